// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io::Write;

use chrono::{DateTime, Utc};
use plotweave_render::text::TextLayout;
use plotweave_render::{
    Color, Font, HorizontalAlignment, Image, LineJoin, Rect, RenderContext, Result, ScreenPoint,
    Size, StandardFont, StandardFontMetrics, VerticalAlignment, rect_has_area, scale_dashes,
    should_fill, should_stroke,
};

use crate::document::{LineCap, PortableDocument};

/// Page size and document information for [`PdfRenderContext`].
#[derive(Clone, Debug, PartialEq)]
pub struct PdfOptions {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Creating application.
    pub creator: Option<String>,
    /// Creation timestamp; `None` stamps the time the context is created.
    pub creation_date: Option<DateTime<Utc>>,
}

impl PdfOptions {
    /// A4 landscape.
    pub const A4_LANDSCAPE: Size = Size::new(297.0 / 25.4 * 72.0, 210.0 / 25.4 * 72.0);

    /// Options for a page of the given size in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            width: Self::A4_LANDSCAPE.width,
            height: Self::A4_LANDSCAPE.height,
            title: None,
            author: None,
            subject: None,
            creator: None,
            creation_date: None,
        }
    }
}

/// [`RenderContext`] that writes a single-page PDF document.
///
/// Drawing coordinates are screen space (origin top-left, y down); the
/// context flips them into PDF user space. The file is written when
/// [`finish`](Self::finish) is called, or on drop as a best effort.
#[derive(Debug)]
pub struct PdfRenderContext<W: Write> {
    doc: PortableDocument,
    out: Option<W>,
    clip_depth: u32,
    width: f64,
    height: f64,
}

impl<W: Write> PdfRenderContext<W> {
    /// Starts a document with one page sized by `options`.
    pub fn new(out: W, options: PdfOptions) -> Self {
        let mut doc = PortableDocument::new();
        let info = doc.info_mut();
        info.title = options.title;
        info.author = options.author;
        info.subject = options.subject;
        info.creator = options.creator;
        info.creation_date = Some(options.creation_date.unwrap_or_else(Utc::now));
        doc.add_page(options.width, options.height);
        Self {
            doc,
            out: Some(out),
            clip_depth: 0,
            width: options.width,
            height: options.height,
        }
    }

    /// The underlying document, for content the render contract does not
    /// cover. Coordinates there are PDF user space.
    pub fn document(&mut self) -> &mut PortableDocument {
        &mut self.doc
    }

    /// Number of clips currently pushed.
    pub fn clip_depth(&self) -> u32 {
        self.clip_depth
    }

    /// Closes open clips, writes the file, and returns the stream.
    pub fn finish(mut self) -> Result<W> {
        self.write_out()
            .map(|out| out.expect("PdfRenderContext output taken before finish"))
    }

    fn write_out(&mut self) -> Result<Option<W>> {
        let Some(out) = self.out.take() else {
            return Ok(None);
        };
        while self.clip_depth > 0 {
            self.doc.restore_state();
            self.clip_depth -= 1;
        }
        let doc = core::mem::take(&mut self.doc);
        doc.save(out).map(Some)
    }

    fn flip(&self, p: ScreenPoint) -> (f64, f64) {
        (p.x, self.height - p.y)
    }

    fn append_path(&mut self, points: &[ScreenPoint]) {
        for (i, p) in points.iter().enumerate() {
            let (x, y) = self.flip(*p);
            if i == 0 {
                self.doc.move_to(x, y);
            } else {
                self.doc.line_to(x, y);
            }
        }
    }

    fn set_stroke_style(
        &mut self,
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        join: LineJoin,
    ) {
        self.doc.set_stroke_color(stroke);
        self.doc.set_line_width(thickness);
        self.doc.set_line_join(join);
        self.doc.set_line_cap(LineCap::Butt);
        match dash_array.filter(|d| !d.is_empty()) {
            Some(dashes) => self.doc.set_dash_pattern(&scale_dashes(dashes, thickness), 0.0),
            None => self.doc.set_dash_pattern(&[], 0.0),
        }
    }

    /// Sets colors for a closed shape and returns whether it fills and strokes.
    fn set_shape_style(
        &mut self,
        fill: Color,
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        join: LineJoin,
    ) -> (bool, bool) {
        let has_fill = should_fill(fill);
        let has_stroke = should_stroke(stroke, thickness);
        if has_fill {
            self.doc.set_fill_color(fill);
        }
        if has_stroke {
            self.set_stroke_style(stroke, thickness, dash_array, join);
        }
        (has_fill, has_stroke)
    }

    fn paint(&mut self, has_fill: bool, has_stroke: bool) {
        match (has_fill, has_stroke) {
            (true, true) => self.doc.fill_and_stroke(),
            (true, false) => self.doc.fill(),
            (false, true) => self.doc.stroke(),
            (false, false) => {}
        }
    }

    /// PDF-space origin and size of a screen rectangle.
    fn flip_rect(&self, rect: Rect) -> (f64, f64, f64, f64) {
        let rect = rect.abs();
        (rect.x0, self.height - rect.y1, rect.width(), rect.height())
    }
}

impl<W: Write> Drop for PdfRenderContext<W> {
    fn drop(&mut self) {
        if let Err(err) = self.write_out() {
            log::warn!(error:% = err; "failed to write PDF document on drop");
        }
    }
}

impl<W: Write> RenderContext for PdfRenderContext<W> {
    fn draw_line(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        _aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 || !should_stroke(stroke, thickness) {
            return Ok(());
        }
        self.set_stroke_style(stroke, thickness, dash_array, line_join);
        self.append_path(points);
        self.doc.stroke();
        Ok(())
    }

    fn draw_line_segments(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        _aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 || !should_stroke(stroke, thickness) {
            return Ok(());
        }
        self.set_stroke_style(stroke, thickness, dash_array, line_join);
        for pair in points.chunks_exact(2) {
            self.append_path(pair);
        }
        self.doc.stroke();
        Ok(())
    }

    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        fill: Color,
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        _aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let (has_fill, has_stroke) =
            self.set_shape_style(fill, stroke, thickness, dash_array, line_join);
        if !has_fill && !has_stroke {
            return Ok(());
        }
        self.append_path(points);
        self.doc.close_subpath();
        self.paint(has_fill, has_stroke);
        Ok(())
    }

    fn draw_rectangle(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        let (has_fill, has_stroke) =
            self.set_shape_style(fill, stroke, thickness, None, LineJoin::Miter);
        if !has_fill && !has_stroke {
            return Ok(());
        }
        let (x, y, w, h) = self.flip_rect(rect);
        self.doc.append_rectangle(x, y, w, h);
        self.paint(has_fill, has_stroke);
        Ok(())
    }

    fn draw_ellipse(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        let (has_fill, has_stroke) =
            self.set_shape_style(fill, stroke, thickness, None, LineJoin::Miter);
        if !has_fill && !has_stroke {
            return Ok(());
        }
        let (x, y, w, h) = self.flip_rect(rect);
        self.doc.append_ellipse(x, y, w, h);
        self.paint(has_fill, has_stroke);
        Ok(())
    }

    fn draw_text(
        &mut self,
        position: ScreenPoint,
        text: &str,
        fill: Color,
        font: &Font<'_>,
        rotation_degrees: f64,
        halign: HorizontalAlignment,
        valign: VerticalAlignment,
        max_size: Option<Size>,
    ) -> Result<()> {
        if text.is_empty() || !should_fill(fill) {
            return Ok(());
        }
        let measured = self.measure_text(text, font);
        let layout = TextLayout::new(position, measured, rotation_degrees, halign, valign, max_size);
        let base = StandardFont::for_font(font);
        let line_height = StandardFontMetrics::line_height(font.size);
        let ascent = StandardFontMetrics::ascent(font.size);
        let align = match halign {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => 0.5,
            HorizontalAlignment::Right => 1.0,
        };

        // Text space: origin at the anchor, x along the rotated baseline,
        // y up. Screen rotation is clockwise, so it reverses in PDF space.
        let (sin, cos) = rotation_degrees.to_radians().sin_cos();
        let (ax, ay) = self.flip(position);
        self.doc.save_state();
        self.doc.transform(cos, -sin, sin, cos, ax, ay);
        self.doc.set_fill_color(fill);
        self.doc.set_font(base, font.size);
        for (i, line) in text.split('\n').enumerate() {
            let line = line.trim_end_matches('\r');
            let width = StandardFontMetrics::line_width(base, line, font.size);
            let x = layout.offset.x + (layout.size.width - width) * align;
            let y = layout.offset.y + i as f64 * line_height + ascent;
            self.doc.draw_text(x, -y, line);
        }
        self.doc.restore_state();
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &Font<'_>) -> Size {
        StandardFontMetrics::measure(text, font)
    }

    fn draw_image(
        &mut self,
        image: &Image,
        src: Rect,
        dst: Rect,
        opacity: f64,
        interpolate: bool,
    ) -> Result<()> {
        let src = src.abs();
        if opacity <= 0.0 || !rect_has_area(dst) || !rect_has_area(src) {
            return Ok(());
        }
        let Some(name) = self.doc.image_resource(image, interpolate)? else {
            return Ok(());
        };
        let dst = dst.abs();
        // Scale the whole image so that `src` lands on `dst`, then clip to `dst`.
        let sx = dst.width() / src.width();
        let sy = dst.height() / src.height();
        let full = Rect::new(
            dst.x0 - src.x0 * sx,
            dst.y0 - src.y0 * sy,
            dst.x0 - src.x0 * sx + f64::from(image.width()) * sx,
            dst.y0 - src.y0 * sy + f64::from(image.height()) * sy,
        );

        self.doc.save_state();
        let (x, y, w, h) = self.flip_rect(dst);
        self.doc.append_rectangle(x, y, w, h);
        self.doc.clip();
        self.doc.set_fill_alpha(opacity.min(1.0));
        let (x, y, w, h) = self.flip_rect(full);
        self.doc.transform(w, 0.0, 0.0, h, x, y);
        self.doc.draw_xobject(&name);
        self.doc.restore_state();
        Ok(())
    }

    fn set_clip(&mut self, rect: Rect) -> Result<bool> {
        log::trace!(depth = self.clip_depth; "PDF clip push");
        self.doc.save_state();
        // Nothing outside the page is visible.
        let page = Rect::new(0.0, 0.0, self.width, self.height).abs();
        let (x, y, w, h) = self.flip_rect(rect.abs().intersect(page));
        self.doc.append_rectangle(x, y, w, h);
        self.doc.clip();
        self.clip_depth += 1;
        Ok(true)
    }

    fn reset_clip(&mut self) -> Result<()> {
        if self.clip_depth == 0 {
            panic!("reset_clip underflow in PDF render context");
        }
        self.clip_depth -= 1;
        log::trace!(depth = self.clip_depth; "PDF clip pop");
        self.doc.restore_state();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn render(build: impl FnOnce(&mut PdfRenderContext<Vec<u8>>) -> Result<()>) -> String {
        let mut options = PdfOptions::new(100.0, 50.0);
        options.creation_date = Some(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap());
        let mut rc = PdfRenderContext::new(Vec::new(), options);
        build(&mut rc).unwrap();
        String::from_utf8_lossy(&rc.finish().unwrap()).into_owned()
    }

    #[test]
    fn default_page_is_a4_landscape() {
        let options = PdfOptions::default();
        assert!((options.width - 841.889_763_779_527_6).abs() < 1e-9);
        assert!((options.height - 595.275_590_551_181_1).abs() < 1e-9);
    }

    #[test]
    fn y_axis_is_flipped() {
        let pdf = render(|rc| {
            rc.draw_line(
                &[ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 20.0)],
                Color::BLACK,
                2.0,
                Some(&[4.0, 1.0]),
                LineJoin::Round,
                false,
            )
        });
        assert!(pdf.contains("2 w\n1 j\n0 J\n[8 2] 0 d\n0 50 m\n10 30 l\nS\n"));
    }

    #[test]
    fn rectangles_pick_the_paint_operator() {
        let pdf = render(|rc| {
            let rect = Rect::new(10.0, 10.0, 30.0, 20.0);
            rc.draw_rectangle(rect, Color::RED, Color::BLACK, 1.0)?;
            rc.draw_rectangle(rect, Color::RED, Color::BLACK, 0.0)?;
            rc.draw_rectangle(rect, Color::TRANSPARENT, Color::BLACK, 1.0)?;
            rc.draw_rectangle(rect, Color::TRANSPARENT, Color::BLACK, 0.0)
        });
        assert_eq!(pdf.matches("10 30 20 10 re\n").count(), 3);
        assert!(pdf.contains("re\nB\n"));
        assert!(pdf.contains("re\nf\n"));
        assert!(pdf.contains("re\nS\n"));
    }

    #[test]
    fn ellipses_are_four_curves() {
        let pdf = render(|rc| {
            rc.draw_ellipse(Rect::new(0.0, 0.0, 20.0, 10.0), Color::BLUE, Color::UNDEFINED, 1.0)
        });
        assert_eq!(pdf.matches(" c\n").count(), 4);
        assert!(pdf.contains("20 45 m\n"));
    }

    #[test]
    fn clips_balance_with_q_and_q() {
        let pdf = render(|rc| {
            assert!(rc.set_clip(Rect::new(0.0, 0.0, 10.0, 10.0))?);
            rc.set_clip(Rect::new(0.0, 0.0, 5.0, 5.0))?;
            rc.reset_clip()?;
            assert_eq!(rc.clip_depth(), 1);
            Ok(())
        });
        assert_eq!(pdf.lines().filter(|l| *l == "q").count(), 2);
        assert_eq!(pdf.lines().filter(|l| *l == "Q").count(), 2);
        assert!(pdf.contains("0 40 10 10 re\nW n\n"));
    }

    #[test]
    fn text_is_placed_with_a_rotation_matrix() {
        let pdf = render(|rc| {
            rc.draw_text(
                ScreenPoint::new(10.0, 20.0),
                "A(1)",
                Color::BLACK,
                &Font::new("Arial", 10.0),
                90.0,
                HorizontalAlignment::Left,
                VerticalAlignment::Top,
                None,
            )
        });
        assert!(pdf.contains("0 -1 1 0 10 30 cm\n"));
        assert!(pdf.contains("/F1 10 Tf\n0 -7.18 Td\n(A\\(1\\)) Tj\n"));
        assert!(pdf.contains("/BaseFont /Helvetica\n"));
    }

    #[test]
    fn sub_images_are_clipped_and_scaled() {
        let image = Image::from_pixels(4, 2, &[Color::GREEN; 8]).unwrap();
        let pdf = render(|rc| {
            rc.draw_image(
                &image,
                Rect::new(1.0, 0.5, 3.0, 1.5),
                Rect::new(10.0, 10.0, 30.0, 20.0),
                0.5,
                false,
            )
        });
        // Destination clip, then the full 40x20 image placed at (0, 5) in
        // screen space, which is (0, 25) from the bottom of a 50pt page.
        assert!(pdf.contains("q\n10 30 20 10 re\nW n\n/GS1 gs\n40 0 0 20 0 25 cm\n/Im1 Do\nQ\n"));
        assert!(pdf.contains("/ca 0.5"));
    }

    #[test]
    fn info_dictionary_is_written() {
        let pdf = render(|_| Ok(()));
        assert!(pdf.contains("/CreationDate (D:20200102030405+00'00)"));
        assert!(pdf.contains("/Producer (Plotweave)"));
    }

    #[test]
    fn dropping_without_finish_still_writes() {
        let mut buf = Vec::new();
        {
            let mut rc = PdfRenderContext::new(&mut buf, PdfOptions::new(10.0, 10.0));
            rc.set_clip(Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        }
        let text = String::from_utf8_lossy(&buf);
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("q\n0 5 5 5 re\nW n\nQ\n"));
    }

    #[test]
    fn unbounded_clips_are_limited_to_the_page() {
        let pdf = render(|rc| {
            rc.set_clip(Rect::new(f64::MIN, f64::MIN, f64::MAX, f64::MAX))?;
            rc.reset_clip()
        });
        assert!(pdf.contains("q\n0 0 100 50 re\nW n\nQ\n"), "{pdf}");
    }

    #[test]
    #[should_panic(expected = "reset_clip underflow")]
    fn unbalanced_reset_panics() {
        let mut rc = PdfRenderContext::new(Vec::new(), PdfOptions::default());
        let _ = rc.reset_clip();
    }
}
