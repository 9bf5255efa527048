// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt::Write as _;
use std::io::{self, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use plotweave_render::text::TextLayout;
use plotweave_render::{
    Color, Error, Font, HorizontalAlignment, Image, LineJoin, Rect, Result, ScreenPoint, Size,
    StandardFont, StandardFontMetrics, VerticalAlignment, rect_has_area, scale_dashes,
    should_fill, should_stroke,
};

/// Document-level settings for [`SvgWriter`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SvgOptions {
    /// Width of the root element, in user units.
    pub width: f64,
    /// Height of the root element, in user units.
    pub height: f64,
    /// Writes the XML declaration and DOCTYPE when `true`. Turn off to
    /// produce a fragment for embedding into another document.
    pub is_document: bool,
}

impl SvgOptions {
    /// Options for a standalone document of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            is_document: true,
        }
    }
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self::new(600.0, 400.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Open {
    Root,
    ClipGroup,
}

/// Incremental SVG element writer.
///
/// The writer keeps the stack of open elements so that the document is
/// always closed in the right order, and a registry of clip rectangles so
/// that each distinct rectangle is defined once and referenced by id.
pub struct SvgWriter<W: Write> {
    out: Option<W>,
    stack: Vec<Open>,
    clips: Vec<(Rect, String)>,
    viewport: Rect,
}

impl<W: Write> std::fmt::Debug for SvgWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgWriter")
            .field("depth", &self.stack.len())
            .field("clips", &self.clips.len())
            .finish_non_exhaustive()
    }
}

impl<W: Write> SvgWriter<W> {
    /// Starts a document and writes the root start tag.
    pub fn new(out: W, options: SvgOptions) -> Result<Self> {
        let mut writer = Self {
            out: Some(out),
            stack: Vec::new(),
            clips: Vec::new(),
            viewport: Rect::new(0.0, 0.0, options.width, options.height).abs(),
        };
        let mut head = String::new();
        if options.is_document {
            head.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"no\"?>\n");
            head.push_str(
                "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
            );
        }
        let _ = writeln!(
            head,
            "<svg width=\"{}\" height=\"{}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">",
            fmt_num(options.width),
            fmt_num(options.height),
        );
        writer.emit(&head)?;
        writer.stack.push(Open::Root);
        Ok(writer)
    }

    fn emit(&mut self, s: &str) -> Result<()> {
        if let Some(out) = self.out.as_mut() {
            out.write_all(s.as_bytes())?;
        }
        Ok(())
    }

    /// Number of clip groups currently open.
    pub fn clip_depth(&self) -> usize {
        self.stack.iter().filter(|o| **o == Open::ClipGroup).count()
    }

    /// Opens a group clipped to `rect`.
    ///
    /// The rectangle is first intersected with the root viewport. The first
    /// clip with a given rectangle emits a `clipPath` definition;
    /// later clips with the same rectangle reference it.
    pub fn begin_clip(&mut self, rect: Rect) -> Result<()> {
        // Nothing outside the root viewport is visible.
        let rect = rect.abs().intersect(self.viewport);
        let id = match self.clips.iter().find(|(r, _)| *r == rect) {
            Some((_, id)) => id.clone(),
            None => {
                let id = format!("clip{}", self.clips.len() + 1);
                let mut def = String::new();
                let _ = writeln!(
                    def,
                    "<defs><clipPath id=\"{id}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/></clipPath></defs>",
                    fmt_num(rect.x0),
                    fmt_num(rect.y0),
                    fmt_num(rect.width()),
                    fmt_num(rect.height()),
                );
                self.emit(&def)?;
                self.clips.push((rect, id.clone()));
                id
            }
        };
        log::trace!("svg: begin clip {id}");
        self.emit(&format!("<g clip-path=\"url(#{id})\">\n"))?;
        self.stack.push(Open::ClipGroup);
        Ok(())
    }

    /// Closes the group opened by the matching [`SvgWriter::begin_clip`].
    ///
    /// # Panics
    ///
    /// Panics if no clip group is open.
    pub fn end_clip(&mut self) -> Result<()> {
        if self.stack.last() != Some(&Open::ClipGroup) {
            panic!("end_clip underflow in SVG writer");
        }
        self.stack.pop();
        log::trace!("svg: end clip");
        self.emit("</g>\n")
    }

    /// Writes an ellipse inscribed in the given box.
    pub fn write_ellipse(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: &str,
    ) -> Result<()> {
        self.emit(&format!(
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" style=\"{style}\"/>\n",
            fmt_num(x + width / 2.0),
            fmt_num(y + height / 2.0),
            fmt_num(width / 2.0),
            fmt_num(height / 2.0),
        ))
    }

    /// Writes a single line segment.
    pub fn write_line(&mut self, p1: ScreenPoint, p2: ScreenPoint, style: &str) -> Result<()> {
        self.emit(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" style=\"{style}\"/>\n",
            fmt_num(p1.x),
            fmt_num(p1.y),
            fmt_num(p2.x),
            fmt_num(p2.y),
        ))
    }

    /// Writes an open polyline.
    pub fn write_polyline(&mut self, points: &[ScreenPoint], style: &str) -> Result<()> {
        self.emit(&format!(
            "<polyline points=\"{}\" style=\"{style}\"/>\n",
            points_attr(points)
        ))
    }

    /// Writes a closed polygon.
    pub fn write_polygon(&mut self, points: &[ScreenPoint], style: &str) -> Result<()> {
        self.emit(&format!(
            "<polygon points=\"{}\" style=\"{style}\"/>\n",
            points_attr(points)
        ))
    }

    /// Writes an axis-aligned rectangle.
    pub fn write_rectangle(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: &str,
    ) -> Result<()> {
        self.emit(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" style=\"{style}\"/>\n",
            fmt_num(x),
            fmt_num(y),
            fmt_num(width),
            fmt_num(height),
        ))
    }

    /// Writes text anchored at `position`.
    ///
    /// Layout follows [`TextLayout`]: lines are stacked top to bottom inside
    /// the measured (and clamped) box, each line aligned within the box
    /// according to `halign`.
    pub fn write_text(
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
        let measured = StandardFontMetrics::measure(text, font);
        let layout = TextLayout::new(position, measured, rotation_degrees, halign, valign, max_size);
        let base = StandardFont::for_font(font);
        let line_height = StandardFontMetrics::line_height(font.size);
        let ascent = StandardFontMetrics::ascent(font.size);
        let align = match halign {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => 0.5,
            HorizontalAlignment::Right => 1.0,
        };

        let mut el = String::new();
        let _ = write!(
            el,
            "<text transform=\"translate({},{})",
            fmt_num(position.x),
            fmt_num(position.y)
        );
        if rotation_degrees.abs() >= f64::EPSILON {
            let _ = write!(el, " rotate({})", fmt_num(rotation_degrees));
        }
        let _ = write!(
            el,
            "\" font-family=\"{}\" font-size=\"{}\"",
            escape(font.family),
            fmt_num(font.size)
        );
        if font.weight.0 != 400.0 {
            let _ = write!(el, " font-weight=\"{}\"", fmt_num(font.weight.0));
        }
        let _ = write!(el, " style=\"{}\">", fill_css(fill));

        for (i, line) in text.split('\n').enumerate() {
            let line = line.trim_end_matches('\r');
            let width = StandardFontMetrics::line_width(base, line, font.size);
            let x = layout.offset.x + (layout.size.width - width) * align;
            let y = layout.offset.y + i as f64 * line_height + ascent;
            let _ = write!(
                el,
                "<tspan x=\"{}\" y=\"{}\" xml:space=\"preserve\">{}</tspan>",
                fmt_num(x),
                fmt_num(y),
                escape(line)
            );
        }
        el.push_str("</text>\n");
        self.emit(&el)
    }

    /// Embeds `image` stretched over the given box.
    pub fn write_image(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: &Image,
        opacity: f64,
        interpolate: bool,
    ) -> Result<()> {
        let mut el = format!(
            "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\"",
            fmt_num(x),
            fmt_num(y),
            fmt_num(width),
            fmt_num(height),
        );
        if opacity < 1.0 {
            let _ = write!(el, " opacity=\"{}\"", fmt_num(opacity.max(0.0)));
        }
        if !interpolate {
            el.push_str(" image-rendering=\"optimizeSpeed\"");
        }
        let _ = writeln!(
            el,
            " xlink:href=\"data:{};base64,{}\"/>",
            image.format().mime_type(),
            BASE64.encode(image.bytes())
        );
        self.emit(&el)
    }

    /// Embeds the `src` region of `image` (in image pixels) into `dst`.
    ///
    /// The whole image is scaled so that `src` lands on `dst`, inside a clip
    /// group restricted to `dst`.
    pub fn write_image_region(
        &mut self,
        src: Rect,
        dst: Rect,
        image: &Image,
        opacity: f64,
        interpolate: bool,
    ) -> Result<()> {
        let (src, dst) = (src.abs(), dst.abs());
        if !rect_has_area(src) || !rect_has_area(dst) {
            return Ok(());
        }
        let sx = dst.width() / src.width();
        let sy = dst.height() / src.height();
        let x = dst.x0 - src.x0 * sx;
        let y = dst.y0 - src.y0 * sy;
        let width = f64::from(image.width()) * sx;
        let height = f64::from(image.height()) * sy;

        self.begin_clip(dst)?;
        let written = self.write_image(x, y, width, height, image, opacity, interpolate);
        self.end_clip()?;
        written
    }

    /// Writes an XML comment.
    pub fn write_comment(&mut self, comment: &str) -> Result<()> {
        let comment: String = comment
            .chars()
            .filter(|&c| is_xml_char(c))
            .collect::<String>()
            .replace("--", "- -");
        self.emit(&format!("<!-- {comment} -->\n"))
    }

    /// Writes pre-formatted markup as is.
    pub fn write_raw(&mut self, markup: &str) -> Result<()> {
        self.emit(markup)
    }

    /// Pushes buffered bytes to the underlying stream without closing any
    /// element.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        while let Some(open) = self.stack.pop() {
            match open {
                Open::ClipGroup => self.emit("</g>\n")?,
                Open::Root => self.emit("</svg>\n")?,
            }
        }
        self.flush()
    }

    /// Closes every open element, writes the root end tag and returns the
    /// stream.
    pub fn finish(mut self) -> Result<W> {
        self.close()?;
        self.out
            .take()
            .ok_or_else(|| Error::Io(io::Error::other("SVG writer has no output stream")))
    }
}

impl<W: Write> Drop for SvgWriter<W> {
    fn drop(&mut self) {
        if self.out.is_some()
            && !self.stack.is_empty()
            && let Err(err) = self.close()
        {
            log::warn!("SVG document was dropped unfinished and could not be closed: {err}");
        }
    }
}

/// Builds a `style` attribute value for the given paint.
///
/// Returns `None` when neither the fill nor the stroke would be visible, in
/// which case callers skip the element entirely. Dash arrays are in units of
/// `thickness`.
pub fn create_style(
    fill: Color,
    stroke: Color,
    thickness: f64,
    dash_array: Option<&[f64]>,
    line_join: LineJoin,
    aliased: bool,
) -> Option<String> {
    let has_fill = should_fill(fill);
    let has_stroke = should_stroke(stroke, thickness);
    if !has_fill && !has_stroke {
        return None;
    }

    let mut style = if has_fill {
        fill_css(fill)
    } else {
        String::from("fill:none")
    };
    if has_stroke {
        let _ = write!(
            style,
            ";stroke:{};stroke-width:{}",
            stroke.to_hex_rgb(),
            fmt_num(thickness)
        );
        if stroke.a() < 255 {
            let _ = write!(style, ";stroke-opacity:{}", fmt_num(stroke.opacity()));
        }
        if let Some(dashes) = dash_array.filter(|d| !d.is_empty()) {
            let dashes: Vec<String> = scale_dashes(dashes, thickness)
                .iter()
                .map(|d| fmt_num(*d))
                .collect();
            let _ = write!(style, ";stroke-dasharray:{}", dashes.join(","));
        }
        let join = match line_join {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        };
        let _ = write!(style, ";stroke-linejoin:{join}");
    }
    if aliased {
        style.push_str(";shape-rendering:crispEdges");
    }
    Some(style)
}

fn fill_css(fill: Color) -> String {
    let mut css = format!("fill:{}", fill.to_hex_rgb());
    if fill.a() < 255 {
        let _ = write!(css, ";fill-opacity:{}", fmt_num(fill.opacity()));
    }
    css
}

fn points_attr(points: &[ScreenPoint]) -> String {
    let mut s = String::new();
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        let _ = write!(s, "{},{}", fmt_num(p.x), fmt_num(p.y));
    }
    s
}

/// Whether `c` is representable in XML 1.0.
fn is_xml_char(c: char) -> bool {
    !c.is_control() || matches!(c, '\t' | '\n' | '\r')
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if !is_xml_char(c) => {}
            c => out.push(c),
        }
    }
    out
}

/// Largest magnitude written as a coordinate; anything beyond is far
/// outside every viewport.
const MAX_COORDINATE: f64 = 1.0e9;

pub(crate) fn fmt_num(v: f64) -> String {
    if v.is_nan() {
        return String::from("0");
    }
    let v = v.clamp(-MAX_COORDINATE, MAX_COORDINATE);
    let mut s = format!("{v:.3}");
    while s.contains('.') && s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s = String::from("0");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(build: impl FnOnce(&mut SvgWriter<Vec<u8>>) -> Result<()>) -> String {
        let mut writer = SvgWriter::new(Vec::new(), SvgOptions::new(200.0, 200.0)).unwrap();
        build(&mut writer).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    fn style() -> String {
        create_style(Color::BLUE, Color::BLACK, 2.0, None, LineJoin::Miter, false).unwrap()
    }

    #[test]
    fn write_ellipse() {
        let svg = document(|w| w.write_ellipse(10.0, 20.0, 30.0, 40.0, &style()));
        assert!(svg.contains("<ellipse cx=\"25\" cy=\"40\" rx=\"15\" ry=\"20\""));
    }

    #[test]
    fn write_line() {
        let svg = document(|w| {
            w.write_line(ScreenPoint::new(10.0, 10.0), ScreenPoint::new(150.0, 80.0), &style())
        });
        assert!(svg.contains("<line x1=\"10\" y1=\"10\" x2=\"150\" y2=\"80\""));
    }

    #[test]
    fn write_polygon_and_polyline() {
        let points = [
            ScreenPoint::new(10.0, 10.0),
            ScreenPoint::new(150.0, 80.0),
            ScreenPoint::new(10.5, 120.25),
        ];
        let svg = document(|w| {
            w.write_polygon(&points, &style())?;
            w.write_polyline(&points, &style())
        });
        assert!(svg.contains("<polygon points=\"10,10 150,80 10.5,120.25\""));
        assert!(svg.contains("<polyline points=\"10,10 150,80 10.5,120.25\""));
    }

    #[test]
    fn write_rectangle() {
        let svg = document(|w| w.write_rectangle(10.0, 20.0, 150.0, 80.0, &style()));
        assert!(svg.contains("<rect x=\"10\" y=\"20\" width=\"150\" height=\"80\""));
    }

    #[test]
    fn write_text() {
        let font = Font::new("Arial", 24.0);
        let svg = document(|w| {
            w.write_text(
                ScreenPoint::new(10.0, 10.0),
                "Hello <world>",
                Color::BLACK,
                &font,
                90.0,
                HorizontalAlignment::Left,
                VerticalAlignment::Top,
                None,
            )
        });
        assert!(svg.contains("transform=\"translate(10,10) rotate(90)\""));
        assert!(svg.contains("Hello &lt;world&gt;"));
    }

    #[test]
    fn write_clipped_ellipse() {
        let svg = document(|w| {
            w.begin_clip(Rect::new(20.0, 20.0, 120.0, 120.0))?;
            w.write_ellipse(10.0, 10.0, 100.0, 100.0, &style())?;
            w.end_clip()?;
            w.flush()
        });
        assert!(svg.contains("<clipPath id=\"clip1\"><rect x=\"20\" y=\"20\" width=\"100\" height=\"100\"/>"));
        assert!(svg.contains("<g clip-path=\"url(#clip1)\">"));
        assert_eq!(svg.matches("</svg>").count(), 1);
    }

    #[test]
    fn identical_clips_share_a_definition() {
        let clip = Rect::new(0.0, 0.0, 50.0, 50.0);
        let svg = document(|w| {
            w.begin_clip(clip)?;
            w.end_clip()?;
            w.begin_clip(clip)?;
            w.end_clip()?;
            w.begin_clip(Rect::new(0.0, 0.0, 10.0, 10.0))?;
            w.end_clip()
        });
        assert_eq!(svg.matches("<clipPath").count(), 2);
        assert_eq!(svg.matches("url(#clip1)").count(), 2);
        assert_eq!(svg.matches("url(#clip2)").count(), 1);
    }

    #[test]
    fn finish_closes_open_clips() {
        let svg = document(|w| {
            w.begin_clip(Rect::new(0.0, 0.0, 50.0, 50.0))?;
            w.begin_clip(Rect::new(0.0, 0.0, 40.0, 40.0))
        });
        assert!(svg.ends_with("</g>\n</g>\n</svg>\n"));
    }

    #[test]
    #[should_panic(expected = "end_clip underflow")]
    fn end_clip_without_begin_panics() {
        let mut writer = SvgWriter::new(Vec::new(), SvgOptions::default()).unwrap();
        let _ = writer.end_clip();
    }

    #[test]
    fn invisible_style_is_none() {
        assert!(create_style(Color::TRANSPARENT, Color::BLACK, 0.0, None, LineJoin::Miter, false).is_none());
        let stroke_only =
            create_style(Color::TRANSPARENT, Color::RED, 2.0, Some(&[4.0, 1.0]), LineJoin::Round, true)
                .unwrap();
        assert_eq!(
            stroke_only,
            "fill:none;stroke:#ff0000;stroke-width:2;stroke-dasharray:8,2;stroke-linejoin:round;shape-rendering:crispEdges"
        );
    }

    #[test]
    fn fragments_skip_the_prolog() {
        let mut options = SvgOptions::new(10.0, 10.0);
        options.is_document = false;
        let writer = SvgWriter::new(Vec::new(), options).unwrap();
        let svg = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(svg.starts_with("<svg "));
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(0.1234), "0.123");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(f64::NAN), "0");
        assert_eq!(fmt_num(f64::MAX), "1000000000");
        assert_eq!(fmt_num(f64::NEG_INFINITY), "-1000000000");
    }

    #[test]
    fn unbounded_clips_are_limited_to_the_viewport() {
        let svg = document(|w| {
            w.begin_clip(Rect::new(f64::MIN, f64::MIN, f64::MAX, f64::MAX))?;
            w.end_clip()
        });
        assert!(
            svg.contains("<rect x=\"0\" y=\"0\" width=\"200\" height=\"200\"/>"),
            "{svg}"
        );
    }

    #[test]
    fn comments_drop_characters_xml_cannot_hold() {
        let svg = document(|w| w.write_comment("a\u{1}b--c\u{7f}"));
        assert!(svg.contains("<!-- ab- -c -->"), "{svg}");
    }
}
