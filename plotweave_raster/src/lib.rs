// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immediate-mode raster backend for Plotweave.
//!
//! [`RasterRenderContext`] implements
//! [`RenderContext`](plotweave_render::RenderContext) on top of a borrowed
//! [`vello_cpu::RenderContext`], the way an interactive plot view redraws a
//! canvas every frame.
//!
//! Pens (stroke styles) and decoded images are cached across frames with a
//! mark-and-sweep scheme: every lookup marks the entry as used in the current
//! generation, and [`RenderContext::clean_up`] drops whatever was not marked
//! since the previous call. Calling `clean_up` once per frame therefore keeps
//! exactly the resources the last frame needed.
//!
//! Text is drawn from glyph outlines of the font in [`RasterOptions::font`].
//! Without a font, text is measured with
//! [`StandardFontMetrics`](plotweave_render::StandardFontMetrics) and not
//! drawn.
//!
//! ```
//! use plotweave_raster::{RasterOptions, RasterRenderContext};
//! use plotweave_render::{Color, Rect, RenderContext};
//!
//! let mut ctx = vello_cpu::RenderContext::new(64, 64);
//! let mut rc = RasterRenderContext::new(&mut ctx, RasterOptions::default());
//! rc.draw_rectangle(Rect::new(8.0, 8.0, 56.0, 56.0), Color::RED, Color::BLACK, 1.0)?;
//! rc.clean_up();
//! assert_eq!(rc.cached_pens(), 1);
//! # Ok::<(), plotweave_render::Error>(())
//! ```

mod cache;
mod text;

use core::fmt;

use peniko::{FontData, ImageAlphaType, ImageData, ImageFormat, ImageQuality, ImageSampler};
use plotweave_render::{
    Color, Font, HorizontalAlignment, Image, LineJoin, Rect, RenderContext, Result, ScreenPoint,
    Size, StandardFontMetrics, VerticalAlignment, rect_has_area, scale_dashes, should_fill,
    should_stroke, text::TextLayout,
};
use vello_cpu::kurbo::{
    Affine as CpuAffine, BezPath, Cap as CpuCap, Ellipse, Join as CpuJoin, Rect as CpuRect,
    Shape, Stroke,
};
use vello_cpu::{Image as CpuImage, ImageSource};

use crate::cache::{GenerationalCache, PenKey};

const ELLIPSE_TOLERANCE: f64 = 0.1;

/// Options for a [`RasterRenderContext`].
#[derive(Clone, Debug, Default)]
pub struct RasterOptions {
    /// Font face used for all text, whatever family a call asks for.
    pub font: Option<FontData>,
}

#[derive(Clone)]
struct DecodedImage {
    source: ImageSource,
    width: u32,
    height: u32,
}

/// Raster implementation of the render context using `vello_cpu`.
pub struct RasterRenderContext<'ctx> {
    /// Underlying Vello CPU render context to draw into.
    pub ctx: &'ctx mut vello_cpu::RenderContext,
    options: RasterOptions,
    pens: GenerationalCache<PenKey, Stroke>,
    /// `None` marks images that failed to decode, so they are not retried
    /// every frame.
    images: GenerationalCache<u64, Option<DecodedImage>>,
    clip_depth: u32,
}

impl fmt::Debug for RasterRenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterRenderContext")
            .field("options", &self.options)
            .field("cached_pens", &self.pens.len())
            .field("cached_images", &self.images.len())
            .field("clip_depth", &self.clip_depth)
            .finish_non_exhaustive()
    }
}

fn cpu_point(p: ScreenPoint) -> (f64, f64) {
    (p.x, p.y)
}

fn cpu_rect(r: Rect) -> CpuRect {
    let r = r.abs();
    CpuRect::new(r.x0, r.y0, r.x1, r.y1)
}

fn cpu_affine(xf: kurbo::Affine) -> CpuAffine {
    CpuAffine::new(xf.as_coeffs())
}

fn cpu_join(join: LineJoin) -> CpuJoin {
    match join {
        LineJoin::Miter => CpuJoin::Miter,
        LineJoin::Round => CpuJoin::Round,
        LineJoin::Bevel => CpuJoin::Bevel,
    }
}

fn rect_path(r: CpuRect) -> BezPath {
    r.to_path(0.0)
}

/// Snaps a coordinate so that a stroke of `thickness` covers whole pixels.
///
/// Odd widths are centered on pixel centers, even widths on pixel edges.
fn snap(v: f64, thickness: f64) -> f64 {
    let offset = if thickness.round() % 2.0 == 1.0 {
        0.5
    } else {
        0.0
    };
    (v - offset).round() + offset
}

fn polyline(points: &[ScreenPoint], thickness: f64, aliased: bool) -> BezPath {
    let mut path = BezPath::new();
    for (i, &p) in points.iter().enumerate() {
        let p = if aliased {
            (snap(p.x, thickness), snap(p.y, thickness))
        } else {
            cpu_point(p)
        };
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

fn decode(image: &Image) -> Option<DecodedImage> {
    match image.to_rgba8() {
        Ok(rgba) => {
            let data = ImageData {
                data: peniko::Blob::from(rgba),
                format: ImageFormat::Rgba8,
                alpha_type: ImageAlphaType::Alpha,
                width: image.width(),
                height: image.height(),
            };
            Some(DecodedImage {
                source: ImageSource::from_peniko_image_data(&data),
                width: image.width(),
                height: image.height(),
            })
        }
        Err(err) => {
            log::warn!(
                image = image.id(),
                error:% = err;
                "skipping image the raster backend cannot decode"
            );
            None
        }
    }
}

impl<'ctx> RasterRenderContext<'ctx> {
    /// Creates a render context that draws into `ctx`.
    pub fn new(ctx: &'ctx mut vello_cpu::RenderContext, options: RasterOptions) -> Self {
        Self {
            ctx,
            options,
            pens: GenerationalCache::default(),
            images: GenerationalCache::default(),
            clip_depth: 0,
        }
    }

    /// Number of pens currently cached.
    pub fn cached_pens(&self) -> usize {
        self.pens.len()
    }

    /// Number of images currently cached, including ones that failed to
    /// decode.
    pub fn cached_images(&self) -> usize {
        self.images.len()
    }

    /// Number of clip rectangles currently pushed.
    pub fn clip_depth(&self) -> u32 {
        self.clip_depth
    }

    /// Looks up or creates the pen for a stroke style and makes it current.
    fn use_pen(
        &mut self,
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
    ) {
        let key = PenKey::new(stroke, thickness, dash_array, line_join);
        let pen = self.pens.get_or_insert_with(key, || {
            let mut pen = Stroke::new(thickness)
                .with_join(cpu_join(line_join))
                .with_caps(CpuCap::Butt);
            if let Some(dashes) = dash_array.filter(|d| !d.is_empty()) {
                pen = pen.with_dashes(0.0, scale_dashes(dashes, thickness));
            }
            pen
        });
        self.ctx.set_stroke(pen.clone());
        self.ctx.set_paint(stroke.to_peniko());
    }

    fn fill_and_stroke(
        &mut self,
        path: &BezPath,
        fill: Color,
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
    ) {
        if should_fill(fill) {
            self.ctx.set_paint(fill.to_peniko());
            self.ctx.fill_path(path);
        }
        if should_stroke(stroke, thickness) {
            self.use_pen(stroke, thickness, dash_array, line_join);
            self.ctx.stroke_path(path);
        }
    }

    fn draw_text_outlines(
        &mut self,
        font: &FontData,
        text: &str,
        fill: Color,
        size: f64,
        layout: &TextLayout,
        halign: HorizontalAlignment,
    ) {
        let Some(metrics) = text::line_metrics(font, size) else {
            log::warn!("raster text font could not be parsed; text is not drawn");
            return;
        };
        let align = match halign {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => 0.5,
            HorizontalAlignment::Right => 1.0,
        };
        let mut path = BezPath::new();
        let mut baseline = metrics.ascent;
        for line in text::lines(text) {
            let width = text::line_width(font, line, size).unwrap_or(0.0);
            let x = (layout.size.width - width) * align;
            text::append_line(font, line, size, x, baseline, &mut path);
            baseline += metrics.line_height;
        }
        if path.elements().is_empty() {
            return;
        }

        let saved_transform = *self.ctx.transform();
        self.ctx
            .set_transform(saved_transform * cpu_affine(layout.transform));
        self.ctx.set_paint(fill.to_peniko());
        self.ctx.fill_path(&path);
        self.ctx.set_transform(saved_transform);
    }
}

impl RenderContext for RasterRenderContext<'_> {
    fn renders_to_screen(&self) -> bool {
        true
    }

    fn draw_line(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 || !should_stroke(stroke, thickness) {
            return Ok(());
        }
        let path = polyline(points, thickness, aliased);
        self.use_pen(stroke, thickness, dash_array, line_join);
        self.ctx.stroke_path(&path);
        Ok(())
    }

    fn draw_line_segments(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 || !should_stroke(stroke, thickness) {
            return Ok(());
        }
        let mut path = BezPath::new();
        for pair in points.chunks_exact(2) {
            path.extend(polyline(pair, thickness, aliased));
        }
        self.use_pen(stroke, thickness, dash_array, line_join);
        self.ctx.stroke_path(&path);
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
        aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let mut path = polyline(points, thickness, aliased);
        path.close_path();
        self.fill_and_stroke(&path, fill, stroke, thickness, dash_array, line_join);
        Ok(())
    }

    fn draw_rectangle(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        let path = rect_path(cpu_rect(rect));
        self.fill_and_stroke(&path, fill, stroke, thickness, None, LineJoin::Miter);
        Ok(())
    }

    fn draw_ellipse(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        let path = Ellipse::from_rect(cpu_rect(rect)).to_path(ELLIPSE_TOLERANCE);
        self.fill_and_stroke(&path, fill, stroke, thickness, None, LineJoin::Miter);
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
        let Some(face) = self.options.font.clone() else {
            log::warn!(family = font.family; "no font loaded for raster text; text is not drawn");
            return Ok(());
        };
        let measured = self.measure_text(text, font);
        let layout = TextLayout::new(position, measured, rotation_degrees, halign, valign, max_size);
        self.draw_text_outlines(&face, text, fill, font.size, &layout, halign);
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &Font<'_>) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        self.options
            .font
            .as_ref()
            .and_then(|face| text::measure(face, text, font.size))
            .unwrap_or_else(|| StandardFontMetrics::measure(text, font))
    }

    fn draw_image(
        &mut self,
        image: &Image,
        src: Rect,
        dst: Rect,
        opacity: f64,
        interpolate: bool,
    ) -> Result<()> {
        if opacity <= 0.0 || !rect_has_area(src) || !rect_has_area(dst) {
            return Ok(());
        }
        let Some(decoded) = self
            .images
            .get_or_insert_with(image.id(), || decode(image))
            .clone()
        else {
            return Ok(());
        };

        let src = src.abs();
        let dst = dst.abs();
        // Whole device pixels; sampling already happens at pixel centers.
        let dst = CpuRect::new(dst.x0.floor(), dst.y0.floor(), dst.x1.ceil(), dst.y1.ceil());
        let local = CpuAffine::translate((dst.x0, dst.y0))
            * CpuAffine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * CpuAffine::translate((-src.x0, -src.y0));

        let quality = if interpolate {
            ImageQuality::Medium
        } else {
            ImageQuality::Low
        };
        let image_paint = CpuImage {
            image: decoded.source,
            sampler: ImageSampler {
                quality,
                ..ImageSampler::default()
            },
        };

        #[allow(
            clippy::cast_possible_truncation,
            reason = "opacity is clamped to 0..=1"
        )]
        let opacity = opacity.min(1.0) as f32;
        let saved_transform = *self.ctx.transform();
        let saved_paint = self.ctx.paint().clone();

        self.ctx
            .push_layer(Some(&rect_path(dst)), None, Some(opacity), None, None);
        self.ctx.set_paint(image_paint);
        self.ctx.set_transform(saved_transform * local);
        self.ctx.fill_rect(&CpuRect::new(
            0.0,
            0.0,
            f64::from(decoded.width),
            f64::from(decoded.height),
        ));
        self.ctx.set_transform(saved_transform);
        self.ctx.set_paint(saved_paint);
        self.ctx.pop_layer();
        Ok(())
    }

    fn set_clip(&mut self, rect: Rect) -> Result<bool> {
        // Nothing outside the pixmap is visible.
        let target = Rect::new(
            0.0,
            0.0,
            f64::from(self.ctx.width()),
            f64::from(self.ctx.height()),
        );
        self.ctx
            .push_clip_layer(&rect_path(cpu_rect(rect.abs().intersect(target))));
        self.clip_depth += 1;
        log::trace!(depth = self.clip_depth; "pushed raster clip");
        Ok(true)
    }

    fn reset_clip(&mut self) -> Result<()> {
        assert!(
            self.clip_depth > 0,
            "reset_clip underflow in raster render context"
        );
        self.ctx.pop_layer();
        self.clip_depth -= 1;
        Ok(())
    }

    fn clean_up(&mut self) {
        let pens = self.pens.sweep();
        let images = self.images.sweep();
        log::debug!(
            evicted_pens = pens,
            evicted_images = images,
            kept_pens = self.pens.len(),
            kept_images = self.images.len();
            "raster cache sweep"
        );
    }
}

#[cfg(test)]
mod tests {
    use vello_cpu::{Pixmap, RenderMode, RenderSettings};

    use super::*;

    const SIZE: u16 = 20;

    fn render(build: impl FnOnce(&mut RasterRenderContext<'_>)) -> Vec<[u8; 4]> {
        let settings = RenderSettings {
            render_mode: RenderMode::OptimizeSpeed,
            ..RenderSettings::default()
        };
        let mut ctx = vello_cpu::RenderContext::new_with(SIZE, SIZE, settings);
        let mut rc = RasterRenderContext::new(&mut ctx, RasterOptions::default());
        build(&mut rc);

        let mut pixmap = Pixmap::new(SIZE, SIZE);
        rc.ctx.flush();
        rc.ctx.render_to_pixmap(&mut pixmap);
        pixmap
            .take_unpremultiplied()
            .into_iter()
            .map(|p| [p.r, p.g, p.b, p.a])
            .collect()
    }

    fn at(pixels: &[[u8; 4]], x: usize, y: usize) -> [u8; 4] {
        pixels[y * usize::from(SIZE) + x]
    }

    fn red_blue() -> Image {
        Image::from_pixels(2, 1, &[Color::RED, Color::BLUE]).unwrap()
    }

    #[test]
    fn filled_rectangle_covers_its_pixels() {
        let pixels = render(|rc| {
            rc.draw_rectangle(
                Rect::new(4.0, 4.0, 16.0, 16.0),
                Color::RED,
                Color::UNDEFINED,
                1.0,
            )
            .unwrap();
        });
        assert_eq!(at(&pixels, 10, 10), [255, 0, 0, 255]);
        assert_eq!(at(&pixels, 1, 1)[3], 0);
    }

    #[test]
    fn clip_limits_drawing_until_reset() {
        let pixels = render(|rc| {
            assert!(rc.set_clip(Rect::new(0.0, 0.0, 10.0, 20.0)).unwrap());
            rc.draw_rectangle(
                Rect::new(0.0, 0.0, 20.0, 10.0),
                Color::BLUE,
                Color::UNDEFINED,
                0.0,
            )
            .unwrap();
            rc.reset_clip().unwrap();
            rc.draw_rectangle(
                Rect::new(0.0, 10.0, 20.0, 20.0),
                Color::GREEN,
                Color::UNDEFINED,
                0.0,
            )
            .unwrap();
            assert_eq!(rc.clip_depth(), 0);
        });
        assert_eq!(at(&pixels, 5, 5), [0, 0, 255, 255]);
        assert_eq!(at(&pixels, 15, 5)[3], 0);
        assert_eq!(at(&pixels, 15, 15)[3], 255);
    }

    #[test]
    #[should_panic(expected = "reset_clip underflow")]
    fn unbalanced_reset_clip_panics() {
        let mut ctx = vello_cpu::RenderContext::new(4, 4);
        let mut rc = RasterRenderContext::new(&mut ctx, RasterOptions::default());
        let _ = rc.reset_clip();
    }

    #[test]
    fn pens_unused_for_a_frame_are_evicted() {
        let mut ctx = vello_cpu::RenderContext::new(SIZE, SIZE);
        let mut rc = RasterRenderContext::new(&mut ctx, RasterOptions::default());
        let line = [ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0)];
        let draw = |rc: &mut RasterRenderContext<'_>, color: Color| {
            rc.draw_line(&line, color, 1.0, None, LineJoin::Miter, false)
                .unwrap();
        };

        draw(&mut rc, Color::RED);
        draw(&mut rc, Color::BLUE);
        draw(&mut rc, Color::BLUE);
        assert_eq!(rc.cached_pens(), 2);
        rc.clean_up();
        assert_eq!(rc.cached_pens(), 2);

        draw(&mut rc, Color::BLUE);
        rc.clean_up();
        assert_eq!(rc.cached_pens(), 1);

        rc.clean_up();
        assert_eq!(rc.cached_pens(), 0);
    }

    #[test]
    fn images_unused_for_a_frame_are_evicted() {
        let mut ctx = vello_cpu::RenderContext::new(SIZE, SIZE);
        let mut rc = RasterRenderContext::new(&mut ctx, RasterOptions::default());
        let (a, b) = (red_blue(), red_blue());
        let src = Rect::new(0.0, 0.0, 2.0, 1.0);
        let dst = Rect::new(0.0, 0.0, 4.0, 2.0);

        rc.draw_image(&a, src, dst, 1.0, false).unwrap();
        rc.draw_image(&b, src, dst, 1.0, false).unwrap();
        rc.draw_image(&b.clone(), src, dst, 1.0, false).unwrap();
        assert_eq!(rc.cached_images(), 2);
        rc.clean_up();

        rc.draw_image(&b, src, dst, 1.0, false).unwrap();
        rc.clean_up();
        assert_eq!(rc.cached_images(), 1);
    }

    #[test]
    fn undecodable_images_are_skipped_and_remembered() {
        let mut bmp = b"BM".to_vec();
        bmp.resize(26, 0);
        bmp[18] = 1;
        bmp[22] = 1;
        let image = Image::from_bytes(bmp).unwrap();

        let pixels = render(|rc| {
            let all = Rect::new(0.0, 0.0, 20.0, 20.0);
            rc.draw_image(&image, Rect::new(0.0, 0.0, 1.0, 1.0), all, 1.0, true)
                .unwrap();
            assert_eq!(rc.cached_images(), 1);
        });
        assert!(pixels.iter().all(|p| p[3] == 0));
    }

    #[test]
    fn nearest_neighbor_image_fills_the_destination() {
        let pixels = render(|rc| {
            rc.draw_image(
                &red_blue(),
                Rect::new(0.0, 0.0, 2.0, 1.0),
                Rect::new(0.0, 0.0, 20.0, 10.0),
                1.0,
                false,
            )
            .unwrap();
        });
        assert_eq!(at(&pixels, 2, 5), [255, 0, 0, 255]);
        assert_eq!(at(&pixels, 17, 5), [0, 0, 255, 255]);
        assert_eq!(at(&pixels, 10, 15)[3], 0);
    }

    #[test]
    fn source_rectangle_selects_part_of_the_image() {
        let pixels = render(|rc| {
            rc.draw_image(
                &red_blue(),
                Rect::new(1.0, 0.0, 2.0, 1.0),
                Rect::new(0.0, 0.0, 10.0, 10.0),
                1.0,
                false,
            )
            .unwrap();
        });
        assert_eq!(at(&pixels, 2, 2), [0, 0, 255, 255]);
        assert_eq!(at(&pixels, 8, 8), [0, 0, 255, 255]);
    }

    #[test]
    fn image_opacity_blends() {
        let pixels = render(|rc| {
            rc.draw_image(
                &red_blue(),
                Rect::new(0.0, 0.0, 1.0, 1.0),
                Rect::new(0.0, 0.0, 20.0, 20.0),
                0.5,
                false,
            )
            .unwrap();
        });
        let alpha = at(&pixels, 10, 10)[3];
        assert!((120..=135).contains(&alpha), "alpha was {alpha}");
    }

    #[test]
    fn aliased_odd_strokes_land_on_pixel_centers() {
        assert_eq!(snap(3.2, 1.0), 3.5);
        assert_eq!(snap(3.7, 1.0), 3.5);
        assert_eq!(snap(3.7, 2.0), 4.0);
        assert_eq!(snap(3.2, 0.4), 3.0);
    }

    #[test]
    fn text_without_a_font_is_measured_but_not_drawn() {
        let font = Font::new("Arial", 12.0);
        let pixels = render(|rc| {
            assert_eq!(rc.measure_text("", &font), Size::ZERO);
            assert_eq!(
                rc.measure_text("Tick 10", &font),
                StandardFontMetrics::measure("Tick 10", &font)
            );
            rc.draw_text(
                ScreenPoint::new(2.0, 2.0),
                "Tick 10",
                Color::BLACK,
                &font,
                0.0,
                HorizontalAlignment::Left,
                VerticalAlignment::Top,
                None,
            )
            .unwrap();
        });
        assert!(pixels.iter().all(|p| p[3] == 0));
    }

    #[test]
    fn renders_to_screen() {
        let mut ctx = vello_cpu::RenderContext::new(1, 1);
        let rc = RasterRenderContext::new(&mut ctx, RasterOptions::default());
        assert!(rc.renders_to_screen());
    }
}
