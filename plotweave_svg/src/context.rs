// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io::Write;

use plotweave_render::{
    Color, Font, HorizontalAlignment, Image, LineJoin, Rect, RenderContext, Result, ScreenPoint,
    Size, StandardFontMetrics, VerticalAlignment, rect_has_area,
};

use crate::{SvgOptions, SvgWriter, create_style};

/// [`RenderContext`] that writes an SVG document.
#[derive(Debug)]
pub struct SvgRenderContext<W: Write> {
    writer: SvgWriter<W>,
}

impl<W: Write> SvgRenderContext<W> {
    /// Starts a document on `out`.
    pub fn new(out: W, options: SvgOptions) -> Result<Self> {
        Ok(Self {
            writer: SvgWriter::new(out, options)?,
        })
    }

    /// The underlying element writer, for markup the render contract does
    /// not cover.
    pub fn writer(&mut self) -> &mut SvgWriter<W> {
        &mut self.writer
    }

    /// Forces buffered output to the stream without closing the document.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }

    /// Closes the document and returns the stream.
    pub fn finish(self) -> Result<W> {
        self.writer.finish()
    }
}

impl<W: Write> RenderContext for SvgRenderContext<W> {
    fn draw_line(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let Some(style) = create_style(
            Color::UNDEFINED,
            stroke,
            thickness,
            dash_array,
            line_join,
            aliased,
        ) else {
            return Ok(());
        };
        if points.len() == 2 {
            self.writer.write_line(points[0], points[1], &style)
        } else {
            self.writer.write_polyline(points, &style)
        }
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
        let Some(style) = create_style(fill, stroke, thickness, dash_array, line_join, aliased)
        else {
            return Ok(());
        };
        self.writer.write_polygon(points, &style)
    }

    fn draw_rectangle(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        let Some(style) = create_style(fill, stroke, thickness, None, LineJoin::Miter, false)
        else {
            return Ok(());
        };
        let rect = rect.abs();
        self.writer
            .write_rectangle(rect.x0, rect.y0, rect.width(), rect.height(), &style)
    }

    fn draw_ellipse(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        let Some(style) = create_style(fill, stroke, thickness, None, LineJoin::Miter, false)
        else {
            return Ok(());
        };
        let rect = rect.abs();
        self.writer
            .write_ellipse(rect.x0, rect.y0, rect.width(), rect.height(), &style)
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
        self.writer.write_text(
            position,
            text,
            fill,
            font,
            rotation_degrees,
            halign,
            valign,
            max_size,
        )
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
        if opacity <= 0.0 || !rect_has_area(src) || !rect_has_area(dst) {
            return Ok(());
        }
        let full = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
        if src.abs() == full {
            let dst = dst.abs();
            self.writer.write_image(
                dst.x0,
                dst.y0,
                dst.width(),
                dst.height(),
                image,
                opacity,
                interpolate,
            )
        } else {
            self.writer
                .write_image_region(src, dst, image, opacity, interpolate)
        }
    }

    fn set_clip(&mut self, rect: Rect) -> Result<bool> {
        self.writer.begin_clip(rect)?;
        Ok(true)
    }

    fn reset_clip(&mut self) -> Result<()> {
        self.writer.end_clip()
    }
}
