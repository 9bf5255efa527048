// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph outlines and measurement for a single loaded font face.
//!
//! Layout is deliberately simple: one glyph per character via the character
//! map, advanced by the font's horizontal metrics. There is no shaping,
//! kerning or fallback.

use peniko::FontData;
use plotweave_render::Size;
use skrifa::instance::{LocationRef, Size as FontSize};
use skrifa::metrics::GlyphMetrics;
use skrifa::outline::OutlinePen;
use skrifa::{FontRef, MetadataProvider};
use vello_cpu::kurbo::BezPath;

/// Vertical metrics of a face at a given pixel size, y down.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct LineMetrics {
    pub(crate) ascent: f64,
    pub(crate) line_height: f64,
}

/// Collects glyph outlines into one path, flipping the font's y-up space and
/// translating to a baseline origin.
struct PathPen<'a> {
    path: &'a mut BezPath,
    x: f64,
    y: f64,
}

impl PathPen<'_> {
    fn point(&self, x: f32, y: f32) -> (f64, f64) {
        (self.x + f64::from(x), self.y - f64::from(y))
    }
}

impl OutlinePen for PathPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let c = self.point(x1, y1);
        let p = self.point(x, y);
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.point(x1, y1);
        let c2 = self.point(x2, y2);
        let p = self.point(x, y);
        self.path.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

fn font_ref(font: &FontData) -> Option<FontRef<'_>> {
    FontRef::from_index(font.data.as_ref(), font.index).ok()
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "font sizes are far below f32 range"
)]
fn font_size(size: f64) -> FontSize {
    FontSize::new(size as f32)
}

/// Ascent and line height of `font` at `size` pixels.
///
/// Returns `None` if the font data cannot be parsed.
pub(crate) fn line_metrics(font: &FontData, size: f64) -> Option<LineMetrics> {
    let face = font_ref(font)?;
    let metrics = face.metrics(font_size(size), LocationRef::default());
    let ascent = f64::from(metrics.ascent);
    let descent = f64::from(-metrics.descent);
    Some(LineMetrics {
        ascent,
        line_height: ascent + descent + f64::from(metrics.leading),
    })
}

/// Advance width of a single line. Unmapped characters contribute nothing.
pub(crate) fn line_width(font: &FontData, line: &str, size: f64) -> Option<f64> {
    let face = font_ref(font)?;
    let charmap = face.charmap();
    let metrics = GlyphMetrics::new(&face, font_size(size), LocationRef::default());
    Some(
        line.chars()
            .filter_map(|ch| charmap.map(ch))
            .map(|gid| f64::from(metrics.advance_width(gid).unwrap_or(0.0)))
            .sum(),
    )
}

/// Splits `text` into lines at `\n`, dropping a trailing `\r` from each.
///
/// A trailing newline starts an empty last line, as in the other backends.
pub(crate) fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.trim_end_matches('\r'))
}

/// Measures multi-line text: the widest line by the number of lines.
pub(crate) fn measure(font: &FontData, text: &str, size: f64) -> Option<Size> {
    if text.is_empty() {
        return Some(Size::ZERO);
    }
    let metrics = line_metrics(font, size)?;
    let mut width = 0.0_f64;
    let mut line_count = 0_u32;
    for line in lines(text) {
        width = width.max(line_width(font, line, size)?);
        line_count += 1;
    }
    Some(Size::new(width, f64::from(line_count) * metrics.line_height))
}

/// Appends the outlines of `line` to `path`, with the baseline starting at
/// `(x, baseline)` in text-local coordinates.
pub(crate) fn append_line(
    font: &FontData,
    line: &str,
    size: f64,
    x: f64,
    baseline: f64,
    path: &mut BezPath,
) -> Option<()> {
    let face = font_ref(font)?;
    let charmap = face.charmap();
    let outlines = face.outline_glyphs();
    let fsize = font_size(size);
    let metrics = GlyphMetrics::new(&face, fsize, LocationRef::default());
    let mut pen = PathPen {
        path,
        x,
        y: baseline,
    };
    for gid in line.chars().filter_map(|ch| charmap.map(ch)) {
        if let Some(outline) = outlines.get(gid) {
            // A glyph that fails to draw is left out; the rest of the line
            // still renders.
            let _ = outline.draw(fsize, &mut pen);
        }
        pen.x += f64::from(metrics.advance_width(gid).unwrap_or(0.0));
    }
    Some(())
}
