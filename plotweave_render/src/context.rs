// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    Color, Font, HorizontalAlignment, Image, LineJoin, Rect, Result, ScreenPoint, Size,
    VerticalAlignment,
};

/// The drawing surface every backend implements.
///
/// All coordinates are in screen space. Styles arrive fully resolved: the
/// render context never sees automatic colors or [`LineStyle::Automatic`].
/// Dash arrays are expressed in units of the stroke thickness.
///
/// Implementations must honor the degenerate-input rules:
/// - an invisible `fill` skips the fill,
/// - an invisible `stroke` or a `thickness <= 0` skips the stroke entirely,
/// - lines and polygons with fewer than two points draw nothing.
///
/// `aliased` asks for output without smoothing so that axis-aligned lines
/// land on exact pixels.
///
/// The trait is object safe; closure-based helpers live in
/// [`RenderContextExt`](crate::RenderContextExt).
///
/// [`LineStyle::Automatic`]: crate::LineStyle::Automatic
pub trait RenderContext {
    /// Returns `true` for interactive surfaces (as opposed to documents).
    fn renders_to_screen(&self) -> bool {
        false
    }

    /// Draws a polyline through `points`.
    fn draw_line(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()>;

    /// Draws independent segments, one per consecutive pair of points.
    ///
    /// A trailing unpaired point is ignored.
    fn draw_line_segments(
        &mut self,
        points: &[ScreenPoint],
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()> {
        for pair in points.chunks_exact(2) {
            self.draw_line(pair, stroke, thickness, dash_array, line_join, aliased)?;
        }
        Ok(())
    }

    /// Draws a closed polygon.
    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        fill: Color,
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()>;

    /// Draws an axis-aligned rectangle.
    fn draw_rectangle(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()>;

    /// Draws the ellipse inscribed in `rect`.
    fn draw_ellipse(&mut self, rect: Rect, fill: Color, stroke: Color, thickness: f64)
    -> Result<()>;

    /// Draws text anchored at `position`.
    ///
    /// The text is measured with [`RenderContext::measure_text`], the box is
    /// clamped to `max_size`, then the text is rotated by `rotation_degrees`
    /// about the anchor and offset according to the alignments (see
    /// [`TextLayout`](crate::text::TextLayout)).
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
    ) -> Result<()>;

    /// Measures `text` as [`RenderContext::draw_text`] would lay it out.
    ///
    /// Empty text measures as zero on every backend.
    fn measure_text(&self, text: &str, font: &Font<'_>) -> Size;

    /// Draws the `src` region of `image` (in image pixels) into `dst`.
    ///
    /// `opacity` below one is a real alpha blend. `interpolate` selects a
    /// smooth resampling filter; `false` selects nearest-neighbor.
    fn draw_image(
        &mut self,
        image: &Image,
        src: Rect,
        dst: Rect,
        opacity: f64,
        interpolate: bool,
    ) -> Result<()>;

    /// Pushes a clip rectangle.
    ///
    /// Returns `false` if the backend cannot clip; callers then clip
    /// geometry themselves and must not call [`RenderContext::reset_clip`].
    fn set_clip(&mut self, rect: Rect) -> Result<bool>;

    /// Pops the most recently pushed clip rectangle.
    ///
    /// # Panics
    ///
    /// Panics if no clip is active.
    fn reset_clip(&mut self) -> Result<()>;

    /// Releases cached resources not used since the previous call.
    ///
    /// Interactive backends call this once per frame.
    fn clean_up(&mut self) {}
}
