// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::clipping::{self, clip_line_segments, clip_polygon, clip_polyline, reduce_points};
use crate::marker::MarkerShape;
use crate::{
    Color, LineJoin, MarkerType, Rect, RenderContext, Result, ScreenPoint, rect_has_area,
    should_fill, should_stroke,
};

/// Clipped drawing helpers for callers of a [`RenderContext`].
///
/// This is separate from [`RenderContext`] so that methods can take closures
/// without breaking `&mut dyn RenderContext`. Every helper first asks the
/// backend to clip with [`RenderContext::set_clip`]; when the backend
/// declines, the geometry is clipped with the algorithms in
/// [`clipping`](crate::clipping) instead.
pub trait RenderContextExt: RenderContext {
    /// Runs `f` with `clip` pushed, resetting it afterwards even when `f`
    /// fails.
    ///
    /// `f` receives whether the backend actually clips. When both `f` and
    /// the reset fail, the error from `f` is returned.
    ///
    /// Note: if `f` panics, the clip is not reset.
    fn with_clip<R>(
        &mut self,
        clip: Rect,
        f: impl FnOnce(&mut Self, bool) -> Result<R>,
    ) -> Result<R> {
        let clipped = self.set_clip(clip)?;
        let out = f(self, clipped);
        let reset = if clipped { self.reset_clip() } else { Ok(()) };
        let out = out?;
        reset?;
        Ok(out)
    }

    /// Draws a polyline clipped to `clip`.
    ///
    /// Points closer than `sqrt(min_distance_squared)` to their predecessor
    /// are dropped first.
    fn draw_clipped_line(
        &mut self,
        points: &[ScreenPoint],
        clip: Rect,
        min_distance_squared: f64,
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 || !should_stroke(stroke, thickness) {
            return Ok(());
        }
        let points = reduce_points(points, min_distance_squared);
        self.with_clip(clip, |rc, clipped| {
            if clipped {
                return rc.draw_line(&points, stroke, thickness, dash_array, line_join, aliased);
            }
            for run in clip_polyline(clip, &points) {
                rc.draw_line(&run, stroke, thickness, dash_array, line_join, aliased)?;
            }
            Ok(())
        })
    }

    /// Draws independent segments (point pairs) clipped to `clip`.
    fn draw_clipped_line_segments(
        &mut self,
        points: &[ScreenPoint],
        clip: Rect,
        stroke: Color,
        thickness: f64,
        dash_array: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<()> {
        if points.len() < 2 || !should_stroke(stroke, thickness) {
            return Ok(());
        }
        self.with_clip(clip, |rc, clipped| {
            if clipped {
                rc.draw_line_segments(points, stroke, thickness, dash_array, line_join, aliased)
            } else {
                let visible = clip_line_segments(clip, points);
                rc.draw_line_segments(&visible, stroke, thickness, dash_array, line_join, aliased)
            }
        })
    }

    /// Draws a polygon clipped to `clip`.
    fn draw_clipped_polygon(
        &mut self,
        points: &[ScreenPoint],
        clip: Rect,
        min_distance_squared: f64,
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
        let points = reduce_points(points, min_distance_squared);
        self.with_clip(clip, |rc, clipped| {
            let points = if clipped {
                points
            } else {
                clip_polygon(clip, &points)
            };
            rc.draw_polygon(
                &points, fill, stroke, thickness, dash_array, line_join, aliased,
            )
        })
    }

    /// Draws the part of `rect` that lies inside `clip`.
    fn draw_clipped_rectangle(
        &mut self,
        rect: Rect,
        clip: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<()> {
        let visible = rect.abs().intersect(clip.abs());
        if !rect_has_area(visible) {
            return Ok(());
        }
        self.draw_rectangle(visible, fill, stroke, thickness)
    }

    /// Draws a marker at each point inside `clip`.
    ///
    /// `size` is the marker's half-extent. Stroke-only markers (cross, plus,
    /// star) are drawn as segments in the stroke color.
    fn draw_markers(
        &mut self,
        points: &[ScreenPoint],
        clip: Rect,
        marker: MarkerType,
        size: f64,
        fill: Color,
        stroke: Color,
        stroke_thickness: f64,
    ) -> Result<()> {
        if marker == MarkerType::None || size <= 0.0 {
            return Ok(());
        }
        if !should_fill(fill) && !should_stroke(stroke, stroke_thickness) {
            return Ok(());
        }

        let mut segments = Vec::new();
        for &p in points {
            if !clipping::contains(clip, p) {
                continue;
            }
            match marker.shape(p, size) {
                Some(MarkerShape::Ellipse(rect)) => {
                    self.draw_ellipse(rect, fill, stroke, stroke_thickness)?;
                }
                Some(MarkerShape::Rectangle(rect)) => {
                    self.draw_rectangle(rect, fill, stroke, stroke_thickness)?;
                }
                Some(MarkerShape::Polygon(polygon)) => {
                    self.draw_polygon(
                        &polygon,
                        fill,
                        stroke,
                        stroke_thickness,
                        None,
                        LineJoin::Miter,
                        false,
                    )?;
                }
                Some(MarkerShape::Segments(pairs)) => segments.extend(pairs),
                None => {}
            }
        }
        if !segments.is_empty() {
            self.draw_line_segments(
                &segments,
                stroke,
                stroke_thickness,
                None,
                LineJoin::Miter,
                false,
            )?;
        }
        Ok(())
    }
}

impl<T: RenderContext + ?Sized> RenderContextExt for T {}
