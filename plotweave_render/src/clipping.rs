// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric clipping against axis-aligned rectangles.
//!
//! Backends that cannot clip report it from
//! [`RenderContext::set_clip`](crate::RenderContext::set_clip); callers then
//! use these functions to cut geometry before drawing. A degenerate clip
//! rectangle has no visible area, so everything is clipped away.

use crate::{Rect, ScreenPoint, rect_has_area};

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

fn outcode(rect: Rect, p: ScreenPoint) -> u8 {
    let mut code = INSIDE;
    if p.x < rect.x0 {
        code |= LEFT;
    } else if p.x > rect.x1 {
        code |= RIGHT;
    }
    if p.y < rect.y0 {
        code |= TOP;
    } else if p.y > rect.y1 {
        code |= BOTTOM;
    }
    code
}

/// Returns `true` if `p` lies inside `rect` or on its boundary.
pub fn contains(rect: Rect, p: ScreenPoint) -> bool {
    let rect = rect.abs();
    outcode(rect, p) == INSIDE
}

/// Clips the segment `p0`-`p1` to `rect` (Cohen–Sutherland).
///
/// Returns the visible part, or `None` if the segment misses the rectangle.
/// Endpoints inside the rectangle are returned unchanged.
pub fn clip_segment(
    rect: Rect,
    p0: ScreenPoint,
    p1: ScreenPoint,
) -> Option<(ScreenPoint, ScreenPoint)> {
    if !rect_has_area(rect) || !(p0.is_finite() && p1.is_finite()) {
        return None;
    }
    let rect = rect.abs();
    let (mut a, mut b) = (p0, p1);
    let mut code_a = outcode(rect, a);
    let mut code_b = outcode(rect, b);

    loop {
        if code_a | code_b == INSIDE {
            return Some((a, b));
        }
        if code_a & code_b != INSIDE {
            return None;
        }

        let out = if code_a != INSIDE { code_a } else { code_b };
        let p = if out & BOTTOM != 0 {
            ScreenPoint::new(a.x + (b.x - a.x) * (rect.y1 - a.y) / (b.y - a.y), rect.y1)
        } else if out & TOP != 0 {
            ScreenPoint::new(a.x + (b.x - a.x) * (rect.y0 - a.y) / (b.y - a.y), rect.y0)
        } else if out & RIGHT != 0 {
            ScreenPoint::new(rect.x1, a.y + (b.y - a.y) * (rect.x1 - a.x) / (b.x - a.x))
        } else {
            ScreenPoint::new(rect.x0, a.y + (b.y - a.y) * (rect.x0 - a.x) / (b.x - a.x))
        };

        if out == code_a {
            a = p;
            code_a = outcode(rect, a);
        } else {
            b = p;
            code_b = outcode(rect, b);
        }
    }
}

/// Drops points closer than `sqrt(min_distance_squared)` to the previously
/// kept point.
///
/// The last point is always kept so that the line ends where it should.
pub fn reduce_points(points: &[ScreenPoint], min_distance_squared: f64) -> Vec<ScreenPoint> {
    if min_distance_squared <= 0.0 || points.len() < 3 {
        return points.to_vec();
    }
    let mut out: Vec<ScreenPoint> = Vec::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        let is_last = i + 1 == points.len();
        match out.last() {
            Some(&prev) if !is_last && (p - prev).hypot2() < min_distance_squared => {}
            _ => out.push(p),
        }
    }
    out
}

/// Splits a polyline into the runs that are visible inside `rect`.
///
/// Each returned run has at least two points. Consecutive visible segments
/// whose shared endpoint is unchanged by clipping stay in one run.
pub fn clip_polyline(rect: Rect, points: &[ScreenPoint]) -> Vec<Vec<ScreenPoint>> {
    let mut runs = Vec::new();
    let mut current: Vec<ScreenPoint> = Vec::new();

    let flush = |current: &mut Vec<ScreenPoint>, runs: &mut Vec<Vec<ScreenPoint>>| {
        if current.len() >= 2 {
            runs.push(core::mem::take(current));
        } else {
            current.clear();
        }
    };

    for pair in points.windows(2) {
        match clip_segment(rect, pair[0], pair[1]) {
            Some((a, b)) => {
                if current.last() != Some(&a) {
                    flush(&mut current, &mut runs);
                    current.push(a);
                }
                current.push(b);
                if b != pair[1] {
                    flush(&mut current, &mut runs);
                }
            }
            None => flush(&mut current, &mut runs),
        }
    }
    flush(&mut current, &mut runs);
    runs
}

/// Clips independent segments (consecutive point pairs) to `rect`.
///
/// The result is again a list of point pairs; fully hidden segments are
/// dropped.
pub fn clip_line_segments(rect: Rect, points: &[ScreenPoint]) -> Vec<ScreenPoint> {
    let mut out = Vec::with_capacity(points.len());
    for pair in points.chunks_exact(2) {
        if let Some((a, b)) = clip_segment(rect, pair[0], pair[1]) {
            out.push(a);
            out.push(b);
        }
    }
    out
}

#[derive(Copy, Clone)]
enum Edge {
    Left(f64),
    Right(f64),
    Top(f64),
    Bottom(f64),
}

impl Edge {
    fn inside(self, p: ScreenPoint) -> bool {
        match self {
            Self::Left(x) => p.x >= x,
            Self::Right(x) => p.x <= x,
            Self::Top(y) => p.y >= y,
            Self::Bottom(y) => p.y <= y,
        }
    }

    fn intersect(self, a: ScreenPoint, b: ScreenPoint) -> ScreenPoint {
        match self {
            Self::Left(x) | Self::Right(x) => {
                let t = (x - a.x) / (b.x - a.x);
                ScreenPoint::new(x, a.y + t * (b.y - a.y))
            }
            Self::Top(y) | Self::Bottom(y) => {
                let t = (y - a.y) / (b.y - a.y);
                ScreenPoint::new(a.x + t * (b.x - a.x), y)
            }
        }
    }
}

/// Clips a closed polygon to `rect` (Sutherland–Hodgman).
///
/// Returns an empty vector when nothing remains visible.
pub fn clip_polygon(rect: Rect, points: &[ScreenPoint]) -> Vec<ScreenPoint> {
    if !rect_has_area(rect) || points.len() < 3 {
        return Vec::new();
    }
    let rect = rect.abs();
    let edges = [
        Edge::Left(rect.x0),
        Edge::Right(rect.x1),
        Edge::Top(rect.y0),
        Edge::Bottom(rect.y1),
    ];

    let mut output = points.to_vec();
    for edge in edges {
        let input = core::mem::take(&mut output);
        let Some(&last) = input.last() else {
            break;
        };
        let mut prev = last;
        for &p in &input {
            match (edge.inside(prev), edge.inside(p)) {
                (true, true) => output.push(p),
                (true, false) => output.push(edge.intersect(prev, p)),
                (false, true) => {
                    output.push(edge.intersect(prev, p));
                    output.push(p);
                }
                (false, false) => {}
            }
            prev = p;
        }
    }
    if output.len() < 3 { Vec::new() } else { output }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn pt(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    const CLIP: Rect = Rect::new(0.0, 0.0, 10.0, 10.0);

    #[test]
    fn segment_inside_is_untouched() {
        assert_eq!(
            clip_segment(CLIP, pt(1.0, 1.0), pt(9.0, 5.0)),
            Some((pt(1.0, 1.0), pt(9.0, 5.0)))
        );
    }

    #[test]
    fn segment_crossing_is_cut() {
        assert_eq!(
            clip_segment(CLIP, pt(-5.0, 5.0), pt(15.0, 5.0)),
            Some((pt(0.0, 5.0), pt(10.0, 5.0)))
        );
        assert_eq!(clip_segment(CLIP, pt(-5.0, -5.0), pt(-1.0, 20.0)), None);
    }

    #[test]
    fn degenerate_clip_hides_everything() {
        let flat = Rect::new(0.0, 0.0, 10.0, 0.0);
        assert_eq!(clip_segment(flat, pt(1.0, 0.0), pt(2.0, 0.0)), None);
        assert!(clip_polygon(flat, &[pt(0.0, 0.0), pt(5.0, 0.0), pt(5.0, 5.0)]).is_empty());
    }

    #[test]
    fn polyline_leaving_and_reentering_splits() {
        let runs = clip_polyline(
            CLIP,
            &[pt(1.0, 1.0), pt(5.0, 1.0), pt(5.0, 20.0), pt(8.0, 20.0), pt(8.0, 2.0)],
        );
        assert_eq!(
            runs,
            vec![
                vec![pt(1.0, 1.0), pt(5.0, 1.0), pt(5.0, 10.0)],
                vec![pt(8.0, 10.0), pt(8.0, 2.0)],
            ]
        );
    }

    #[test]
    fn polygon_is_cut_to_the_rect() {
        let square = [pt(-5.0, -5.0), pt(5.0, -5.0), pt(5.0, 5.0), pt(-5.0, 5.0)];
        let clipped = clip_polygon(CLIP, &square);
        assert_eq!(clipped.len(), 4);
        for p in clipped {
            assert!(contains(CLIP, p));
        }
    }

    #[test]
    fn reduce_points_keeps_endpoints() {
        let points = [pt(0.0, 0.0), pt(0.5, 0.0), pt(0.7, 0.0), pt(3.0, 0.0)];
        let reduced = reduce_points(&points, 4.0);
        assert_eq!(reduced, vec![pt(0.0, 0.0), pt(3.0, 0.0)]);
    }

    proptest! {
        #[test]
        fn clipped_segments_stay_inside(
            x0 in -50.0..50.0_f64, y0 in -50.0..50.0_f64,
            x1 in -50.0..50.0_f64, y1 in -50.0..50.0_f64,
        ) {
            if let Some((a, b)) = clip_segment(CLIP, pt(x0, y0), pt(x1, y1)) {
                let grown = CLIP.inflate(1e-9, 1e-9);
                prop_assert!(contains(grown, a));
                prop_assert!(contains(grown, b));
            }
        }

        #[test]
        fn clipped_polygons_stay_inside(
            coords in proptest::collection::vec((-30.0..30.0_f64, -30.0..30.0_f64), 3..8),
        ) {
            let points: Vec<_> = coords.into_iter().map(|(x, y)| pt(x, y)).collect();
            let grown = CLIP.inflate(1e-9, 1e-9);
            for p in clip_polygon(CLIP, &points) {
                prop_assert!(contains(grown, p));
            }
        }
    }
}
