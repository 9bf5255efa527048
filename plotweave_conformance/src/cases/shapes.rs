// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

/// One of each primitive with both fill and stroke.
pub(super) struct BasicShapes;

impl ConformanceCase for BasicShapes {
    fn name(&self) -> &'static str {
        "basic_shapes"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        rc.draw_rectangle(
            Rect::new(10.0, 10.0, width * 0.3, height * 0.4),
            Color::BLUE,
            Color::BLACK,
            2.0,
        )?;
        rc.draw_ellipse(
            Rect::new(width * 0.4, 10.0, width * 0.7, height * 0.4),
            Color::ORANGE.with_alpha(180),
            Color::RED,
            1.5,
        )?;
        rc.draw_polygon(
            &[
                ScreenPoint::new(width * 0.8, 10.0),
                ScreenPoint::new(width - 10.0, height * 0.4),
                ScreenPoint::new(width * 0.75, height * 0.4),
            ],
            Color::GREEN,
            Color::UNDEFINED,
            1.0,
            None,
            LineJoin::Round,
            false,
        )?;
        rc.draw_line(
            &[
                ScreenPoint::new(10.0, height * 0.6),
                ScreenPoint::new(width * 0.5, height * 0.9),
                ScreenPoint::new(width - 10.0, height * 0.6),
            ],
            Color::BLACK,
            3.0,
            None,
            LineJoin::Bevel,
            false,
        )?;
        rc.draw_line(
            &segment(10.0, height - 5.5, width - 10.0, height - 5.5),
            Color::GRAY,
            1.0,
            None,
            LineJoin::Miter,
            true,
        )
    }
}

/// Every dash pattern, one per row, with batched segments at the bottom.
pub(super) struct DashedStrokes;

impl ConformanceCase for DashedStrokes {
    fn name(&self) -> &'static str {
        "dashed_strokes"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, _height: f64) -> Result<()> {
        let styles = [
            LineStyle::Dash,
            LineStyle::Dot,
            LineStyle::DashDot,
            LineStyle::DashDashDot,
            LineStyle::DashDotDot,
            LineStyle::DashDashDotDot,
            LineStyle::LongDash,
            LineStyle::LongDashDot,
            LineStyle::LongDashDotDot,
        ];
        let mut y = 12.0;
        for style in styles {
            let dashes = style.dash_array();
            rc.draw_line(
                &segment(10.0, y, width - 10.0, y),
                Color::BLACK,
                2.0,
                dashes.as_deref(),
                LineJoin::Miter,
                false,
            )?;
            y += 16.0;
        }

        let ticks: Vec<ScreenPoint> = (0..16)
            .flat_map(|i| {
                let x = 10.0 + f64::from(i) * 18.0;
                segment(x, y, x, y + 8.0)
            })
            .collect();
        rc.draw_line_segments(&ticks, Color::BLUE, 1.0, None, LineJoin::Miter, true)
    }
}

/// Clips nested three deep, each wider than its parent so that only the
/// innermost intersection is visible.
pub(super) struct NestedClips;

impl ConformanceCase for NestedClips {
    fn name(&self) -> &'static str {
        "nested_clips"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let full = Rect::new(0.0, 0.0, width, height);
        let clips = [
            Rect::new(20.0, 20.0, width - 20.0, height - 20.0),
            Rect::new(0.0, 40.0, width, height - 40.0),
            Rect::new(60.0, 0.0, width - 60.0, height),
        ];
        let mut pushed = 0;
        for clip in clips {
            if rc.set_clip(clip)? {
                pushed += 1;
            }
            rc.draw_rectangle(full, Color::BLUE.with_alpha(64), Color::UNDEFINED, 0.0)?;
        }
        for _ in 0..pushed {
            rc.reset_clip()?;
        }
        rc.draw_rectangle(full, Color::UNDEFINED, Color::BLACK, 1.0)
    }
}

/// The caller-side helpers, which clip by hand when the backend cannot.
pub(super) struct ClippedHelpers;

impl ConformanceCase for ClippedHelpers {
    fn name(&self) -> &'static str {
        "clipped_helpers"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let clip = Rect::new(40.0, 30.0, width - 40.0, height - 30.0);
        let zigzag: Vec<ScreenPoint> = (0..12)
            .map(|i| {
                let y = if i % 2 == 0 { 0.0 } else { height };
                ScreenPoint::new(f64::from(i) * width / 11.0, y)
            })
            .collect();
        rc.draw_clipped_line(
            &zigzag,
            clip,
            4.0,
            Color::RED,
            2.0,
            None,
            LineJoin::Round,
            false,
        )?;
        rc.draw_clipped_polygon(
            &[
                ScreenPoint::new(0.0, height / 2.0),
                ScreenPoint::new(width / 2.0, 0.0),
                ScreenPoint::new(width, height / 2.0),
                ScreenPoint::new(width / 2.0, height),
            ],
            clip,
            0.0,
            Color::YELLOW.with_alpha(100),
            Color::BLACK,
            1.0,
            None,
            LineJoin::Miter,
            false,
        )?;
        rc.draw_clipped_rectangle(
            Rect::new(-20.0, -20.0, 80.0, 60.0),
            clip,
            Color::GREEN,
            Color::BLACK,
            1.0,
        )?;
        let grid: Vec<ScreenPoint> = (0..8)
            .flat_map(|i| (0..5).map(move |j| (i, j)))
            .map(|(i, j)| ScreenPoint::new(f64::from(i) * 45.0, f64::from(j) * 45.0))
            .collect();
        for (marker, offset) in [
            (MarkerType::Circle, 0.0),
            (MarkerType::Diamond, 8.0),
            (MarkerType::Cross, 16.0),
            (MarkerType::Star, 24.0),
        ] {
            let points: Vec<ScreenPoint> = grid
                .iter()
                .map(|p| ScreenPoint::new(p.x + offset, p.y + offset))
                .collect();
            rc.draw_markers(
                &points,
                clip,
                marker,
                3.0,
                Color::PINK,
                Color::BLACK,
                1.0,
            )?;
        }
        Ok(())
    }
}
