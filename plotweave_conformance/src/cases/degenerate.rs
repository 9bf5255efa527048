// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

/// Calls that the contract requires to draw nothing: invisible fills and
/// strokes, non-positive thickness, too few points, empty rectangles, empty
/// text, zero opacity.
pub(super) struct DegenerateInput;

impl ConformanceCase for DegenerateInput {
    fn name(&self) -> &'static str {
        "degenerate_input"
    }

    fn draws_nothing(&self) -> bool {
        true
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let area = Rect::new(10.0, 10.0, width - 10.0, height - 10.0);
        let invisible = [Color::UNDEFINED, Color::TRANSPARENT, Color::RED.with_alpha(0)];

        for fill in invisible {
            rc.draw_rectangle(area, fill, Color::BLACK, 0.0)?;
            rc.draw_ellipse(area, fill, Color::BLACK, -1.0)?;
            rc.draw_polygon(
                &[area.origin(), ScreenPoint::new(area.x1, area.y0), area.center()],
                fill,
                fill,
                1.0,
                None,
                LineJoin::Miter,
                false,
            )?;
        }

        let line = segment(area.x0, area.y0, area.x1, area.y1);
        rc.draw_line(&line, Color::BLACK, 0.0, None, LineJoin::Miter, false)?;
        rc.draw_line(&line, Color::TRANSPARENT, 2.0, None, LineJoin::Miter, false)?;
        rc.draw_line(&line[..1], Color::BLACK, 2.0, None, LineJoin::Miter, false)?;
        rc.draw_line(&[], Color::BLACK, 2.0, None, LineJoin::Miter, false)?;
        rc.draw_line_segments(&line[..1], Color::BLACK, 2.0, None, LineJoin::Miter, false)?;
        rc.draw_polygon(
            &line[..1],
            Color::RED,
            Color::BLACK,
            1.0,
            None,
            LineJoin::Miter,
            false,
        )?;

        let font = Font::new("Arial", 12.0);
        rc.draw_text(
            area.center(),
            "",
            Color::BLACK,
            &font,
            0.0,
            HorizontalAlignment::Center,
            VerticalAlignment::Middle,
            None,
        )?;
        rc.draw_text(
            area.center(),
            "hidden",
            Color::TRANSPARENT,
            &font,
            0.0,
            HorizontalAlignment::Center,
            VerticalAlignment::Middle,
            None,
        )?;

        let image = sample_image();
        let src = Rect::new(0.0, 0.0, 4.0, 2.0);
        rc.draw_image(&image, src, area, 0.0, true)?;
        rc.draw_image(&image, src, Rect::new(5.0, 5.0, 5.0, 50.0), 1.0, true)?;
        rc.draw_image(&image, Rect::new(1.0, 1.0, 1.0, 1.0), area, 1.0, true)?;
        Ok(())
    }
}
