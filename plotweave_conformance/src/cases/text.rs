// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;

/// Every alignment combination around a marked anchor.
pub(super) struct AlignedText;

impl ConformanceCase for AlignedText {
    fn name(&self) -> &'static str {
        "aligned_text"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let font = Font::new("Arial", 11.0);
        let columns = [
            HorizontalAlignment::Left,
            HorizontalAlignment::Center,
            HorizontalAlignment::Right,
        ];
        let rows = [
            VerticalAlignment::Top,
            VerticalAlignment::Middle,
            VerticalAlignment::Bottom,
        ];
        for (i, halign) in columns.into_iter().enumerate() {
            for (j, valign) in rows.into_iter().enumerate() {
                let anchor = ScreenPoint::new(
                    width * (0.2 + 0.3 * i as f64),
                    height * (0.2 + 0.3 * j as f64),
                );
                rc.draw_ellipse(
                    Rect::from_center_size(anchor, (4.0, 4.0)),
                    Color::RED,
                    Color::UNDEFINED,
                    0.0,
                )?;
                rc.draw_text(
                    anchor,
                    "Axis 42",
                    Color::BLACK,
                    &font,
                    0.0,
                    halign,
                    valign,
                    None,
                )?;
            }
        }
        Ok(())
    }
}

/// Rotated, bold, multi-line text with a clamped box and characters that
/// need escaping.
pub(super) struct RotatedMultilineText;

impl ConformanceCase for RotatedMultilineText {
    fn name(&self) -> &'static str {
        "rotated_multiline_text"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let bold = Font::new("Times New Roman", 14.0).with_weight(FontWeight::BOLD);
        let center = ScreenPoint::new(width / 2.0, height / 2.0);
        rc.draw_text(
            center,
            "Temperature <\u{b0}C>\n(a & b) \"quoted\"",
            Color::BLUE,
            &bold,
            -90.0,
            HorizontalAlignment::Center,
            VerticalAlignment::Bottom,
            None,
        )?;
        let clamp = Size::new(40.0, 10.0);
        rc.draw_text(
            ScreenPoint::new(10.0, 10.0),
            "A long label clamped to a small box",
            Color::BLACK,
            &Font::new("Courier New", 9.0),
            30.0,
            HorizontalAlignment::Right,
            VerticalAlignment::Top,
            Some(clamp),
        )
    }
}
