// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Rect, ScreenPoint};

/// Shapes drawn at data points.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkerType {
    /// No marker.
    #[default]
    None,
    /// Filled circle.
    Circle,
    /// Filled square.
    Square,
    /// Filled diamond.
    Diamond,
    /// Filled triangle pointing up.
    Triangle,
    /// Diagonal cross (stroke only).
    Cross,
    /// Upright cross (stroke only).
    Plus,
    /// Cross and plus combined (stroke only).
    Star,
}

/// Tangent of 30 degrees.
const M1: f64 = 0.577_350_269_189_625_8;
/// `sqrt(1 + M1^2)`.
const M2: f64 = 1.154_700_538_379_251_7;
/// Half-diagonal scale for crosses.
const M3: f64 = core::f64::consts::FRAC_1_SQRT_2;

/// The geometry of one marker.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MarkerShape {
    Ellipse(Rect),
    Rectangle(Rect),
    Polygon(Vec<ScreenPoint>),
    Segments(Vec<ScreenPoint>),
}

impl MarkerType {
    /// Returns `true` for markers made only of strokes.
    pub fn is_stroke_only(self) -> bool {
        matches!(self, Self::Cross | Self::Plus | Self::Star)
    }

    /// Builds the marker geometry centered on `p`; `size` is the half-extent.
    pub(crate) fn shape(self, p: ScreenPoint, size: f64) -> Option<MarkerShape> {
        let (x, y) = (p.x, p.y);
        let shape = match self {
            Self::None => return None,
            Self::Circle => MarkerShape::Ellipse(Rect::new(x - size, y - size, x + size, y + size)),
            Self::Square => {
                MarkerShape::Rectangle(Rect::new(x - size, y - size, x + size, y + size))
            }
            Self::Diamond => MarkerShape::Polygon(vec![
                ScreenPoint::new(x, y - M2 * size),
                ScreenPoint::new(x + M2 * size, y),
                ScreenPoint::new(x, y + M2 * size),
                ScreenPoint::new(x - M2 * size, y),
            ]),
            Self::Triangle => MarkerShape::Polygon(vec![
                ScreenPoint::new(x - size, y + M1 * size),
                ScreenPoint::new(x + size, y + M1 * size),
                ScreenPoint::new(x, y - M2 * size),
            ]),
            Self::Plus => MarkerShape::Segments(plus(x, y, size)),
            Self::Cross => MarkerShape::Segments(cross(x, y, size)),
            Self::Star => {
                let mut segments = plus(x, y, size);
                segments.extend(cross(x, y, size));
                MarkerShape::Segments(segments)
            }
        };
        Some(shape)
    }
}

fn plus(x: f64, y: f64, size: f64) -> Vec<ScreenPoint> {
    vec![
        ScreenPoint::new(x - size, y),
        ScreenPoint::new(x + size, y),
        ScreenPoint::new(x, y - size),
        ScreenPoint::new(x, y + size),
    ]
}

fn cross(x: f64, y: f64, size: f64) -> Vec<ScreenPoint> {
    let d = size * M3;
    vec![
        ScreenPoint::new(x - d, y - d),
        ScreenPoint::new(x + d, y + d),
        ScreenPoint::new(x - d, y + d),
        ScreenPoint::new(x + d, y - d),
    ]
}
