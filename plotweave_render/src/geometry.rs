// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// A point in screen space (device pixels, origin top-left, y down).
pub type ScreenPoint = kurbo::Point;

/// A displacement in screen space.
pub type ScreenVector = kurbo::Vec2;

/// An axis-aligned rectangle in screen space.
pub type Rect = kurbo::Rect;

/// A width/height pair in screen space.
pub type Size = kurbo::Size;

/// A point in a series' data space.
///
/// Non-finite coordinates mark the point as invalid; series treat invalid
/// points as breaks between runs of connected points.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint {
    /// The x coordinate.
    pub x: f64,
    /// The y coordinate.
    pub y: f64,
}

impl DataPoint {
    /// An invalid point, usable as an explicit break.
    pub const UNDEFINED: Self = Self {
        x: f64::NAN,
        y: f64::NAN,
    };

    /// Creates a data point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates are finite.
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for DataPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Returns `true` if `rect` covers a non-empty, finite area.
///
/// Degenerate rectangles (zero or negative extent, non-finite edges) are not
/// errors; callers treat them as "nothing visible".
pub fn rect_has_area(rect: Rect) -> bool {
    let rect = rect.abs();
    rect.x0.is_finite()
        && rect.y0.is_finite()
        && rect.x1.is_finite()
        && rect.y1.is_finite()
        && rect.width() > 0.0
        && rect.height() > 0.0
}
