// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use kurbo::Affine;
use plotweave_render::{DataPoint, Rect, ScreenPoint};

/// Maps data space to screen space.
///
/// Linear axes reduce to an affine map, so that is all this holds. The
/// identity map treats data coordinates as pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenTransform {
    data_to_screen: Affine,
}

impl Default for ScreenTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ScreenTransform {
    /// Data coordinates are screen coordinates.
    pub const IDENTITY: Self = Self {
        data_to_screen: Affine::IDENTITY,
    };

    /// Wraps an arbitrary affine map.
    pub const fn new(data_to_screen: Affine) -> Self {
        Self { data_to_screen }
    }

    /// Maps `x` onto the plot area's width and `y` onto its height, with `y`
    /// increasing upward as on a conventional chart.
    ///
    /// Empty ranges produce non-finite screen coordinates, which renderers
    /// treat as breaks.
    pub fn from_ranges(x: Range<f64>, y: Range<f64>, plot_area: Rect) -> Self {
        let plot_area = plot_area.abs();
        let sx = plot_area.width() / (x.end - x.start);
        let sy = -plot_area.height() / (y.end - y.start);
        Self::new(Affine::new([
            sx,
            0.0,
            0.0,
            sy,
            plot_area.x0 - x.start * sx,
            plot_area.y1 - y.start * sy,
        ]))
    }

    /// The underlying affine map.
    pub fn affine(&self) -> Affine {
        self.data_to_screen
    }

    /// Maps a data point to the screen.
    pub fn transform(&self, point: DataPoint) -> ScreenPoint {
        self.data_to_screen * ScreenPoint::new(point.x, point.y)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn ranges_map_onto_the_plot_area_with_y_up() {
        let t = ScreenTransform::from_ranges(
            0.0..10.0,
            -1.0..1.0,
            Rect::new(50.0, 20.0, 250.0, 120.0),
        );
        let bottom_left = t.transform(DataPoint::new(0.0, -1.0));
        let top_right = t.transform(DataPoint::new(10.0, 1.0));
        let middle = t.transform(DataPoint::new(5.0, 0.0));
        assert_eq!(bottom_left, ScreenPoint::new(50.0, 120.0));
        assert_eq!(top_right, ScreenPoint::new(250.0, 20.0));
        assert!(approx_eq!(f64, middle.x, 150.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, middle.y, 70.0, epsilon = 1e-9));
    }

    #[test]
    fn default_is_identity() {
        let p = DataPoint::new(3.5, -2.0);
        assert_eq!(
            ScreenTransform::default().transform(p),
            ScreenPoint::new(3.5, -2.0)
        );
    }
}
