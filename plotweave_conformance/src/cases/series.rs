// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use plotweave_series::{ScreenTransform, StairStepSeries};

use super::*;

/// A stair-step series with a break, dashed vertical legs and markers,
/// clipped to an inner plot area.
pub(super) struct StairStepWithBreaks;

impl ConformanceCase for StairStepWithBreaks {
    fn name(&self) -> &'static str {
        "stair_step_with_breaks"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let plot_area = Rect::new(30.0, 20.0, width - 20.0, height - 30.0);
        let mut points: Vec<DataPoint> = (0..10)
            .map(|i| {
                let x = f64::from(i);
                DataPoint::new(x, (x * 0.9).sin() * 4.0 + 5.0)
            })
            .collect();
        points.insert(5, DataPoint::UNDEFINED);
        // Outside the y range, so the clip has work to do.
        points.push(DataPoint::new(10.0, 12.0));

        let series = StairStepSeries {
            color: Color::BLUE,
            vertical_line_style: Some(LineStyle::Dash),
            vertical_stroke_thickness: Some(1.0),
            marker_type: MarkerType::Circle,
            marker_fill: Color::WHITE,
            marker_stroke: Color::BLUE,
            clip: Some(plot_area),
            transform: ScreenTransform::from_ranges(0.0..10.0, 0.0..10.0, plot_area),
            ..StairStepSeries::new(points)
        };
        rc.draw_rectangle(plot_area, Color::UNDEFINED, Color::BLACK, 1.0)?;
        series.render(rc)
    }
}

/// Series left at their defaults: one without a clip and one clipped to an
/// unbounded rectangle, both drawn straight in screen coordinates.
pub(super) struct StairStepDefaults;

impl ConformanceCase for StairStepDefaults {
    fn name(&self) -> &'static str {
        "stair_step_defaults"
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()> {
        let steps = |y0: f64| {
            (0..8).map(move |i| {
                let x = f64::from(i) * width / 8.0 + 10.0;
                DataPoint::new(x, y0 + f64::from(i % 3) * height / 10.0)
            })
        };
        StairStepSeries::new(steps(20.0)).render(rc)?;

        let unbounded = Rect::new(f64::MIN, f64::MIN, f64::MAX, f64::MAX);
        let series = StairStepSeries {
            clip: Some(unbounded),
            ..StairStepSeries::new(steps(height / 2.0))
        };
        series.render(rc)
    }
}
