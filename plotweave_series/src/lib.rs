// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotweave Series: data series drawn through a
//! [`RenderContext`](plotweave_render::RenderContext).
//!
//! A series owns its data points and styling, maps the points to the screen
//! with a [`ScreenTransform`], and draws itself with the clipped helpers of
//! [`RenderContextExt`](plotweave_render::RenderContextExt). It also answers
//! tracker queries: which point of the series is nearest to the cursor.
//!
//! [`StairStepSeries`] holds each y value until the next x is reached:
//!
//! ```
//! use plotweave_render::DataPoint;
//! use plotweave_render_ref::RecordingContext;
//! use plotweave_series::StairStepSeries;
//!
//! let series = StairStepSeries::new([DataPoint::new(0.0, 0.0), DataPoint::new(10.0, 5.0)]);
//! let mut rc = RecordingContext::new();
//! series.render(&mut rc)?;
//!
//! // Data coordinates are pixels under the default transform, so this is
//! // close enough to the horizontal leg to count.
//! let hit = series.nearest_point((5.0, 2.0).into(), true).unwrap();
//! assert_eq!(hit.data_point, DataPoint::new(5.0, 0.0));
//! # Ok::<(), plotweave_render::Error>(())
//! ```

mod stair_step;
mod transform;

pub use stair_step::{StairStepSeries, TRACKER_DISTANCE_SQUARED, TrackerHit};
pub use transform::ScreenTransform;
