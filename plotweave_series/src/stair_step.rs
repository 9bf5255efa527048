// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use plotweave_render::{
    Color, DataPoint, LineJoin, LineStyle, MarkerType, Rect, RenderContext, RenderContextExt,
    Result, ScreenPoint,
};

use crate::ScreenTransform;

/// Squared screen distance within which the tracker reports a hit.
pub const TRACKER_DISTANCE_SQUARED: f64 = 16.0 * 16.0;

/// Horizontal segments shorter than this (squared, in pixels) are treated as
/// their start point.
const DEGENERATE_SEGMENT_SQUARED: f64 = 4.0;

/// Marker filter for series without a clip. Never handed to a backend.
const UNCLIPPED: Rect = Rect::new(
    f64::NEG_INFINITY,
    f64::NEG_INFINITY,
    f64::INFINITY,
    f64::INFINITY,
);

/// The point of a series nearest to a query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackerHit {
    /// The hit in data space. Interpolated hits lie between data points.
    pub data_point: DataPoint,
    /// The hit in screen space.
    pub screen_point: ScreenPoint,
    /// Index of the data point the hit belongs to. For interpolated hits this
    /// is the start of the step.
    pub index: usize,
}

/// A series drawn as steps: each y value is held until the next x is
/// reached.
///
/// Points with a non-finite coordinate break the series into separately
/// drawn runs.
#[derive(Clone, Debug, PartialEq)]
pub struct StairStepSeries {
    /// The data, in drawing order.
    pub points: Vec<DataPoint>,
    /// Line color.
    pub color: Color,
    /// Thickness of the horizontal legs.
    pub stroke_thickness: f64,
    /// Dash style of the horizontal legs.
    pub line_style: LineStyle,
    /// Thickness of the vertical legs, if different from
    /// [`stroke_thickness`](Self::stroke_thickness).
    pub vertical_stroke_thickness: Option<f64>,
    /// Dash style of the vertical legs, if different from
    /// [`line_style`](Self::line_style).
    pub vertical_line_style: Option<LineStyle>,
    /// Join between legs.
    pub line_join: LineJoin,
    /// Marker drawn at each data point.
    pub marker_type: MarkerType,
    /// Marker half-extent.
    pub marker_size: f64,
    /// Marker fill.
    pub marker_fill: Color,
    /// Marker outline.
    pub marker_stroke: Color,
    /// Marker outline thickness.
    pub marker_stroke_thickness: f64,
    /// Screen rectangle the series is clipped to, usually the plot area.
    /// `None` draws without clipping.
    pub clip: Option<Rect>,
    /// Data to screen mapping.
    pub transform: ScreenTransform,
}

impl Default for StairStepSeries {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            color: Color::BLACK,
            stroke_thickness: 2.0,
            line_style: LineStyle::Solid,
            vertical_stroke_thickness: None,
            vertical_line_style: None,
            line_join: LineJoin::Bevel,
            marker_type: MarkerType::None,
            marker_size: 3.0,
            marker_fill: Color::BLACK,
            marker_stroke: Color::UNDEFINED,
            marker_stroke_thickness: 1.0,
            clip: None,
            transform: ScreenTransform::IDENTITY,
        }
    }
}

impl StairStepSeries {
    /// Creates a series over `points` with default styling.
    pub fn new(points: impl IntoIterator<Item = DataPoint>) -> Self {
        Self {
            points: points.into_iter().collect(),
            ..Self::default()
        }
    }

    fn horizontal_style(&self) -> LineStyle {
        self.line_style.resolve(LineStyle::Solid)
    }

    fn vertical_style(&self) -> LineStyle {
        self.vertical_line_style
            .unwrap_or(self.line_style)
            .resolve(LineStyle::Solid)
    }

    fn vertical_thickness(&self) -> f64 {
        self.vertical_stroke_thickness
            .unwrap_or(self.stroke_thickness)
    }

    /// Draws the series.
    ///
    /// Each maximal run of valid points becomes one stepped polyline plus its
    /// markers.
    pub fn render<R: RenderContext + ?Sized>(&self, rc: &mut R) -> Result<()> {
        let mut line = Vec::new();
        let mut markers = Vec::new();
        let mut previous_y = None;
        for &point in &self.points {
            if !point.is_valid() {
                self.render_run(rc, &line, &markers)?;
                line.clear();
                markers.clear();
                previous_y = None;
                continue;
            }
            let sp = self.transform.transform(point);
            if let Some(y) = previous_y {
                line.push(ScreenPoint::new(sp.x, y));
            }
            line.push(sp);
            markers.push(sp);
            previous_y = Some(sp.y);
        }
        self.render_run(rc, &line, &markers)
    }

    fn render_run<R: RenderContext + ?Sized>(
        &self,
        rc: &mut R,
        line: &[ScreenPoint],
        markers: &[ScreenPoint],
    ) -> Result<()> {
        let style = self.horizontal_style();
        if self.stroke_thickness > 0.0 && style.is_visible() {
            let dashes = style.dash_array();
            let vertical_style = self.vertical_style();
            let vertical_thickness = self.vertical_thickness();
            if vertical_thickness != self.stroke_thickness || vertical_style != style {
                // The stepped polyline alternates horizontal and vertical legs.
                let mut horizontal = Vec::with_capacity(line.len());
                let mut vertical = Vec::with_capacity(line.len());
                let mut i = 0;
                while i + 2 < line.len() {
                    horizontal.extend([line[i], line[i + 1]]);
                    vertical.extend([line[i + 1], line[i + 2]]);
                    i += 2;
                }
                self.draw_segments(rc, &horizontal, self.stroke_thickness, style)?;
                if vertical_style.is_visible() {
                    self.draw_segments(rc, &vertical, vertical_thickness, vertical_style)?;
                }
            } else if let Some(clip) = self.clip {
                rc.draw_clipped_line(
                    line,
                    clip,
                    0.0,
                    self.color,
                    self.stroke_thickness,
                    dashes.as_deref(),
                    self.line_join,
                    false,
                )?;
            } else {
                rc.draw_line(
                    line,
                    self.color,
                    self.stroke_thickness,
                    dashes.as_deref(),
                    self.line_join,
                    false,
                )?;
            }
        }

        if self.marker_type != MarkerType::None {
            rc.draw_markers(
                markers,
                self.clip.unwrap_or(UNCLIPPED),
                self.marker_type,
                self.marker_size,
                self.marker_fill,
                self.marker_stroke,
                self.marker_stroke_thickness,
            )?;
        }
        Ok(())
    }

    fn draw_segments<R: RenderContext + ?Sized>(
        &self,
        rc: &mut R,
        points: &[ScreenPoint],
        thickness: f64,
        style: LineStyle,
    ) -> Result<()> {
        let dashes = style.dash_array();
        match self.clip {
            Some(clip) => rc.draw_clipped_line_segments(
                points,
                clip,
                self.color,
                thickness,
                dashes.as_deref(),
                self.line_join,
                false,
            ),
            None => rc.draw_line_segments(
                points,
                self.color,
                thickness,
                dashes.as_deref(),
                self.line_join,
                false,
            ),
        }
    }

    /// The data point whose screen position is closest to `point`, ignoring
    /// distance limits.
    pub fn nearest_data_point(&self, point: ScreenPoint) -> Option<TrackerHit> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_valid())
            .map(|(index, &p)| TrackerHit {
                data_point: p,
                screen_point: self.transform.transform(p),
                index,
            })
            .min_by(|a, b| {
                let da = (a.screen_point - point).hypot2();
                let db = (b.screen_point - point).hypot2();
                da.total_cmp(&db)
            })
    }

    /// Finds the point of the series nearest to the screen position `point`.
    ///
    /// Unless `interpolate` is set, a data point within
    /// [`TRACKER_DISTANCE_SQUARED`] wins outright. Otherwise the query is
    /// projected onto every horizontal leg and the closest projection within
    /// the threshold is returned, with its data-space position interpolated
    /// along the leg. Legs touching an invalid point are skipped.
    pub fn nearest_point(&self, point: ScreenPoint, interpolate: bool) -> Option<TrackerHit> {
        if !interpolate
            && let Some(hit) = self.nearest_data_point(point)
            && (hit.screen_point - point).hypot2() < TRACKER_DISTANCE_SQUARED
        {
            return Some(hit);
        }

        let mut best = None;
        let mut min_distance_squared = TRACKER_DISTANCE_SQUARED;
        let n = self.points.len();
        for i in 0..n {
            let p1 = self.points[i];
            // The last point pairs with itself so it can still be hit.
            let p2 = self.points[(i + 1).min(n - 1)];
            if !p1.is_valid() || !p2.is_valid() {
                continue;
            }
            let sp1 = self.transform.transform(p1);
            let sp2 = self.transform.transform(DataPoint::new(p2.x, p1.y));

            let d = sp2 - sp1;
            let ds = d.hypot2();
            let (u1, u2) = if ds < DEGENERATE_SEGMENT_SQUARED {
                (0.0, 1.0)
            } else {
                ((point - sp1).dot(d), ds)
            };
            let u = u1 / u2;
            if !(0.0..=1.0).contains(&u) {
                continue;
            }

            let projected = sp1 + d * u;
            let distance_squared = (point - projected).hypot2();
            if distance_squared < min_distance_squared {
                min_distance_squared = distance_squared;
                best = Some(TrackerHit {
                    data_point: DataPoint::new(p1.x + u * (p2.x - p1.x), p1.y),
                    screen_point: projected,
                    index: i,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use kurbo::Affine;
    use plotweave_render_ref::{Command, RecordingContext};

    use super::*;

    fn step_series() -> StairStepSeries {
        StairStepSeries {
            transform: ScreenTransform::new(Affine::scale(100.0)),
            ..StairStepSeries::new([
                DataPoint::new(0.0, 0.0),
                DataPoint::new(1.0, 0.0),
                DataPoint::new(1.0, 1.0),
                DataPoint::new(2.0, 1.0),
            ])
        }
    }

    fn lines(rc: &RecordingContext) -> Vec<Vec<ScreenPoint>> {
        rc.commands()
            .filter_map(|c| match c {
                Command::Line { points, .. } => Some(points.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn interpolated_query_lands_on_the_step() {
        let hit = step_series()
            .nearest_point(ScreenPoint::new(50.0, 0.0), true)
            .unwrap();
        assert!(approx_eq!(f64, hit.data_point.x, 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, hit.data_point.y, 0.0, epsilon = 1e-12));
        assert_eq!(hit.screen_point, ScreenPoint::new(50.0, 0.0));
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn query_far_from_every_leg_misses() {
        let series = step_series();
        assert_eq!(series.nearest_point(ScreenPoint::new(150.0, 500.0), true), None);
        assert_eq!(series.nearest_point(ScreenPoint::new(150.0, 500.0), false), None);
    }

    #[test]
    fn snapping_prefers_data_points() {
        let hit = step_series()
            .nearest_point(ScreenPoint::new(103.0, 96.0), false)
            .unwrap();
        assert_eq!(hit.data_point, DataPoint::new(1.0, 1.0));
        assert_eq!(hit.index, 2);
    }

    #[test]
    fn short_legs_collapse_to_their_start() {
        // One data unit is one pixel, below the degenerate length.
        let series = StairStepSeries::new([DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 0.0)]);
        let hit = series.nearest_point(ScreenPoint::new(0.3, 0.0), true).unwrap();
        assert_eq!(hit.screen_point, ScreenPoint::new(0.0, 0.0));
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn legs_touching_invalid_points_are_not_tracked() {
        let series = StairStepSeries {
            transform: ScreenTransform::new(Affine::scale(100.0)),
            ..StairStepSeries::new([
                DataPoint::new(0.0, 0.0),
                DataPoint::UNDEFINED,
                DataPoint::new(2.0, 0.0),
            ])
        };
        assert_eq!(series.nearest_point(ScreenPoint::new(100.0, 0.0), true), None);
        let hit = series
            .nearest_point(ScreenPoint::new(195.0, 3.0), true)
            .unwrap();
        assert_eq!(hit.index, 2);
    }

    #[test]
    fn steps_hold_y_until_the_next_x() {
        let series = StairStepSeries::new([
            DataPoint::new(0.0, 0.0),
            DataPoint::new(10.0, 5.0),
            DataPoint::new(20.0, 2.0),
        ]);
        let mut rc = RecordingContext::new();
        series.render(&mut rc).unwrap();
        assert_eq!(
            lines(&rc),
            vec![vec![
                ScreenPoint::new(0.0, 0.0),
                ScreenPoint::new(10.0, 0.0),
                ScreenPoint::new(10.0, 5.0),
                ScreenPoint::new(20.0, 5.0),
                ScreenPoint::new(20.0, 2.0),
            ]]
        );
        assert_eq!(rc.clip_depth(), 0);
    }

    #[test]
    fn series_without_a_clip_never_pushes_one() {
        let mut series = StairStepSeries {
            marker_type: MarkerType::Circle,
            ..StairStepSeries::new([DataPoint::new(0.0, 0.0), DataPoint::new(10.0, 5.0)])
        };
        let mut rc = RecordingContext::new();
        series.render(&mut rc).unwrap();
        assert!(!rc.commands().any(|c| matches!(c, Command::SetClip(_))));
        assert_eq!(lines(&rc).len(), 1);
        assert_eq!(
            rc.commands()
                .filter(|c| matches!(c, Command::Ellipse { .. }))
                .count(),
            2
        );

        let area = Rect::new(0.0, 0.0, 5.0, 5.0);
        series.clip = Some(area);
        let mut rc = RecordingContext::new();
        series.render(&mut rc).unwrap();
        assert_eq!(rc.commands().next(), Some(&Command::SetClip(area)));
    }

    #[test]
    fn invalid_points_split_runs() {
        let series = StairStepSeries::new([
            DataPoint::new(0.0, 0.0),
            DataPoint::new(1.0, 1.0),
            DataPoint::new(f64::NAN, 3.0),
            DataPoint::new(5.0, 5.0),
            DataPoint::new(6.0, 4.0),
        ]);
        let mut rc = RecordingContext::new();
        series.render(&mut rc).unwrap();
        let runs = lines(&rc);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1][0], ScreenPoint::new(5.0, 5.0));
        assert_eq!(runs[1].len(), 3);
    }

    #[test]
    fn distinct_vertical_style_draws_two_batches() {
        let series = StairStepSeries {
            vertical_line_style: Some(LineStyle::Dot),
            ..StairStepSeries::new([
                DataPoint::new(0.0, 0.0),
                DataPoint::new(10.0, 5.0),
                DataPoint::new(20.0, 2.0),
            ])
        };
        let mut rc = RecordingContext::new();
        series.render(&mut rc).unwrap();
        let batches: Vec<_> = rc
            .commands()
            .filter_map(|c| match c {
                Command::LineSegments {
                    points, dash_array, ..
                } => Some((points.clone(), dash_array.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(batches.len(), 2);
        let (horizontal, solid) = &batches[0];
        let (vertical, dotted) = &batches[1];
        assert_eq!(solid, &None);
        assert_eq!(dotted.as_deref(), Some(&[1.0, 1.0][..]));
        assert_eq!(horizontal[1], ScreenPoint::new(10.0, 0.0));
        assert_eq!(vertical[..2], [ScreenPoint::new(10.0, 0.0), ScreenPoint::new(10.0, 5.0)]);
        assert_eq!(horizontal.len(), 4);
        assert_eq!(vertical.len(), 4);
    }

    #[test]
    fn markers_follow_data_points() {
        let series = StairStepSeries {
            marker_type: MarkerType::Square,
            stroke_thickness: 0.0,
            ..StairStepSeries::new([DataPoint::new(4.0, 4.0), DataPoint::new(8.0, 6.0)])
        };
        let mut rc = RecordingContext::new();
        series.render(&mut rc).unwrap();
        let squares: Vec<_> = rc
            .commands()
            .filter_map(|c| match c {
                Command::Rectangle { rect, .. } => Some(rect.center()),
                Command::Line { .. } | Command::LineSegments { .. } => {
                    panic!("zero thickness draws no line")
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            squares,
            vec![ScreenPoint::new(4.0, 4.0), ScreenPoint::new(8.0, 6.0)]
        );
    }
}
