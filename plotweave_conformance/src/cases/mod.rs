// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use plotweave_render::{
    Color, DataPoint, Font, FontWeight, HorizontalAlignment, Image, LineJoin, LineStyle,
    MarkerType, Rect, RenderContext, RenderContextExt, Result, ScreenPoint, Size,
    VerticalAlignment,
};

mod degenerate;
mod images;
mod series;
mod shapes;
mod text;

pub const DEFAULT_WIDTH: u16 = 320;
pub const DEFAULT_HEIGHT: u16 = 200;

pub trait ConformanceCase: Sync {
    fn name(&self) -> &'static str;

    /// Whether the case must leave the output visually empty.
    fn draws_nothing(&self) -> bool {
        false
    }

    fn run(&self, rc: &mut dyn RenderContext, width: f64, height: f64) -> Result<()>;
}

/// Cases named by the patterns in `PLOTWEAVE_CASE`, or every case when it
/// is unset or blank.
pub fn selected_cases() -> Vec<&'static dyn ConformanceCase> {
    select(std::env::var("PLOTWEAVE_CASE").ok().as_deref())
}

/// Keeps the cases matching any comma- or space-separated pattern in
/// `filter`. A pattern may start or end with `*`.
///
/// Panics if the patterns match nothing, listing the available names.
fn select(filter: Option<&str>) -> Vec<&'static dyn ConformanceCase> {
    let patterns: Vec<&str> = filter
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return CASES.to_vec();
    }

    let matches = |name: &str| {
        patterns.iter().any(|pattern| {
            let (open_start, rest) = match pattern.strip_prefix('*') {
                Some(rest) => (true, rest),
                None => (false, *pattern),
            };
            let (open_end, core) = match rest.strip_suffix('*') {
                Some(core) => (true, core),
                None => (false, rest),
            };
            match (open_start, open_end) {
                (false, false) => name == core,
                (false, true) => name.starts_with(core),
                (true, false) => name.ends_with(core),
                (true, true) => name.contains(core),
            }
        })
    };
    let selected: Vec<&'static dyn ConformanceCase> =
        CASES.iter().copied().filter(|case| matches(case.name())).collect();

    if selected.is_empty() {
        let available: Vec<&str> = CASES.iter().map(|c| c.name()).collect();
        panic!("PLOTWEAVE_CASE={patterns:?} matched no cases; available: {available:?}");
    }
    selected
}

/// A 4x2 grid mixing opaque, half-transparent and fully transparent pixels.
pub fn sample_image() -> Image {
    let half = 127;
    Image::from_pixels(
        4,
        2,
        &[
            Color::BLUE,
            Color::GREEN,
            Color::RED,
            Color::WHITE,
            Color::TRANSPARENT,
            Color::YELLOW.with_alpha(half),
            Color::ORANGE.with_alpha(half),
            Color::PINK.with_alpha(half),
        ],
    )
    .expect("4x2 grid has 8 pixels")
}

fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> [ScreenPoint; 2] {
    [ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1)]
}

pub const CASES: &[&dyn ConformanceCase] = &[
    &shapes::BasicShapes,
    &shapes::DashedStrokes,
    &shapes::NestedClips,
    &shapes::ClippedHelpers,
    &degenerate::DegenerateInput,
    &text::AlignedText,
    &text::RotatedMultilineText,
    &images::ImageSubRectAndOpacity,
    &images::UndecodableImage,
    &series::StairStepWithBreaks,
    &series::StairStepDefaults,
];
