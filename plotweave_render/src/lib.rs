// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotweave Render: the backend-agnostic drawing contract for plots.
//!
//! This crate sits between the scene model (plots, axes, series) and
//! concrete output backends (SVG documents, PDF documents, raster
//! canvases). It defines:
//!
//! - **Primitives**: [`Color`], screen/data space geometry, [`LineStyle`]
//!   dash patterns, [`LineJoin`], text alignment, [`Font`] and [`Image`].
//! - **The contract**: [`RenderContext`], which every backend implements.
//!   All coordinates are in screen space (origin top-left, y down) and every
//!   drawing call takes fully resolved styles.
//! - **Shared helpers** composed by backends: text alignment math
//!   ([`text`]), standard font metrics ([`StandardFontMetrics`]), and the
//!   geometric clipping algorithms in [`clipping`].
//! - **Caller helpers**: [`RenderContextExt`] draws clipped lines, polygons
//!   and markers, falling back to manual clipping when a backend cannot clip.
//!
//! # Degenerate input
//!
//! Drawing is forgiving by contract. Invisible fills are skipped, strokes
//! with an invisible color or a non-positive thickness are skipped, and lines
//! or polygons with fewer than two points draw nothing. None of these are
//! errors. Errors are reserved for I/O and image encoding failures.
//!
//! # Example
//!
//! ```
//! use plotweave_render::{Color, LineJoin, LineStyle, RenderContext, Result, ScreenPoint};
//!
//! fn draw_axis_line(rc: &mut dyn RenderContext) -> Result<()> {
//!     let dashes = LineStyle::Dash.dash_array();
//!     rc.draw_line(
//!         &[ScreenPoint::new(10.0, 90.0), ScreenPoint::new(190.0, 90.0)],
//!         Color::BLACK,
//!         1.0,
//!         dashes.as_deref(),
//!         LineJoin::Miter,
//!         true,
//!     )
//! }
//! ```

pub mod clipping;
mod color;
mod context;
mod error;
mod ext;
mod filename;
mod geometry;
mod image;
mod line_style;
mod marker;
mod metrics;
mod style;
pub mod text;

pub use color::Color;
pub use context::RenderContext;
pub use error::{Error, Result};
pub use ext::RenderContextExt;
pub use filename::make_safe_filename;
pub use geometry::{DataPoint, Rect, ScreenPoint, ScreenVector, Size, rect_has_area};
pub use image::{Image, ImageFormat};
pub use line_style::{DashArray, LineStyle, scale_dashes};
pub use marker::MarkerType;
pub use metrics::{StandardFont, StandardFontMetrics};
pub use style::{
    Font, FontWeight, HorizontalAlignment, LineJoin, VerticalAlignment, should_fill, should_stroke,
};
