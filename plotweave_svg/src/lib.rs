// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG export for Plotweave.
//!
//! This crate writes SVG 1.1 documents incrementally to any
//! [`std::io::Write`]:
//!
//! - [`SvgWriter`] is the low-level element writer. It keeps the open
//!   element stack, a registry of clip rectangles (each distinct rectangle
//!   gets one `clipPath` definition that later clips reuse), and converts
//!   styles into `style` attributes with [`create_style`].
//! - [`SvgRenderContext`] implements
//!   [`RenderContext`](plotweave_render::RenderContext) on top of the writer.
//!
//! Images are embedded as base64 data URIs. Text is measured with
//! [`StandardFontMetrics`](plotweave_render::StandardFontMetrics), which
//! matches the generic font families the document asks viewers for closely
//! enough for layout.
//!
//! # Finishing
//!
//! Call `finish` to close every open element, write the root end tag and get
//! the stream back. A writer dropped without `finish` closes the document on
//! a best-effort basis and logs a warning if that fails.
//!
//! ```
//! use plotweave_render::{Color, Rect, RenderContext};
//! use plotweave_svg::{SvgOptions, SvgRenderContext};
//!
//! let mut rc = SvgRenderContext::new(Vec::new(), SvgOptions::new(200.0, 100.0))?;
//! rc.draw_rectangle(Rect::new(10.0, 10.0, 60.0, 40.0), Color::RED, Color::BLACK, 1.0)?;
//! let bytes = rc.finish()?;
//! assert!(String::from_utf8(bytes).unwrap().ends_with("</svg>\n"));
//! # Ok::<(), plotweave_render::Error>(())
//! ```

mod context;
mod writer;

pub use context::SvgRenderContext;
pub use writer::{SvgOptions, SvgWriter, create_style};
