// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plotweave PDF: a PDF backend for the Plotweave render contract.
//!
//! The crate is layered:
//! - [`PdfValue`] and friends model direct objects and their syntax.
//! - [`PdfWriter`] writes indirect objects, recording each object's byte
//!   offset as its header is written, and ends the file with the
//!   cross-reference table and trailer.
//! - [`PortableDocument`] holds pages, content streams, and shared
//!   resources (base-14 fonts, transparency states, images) in memory and
//!   serializes them through a [`PdfWriter`].
//! - [`PdfRenderContext`] implements
//!   [`RenderContext`](plotweave_render::RenderContext) on top of a
//!   single-page document.
//!
//! ```
//! use plotweave_pdf::{PdfOptions, PdfRenderContext};
//! use plotweave_render::{Color, Rect, RenderContext};
//!
//! let mut rc = PdfRenderContext::new(Vec::new(), PdfOptions::new(200.0, 100.0));
//! rc.draw_rectangle(Rect::new(10.0, 10.0, 190.0, 90.0), Color::BLUE, Color::BLACK, 1.0)?;
//! let bytes = rc.finish()?;
//! assert!(bytes.starts_with(b"%PDF-"));
//! # Ok::<(), plotweave_render::Error>(())
//! ```

mod context;
mod document;
mod object;
mod writer;

pub use context::{PdfOptions, PdfRenderContext};
pub use document::{DocumentInfo, LineCap, PortableDocument};
pub use object::{
    MAX_REAL, ObjectRef, ObjectType, PdfDictionary, PdfValue, fmt_real, literal_string,
    win_ansi_byte,
};
pub use writer::PdfWriter;
