// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Development-only conformance cases for Plotweave render contexts.
//!
//! Each case drives a `&mut dyn RenderContext` through one area of the
//! contract (shapes, clipping, text, images, degenerate input, series). The
//! integration tests in `tests/` run every case against every backend and
//! check the backend-specific output: well-formed SVG, a PDF whose trailer
//! closes the file, raster pixels, balanced clip stacks.
//!
//! ## Run tests
//!
//! - All backends: `cargo test -p plotweave_conformance`
//!
//! ## Filter cases
//!
//! To run only a subset of cases, set `PLOTWEAVE_CASE` (supports `*` globs,
//! comma or whitespace separated):
//!
//! - Single case: `PLOTWEAVE_CASE=nested_clips cargo test -p plotweave_conformance`
//! - Prefix: `PLOTWEAVE_CASE='image_*' cargo test -p plotweave_conformance`

#![allow(
    missing_docs,
    reason = "development-only crate; cases are self-documenting via their names"
)]

pub mod cases;
