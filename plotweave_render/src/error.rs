// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::ImageFormat;

/// Errors raised while rendering or exporting.
///
/// Degenerate drawing input is never an error; these cover the output side
/// (streams, image codecs).
#[derive(Debug, Error)]
pub enum Error {
    /// The output stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding pixels as PNG failed.
    #[error("PNG encoding failed: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Decoding PNG bytes failed.
    #[error("PNG decoding failed: {0}")]
    PngDecoding(#[from] png::DecodingError),

    /// The operation needs pixel data this format cannot provide.
    #[error("unsupported image format: {0:?}")]
    UnsupportedImageFormat(ImageFormat),

    /// The encoded image is truncated or malformed.
    #[error("invalid image: {0}")]
    InvalidImage(&'static str),

    /// A pixel buffer does not match the requested dimensions.
    #[error("pixel buffer of length {pixels} does not match {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Number of pixels supplied.
        pixels: usize,
    },
}

/// Result alias used throughout Plotweave.
pub type Result<T, E = Error> = core::result::Result<T, E>;
