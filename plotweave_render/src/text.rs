// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text placement shared by all backends.
//!
//! Text is positioned in two steps: the measured box is first clamped to the
//! optional maximum size, then the text is rotated about the anchor point and
//! shifted by an alignment offset derived from the clamped box. Only the box
//! is clamped; glyphs may overflow a tight maximum size.

use kurbo::Affine;

use crate::{HorizontalAlignment, ScreenPoint, ScreenVector, Size, VerticalAlignment};

/// The resolved placement of a text run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextLayout {
    /// Measured size after clamping to the maximum size.
    pub size: Size,
    /// Offset from the anchor to the top-left corner of the text box, in the
    /// rotated text frame.
    pub offset: ScreenVector,
    /// Transform from text-local coordinates (origin at the top-left of the
    /// box, y down) to screen space.
    pub transform: Affine,
}

impl TextLayout {
    /// Resolves the placement of text with the given measured size.
    pub fn new(
        anchor: ScreenPoint,
        measured: Size,
        rotation_degrees: f64,
        halign: HorizontalAlignment,
        valign: VerticalAlignment,
        max_size: Option<Size>,
    ) -> Self {
        let size = clamp_to_max_size(measured, max_size);
        let offset = alignment_offset(size, halign, valign);
        Self {
            size,
            offset,
            transform: anchor_transform(anchor, rotation_degrees) * Affine::translate(offset),
        }
    }
}

/// Clamps a measured size to `max_size`, component-wise.
pub fn clamp_to_max_size(size: Size, max_size: Option<Size>) -> Size {
    match max_size {
        Some(max) => Size::new(size.width.min(max.width), size.height.min(max.height)),
        None => size,
    }
}

/// Offset from the anchor to the top-left corner of a box of `size`.
pub fn alignment_offset(
    size: Size,
    halign: HorizontalAlignment,
    valign: VerticalAlignment,
) -> ScreenVector {
    let dx = match halign {
        HorizontalAlignment::Left => 0.0,
        HorizontalAlignment::Center => -size.width / 2.0,
        HorizontalAlignment::Right => -size.width,
    };
    let dy = match valign {
        VerticalAlignment::Top => 0.0,
        VerticalAlignment::Middle => -size.height / 2.0,
        VerticalAlignment::Bottom => -size.height,
    };
    ScreenVector::new(dx, dy)
}

/// Translation to the anchor followed by a rotation about it.
///
/// Rotations below a tiny threshold are treated as none so that unrotated
/// text keeps an exact translation.
pub fn anchor_transform(anchor: ScreenPoint, rotation_degrees: f64) -> Affine {
    let translate = Affine::translate(anchor.to_vec2());
    if rotation_degrees.abs() < f64::EPSILON {
        translate
    } else {
        translate * Affine::rotate(rotation_degrees.to_radians())
    }
}
