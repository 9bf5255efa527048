// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::Color;

/// How two connected stroke segments are joined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

impl LineJoin {
    /// The equivalent `kurbo` join.
    pub fn to_kurbo(self) -> kurbo::Join {
        match self {
            Self::Miter => kurbo::Join::Miter,
            Self::Round => kurbo::Join::Round,
            Self::Bevel => kurbo::Join::Bevel,
        }
    }
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalAlignment {
    /// The anchor is at the left edge of the text.
    #[default]
    Left,
    /// The anchor is at the horizontal center.
    Center,
    /// The anchor is at the right edge.
    Right,
}

/// Vertical text alignment relative to the anchor point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlignment {
    /// The anchor is at the top of the text box.
    #[default]
    Top,
    /// The anchor is at the vertical middle.
    Middle,
    /// The anchor is at the bottom of the text box.
    Bottom,
}

/// Font weight on the usual 100..=900 scale.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontWeight(pub f64);

impl FontWeight {
    /// Regular text.
    pub const NORMAL: Self = Self(400.0);
    /// Bold text.
    pub const BOLD: Self = Self(700.0);

    /// Returns `true` for weights of 700 and above.
    pub fn is_bold(self) -> bool {
        self.0 >= Self::BOLD.0
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Font selection for text drawing and measuring.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Font<'a> {
    /// Family name, e.g. `"Arial"`. Backends map unknown families to a default.
    pub family: &'a str,
    /// Size in screen units.
    pub size: f64,
    /// Weight.
    pub weight: FontWeight,
}

impl<'a> Font<'a> {
    /// Creates a regular-weight font.
    pub const fn new(family: &'a str, size: f64) -> Self {
        Self {
            family,
            size,
            weight: FontWeight::NORMAL,
        }
    }

    /// Returns the same font with another weight.
    pub const fn with_weight(self, weight: FontWeight) -> Self {
        Self { weight, ..self }
    }
}

impl Default for Font<'_> {
    fn default() -> Self {
        Self::new("Arial", 12.0)
    }
}

/// Returns `true` if a fill with `color` must be emitted.
pub fn should_fill(color: Color) -> bool {
    color.is_visible()
}

/// Returns `true` if a stroke with `color` and `thickness` must be emitted.
///
/// Non-positive (and NaN) thicknesses never produce a stroke, even a hairline.
pub fn should_stroke(color: Color, thickness: f64) -> bool {
    color.is_visible() && thickness > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_needs_color_and_thickness() {
        assert!(should_stroke(Color::BLACK, 1.0));
        assert!(!should_stroke(Color::BLACK, 0.0));
        assert!(!should_stroke(Color::BLACK, -2.0));
        assert!(!should_stroke(Color::BLACK, f64::NAN));
        assert!(!should_stroke(Color::TRANSPARENT, 1.0));
        assert!(!should_stroke(Color::UNDEFINED, 1.0));
    }

    #[test]
    fn bold_threshold() {
        assert!(FontWeight::BOLD.is_bold());
        assert!(FontWeight(800.0).is_bold());
        assert!(!FontWeight(600.0).is_bold());
    }
}
