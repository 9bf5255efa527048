// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

/// A dash pattern: alternating dash and gap lengths.
pub type DashArray = SmallVec<[f64; 8]>;

/// Named line styles.
///
/// Each style maps to a fixed dash pattern expressed in units of the stroke
/// thickness. Backends scale the pattern with [`scale_dashes`] when emitting
/// it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Dashed line.
    Dash,
    /// Dotted line.
    Dot,
    /// Dash followed by a dot.
    DashDot,
    /// Two dashes followed by a dot.
    DashDashDot,
    /// A dash followed by two dots.
    DashDotDot,
    /// Two dashes followed by two dots.
    DashDashDotDot,
    /// Long dashes.
    LongDash,
    /// A long dash followed by a dot.
    LongDashDot,
    /// A long dash followed by two dots.
    LongDashDotDot,
    /// No line at all, regardless of thickness.
    None,
    /// Chosen by the owner of the style; see [`LineStyle::resolve`].
    Automatic,
}

impl LineStyle {
    /// The dash pattern for this style, in units of stroke thickness.
    ///
    /// `Solid`, `None` and `Automatic` have no pattern.
    pub fn dash_pattern(self) -> Option<&'static [f64]> {
        let pattern: &'static [f64] = match self {
            Self::Solid | Self::None | Self::Automatic => return None,
            Self::Dash => &[4.0, 1.0],
            Self::Dot => &[1.0, 1.0],
            Self::DashDot => &[4.0, 1.0, 1.0, 1.0],
            Self::DashDashDot => &[4.0, 1.0, 4.0, 1.0, 1.0, 1.0],
            Self::DashDotDot => &[4.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            Self::DashDashDotDot => &[4.0, 1.0, 4.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            Self::LongDash => &[10.0, 1.0],
            Self::LongDashDot => &[10.0, 1.0, 1.0, 1.0],
            Self::LongDashDotDot => &[10.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        };
        Some(pattern)
    }

    /// The dash pattern as an owned array.
    pub fn dash_array(self) -> Option<DashArray> {
        self.dash_pattern().map(SmallVec::from_slice)
    }

    /// Returns `false` for [`LineStyle::None`].
    pub fn is_visible(self) -> bool {
        self != Self::None
    }

    /// Replaces [`LineStyle::Automatic`] with `fallback`.
    pub fn resolve(self, fallback: Self) -> Self {
        match self {
            Self::Automatic => fallback,
            other => other,
        }
    }
}

/// Scales a thickness-relative dash pattern to absolute lengths.
///
/// Thin strokes still get dashes of at least one unit so that patterns do
/// not collapse into a solid line.
pub fn scale_dashes(dashes: &[f64], thickness: f64) -> DashArray {
    let unit = thickness.max(1.0);
    dashes.iter().map(|d| d * unit).collect()
}
