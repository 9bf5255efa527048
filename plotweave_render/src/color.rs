// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// A color with an alpha channel, or the "undefined" sentinel.
///
/// Colors are immutable values. A color is *visible* when it is defined and
/// its alpha is non-zero, and *invisible* when its alpha is zero. The
/// undefined sentinel ([`Color::UNDEFINED`]) is what scene models use for
/// "automatic" colors; it never reaches a backend as a real paint and is
/// neither visible nor equal to [`Color::TRANSPARENT`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    a: u8,
    r: u8,
    g: u8,
    b: u8,
    defined: bool,
}

impl Color {
    /// The undefined sentinel.
    pub const UNDEFINED: Self = Self {
        a: 0,
        r: 0,
        g: 0,
        b: 0,
        defined: false,
    };
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::from_argb(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    /// Opaque green (`#008000`).
    pub const GREEN: Self = Self::from_rgb(0, 128, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::from_rgb(255, 255, 0);
    /// Opaque orange (`#ffa500`).
    pub const ORANGE: Self = Self::from_rgb(255, 165, 0);
    /// Opaque pink (`#ffc0cb`).
    pub const PINK: Self = Self::from_rgb(255, 192, 203);
    /// Opaque gray (`#808080`).
    pub const GRAY: Self = Self::from_rgb(128, 128, 128);

    /// Creates a color from alpha, red, green and blue components.
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self {
            a,
            r,
            g,
            b,
            defined: true,
        }
    }

    /// Creates an opaque color.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(255, r, g, b)
    }

    /// Creates a color from a packed `0xAARRGGBB` value.
    pub const fn from_u32(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self::from_argb(a, r, g, b)
    }

    /// Returns the packed `0xAARRGGBB` value.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    /// Alpha component.
    pub const fn a(self) -> u8 {
        self.a
    }

    /// Red component.
    pub const fn r(self) -> u8 {
        self.r
    }

    /// Green component.
    pub const fn g(self) -> u8 {
        self.g
    }

    /// Blue component.
    pub const fn b(self) -> u8 {
        self.b
    }

    /// Returns `true` for the undefined sentinel.
    pub const fn is_undefined(self) -> bool {
        !self.defined
    }

    /// Returns `true` if drawing with this color produces visible output.
    pub const fn is_visible(self) -> bool {
        self.defined && self.a > 0
    }

    /// Returns `true` if the alpha channel is zero.
    pub const fn is_invisible(self) -> bool {
        self.a == 0
    }

    /// Returns the same color with a different alpha.
    ///
    /// The undefined sentinel stays undefined.
    pub const fn with_alpha(self, a: u8) -> Self {
        if self.defined {
            Self::from_argb(a, self.r, self.g, self.b)
        } else {
            self
        }
    }

    /// Alpha as a value in `0.0..=1.0`.
    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Formats the RGB part as `#rrggbb`.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Converts to a `peniko` color for rasterizing backends.
    pub fn to_peniko(self) -> peniko::Color {
        peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "#{:08x}", self.to_u32())
        } else {
            f.write_str("Color::UNDEFINED")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_follows_alpha() {
        assert!(Color::RED.is_visible());
        assert!(!Color::RED.is_invisible());
        assert!(!Color::TRANSPARENT.is_visible());
        assert!(Color::TRANSPARENT.is_invisible());
        assert!(!Color::UNDEFINED.is_visible());
        assert_ne!(Color::UNDEFINED, Color::TRANSPARENT);
    }

    #[test]
    fn packs_argb() {
        let c = Color::from_u32(0x7f_ff_a5_00);
        assert_eq!(c, Color::ORANGE.with_alpha(127));
        assert_eq!(c.to_u32(), 0x7f_ff_a5_00);
        assert_eq!(c.to_hex_rgb(), "#ffa500");
    }

    #[test]
    fn undefined_ignores_alpha_changes() {
        assert!(Color::UNDEFINED.with_alpha(255).is_undefined());
    }
}
