// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Font, Size};

/// The standard PDF base fonts Plotweave maps families onto.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StandardFont {
    /// Helvetica.
    Helvetica,
    /// Helvetica Bold.
    HelveticaBold,
    /// Times Roman.
    TimesRoman,
    /// Times Bold.
    TimesBold,
    /// Courier.
    Courier,
    /// Courier Bold.
    CourierBold,
}

impl StandardFont {
    /// Picks a base font for a family name and weight.
    ///
    /// Monospaced families map to Courier, serif families to Times, and
    /// everything else to Helvetica.
    pub fn for_font(font: &Font<'_>) -> Self {
        let family = font.family.to_ascii_lowercase();
        let bold = font.weight.is_bold();
        if family.contains("courier") || family.contains("mono") || family.contains("consol") {
            if bold { Self::CourierBold } else { Self::Courier }
        } else if family.contains("times") || (family.contains("serif") && !family.contains("sans"))
        {
            if bold { Self::TimesBold } else { Self::TimesRoman }
        } else if bold {
            Self::HelveticaBold
        } else {
            Self::Helvetica
        }
    }

    /// The PostScript name used in PDF font dictionaries.
    pub fn base_font_name(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    /// Advance width of `ch` in thousandths of the font size.
    ///
    /// Times uses Helvetica widths; the difference is small enough for
    /// layout purposes.
    pub fn advance(self, ch: char) -> u16 {
        let table = match self {
            Self::Courier | Self::CourierBold => return 600,
            Self::Helvetica | Self::TimesRoman => &HELVETICA_WIDTHS,
            Self::HelveticaBold | Self::TimesBold => &HELVETICA_BOLD_WIDTHS,
        };
        let code = u32::from(ch);
        if (32..127).contains(&code) {
            table[(code - 32) as usize]
        } else {
            556
        }
    }
}

/// Ascent of the standard fonts, in units of font size.
const ASCENT: f64 = 0.718;
/// Descent of the standard fonts, in units of font size.
const DESCENT: f64 = 0.207;

/// Text measurement based on the standard base-font metrics.
///
/// Document backends cannot query the fonts a viewer will eventually use, so
/// they measure with these metrics and emit text that references the same
/// base fonts.
#[derive(Copy, Clone, Debug, Default)]
pub struct StandardFontMetrics;

impl StandardFontMetrics {
    /// Measures `text`; lines are separated by `\n`.
    ///
    /// Empty text measures as zero.
    pub fn measure(text: &str, font: &Font<'_>) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let base = StandardFont::for_font(font);
        let mut width: f64 = 0.0;
        let mut lines = 0_u32;
        for line in text.split('\n') {
            lines += 1;
            width = width.max(Self::line_width(base, line, font.size));
        }
        Size::new(width, f64::from(lines) * Self::line_height(font.size))
    }

    /// Width of a single line.
    pub fn line_width(base: StandardFont, line: &str, size: f64) -> f64 {
        let units: u32 = line
            .trim_end_matches('\r')
            .chars()
            .map(|c| u32::from(base.advance(c)))
            .sum();
        f64::from(units) * size / 1000.0
    }

    /// Height of one line of text.
    pub fn line_height(size: f64) -> f64 {
        (ASCENT + DESCENT) * size
    }

    /// Distance from the top of a line to its baseline.
    pub fn ascent(size: f64) -> f64 {
        ASCENT * size
    }
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];
