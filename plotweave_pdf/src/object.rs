// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! PDF object model.

use core::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// A dictionary with insertion-ordered keys.
///
/// Keys are stored without the leading slash.
pub type PdfDictionary = IndexMap<String, PdfValue>;

/// The number of an indirect object.
///
/// Numbers are 1-based and assigned in allocation order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(u32);

impl ObjectRef {
    /// Wraps an object number.
    ///
    /// # Panics
    ///
    /// Panics if `number` is zero, which is reserved for the free-list head.
    pub fn new(number: u32) -> Self {
        assert!(number > 0, "PDF object numbers start at 1");
        Self(number)
    }

    /// The object number.
    pub fn number(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize - 1
    }
}

/// Type tags written as `/Type` names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// Document catalog.
    Catalog,
    /// Page tree node.
    Pages,
    /// A page.
    Page,
    /// A font.
    Font,
    /// An external object such as an image.
    XObject,
    /// A graphics state parameter dictionary.
    ExtGState,
    /// A font descriptor.
    FontDescriptor,
}

impl ObjectType {
    /// The tag as it appears after the slash.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "Catalog",
            Self::Pages => "Pages",
            Self::Page => "Page",
            Self::Font => "Font",
            Self::XObject => "XObject",
            Self::ExtGState => "ExtGState",
            Self::FontDescriptor => "FontDescriptor",
        }
    }
}

/// A direct PDF value.
#[derive(Clone, Debug, PartialEq)]
pub enum PdfValue {
    /// `N 0 R`.
    Reference(ObjectRef),
    /// `/Name`.
    Name(String),
    /// A type tag, written as a name.
    Type(ObjectType),
    /// An integer.
    Integer(i64),
    /// A real, written without exponent.
    Real(f64),
    /// `true` or `false`.
    Bool(bool),
    /// `(D:YYYYMMDDHHmmss+00'00)`.
    Date(DateTime<Utc>),
    /// A literal string, escaped and encoded as `WinAnsiEncoding`.
    Text(String),
    /// Pre-formatted PDF syntax, written as is.
    Raw(String),
    /// `[a b c]`.
    List(Vec<PdfValue>),
    /// `<< /Key value >>`.
    Dictionary(PdfDictionary),
}

impl PdfValue {
    /// A name value.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl From<ObjectRef> for PdfValue {
    fn from(value: ObjectRef) -> Self {
        Self::Reference(value)
    }
}

impl From<ObjectType> for PdfValue {
    fn from(value: ObjectType) -> Self {
        Self::Type(value)
    }
}

impl From<i64> for PdfValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for PdfValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<usize> for PdfValue {
    fn from(value: usize) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for PdfValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for PdfValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for PdfValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<Self>> for PdfValue {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<PdfDictionary> for PdfValue {
    fn from(value: PdfDictionary) -> Self {
        Self::Dictionary(value)
    }
}

impl fmt::Display for PdfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(r) => write!(f, "{} 0 R", r.number()),
            Self::Name(name) => write!(f, "/{name}"),
            Self::Type(ty) => write!(f, "/{}", ty.as_str()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => f.write_str(&fmt_real(*r)),
            Self::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Self::Date(dt) => write!(f, "(D:{}+00'00)", dt.format("%Y%m%d%H%M%S")),
            Self::Text(text) => f.write_str(&literal_string(text)),
            Self::Raw(raw) => f.write_str(raw),
            Self::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Self::Dictionary(dict) => {
                f.write_str("<<\n")?;
                for (key, value) in dict {
                    writeln!(f, "/{key} {value}")?;
                }
                f.write_str(">>")
            }
        }
    }
}

/// Largest real magnitude readers must accept (PDF 1.4, Appendix C).
pub const MAX_REAL: f64 = 32_767.0;

/// Formats a real in invariant notation with at most four decimals.
///
/// Magnitudes beyond [`MAX_REAL`] are clamped; NaN is written as zero.
pub fn fmt_real(v: f64) -> String {
    if v.is_nan() {
        return String::from("0");
    }
    let v = v.clamp(-MAX_REAL, MAX_REAL);
    let mut s = format!("{v:.4}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s = String::from("0");
    }
    s
}

/// Writes `text` as a PDF literal string in `WinAnsiEncoding`.
///
/// Delimiters are escaped and bytes outside printable ASCII are written as
/// octal escapes, so the result is plain ASCII.
pub fn literal_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for byte in text.chars().map(win_ansi_byte) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(char::from(byte));
            }
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out.push(')');
    out
}

/// Maps a character to its `WinAnsiEncoding` code, or `?` when it has none.
pub fn win_ansi_byte(ch: char) -> u8 {
    if let Ok(byte) = u8::try_from(ch) {
        if byte < 0x80 || byte >= 0xa0 {
            return byte;
        }
    }
    match ch {
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn scalar_values() {
        assert_eq!(PdfValue::from(ObjectRef::new(12)).to_string(), "12 0 R");
        assert_eq!(PdfValue::from(ObjectType::ExtGState).to_string(), "/ExtGState");
        assert_eq!(PdfValue::name("F1").to_string(), "/F1");
        assert_eq!(PdfValue::from(true).to_string(), "true");
        assert_eq!(PdfValue::from(-3_i64).to_string(), "-3");
        assert_eq!(PdfValue::from(841.889_763_779_5).to_string(), "841.8898");
        assert_eq!(PdfValue::from(0.5).to_string(), "0.5");
        assert_eq!(PdfValue::from(-0.000_01).to_string(), "0");
        assert_eq!(PdfValue::from(f64::NAN).to_string(), "0");
        assert_eq!(PdfValue::from(f64::MIN).to_string(), "-32767");
        assert_eq!(PdfValue::from(f64::INFINITY).to_string(), "32767");
    }

    #[test]
    fn dates_use_the_pdf_date_syntax() {
        let dt = Utc.with_ymd_and_hms(2014, 3, 9, 17, 5, 42).unwrap();
        assert_eq!(PdfValue::from(dt).to_string(), "(D:20140309170542+00'00)");
    }

    #[test]
    fn containers_recurse() {
        let mut inner = PdfDictionary::new();
        inner.insert("Type".into(), ObjectType::Font.into());
        inner.insert("BaseFont".into(), PdfValue::name("Helvetica"));
        let list = PdfValue::List(vec![1_i64.into(), PdfValue::Dictionary(inner), 2.5.into()]);
        assert_eq!(
            list.to_string(),
            "[1 <<\n/Type /Font\n/BaseFont /Helvetica\n>> 2.5]"
        );
    }

    #[test]
    fn literal_strings_are_escaped() {
        assert_eq!(literal_string("a(b)\\c"), "(a\\(b\\)\\\\c)");
        assert_eq!(literal_string("\u{e9}\u{20ac}\u{4e2d}"), "(\\351\\200?)");
        assert_eq!(literal_string("line\n"), "(line\\012)");
    }

    #[test]
    #[should_panic(expected = "start at 1")]
    fn object_zero_is_reserved() {
        let _ = ObjectRef::new(0);
    }
}
