// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use png::{BitDepth, ColorType, Encoder, Transformations};

use crate::{Color, Error, Result};

/// Source encoding of an [`Image`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// Windows bitmap.
    Bmp,
    /// JPEG.
    Jpeg,
    /// Not recognized.
    Unknown,
}

impl ImageFormat {
    /// Detects the format from the leading magic bytes.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&PNG_SIGNATURE) {
            Self::Png
        } else if bytes.starts_with(b"BM") {
            Self::Bmp
        } else if bytes.starts_with(&[0xFF, 0xD8]) {
            Self::Jpeg
        } else {
            Self::Unknown
        }
    }

    /// Maps a MIME type (parameters and case ignored) to a format.
    pub fn from_mime_type(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/bmp" | "image/x-ms-bmp" => Self::Bmp,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Self::Jpeg,
            _ => Self::Unknown,
        }
    }

    /// The MIME type used in data URIs.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Jpeg => "image/jpeg",
            Self::Unknown => "application/octet-stream",
        }
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

struct ImageData {
    id: u64,
    format: ImageFormat,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

/// An immutable, encoded raster image.
///
/// Cloning an `Image` is cheap and keeps its identity: backends key their
/// caches by [`Image::id`], so reusing the same instance across frames hits
/// those caches while a re-created image with equal pixels does not.
#[derive(Clone)]
pub struct Image {
    inner: Arc<ImageData>,
}

impl Image {
    /// Encodes a row-major grid of colors as a PNG image.
    ///
    /// Undefined colors are stored as fully transparent pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Color]) -> Result<Self> {
        let expected = u64::from(width) * u64::from(height);
        if width == 0 || height == 0 || expected != pixels.len() as u64 {
            return Err(Error::InvalidDimensions {
                width,
                height,
                pixels: pixels.len(),
            });
        }

        let mut rgba = Vec::with_capacity(pixels.len() * 4);
        for c in pixels {
            if c.is_undefined() {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                rgba.extend_from_slice(&[c.r(), c.g(), c.b(), c.a()]);
            }
        }

        let mut bytes = Vec::new();
        {
            let mut encoder = Encoder::new(&mut bytes, width, height);
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&rgba)?;
            writer.finish()?;
        }
        Ok(Self::new(ImageFormat::Png, width, height, bytes))
    }

    /// Wraps already encoded PNG, BMP or JPEG bytes.
    ///
    /// Only the header is inspected; pixel data is decoded lazily by the
    /// backends that need it.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = ImageFormat::detect(&bytes);
        let (width, height) = match format {
            ImageFormat::Png => png_dimensions(&bytes)?,
            ImageFormat::Bmp => bmp_dimensions(&bytes)?,
            ImageFormat::Jpeg => jpeg_dimensions(&bytes)?,
            ImageFormat::Unknown => return Err(Error::UnsupportedImageFormat(format)),
        };
        Ok(Self::new(format, width, height, bytes))
    }

    fn new(format: ImageFormat, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(ImageData {
                id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
                format,
                width,
                height,
                bytes,
            }),
        }
    }

    /// Process-unique identity, shared by clones.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Source encoding.
    pub fn format(&self) -> ImageFormat {
        self.inner.format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// The encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    /// Decodes the image to straight-alpha RGBA8, row-major.
    ///
    /// Only PNG sources can be decoded.
    pub fn to_rgba8(&self) -> Result<Vec<u8>> {
        if self.format() != ImageFormat::Png {
            return Err(Error::UnsupportedImageFormat(self.format()));
        }
        let mut decoder = png::Decoder::new(self.bytes());
        decoder.set_transformations(
            Transformations::EXPAND | Transformations::ALPHA | Transformations::STRIP_16,
        );
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0_u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        match info.color_type {
            ColorType::Rgba => Ok(buf),
            ColorType::GrayscaleAlpha => Ok(buf
                .chunks_exact(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect()),
            _ => Err(Error::InvalidImage("unexpected PNG color type after expansion")),
        }
    }

    /// Decodes the image to a row-major grid of colors.
    pub fn pixels(&self) -> Result<Vec<Color>> {
        Ok(self
            .to_rgba8()?
            .chunks_exact(4)
            .map(|p| Color::from_argb(p[3], p[0], p[1], p[2]))
            .collect())
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Image {}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id())
            .field("format", &self.format())
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn png_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    // Signature, IHDR length and tag, then width and height.
    let header = bytes
        .get(16..24)
        .ok_or(Error::InvalidImage("truncated PNG header"))?;
    let width = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let height = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    Ok((width, height))
}

fn bmp_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let header = bytes
        .get(18..26)
        .ok_or(Error::InvalidImage("truncated BMP header"))?;
    let width = i32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    // Negative heights mark top-down bitmaps.
    let height = i32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    Ok((width.unsigned_abs(), height.unsigned_abs()))
}

fn jpeg_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return Err(Error::InvalidImage("malformed JPEG marker"));
        }
        let marker = bytes[pos + 1];
        // Fill bytes.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        let len = usize::from(
            be_u16(bytes, pos + 2).ok_or(Error::InvalidImage("truncated JPEG segment"))?,
        );
        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let height = be_u16(bytes, pos + 5).ok_or(Error::InvalidImage("truncated JPEG SOF"))?;
            let width = be_u16(bytes, pos + 7).ok_or(Error::InvalidImage("truncated JPEG SOF"))?;
            return Ok((u32::from(width), u32::from(height)));
        }
        pos += 2 + len;
    }
    Err(Error::InvalidImage("JPEG without frame header"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Image {
        let pixels = [
            Color::BLUE,
            Color::GREEN,
            Color::RED,
            Color::WHITE,
            Color::TRANSPARENT,
            Color::YELLOW.with_alpha(127),
            Color::ORANGE.with_alpha(127),
            Color::PINK.with_alpha(127),
        ];
        Image::from_pixels(4, 2, &pixels).unwrap()
    }

    #[test]
    fn pixels_survive_png_encoding() {
        let image = sample();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!((image.width(), image.height()), (4, 2));
        let decoded = image.pixels().unwrap();
        assert_eq!(decoded[0], Color::BLUE);
        assert_eq!(decoded[5], Color::YELLOW.with_alpha(127));
        assert!(decoded[4].is_invisible());
    }

    #[test]
    fn clones_share_identity() {
        let a = sample();
        let b = a.clone();
        let c = sample();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn reads_dimensions_from_headers() {
        let png = sample();
        let reread = Image::from_bytes(png.bytes().to_vec()).unwrap();
        assert_eq!((reread.width(), reread.height()), (4, 2));

        let mut bmp = vec![0_u8; 54];
        bmp[0] = b'B';
        bmp[1] = b'M';
        bmp[18..22].copy_from_slice(&3_i32.to_le_bytes());
        bmp[22..26].copy_from_slice(&(-5_i32).to_le_bytes());
        let bmp = Image::from_bytes(bmp).unwrap();
        assert_eq!(bmp.format(), ImageFormat::Bmp);
        assert_eq!((bmp.width(), bmp.height()), (3, 5));

        let jpeg = vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00,
            0x07, 0x00, 0x09, 0x01, 0x01, 0x11, 0x00,
        ];
        let jpeg = Image::from_bytes(jpeg).unwrap();
        assert_eq!((jpeg.width(), jpeg.height()), (9, 7));
        assert!(matches!(
            jpeg.pixels(),
            Err(Error::UnsupportedImageFormat(ImageFormat::Jpeg))
        ));
    }

    #[test]
    fn formats_from_mime_types() {
        assert_eq!(ImageFormat::from_mime_type("image/PNG"), ImageFormat::Png);
        assert_eq!(
            ImageFormat::from_mime_type("image/jpeg; q=0.9"),
            ImageFormat::Jpeg
        );
        assert_eq!(ImageFormat::from_mime_type("image/x-ms-bmp"), ImageFormat::Bmp);
        assert_eq!(ImageFormat::from_mime_type("text/plain"), ImageFormat::Unknown);
        for format in [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Jpeg] {
            assert_eq!(ImageFormat::from_mime_type(format.mime_type()), format);
        }
    }

    #[test]
    fn rejects_mismatched_buffers() {
        assert!(matches!(
            Image::from_pixels(3, 3, &[Color::RED; 4]),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(Image::from_bytes(b"GIF89a".to_vec()).is_err());
    }
}
