// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory PDF document with a page-content operator API.

use core::fmt::Write as _;
use std::io::Write;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use plotweave_render::{Color, Error, Image, LineJoin, Result, StandardFont};

use crate::object::{ObjectRef, ObjectType, PdfDictionary, PdfValue, fmt_real, literal_string};
use crate::writer::PdfWriter;

/// Line cap styles (`J`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    /// Square end at the endpoint.
    #[default]
    Butt,
    /// Semicircular end.
    Round,
    /// Square end extending past the endpoint.
    Square,
}

/// Document information dictionary entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentInfo {
    /// `/Title`.
    pub title: Option<String>,
    /// `/Author`.
    pub author: Option<String>,
    /// `/Subject`.
    pub subject: Option<String>,
    /// `/Creator`.
    pub creator: Option<String>,
    /// `/CreationDate`.
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum Slot {
    Reserved,
    Value(PdfValue),
    Stream(PdfDictionary, Vec<u8>),
}

#[derive(Clone, Debug)]
struct Resource {
    name: String,
    object: ObjectRef,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum AlphaKind {
    Fill,
    Stroke,
}

/// Alpha in thousandths, as tracked for `gs` emission.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct AlphaState {
    fill: u16,
    stroke: u16,
}

impl AlphaState {
    const OPAQUE: Self = Self {
        fill: 1000,
        stroke: 1000,
    };
}

#[derive(Debug)]
struct Page {
    object: ObjectRef,
    content: ObjectRef,
    width: f64,
    height: f64,
    ops: String,
    fonts: IndexMap<String, ObjectRef>,
    xobjects: IndexMap<String, ObjectRef>,
    ext_gstates: IndexMap<String, ObjectRef>,
    alpha: AlphaState,
    saved: Vec<AlphaState>,
}

/// A PDF document built in memory and serialized by [`save`](Self::save).
///
/// Content operators append to the current page, which is opened with
/// [`add_page`](Self::add_page). Fonts, transparency states, and images are
/// shared document resources; each page's resource dictionary lists the
/// ones it uses.
///
/// # Panics
///
/// Content operators panic when no page is open.
#[derive(Debug)]
pub struct PortableDocument {
    slots: Vec<Slot>,
    catalog: ObjectRef,
    pages: ObjectRef,
    page_refs: Vec<ObjectRef>,
    page: Option<Page>,
    fonts: IndexMap<StandardFont, Resource>,
    alphas: IndexMap<(AlphaKind, u16), Resource>,
    images: IndexMap<(u64, bool), Resource>,
    current_font: Option<(StandardFont, f64)>,
    info: DocumentInfo,
}

impl Default for PortableDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PortableDocument {
    /// Creates an empty document with no pages.
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            catalog: ObjectRef::new(1),
            pages: ObjectRef::new(2),
            page_refs: Vec::new(),
            page: None,
            fonts: IndexMap::new(),
            alphas: IndexMap::new(),
            images: IndexMap::new(),
            current_font: None,
            info: DocumentInfo::default(),
        };
        doc.catalog = doc.allocate();
        doc.pages = doc.allocate();
        doc
    }

    /// Document information written at save time.
    pub fn info_mut(&mut self) -> &mut DocumentInfo {
        &mut self.info
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Width of the current page in points.
    pub fn page_width(&self) -> f64 {
        self.page.as_ref().map_or(0.0, |p| p.width)
    }

    /// Height of the current page in points.
    pub fn page_height(&self) -> f64 {
        self.page.as_ref().map_or(0.0, |p| p.height)
    }

    fn allocate(&mut self) -> ObjectRef {
        self.slots.push(Slot::Reserved);
        let number = u32::try_from(self.slots.len()).expect("PDF object number overflow");
        ObjectRef::new(number)
    }

    fn set(&mut self, object: ObjectRef, slot: Slot) {
        self.slots[object.index()] = slot;
    }

    fn page_mut(&mut self) -> &mut Page {
        self.page
            .as_mut()
            .expect("no open page in PortableDocument; call add_page first")
    }

    fn op(&mut self, args: core::fmt::Arguments<'_>) {
        let ops = &mut self.page_mut().ops;
        let _ = ops.write_fmt(args);
        ops.push('\n');
    }

    /// Closes the current page, if any, and opens a new one.
    pub fn add_page(&mut self, width: f64, height: f64) {
        self.close_page();
        let object = self.allocate();
        let content = self.allocate();
        self.page_refs.push(object);
        self.current_font = None;
        self.page = Some(Page {
            object,
            content,
            width,
            height,
            ops: String::new(),
            fonts: IndexMap::new(),
            xobjects: IndexMap::new(),
            ext_gstates: IndexMap::new(),
            alpha: AlphaState::OPAQUE,
            saved: Vec::new(),
        });
    }

    fn close_page(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        let mut resources = PdfDictionary::new();
        let section = |map: IndexMap<String, ObjectRef>| {
            PdfValue::Dictionary(map.into_iter().map(|(k, v)| (k, v.into())).collect())
        };
        if !page.fonts.is_empty() {
            resources.insert("Font".into(), section(page.fonts));
        }
        if !page.xobjects.is_empty() {
            resources.insert("XObject".into(), section(page.xobjects));
        }
        if !page.ext_gstates.is_empty() {
            resources.insert("ExtGState".into(), section(page.ext_gstates));
        }

        let mut dict = PdfDictionary::new();
        dict.insert("Type".into(), ObjectType::Page.into());
        dict.insert("Parent".into(), self.pages.into());
        dict.insert(
            "MediaBox".into(),
            PdfValue::List(vec![
                0_i64.into(),
                0_i64.into(),
                page.width.into(),
                page.height.into(),
            ]),
        );
        dict.insert("Contents".into(), page.content.into());
        dict.insert("Resources".into(), resources.into());
        self.set(page.object, Slot::Value(dict.into()));
        self.set(
            page.content,
            Slot::Stream(PdfDictionary::new(), page.ops.into_bytes()),
        );
    }

    /// `q`: pushes the graphics state.
    pub fn save_state(&mut self) {
        let page = self.page_mut();
        page.saved.push(page.alpha);
        self.op(format_args!("q"));
    }

    /// `Q`: pops the graphics state.
    ///
    /// # Panics
    ///
    /// Panics if there is no matching [`save_state`](Self::save_state).
    pub fn restore_state(&mut self) {
        let page = self.page_mut();
        let Some(alpha) = page.saved.pop() else {
            panic!("restore_state underflow in PortableDocument");
        };
        page.alpha = alpha;
        self.op(format_args!("Q"));
    }

    /// Nesting depth of saved graphics states on the current page.
    pub fn state_depth(&self) -> usize {
        self.page.as_ref().map_or(0, |p| p.saved.len())
    }

    /// `cm`: concatenates a matrix to the current transform.
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.op(format_args!(
            "{} {} {} {} {} {} cm",
            fmt_real(a),
            fmt_real(b),
            fmt_real(c),
            fmt_real(d),
            fmt_real(e),
            fmt_real(f)
        ));
    }

    /// `w`.
    pub fn set_line_width(&mut self, width: f64) {
        self.op(format_args!("{} w", fmt_real(width)));
    }

    /// `J`.
    pub fn set_line_cap(&mut self, cap: LineCap) {
        let code = match cap {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        };
        self.op(format_args!("{code} J"));
    }

    /// `j`.
    pub fn set_line_join(&mut self, join: LineJoin) {
        let code = match join {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        };
        self.op(format_args!("{code} j"));
    }

    /// `d`: sets the dash pattern in absolute units. An empty pattern is solid.
    pub fn set_dash_pattern(&mut self, dashes: &[f64], phase: f64) {
        let mut s = String::from("[");
        for (i, d) in dashes.iter().enumerate() {
            if i > 0 {
                s.push(' ');
            }
            s.push_str(&fmt_real(*d));
        }
        self.op(format_args!("{s}] {} d", fmt_real(phase)));
    }

    /// `RG`, plus a `gs` when the stroke alpha changes.
    pub fn set_stroke_color(&mut self, color: Color) {
        self.op(format_args!("{} RG", rgb(color)));
        self.set_alpha(AlphaKind::Stroke, color.opacity());
    }

    /// `rg`, plus a `gs` when the fill alpha changes.
    pub fn set_fill_color(&mut self, color: Color) {
        self.op(format_args!("{} rg", rgb(color)));
        self.set_alpha(AlphaKind::Fill, color.opacity());
    }

    /// Sets the fill alpha alone, as used for image painting.
    pub fn set_fill_alpha(&mut self, alpha: f64) {
        self.set_alpha(AlphaKind::Fill, alpha);
    }

    fn set_alpha(&mut self, kind: AlphaKind, alpha: f64) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "alpha is clamped to 0..=1000 thousandths"
        )]
        let milli = (alpha.clamp(0.0, 1.0) * 1000.0).round() as u16;
        let page = self.page_mut();
        let current = match kind {
            AlphaKind::Fill => &mut page.alpha.fill,
            AlphaKind::Stroke => &mut page.alpha.stroke,
        };
        if *current == milli {
            return;
        }
        *current = milli;

        let resource = match self.alphas.get(&(kind, milli)) {
            Some(resource) => resource.clone(),
            None => {
                let object = self.allocate();
                let mut dict = PdfDictionary::new();
                dict.insert("Type".into(), ObjectType::ExtGState.into());
                let key = match kind {
                    AlphaKind::Fill => "ca",
                    AlphaKind::Stroke => "CA",
                };
                dict.insert(key.into(), (f64::from(milli) / 1000.0).into());
                self.set(object, Slot::Value(dict.into()));
                let resource = Resource {
                    name: format!("GS{}", self.alphas.len() + 1),
                    object,
                };
                self.alphas.insert((kind, milli), resource.clone());
                resource
            }
        };
        self.page_mut()
            .ext_gstates
            .insert(resource.name.clone(), resource.object);
        self.op(format_args!("/{} gs", resource.name));
    }

    /// `m`.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.op(format_args!("{} {} m", fmt_real(x), fmt_real(y)));
    }

    /// `l`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.op(format_args!("{} {} l", fmt_real(x), fmt_real(y)));
    }

    /// `c`.
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.op(format_args!(
            "{} {} {} {} {} {} c",
            fmt_real(x1),
            fmt_real(y1),
            fmt_real(x2),
            fmt_real(y2),
            fmt_real(x3),
            fmt_real(y3)
        ));
    }

    /// `h`.
    pub fn close_subpath(&mut self) {
        self.op(format_args!("h"));
    }

    /// `re`.
    pub fn append_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.op(format_args!(
            "{} {} {} {} re",
            fmt_real(x),
            fmt_real(y),
            fmt_real(width),
            fmt_real(height)
        ));
    }

    /// Appends an ellipse inscribed in the box as four cubic arcs.
    pub fn append_ellipse(&mut self, x: f64, y: f64, width: f64, height: f64) {
        const KAPPA: f64 = 0.552_284_749_830_793_4;
        let rx = width / 2.0;
        let ry = height / 2.0;
        let cx = x + rx;
        let cy = y + ry;
        let ox = rx * KAPPA;
        let oy = ry * KAPPA;
        self.move_to(cx + rx, cy);
        self.curve_to(cx + rx, cy + oy, cx + ox, cy + ry, cx, cy + ry);
        self.curve_to(cx - ox, cy + ry, cx - rx, cy + oy, cx - rx, cy);
        self.curve_to(cx - rx, cy - oy, cx - ox, cy - ry, cx, cy - ry);
        self.curve_to(cx + ox, cy - ry, cx + rx, cy - oy, cx + rx, cy);
        self.close_subpath();
    }

    /// `S`.
    pub fn stroke(&mut self) {
        self.op(format_args!("S"));
    }

    /// `f`.
    pub fn fill(&mut self) {
        self.op(format_args!("f"));
    }

    /// `B`.
    pub fn fill_and_stroke(&mut self) {
        self.op(format_args!("B"));
    }

    /// `W n`: intersects the clip with the current path and discards it.
    pub fn clip(&mut self) {
        self.op(format_args!("W n"));
    }

    /// Selects a base-14 font for subsequent [`draw_text`](Self::draw_text).
    pub fn set_font(&mut self, font: StandardFont, size: f64) {
        let resource = match self.fonts.get(&font) {
            Some(resource) => resource.clone(),
            None => {
                let object = self.allocate();
                let mut dict = PdfDictionary::new();
                dict.insert("Type".into(), ObjectType::Font.into());
                dict.insert("Subtype".into(), PdfValue::name("Type1"));
                dict.insert("BaseFont".into(), PdfValue::name(font.base_font_name()));
                dict.insert("Encoding".into(), PdfValue::name("WinAnsiEncoding"));
                self.set(object, Slot::Value(dict.into()));
                let resource = Resource {
                    name: format!("F{}", self.fonts.len() + 1),
                    object,
                };
                self.fonts.insert(font, resource.clone());
                resource
            }
        };
        self.page_mut()
            .fonts
            .insert(resource.name.clone(), resource.object);
        self.current_font = Some((font, size));
    }

    /// Shows one line of text with its baseline origin at `(x, y)`.
    ///
    /// Emits `BT /F Tf x y Td (..) Tj ET` using the font from
    /// [`set_font`](Self::set_font), or 12pt Helvetica if none was set.
    pub fn draw_text(&mut self, x: f64, y: f64, text: &str) {
        let (font, size) = match self.current_font {
            Some(current) => current,
            None => {
                self.set_font(StandardFont::Helvetica, 12.0);
                (StandardFont::Helvetica, 12.0)
            }
        };
        let name = self.fonts[&font].name.clone();
        self.op(format_args!(
            "BT\n/{name} {} Tf\n{} {} Td\n{} Tj\nET",
            fmt_real(size),
            fmt_real(x),
            fmt_real(y),
            literal_string(text)
        ));
    }

    /// Registers `image` as an XObject on the current page and returns its
    /// resource name.
    ///
    /// Images are stored once per identity and sampling mode. Returns `None`
    /// and logs a warning when the image cannot be decoded.
    pub fn image_resource(&mut self, image: &Image, interpolate: bool) -> Result<Option<String>> {
        let key = (image.id(), interpolate);
        let resource = match self.images.get(&key) {
            Some(resource) => resource.clone(),
            None => {
                let rgba = match image.to_rgba8() {
                    Ok(rgba) => rgba,
                    Err(Error::UnsupportedImageFormat(format)) => {
                        log::warn!(format:? = format; "skipping image the PDF backend cannot decode");
                        return Ok(None);
                    }
                    Err(err) => return Err(err),
                };
                let object = self.image_object(image.width(), image.height(), &rgba, interpolate);
                let resource = Resource {
                    name: format!("Im{}", self.images.len() + 1),
                    object,
                };
                self.images.insert(key, resource.clone());
                resource
            }
        };
        self.page_mut()
            .xobjects
            .insert(resource.name.clone(), resource.object);
        Ok(Some(resource.name))
    }

    fn image_object(&mut self, width: u32, height: u32, rgba: &[u8], interpolate: bool) -> ObjectRef {
        let image_dict = |color_space: &str| {
            let mut dict = PdfDictionary::new();
            dict.insert("Type".into(), ObjectType::XObject.into());
            dict.insert("Subtype".into(), PdfValue::name("Image"));
            dict.insert("Width".into(), width.into());
            dict.insert("Height".into(), height.into());
            dict.insert("ColorSpace".into(), PdfValue::name(color_space));
            dict.insert("BitsPerComponent".into(), 8_i64.into());
            if interpolate {
                dict.insert("Interpolate".into(), true.into());
            }
            dict
        };

        let object = self.allocate();
        let mut dict = image_dict("DeviceRGB");
        if rgba.chunks_exact(4).any(|p| p[3] < 255) {
            let mask = self.allocate();
            let alpha: Vec<u8> = rgba.chunks_exact(4).map(|p| p[3]).collect();
            self.set(mask, Slot::Stream(image_dict("DeviceGray"), alpha));
            dict.insert("SMask".into(), mask.into());
        }
        let rgb: Vec<u8> = rgba.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect();
        self.set(object, Slot::Stream(dict, rgb));
        object
    }

    /// `Do`.
    pub fn draw_xobject(&mut self, name: &str) {
        self.op(format_args!("/{name} Do"));
    }

    /// Closes the current page and writes the complete file to `out`.
    pub fn save<W: Write>(mut self, out: W) -> Result<W> {
        self.close_page();

        let mut pages = PdfDictionary::new();
        pages.insert("Type".into(), ObjectType::Pages.into());
        pages.insert(
            "Kids".into(),
            PdfValue::List(self.page_refs.iter().map(|&p| p.into()).collect()),
        );
        pages.insert("Count".into(), self.page_refs.len().into());
        self.set(self.pages, Slot::Value(pages.into()));

        let mut catalog = PdfDictionary::new();
        catalog.insert("Type".into(), ObjectType::Catalog.into());
        catalog.insert("Pages".into(), self.pages.into());
        self.set(self.catalog, Slot::Value(catalog.into()));

        let info = self.allocate();
        let info_dict = self.info_dictionary();
        self.set(info, Slot::Value(info_dict.into()));

        let mut writer = PdfWriter::new(out);
        writer.write_header()?;
        for (i, slot) in self.slots.into_iter().enumerate() {
            let object = ObjectRef::new(u32::try_from(i + 1).expect("PDF object number overflow"));
            match slot {
                Slot::Reserved => {}
                Slot::Value(value) => writer.write_object(object, &value)?,
                Slot::Stream(dict, data) => writer.write_stream(object, dict, &data)?,
            }
        }
        writer.write_trailer(self.catalog, Some(info))?;
        log::debug!(
            pages = self.page_refs.len(), bytes = writer.position();
            "PDF document saved"
        );
        Ok(writer.into_inner())
    }

    fn info_dictionary(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        let text = |s: &Option<String>| s.as_ref().map(|s| PdfValue::Text(s.clone()));
        for (key, value) in [
            ("Title", text(&self.info.title)),
            ("Author", text(&self.info.author)),
            ("Subject", text(&self.info.subject)),
            ("Creator", text(&self.info.creator)),
        ] {
            if let Some(value) = value {
                dict.insert(key.into(), value);
            }
        }
        dict.insert("Producer".into(), PdfValue::Text("Plotweave".into()));
        if let Some(date) = self.info.creation_date {
            dict.insert("CreationDate".into(), date.into());
        }
        dict
    }
}

fn rgb(color: Color) -> String {
    let c = |v: u8| fmt_real(f64::from(v) / 255.0);
    format!("{} {} {}", c(color.r()), c(color.g()), c(color.b()))
}
