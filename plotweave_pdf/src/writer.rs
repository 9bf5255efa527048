// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset-tracking writer for indirect objects and the cross-reference table.

use std::io::Write;

use plotweave_render::Result;

use crate::object::{ObjectRef, PdfDictionary, PdfValue};

/// Writes PDF file structure to a byte stream.
///
/// The writer counts every byte it hands to the stream. An object's offset is
/// captured from that count immediately before its `N 0 obj` header is
/// written, so buffering in `W` cannot skew the cross-reference table.
#[derive(Debug)]
pub struct PdfWriter<W: Write> {
    out: W,
    position: u64,
    offsets: Vec<Option<u64>>,
}

impl<W: Write> PdfWriter<W> {
    /// Wraps `out`. Nothing is written until the first call.
    pub fn new(out: W) -> Self {
        Self {
            out,
            position: 0,
            offsets: Vec::new(),
        }
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The recorded offset of `object`, if it has been written.
    pub fn offset_of(&self, object: ObjectRef) -> Option<u64> {
        self.offsets.get(object.index()).copied().flatten()
    }

    /// Writes the `%PDF-1.4` header and the binary marker comment.
    pub fn write_header(&mut self) -> Result<()> {
        self.write_bytes(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    fn begin_object(&mut self, object: ObjectRef) -> Result<()> {
        let index = object.index();
        if self.offsets.len() <= index {
            self.offsets.resize(index + 1, None);
        }
        self.offsets[index] = Some(self.position);
        self.write_str(&format!("{} 0 obj\n", object.number()))
    }

    /// Writes `value` as indirect object `object`.
    pub fn write_object(&mut self, object: ObjectRef, value: &PdfValue) -> Result<()> {
        self.begin_object(object)?;
        self.write_str(&format!("{value}\nendobj\n"))
    }

    /// Writes a stream object. `/Length` is set from `data`.
    pub fn write_stream(
        &mut self,
        object: ObjectRef,
        mut dictionary: PdfDictionary,
        data: &[u8],
    ) -> Result<()> {
        dictionary.insert("Length".into(), data.len().into());
        self.begin_object(object)?;
        self.write_str(&format!("{}\nstream\n", PdfValue::Dictionary(dictionary)))?;
        self.write_bytes(data)?;
        self.write_str("\nendstream\nendobj\n")
    }

    /// Writes the cross-reference table and the trailer, then flushes.
    ///
    /// Objects that were never written are listed as free.
    pub fn write_trailer(&mut self, root: ObjectRef, info: Option<ObjectRef>) -> Result<()> {
        let xref = self.position;
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for (i, offset) in self.offsets.iter().enumerate() {
            match offset {
                Some(offset) => table.push_str(&format!("{offset:010} 00000 n \n")),
                None => {
                    log::warn!(object = i + 1; "PDF object was allocated but never written");
                    table.push_str("0000000000 65535 f \n");
                }
            }
        }
        self.write_str(&table)?;

        let mut trailer = PdfDictionary::new();
        trailer.insert("Size".into(), (self.offsets.len() + 1).into());
        trailer.insert("Root".into(), root.into());
        if let Some(info) = info {
            trailer.insert("Info".into(), info.into());
        }
        self.write_str(&format!(
            "trailer\n{}\nstartxref\n{xref}\n%%EOF\n",
            PdfValue::Dictionary(trailer)
        ))?;
        self.out.flush()?;
        Ok(())
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}
