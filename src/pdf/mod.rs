//! # PDF Writer
//!
//! Takes composed pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. We write the raw bytes ourselves
//! because it keeps the engine self-contained and the output byte-exact. The
//! PDF spec is verbose but the subset an overlay needs is manageable.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Fonts
//!
//! Text draws with the standard PDF fonts as plain Type1 references in
//! WinAnsiEncoding; nothing is embedded. Template artwork carries any
//! branded faces — the overlay only needs its own text to land exactly.
//!
//! Pages store operations in draw space (bottom-left origin). The
//! coordinate flip happened during composition, so the writer emits
//! positions as received.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::{FontContext, StandardFont};
use crate::image_loader::{ChartImage, ChartPixelData, JpegColorSpace};
use crate::model::Metadata;
use crate::surface::{ImageOp, Surface, TextOp};

/// One recorded draw operation.
#[derive(Debug, Clone)]
enum PageOp {
    Text { text: String, op: TextOp },
    Image { image: ChartImage, op: ImageOp },
}

/// A physical page accumulating draw operations for the writer.
#[derive(Debug, Clone)]
pub struct PdfPage {
    pub width: f64,
    pub height: f64,
    ops: Vec<PageOp>,
}

impl PdfPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }
}

impl Surface for PdfPage {
    fn height(&self) -> f64 {
        self.height
    }

    fn draw_text(&mut self, text: &str, op: TextOp) {
        self.ops.push(PageOp::Text {
            text: text.to_string(),
            op,
        });
    }

    fn draw_image(&mut self, image: &ChartImage, op: ImageOp) {
        self.ops.push(PageOp::Image {
            image: image.clone(),
            op,
        });
    }
}

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Registered fonts in /F-index order: (font, object id).
    font_objects: Vec<(StandardFont, usize)>,
    /// XObject obj IDs for images, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Maps (page_index, image_position_on_page) to an image_objects index,
    /// so content streams can reference the right /ImN.
    image_index_map: HashMap<(usize, usize), usize>,
}

struct PdfObject {
    #[allow(dead_code)]
    id: usize,
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write composed pages to a PDF byte vector.
    pub fn write(&self, pages: &[PdfPage], metadata: &Metadata, font_context: &FontContext) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then images, then page objects and content streams
        builder.objects.push(PdfObject { id: 0, data: vec![] });
        builder.objects.push(PdfObject { id: 1, data: vec![] });
        builder.objects.push(PdfObject { id: 2, data: vec![] });

        self.register_fonts(&mut builder, pages, font_context);
        self.register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();

        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder, font_context);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject {
                id: content_obj_id,
                data: content_data,
            });

            let page_obj_id = builder.objects.len();
            let font_resources = Self::build_font_resource_dict(&builder.font_objects);
            let xobject_resources = self.build_xobject_resource_dict(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!(
                    "/Font << {} >> /XObject << {} >>",
                    font_resources, xobject_resources
                )
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                id: page_obj_id,
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        // Catalog (object 1)
        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        // Pages tree (object 2)
        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = self.write_info(&mut builder, metadata);

        self.serialize(&builder, info_obj_id)
    }

    /// Info dictionary, when any metadata field is set.
    fn write_info(&self, builder: &mut PdfBuilder, metadata: &Metadata) -> Option<usize> {
        let has_any = metadata.title.is_some()
            || metadata.author.is_some()
            || metadata.subject.is_some()
            || metadata.creator.is_some();
        if !has_any {
            return None;
        }

        let id = builder.objects.len();
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::escape_pdf_string(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::escape_pdf_string(subject));
        }
        let creator = metadata.creator.as_deref().unwrap_or("Platen");
        let _ = write!(
            info,
            "/Creator ({}) /Producer (Platen 0.1) >>",
            Self::escape_pdf_string(creator)
        );
        builder.objects.push(PdfObject {
            id,
            data: info.into_bytes(),
        });
        Some(id)
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(
        &self,
        page: &PdfPage,
        page_idx: usize,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) -> String {
        let mut stream = String::new();
        let mut image_counter = 0usize;

        for op in &page.ops {
            match op {
                PageOp::Text { text, op } => {
                    self.write_text_op(&mut stream, text, op, builder, font_context)
                }
                PageOp::Image { op, .. } => {
                    let img_pos = image_counter;
                    image_counter += 1;
                    if let Some(&img_idx) = builder.image_index_map.get(&(page_idx, img_pos)) {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            op.width, op.height, op.x, op.y, img_idx
                        );
                    }
                }
            }
        }

        stream
    }

    /// One line of text as PDF operators: set color and font, position the
    /// baseline, show the WinAnsi-encoded string.
    fn write_text_op(
        &self,
        stream: &mut String,
        text: &str,
        op: &TextOp,
        builder: &PdfBuilder,
        font_context: &FontContext,
    ) {
        let font = font_context.standard(op.font);
        let font_idx = Self::font_index(font, &builder.font_objects);

        let _ = write!(
            stream,
            "BT\n{:.3} {:.3} {:.3} rg\n",
            op.color.r, op.color.g, op.color.b
        );
        let _ = write!(
            stream,
            "/F{} {:.1} Tf\n{:.2} {:.2} Td\n",
            font_idx, op.size, op.x, op.y
        );
        let _ = write!(stream, "({}) Tj\nET\n", Self::encode_winansi_text(text));
    }

    /// Encode text for a `( ... ) Tj` operator: WinAnsi bytes with the
    /// string delimiters escaped and non-ASCII bytes in octal.
    fn encode_winansi_text(text: &str) -> String {
        let mut out = String::new();
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Register the standard fonts actually drawn across all pages.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[PdfPage], font_context: &FontContext) {
        let mut fonts: Vec<StandardFont> = Vec::new();
        for page in pages {
            for op in &page.ops {
                if let PageOp::Text { op, .. } = op {
                    let font = font_context.standard(op.font);
                    if !fonts.contains(&font) {
                        fonts.push(font);
                    }
                }
            }
        }
        // Deterministic resource order, and never an empty /Font dict.
        fonts.sort_by_key(|f| f.pdf_name());
        if fonts.is_empty() {
            fonts.push(font_context.standard(crate::font::FontChoice::Regular));
        }

        for font in fonts {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                id: obj_id,
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push((font, obj_id));
        }
    }

    /// Walk all pages, write an XObject per image, and record which /ImN
    /// each page position refers to.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[PdfPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            let mut image_counter = 0usize;
            for op in &page.ops {
                if let PageOp::Image { image, .. } = op {
                    let img_pos = image_counter;
                    image_counter += 1;

                    let img_idx = builder.image_objects.len();
                    let xobj_id = Self::write_image_xobject(builder, image);
                    builder.image_objects.push(xobj_id);
                    builder.image_index_map.insert((page_idx, img_pos), img_idx);
                }
            }
        }
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &ChartImage) -> usize {
        match &image.pixels {
            ChartPixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };

                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject {
                    id: obj_id,
                    data: obj_data,
                });
                obj_id
            }

            ChartPixelData::Rgb { data, alpha } => {
                // SMask first if an alpha plane exists.
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let smask_obj_id = builder.objects.len();
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed_alpha.len()
                    );
                    smask_data.extend_from_slice(&compressed_alpha);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.objects.push(PdfObject {
                        id: smask_obj_id,
                        data: smask_data,
                    });
                    smask_obj_id
                });

                let compressed_rgb = compress_to_vec_zlib(data, 6);
                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();

                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();

                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject {
                    id: obj_id,
                    data: obj_data,
                });
                obj_id
            }
        }
    }

    /// Build the /XObject resource dict entries for a specific page.
    fn build_xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = Vec::new();
        for (&(pidx, _), &img_idx) in &builder.image_index_map {
            if pidx == page_idx {
                let obj_id = builder.image_objects[img_idx];
                entries.push((img_idx, obj_id));
            }
        }
        if entries.is_empty() {
            return String::new();
        }
        entries.sort_by_key(|(idx, _)| *idx);
        entries.dedup();
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build_font_resource_dict(font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Look up the /F index for a font. Falls back to the first registered
    /// font, which always exists.
    fn font_index(font: StandardFont, font_objects: &[(StandardFont, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// contains special mappings for smart quotes, bullets, dashes, etc.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        // ASCII printable range maps directly
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        // Windows-1252 special mappings (0x80-0x9F)
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for i in 1..builder.objects.len() {
            let _ = write!(output, "{:010} 00000 n \n", offsets[i]);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R",
            builder.objects.len()
        );
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}
