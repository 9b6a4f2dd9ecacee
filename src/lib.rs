//! # Platen
//!
//! A fixed-layout PDF overlay engine.
//!
//! Most PDF generators treat the document as a flowing canvas: content
//! determines geometry, and a change in copy can push every later element
//! around. Platen does the opposite: **the template's geometry is the
//! contract.** Every box has a fixed place on a fixed page; content adapts
//! to the box — wrapped, aligned, truncated — and never moves it.
//!
//! The practical consequence: a malformed payload or a bad layout edit can
//! cost at most its own element. The artifact always comes out complete.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON request)
//!       ↓
//!  [normalize]  — Resolve payload field aliases → field bindings
//!       ↓
//!  [layout]     — Default table + override resolution
//!       ↓
//!  [compose]    — Wrap, align, place into boxes → draw ops
//!       ↓
//!  [pdf]        — Serialize to PDF bytes
//! ```

pub mod compose;
pub mod error;
pub mod font;
pub mod geom;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod pdf;
pub mod surface;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::Serialize;

use compose::{SkippedField, TruncatedField};
use error::PlatenError;
use font::{FontChoice, FontContext, StandardFont};
use image_loader::FileFetcher;
use layout::{AppliedOverride, IgnoredOverride};
use model::{FontFamily, RenderRequest};
use pdf::{PdfPage, PdfWriter};

/// Everything a render decided along the way: layout edits applied and
/// ignored, fields skipped, lines truncated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderReport {
    pub applied: Vec<AppliedOverride>,
    pub ignored: Vec<IgnoredOverride>,
    pub skipped: Vec<SkippedField>,
    pub truncated: Vec<TruncatedField>,
}

/// Render a request to PDF bytes.
///
/// This is the primary entry point. Fatal errors are limited to broken
/// preconditions (unparseable font data, a layout with no pages); bad
/// content degrades per element and is reported, not thrown.
pub fn render(request: &RenderRequest) -> Result<Vec<u8>, PlatenError> {
    render_with_report(request).map(|(bytes, _)| bytes)
}

/// Render a request to PDF bytes plus the diagnostics report.
pub fn render_with_report(request: &RenderRequest) -> Result<(Vec<u8>, RenderReport), PlatenError> {
    let mut font_context = match request.font_family {
        FontFamily::Helvetica => FontContext::new(),
        FontFamily::Courier => FontContext::with_base(StandardFont::Courier),
    };
    if let Some(ref font_data) = request.font_data {
        let bytes = image_loader::base64_decode(font_data.trim())
            .map_err(PlatenError::FontError)?;
        font_context.register_custom(FontChoice::Regular, &bytes)?;
    }

    let defaults = request
        .layout
        .clone()
        .unwrap_or_else(layout::default::default_layout);
    let resolution = layout::resolve(&defaults, &request.overrides);

    let page_count = request
        .page_count
        .unwrap_or_else(|| resolution.table.page_count());
    if page_count == 0 {
        return Err(PlatenError::RenderError(
            "layout names no pages and no page count was given".to_string(),
        ));
    }

    let (width, height) = request.page_size.dimensions();
    let mut pages: Vec<PdfPage> = (0..page_count).map(|_| PdfPage::new(width, height)).collect();

    let mut bindings = normalize::bindings(&normalize::normalize(&request.payload));
    bindings.extend(request.fields.iter().cloned());

    let log = compose::composite(
        &mut pages,
        &bindings,
        &resolution.table,
        &font_context,
        &FileFetcher,
    );

    let bytes = PdfWriter::new().write(&pages, &request.metadata, &font_context);

    let report = RenderReport {
        applied: resolution.applied,
        ignored: resolution.ignored,
        skipped: log.skipped,
        truncated: log.truncated,
    };
    Ok((bytes, report))
}

/// Render a request described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, PlatenError> {
    let request: RenderRequest = serde_json::from_str(json)?;
    render(&request)
}
