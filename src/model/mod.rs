//! # Request Model
//!
//! The input representation for the overlay engine. A render request carries
//! the raw inbound payload (normalized into field bindings), optional
//! pre-normalized bindings, the layout table and its override sources, and
//! page/metadata settings. Everything deserializes from camelCase JSON.
//!
//! A layout table maps page keys to boxes. Page keys are names, not page
//! numbers: several keys may target the same physical page, which lets one
//! template page carry independently overridable box groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::font::FontChoice;

/// Horizontal alignment of wrapped lines inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A named rectangular placement region with its text-layout parameters.
///
/// Coordinates are authoring-space points: origin top-left, y growing
/// downward. `w` and `h` are clamped non-negative during layout resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSpec {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    /// Box height. 0 means "auto": tall enough for whatever renders.
    #[serde(default)]
    pub h: f64,
    /// Text point size.
    #[serde(default = "default_size")]
    pub size: f64,
    /// Extra space between consecutive baselines, on top of `size`.
    #[serde(default = "default_line_gap")]
    pub line_gap: f64,
    #[serde(default)]
    pub align: Align,
    /// Line cap. Absent means unbounded.
    #[serde(default)]
    pub max_lines: Option<u32>,
    /// Symmetric inset from the box edges.
    #[serde(default)]
    pub pad: f64,
    /// Grow `h` to guarantee room for `max_lines` lines.
    #[serde(default = "default_true")]
    pub auto_expand: bool,
}

fn default_size() -> f64 {
    12.0
}

fn default_line_gap() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

impl BoxSpec {
    /// Baseline-to-baseline distance.
    pub fn line_height(&self) -> f64 {
        self.size + self.line_gap
    }

    /// Box height after the auto-expand rule: with `autoExpand` and a finite
    /// line cap, the box grows to hold exactly `maxLines` lines when the
    /// stored height is smaller.
    pub fn effective_height(&self) -> f64 {
        match self.max_lines {
            Some(n) if self.auto_expand && n > 0 => {
                let needed = self.pad * 2.0 + self.size + (n - 1) as f64 * self.line_height();
                self.h.max(needed)
            }
            _ => self.h,
        }
    }
}

/// One page key's entry: the physical page it targets and its boxes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEntry {
    /// 0-based physical page index.
    pub index: usize,
    pub boxes: BTreeMap<String, BoxSpec>,
}

/// Page key → box key → box spec.
///
/// Constructed once per request as a deep copy of the compiled default (or
/// the request's replacement table), mutated by override passes, then read
/// only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutTable {
    pub pages: BTreeMap<String, PageEntry>,
}

impl LayoutTable {
    /// Physical pages needed to satisfy every page entry.
    pub fn page_count(&self) -> usize {
        self.pages
            .values()
            .map(|p| p.index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Resolve a (page key, box key) pair to the physical page index and
    /// the box spec.
    pub fn lookup(&self, page_key: &str, box_key: &str) -> Option<(usize, &BoxSpec)> {
        let page = self.pages.get(page_key)?;
        let spec = page.boxes.get(box_key)?;
        Some((page.index, spec))
    }
}

/// Content bound to one box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldValue {
    Text { value: String },
    Image { src: String },
}

/// One field to place: which box, what content, which weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBinding {
    pub page: String,
    #[serde(rename = "box")]
    pub box_key: String,
    pub value: FieldValue,
    #[serde(default)]
    pub font: FontChoice,
}

/// One override source: a labelled set of layout edits.
///
/// Sources apply in list order, later sources winning on conflicts. Each
/// source may carry flat `<prefix>_<page>_<box>_<property>` pairs (the shape
/// query strings arrive in) and/or a structured page → box → property table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideSource {
    /// Free-form origin tag, echoed in the applied/ignored logs.
    #[serde(default)]
    pub label: String,
    /// Key prefix the flat pairs are named under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Flat pairs, e.g. `"L_p3_domDesc_x": 72`.
    #[serde(default)]
    pub pairs: serde_json::Map<String, serde_json::Value>,
    /// Structured table, e.g. `{"p3": {"domDesc": {"x": 72}}}`.
    #[serde(default)]
    pub table: serde_json::Map<String, serde_json::Value>,
}

fn default_prefix() -> String {
    "L".to_string()
}

impl Default for OverrideSource {
    fn default() -> Self {
        Self {
            label: String::new(),
            prefix: default_prefix(),
            pairs: serde_json::Map::new(),
            table: serde_json::Map::new(),
        }
    }
}

/// Which standard font pair backs regular/bold text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Helvetica,
    Courier,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    Letter,
    Legal,
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// The built-in report template's page size. Taller than Letter: the box
/// coordinates inherited from the template address y values up to ~1040.
fn template_page_size() -> PageSize {
    PageSize::Custom {
        width: 612.0,
        height: 1100.0,
    }
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// A complete render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Raw inbound payload; historical field aliases resolve during
    /// normalization.
    #[serde(default)]
    pub payload: serde_json::Value,

    /// Pre-normalized bindings, drawn after the payload's own.
    #[serde(default)]
    pub fields: Vec<FieldBinding>,

    /// Replaces the built-in template table when present.
    #[serde(default)]
    pub layout: Option<LayoutTable>,

    /// Layout edits applied on top of the table, in order.
    #[serde(default)]
    pub overrides: Vec<OverrideSource>,

    #[serde(default = "template_page_size")]
    pub page_size: PageSize,

    /// Caps or extends the physical page count; defaults to what the layout
    /// table needs.
    #[serde(default)]
    pub page_count: Option<usize>,

    #[serde(default)]
    pub font_family: FontFamily,

    /// Base64-encoded TTF whose metrics replace the regular-weight
    /// measurement, for templates set in a non-standard face.
    #[serde(default)]
    pub font_data: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            payload: serde_json::Value::Null,
            fields: Vec::new(),
            layout: None,
            overrides: Vec::new(),
            page_size: template_page_size(),
            page_count: None,
            font_family: FontFamily::default(),
            font_data: None,
            metadata: Metadata::default(),
        }
    }
}
