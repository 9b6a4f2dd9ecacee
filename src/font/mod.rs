//! # Font Metrics
//!
//! Text measurement for the two weights the overlay draws with.
//!
//! Drawing always uses standard PDF fonts (no embedding), but measurement
//! can be overridden with metrics parsed from the template's own font via
//! ttf-parser, so wrap decisions match artwork produced with a non-standard
//! face.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::PlatenError;
use crate::text::TextMeasure;

/// The font weight a draw instruction selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    #[default]
    Regular,
    Bold,
}

/// The standard PDF fonts the writer can reference without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// The PDF BaseFont name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    /// The bold sibling of a regular face (bold faces return themselves).
    pub fn bold_variant(&self) -> StandardFont {
        match self {
            Self::Helvetica => Self::HelveticaBold,
            Self::Courier => Self::CourierBold,
            bold => *bold,
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        StandardFontMetrics::new(*self)
    }
}

/// WinAnsi code points beyond Latin-1 that the PDF writer can encode.
const WINANSI_EXTRAS: [char; 27] = [
    '\u{0152}', '\u{0153}', '\u{0160}', '\u{0161}', '\u{0178}', '\u{017D}', '\u{017E}',
    '\u{0192}', '\u{02C6}', '\u{02DC}', '\u{2013}', '\u{2014}', '\u{2018}', '\u{2019}',
    '\u{201A}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{2020}', '\u{2021}', '\u{2022}',
    '\u{2026}', '\u{2030}', '\u{2039}', '\u{203A}', '\u{20AC}', '\u{2122}',
];

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
///
/// Only used for measurement; the glyphs themselves stay in the template
/// artwork, so no embedding or subsetting happens here.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    advance_widths: HashMap<char, u16>,
    default_advance: u16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Sample the WinAnsi range; nothing outside it can be drawn.
        let latin1 = (0x20u32..=0xFF).filter_map(char::from_u32);
        for ch in latin1.chain(WINANSI_EXTRAS) {
            if let Some(glyph_id) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                advance_widths.insert(ch, advance);
                if ch == ' ' {
                    default_advance = advance;
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }
}

/// Shared measurement context for the regular/bold pair.
///
/// Wrapping and alignment measure through this; the PDF writer asks it which
/// standard font backs each [`FontChoice`].
pub struct FontContext {
    regular: StandardFont,
    bold: StandardFont,
    custom_regular: Option<CustomFontMetrics>,
    custom_bold: Option<CustomFontMetrics>,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// Helvetica / Helvetica-Bold.
    pub fn new() -> Self {
        Self::with_base(StandardFont::Helvetica)
    }

    /// Use `base` for regular text and its bold sibling for bold text.
    pub fn with_base(base: StandardFont) -> Self {
        Self {
            regular: base,
            bold: base.bold_variant(),
            custom_regular: None,
            custom_bold: None,
        }
    }

    /// Override one slot's measurement with metrics parsed from TTF bytes.
    pub fn register_custom(&mut self, choice: FontChoice, data: &[u8]) -> Result<(), PlatenError> {
        let metrics = CustomFontMetrics::from_font_data(data).ok_or_else(|| {
            PlatenError::FontError("could not parse font data for measurement".to_string())
        })?;
        match choice {
            FontChoice::Regular => self.custom_regular = Some(metrics),
            FontChoice::Bold => self.custom_bold = Some(metrics),
        }
        Ok(())
    }

    /// The standard font the PDF writer draws this choice with.
    pub fn standard(&self, choice: FontChoice) -> StandardFont {
        match choice {
            FontChoice::Regular => self.regular,
            FontChoice::Bold => self.bold,
        }
    }

    fn custom(&self, choice: FontChoice) -> Option<&CustomFontMetrics> {
        match choice {
            FontChoice::Regular => self.custom_regular.as_ref(),
            FontChoice::Bold => self.custom_bold.as_ref(),
        }
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, choice: FontChoice, font_size: f64) -> f64 {
        match self.custom(choice) {
            Some(m) => m.char_width(ch, font_size),
            None => self.standard(choice).metrics().char_width(ch, font_size),
        }
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, choice: FontChoice, font_size: f64) -> f64 {
        match self.custom(choice) {
            Some(m) => text.chars().map(|ch| m.char_width(ch, font_size)).sum(),
            None => self.standard(choice).metrics().measure_string(text, font_size),
        }
    }

    /// A [`TextMeasure`] bound to one font choice, for the wrap path.
    pub fn measurer(&self, choice: FontChoice) -> FontMeasure<'_> {
        FontMeasure { ctx: self, choice }
    }
}

/// Borrowed measurement handle implementing the wrap seam.
pub struct FontMeasure<'a> {
    ctx: &'a FontContext,
    choice: FontChoice,
}

impl TextMeasure for FontMeasure<'_> {
    fn text_width(&self, text: &str, size: f64) -> f64 {
        self.ctx.measure_string(text, self.choice, size)
    }
}
