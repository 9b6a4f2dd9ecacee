//! Built-in width tables for the standard PDF fonts the engine draws with.
//!
//! Widths are the AFM advance values in 1/1000 em units, so
//! `width / 1000 * font_size` gives the advance in points. Only the WinAnsi
//! range matters: that is all the PDF writer can encode.

use super::StandardFont;

/// Measurement handle for one standard font.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    font: StandardFont,
}

impl StandardFontMetrics {
    pub fn new(font: StandardFont) -> Self {
        Self { font }
    }

    /// Advance width of a single character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match self.font {
            StandardFont::Helvetica => helvetica_units(ch),
            StandardFont::HelveticaBold => helvetica_bold_units(ch),
            // Courier is monospaced at 600 units for every weight.
            StandardFont::Courier | StandardFont::CourierBold => 600,
        };
        units as f64 / 1000.0 * font_size
    }

    /// Advance width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

/// Helvetica AFM advances for the WinAnsi range.
fn helvetica_units(ch: char) -> u16 {
    match ch {
        '\'' => 191,
        'i' | 'j' | 'l' | '\u{2018}' | '\u{2019}' => 222,
        '|' => 260,
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '[' | '\\' | ']' | 'f' | 't' => 278,
        '(' | ')' | '-' | '`' | 'r' | '\u{201C}' | '\u{201D}' => 333,
        '{' | '}' => 334,
        '\u{2022}' => 350,
        '"' => 355,
        '*' => 389,
        '^' => 469,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        '+' | '<' | '=' | '>' | '~' => 584,
        'F' | 'T' | 'Z' => 611,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        '%' => 889,
        'W' => 944,
        '\u{2014}' | '\u{2026}' => 1000,
        '@' => 1015,
        _ => 556,
    }
}

/// Helvetica-Bold AFM advances for the WinAnsi range.
fn helvetica_bold_units(ch: char) -> u16 {
    match ch {
        '\'' => 238,
        ' ' | ',' | '.' | '/' | 'I' | '\\' | 'i' | 'j' | 'l' | '\u{2018}' | '\u{2019}' => 278,
        '|' => 280,
        '!' | '(' | ')' | '-' | ':' | ';' | '[' | ']' | '`' | 'f' | 't' => 333,
        '\u{2022}' => 350,
        '*' | 'r' | '{' | '}' => 389,
        '"' => 474,
        'z' | '\u{201C}' | '\u{201D}' => 500,
        '+' | '<' | '=' | '>' | '^' | '~' => 584,
        '?' | 'F' | 'L' | 'T' | 'Z' | 'b' | 'd' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 611,
        'E' | 'S' | 'V' | 'X' | 'Y' => 667,
        '&' | 'A' | 'B' | 'C' | 'D' | 'H' | 'K' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' | 'w' => 778,
        'M' => 833,
        '%' | 'm' => 889,
        'W' => 944,
        '@' => 975,
        '\u{2014}' | '\u{2026}' => 1000,
        _ => 556,
    }
}
