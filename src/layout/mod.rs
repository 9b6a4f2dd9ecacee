//! # Layout Resolution
//!
//! This is the heart of Platen and the reason it exists.
//!
//! Fixed-layout templates drift. Artwork gets revised, a box moves 30 points
//! down, a question gains a second line — and the code that positions text
//! must follow without a redeploy. Platen's answer is a compiled default
//! table plus run-time override sources:
//!
//! 1. Deep-copy the default table (requests never share mutable state)
//! 2. Apply each override source in order; later sources win
//! 3. Validate every edit against the table and a fixed property schema
//! 4. Record every decision — applied or ignored with a stable reason code
//!
//! Malformed override input is data, not an exception: a bad key can cost at
//! most its own edit, never the render. The resolver therefore never panics
//! and never returns an error; the worst possible input yields the default
//! table and a long ignored log.

pub mod default;
pub mod overrides;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::model::{Align, BoxSpec, LayoutTable, OverrideSource};
use overrides::{BoxProp, OverrideEntry, Parsed};

/// Why an override entry was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    BadKeyShape,
    UnknownPage,
    UnknownBox,
    BadProperty,
    NotANumber,
    BadAlign,
}

impl IgnoreReason {
    /// The stable code clients match on.
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::BadKeyShape => "bad_key_shape",
            IgnoreReason::UnknownPage => "unknown_page",
            IgnoreReason::UnknownBox => "unknown_box",
            IgnoreReason::BadProperty => "bad_property",
            IgnoreReason::NotANumber => "not_a_number",
            IgnoreReason::BadAlign => "bad_align",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted edit, with the canonical value that landed in the table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedOverride {
    pub source: String,
    pub page: String,
    #[serde(rename = "box")]
    pub box_key: String,
    pub prop: String,
    pub value: Value,
}

/// One rejected edit and why.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoredOverride {
    pub source: String,
    pub key: String,
    pub reason: IgnoreReason,
    pub value: Value,
}

/// The merged table plus the full decision log.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub table: LayoutTable,
    pub applied: Vec<AppliedOverride>,
    pub ignored: Vec<IgnoredOverride>,
}

/// Merges override sources into a copy of `defaults`.
///
/// The input table is cloned, its geometry clamped non-negative, and every
/// decomposed entry validated and applied in source order. Never fails.
pub fn resolve(defaults: &LayoutTable, sources: &[OverrideSource]) -> Resolution {
    let mut table = defaults.clone();
    for page in table.pages.values_mut() {
        for spec in page.boxes.values_mut() {
            spec.w = spec.w.max(0.0);
            spec.h = spec.h.max(0.0);
        }
    }

    let mut applied = Vec::new();
    let mut ignored = Vec::new();

    for source in sources {
        for parsed in overrides::decompose(source) {
            match parsed {
                Parsed::BadShape { key, value } => ignored.push(IgnoredOverride {
                    source: source.label.clone(),
                    key,
                    reason: IgnoreReason::BadKeyShape,
                    value,
                }),
                Parsed::Entry(entry) => {
                    apply_entry(&mut table, &source.label, entry, &mut applied, &mut ignored)
                }
            }
        }
    }

    Resolution {
        table,
        applied,
        ignored,
    }
}

fn apply_entry(
    table: &mut LayoutTable,
    source: &str,
    entry: OverrideEntry,
    applied: &mut Vec<AppliedOverride>,
    ignored: &mut Vec<IgnoredOverride>,
) {
    let reject = |reason: IgnoreReason, value: Value, ignored: &mut Vec<IgnoredOverride>| {
        ignored.push(IgnoredOverride {
            source: source.to_string(),
            key: entry.key.clone(),
            reason,
            value,
        });
    };

    let Some(page) = table.pages.get_mut(&entry.page) else {
        reject(IgnoreReason::UnknownPage, entry.value, ignored);
        return;
    };
    let Some(spec) = page.boxes.get_mut(&entry.box_key) else {
        reject(IgnoreReason::UnknownBox, entry.value, ignored);
        return;
    };
    let Some(prop) = BoxProp::parse(&entry.prop) else {
        reject(IgnoreReason::BadProperty, entry.value, ignored);
        return;
    };

    let canonical = match prop {
        BoxProp::Align => match parse_align(&entry.value) {
            Some(align) => {
                spec.align = align;
                Value::from(align_token(align))
            }
            None => {
                reject(IgnoreReason::BadAlign, entry.value, ignored);
                return;
            }
        },
        _ => match coerce_number(&entry.value) {
            Some(n) => apply_numeric(spec, prop, n),
            None => {
                reject(IgnoreReason::NotANumber, entry.value, ignored);
                return;
            }
        },
    };

    applied.push(AppliedOverride {
        source: source.to_string(),
        page: entry.page,
        box_key: entry.box_key,
        prop: entry.prop,
        value: canonical,
    });
}

/// Assigns a validated number, returning the value as it landed (clamps and
/// flooring included).
fn apply_numeric(spec: &mut BoxSpec, prop: BoxProp, n: f64) -> Value {
    match prop {
        BoxProp::X => {
            spec.x = n;
            Value::from(n)
        }
        BoxProp::Y => {
            spec.y = n;
            Value::from(n)
        }
        BoxProp::W => {
            spec.w = n.max(0.0);
            Value::from(spec.w)
        }
        BoxProp::H => {
            spec.h = n.max(0.0);
            Value::from(spec.h)
        }
        BoxProp::Size => {
            spec.size = n;
            Value::from(n)
        }
        BoxProp::MaxLines => {
            let lines = n.floor().max(0.0) as u32;
            spec.max_lines = Some(lines);
            Value::from(lines)
        }
        BoxProp::Align => unreachable!("align is handled before numeric coercion"),
    }
}

/// Accepts JSON numbers and numeric strings; anything non-finite fails.
fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Alignment tokens, with the one tolerated synonym. This is the only place
/// "centre" is recognised.
fn parse_align(value: &Value) -> Option<Align> {
    match value.as_str()?.trim().to_ascii_lowercase().as_str() {
        "left" => Some(Align::Left),
        "center" | "centre" => Some(Align::Center),
        "right" => Some(Align::Right),
        _ => None,
    }
}

fn align_token(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
    }
}
