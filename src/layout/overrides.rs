//! Override-key decomposition.
//!
//! Flat override keys arrive shaped `<prefix>_<pageKey>_<boxKey>_<property>`,
//! e.g. `L_p3_domDesc_x`. Box keys may themselves contain underscores
//! (`workwith_colleagues_q`), so a key parses from both ends: prefix, then
//! page, then the property off the tail, and whatever remains in the middle
//! is the box key. Structured override tables (page → box → property) flatten
//! to the same tagged entries.
//!
//! All key-shape handling lives here, at the boundary. The resolver receives
//! tagged entries and never splits a string.

use serde_json::Value;

use crate::model::OverrideSource;

/// The box properties an override may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxProp {
    X,
    Y,
    W,
    H,
    Size,
    MaxLines,
    Align,
}

impl BoxProp {
    /// Parse a property token. Accepts both spellings of the line cap.
    pub fn parse(token: &str) -> Option<BoxProp> {
        match token {
            "x" => Some(BoxProp::X),
            "y" => Some(BoxProp::Y),
            "w" => Some(BoxProp::W),
            "h" => Some(BoxProp::H),
            "size" => Some(BoxProp::Size),
            "maxLines" | "max_lines" => Some(BoxProp::MaxLines),
            "align" => Some(BoxProp::Align),
            _ => None,
        }
    }
}

/// One decomposed override edit. `prop` stays a raw token here; the
/// resolver owns the allowed-property check.
#[derive(Debug, Clone)]
pub struct OverrideEntry {
    /// The key as it arrived, echoed in the logs.
    pub key: String,
    pub page: String,
    pub box_key: String,
    pub prop: String,
    pub value: Value,
}

/// Decomposition outcome for one key.
#[derive(Debug, Clone)]
pub enum Parsed {
    Entry(OverrideEntry),
    /// The key could not be split into page/box/property at all.
    BadShape { key: String, value: Value },
}

/// Flattens a source into tagged entries: flat pairs first, then the
/// structured table. Pairs not starting with the source's prefix are not
/// override keys and are passed over without a log entry.
pub fn decompose(source: &OverrideSource) -> Vec<Parsed> {
    let mut out = Vec::new();

    let prefix_tag = format!("{}_", source.prefix);
    for (key, value) in &source.pairs {
        if !key.starts_with(&prefix_tag) {
            continue;
        }
        out.push(decompose_flat_key(key, value.clone()));
    }

    for (page_key, page_value) in &source.table {
        let Some(boxes) = page_value.as_object() else {
            out.push(Parsed::BadShape {
                key: page_key.clone(),
                value: page_value.clone(),
            });
            continue;
        };
        for (box_key, box_value) in boxes {
            let Some(props) = box_value.as_object() else {
                out.push(Parsed::BadShape {
                    key: format!("{}.{}", page_key, box_key),
                    value: box_value.clone(),
                });
                continue;
            };
            for (prop, value) in props {
                out.push(Parsed::Entry(OverrideEntry {
                    key: format!("{}.{}.{}", page_key, box_key, prop),
                    page: page_key.clone(),
                    box_key: box_key.clone(),
                    prop: prop.clone(),
                    value: value.clone(),
                }));
            }
        }
    }

    out
}

fn decompose_flat_key(key: &str, value: Value) -> Parsed {
    let parts: Vec<&str> = key.split('_').collect();
    // prefix + page + at least one box segment + property.
    if parts.len() < 4 {
        return Parsed::BadShape {
            key: key.to_string(),
            value,
        };
    }

    let page = parts[1];

    // The property comes off the tail: one segment, or two when they spell
    // a two-word property ("max_lines").
    let tail_two = format!("{}_{}", parts[parts.len() - 2], parts[parts.len() - 1]);
    let (prop, box_end) = if BoxProp::parse(&tail_two).is_some() {
        (tail_two, parts.len() - 2)
    } else {
        (parts[parts.len() - 1].to_string(), parts.len() - 1)
    };

    let box_key = parts[2..box_end].join("_");
    if page.is_empty() || box_key.is_empty() || prop.is_empty() {
        return Parsed::BadShape {
            key: key.to_string(),
            value,
        };
    }

    Parsed::Entry(OverrideEntry {
        key: key.to_string(),
        page: page.to_string(),
        box_key,
        prop,
        value,
    })
}
