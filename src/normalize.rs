//! # Payload Normalization
//!
//! Inbound report payloads accumulated years of field-name drift: the same
//! value can arrive as `fullName`, `FullName`, `identity.fullName`, or buried
//! under `ctrl.summary`. This module resolves every historical variant into
//! one canonical struct, then maps the canonical fields onto the template's
//! page/box keys in a fixed draw order.
//!
//! Normalization is content-shaping policy. The composition core only ever
//! sees a single string per box.

use serde_json::Value;

use crate::font::FontChoice;
use crate::model::{FieldBinding, FieldValue};

/// The canonical field set after alias resolution.
#[derive(Debug, Clone, Default)]
pub struct NormalizedFields {
    pub full_name: String,
    pub date_label: String,
    /// Band scores keyed by band name, from whichever payload shape carried
    /// a non-empty set.
    pub bands: serde_json::Map<String, Value>,
    pub dom_desc: String,
    pub exec_summary_para1: String,
    pub exec_summary_para2: String,
    pub exec_q: [String; 4],
    pub ctrl_overview_para1: String,
    pub ctrl_overview_para2: String,
    pub overview_q: [String; 2],
    pub ctrl_deepdive_para1: String,
    pub ctrl_deepdive_para2: String,
    pub deepdive_q: [String; 2],
    pub themes_para1: String,
    pub themes_para2: String,
    pub themes_q: [String; 2],
    pub work_with: WorkWith,
    pub workwith_colleagues_q: String,
    pub workwith_leaders_q: String,
    pub actions: [String; 3],
    pub chart_url: String,
}

/// The two page-6 column texts.
#[derive(Debug, Clone, Default)]
pub struct WorkWith {
    pub concealed: String,
    pub triggered: String,
}

/// Resolve a raw payload into the canonical field set.
pub fn normalize(payload: &Value) -> NormalizedFields {
    let full_name = first_text(
        payload,
        &[
            &["identity", "fullName"],
            &["fullName"],
            &["FullName"],
            &["ctrl", "summary", "identity", "fullName"],
        ],
    )
    .trim()
    .to_string();

    let date_label = first_text(
        payload,
        &[
            &["identity", "dateLabel"],
            &["dateLbl"],
            &["date"],
            &["Date"],
            &["ctrl", "summary", "dateLbl"],
        ],
    )
    .trim()
    .to_string();

    let bands = [
        at(payload, &["ctrl", "bands"]),
        at(payload, &["bands"]),
        at(payload, &["ctrl", "summary", "ctrl12"]),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_object)
    .find(|map| !map.is_empty())
    .cloned()
    .unwrap_or_default();

    let dom_desc = {
        let explicit = first_text(
            payload,
            &[&["text", "dom_desc"], &["domDesc"], &["dom_desc"]],
        )
        .trim()
        .to_string();
        if explicit.is_empty() {
            dominant_band(&bands).unwrap_or_default()
        } else {
            explicit
        }
    };

    let (exec_summary_para1, exec_summary_para2) =
        long_split(at(payload, &["text", "exec_summary"]));
    let (ctrl_overview_para1, ctrl_overview_para2) =
        long_split(at(payload, &["text", "ctrl_overview"]));
    let (ctrl_deepdive_para1, ctrl_deepdive_para2) =
        long_split(at(payload, &["text", "ctrl_deepdive"]));
    let (themes_para1, themes_para2) = long_split(at(payload, &["text", "themes"]));

    let exec_q = [
        bullet_q(at(payload, &["text", "exec_summary_q1"])),
        bullet_q(at(payload, &["text", "exec_summary_q2"])),
        bullet_q(at(payload, &["text", "exec_summary_q3"])),
        bullet_q(at(payload, &["text", "exec_summary_q4"])),
    ];
    let overview_q = [
        bullet_q(at(payload, &["text", "ctrl_overview_q1"])),
        bullet_q(at(payload, &["text", "ctrl_overview_q2"])),
    ];
    let deepdive_q = [
        bullet_q(at(payload, &["text", "ctrl_deepdive_q1"])),
        bullet_q(at(payload, &["text", "ctrl_deepdive_q2"])),
    ];
    let themes_q = [
        bullet_q(at(payload, &["text", "themes_q1"])),
        bullet_q(at(payload, &["text", "themes_q2"])),
    ];

    let work_with = WorkWith {
        concealed: long_text(at(payload, &["text", "adapt_with_colleagues"])),
        triggered: long_text(at(payload, &["text", "adapt_with_leaders"])),
    };
    let workwith_colleagues_q = bullet_q(at(payload, &["text", "adapt_with_colleagues_q1"]));
    let workwith_leaders_q = bullet_q(at(payload, &["text", "adapt_with_leaders_q2"]));

    let actions = [
        first_text(payload, &[&["Act1"], &["text", "actions1"]]),
        first_text(payload, &[&["Act2"], &["text", "actions2"]]),
        first_text(payload, &[&["Act3"], &["text", "actions3"]]),
    ];

    let chart_url = first_text(
        payload,
        &[
            &["spiderChartUrl"],
            &["spider_chart_url"],
            &["chartUrl"],
            &["text", "chartUrl"],
            &["chart", "spiderUrl"],
            &["chart", "url"],
            &["ctrl", "summary", "chart", "spiderUrl"],
        ],
    )
    .trim()
    .to_string();

    NormalizedFields {
        full_name,
        date_label,
        bands,
        dom_desc,
        exec_summary_para1,
        exec_summary_para2,
        exec_q,
        ctrl_overview_para1,
        ctrl_overview_para2,
        overview_q,
        ctrl_deepdive_para1,
        ctrl_deepdive_para2,
        deepdive_q,
        themes_para1,
        themes_para2,
        themes_q,
        work_with,
        workwith_colleagues_q,
        workwith_leaders_q,
        actions,
        chart_url,
    }
}

/// Map the canonical fields onto the template's page/box keys, in the fixed
/// draw order. The name binds bold; everything else draws regular. An empty
/// chart URL emits no image binding.
pub fn bindings(fields: &NormalizedFields) -> Vec<FieldBinding> {
    let mut out: Vec<FieldBinding> = Vec::new();

    push_text(&mut out, "p1", "fullName", &fields.full_name, FontChoice::Bold);
    push_text(&mut out, "p1", "dateLabel", &fields.date_label, FontChoice::Regular);

    if !fields.chart_url.is_empty() {
        out.push(FieldBinding {
            page: "p2Chart".to_string(),
            box_key: "spiderChart".to_string(),
            value: FieldValue::Image {
                src: fields.chart_url.clone(),
            },
            font: FontChoice::Regular,
        });
    }

    push_text(&mut out, "p3", "domDesc", &fields.dom_desc, FontChoice::Regular);
    push_text(&mut out, "p3", "execP1", &fields.exec_summary_para1, FontChoice::Regular);
    push_text(&mut out, "p3", "execP2", &fields.exec_summary_para2, FontChoice::Regular);
    push_text(&mut out, "p3", "execQ1", &fields.exec_q[0], FontChoice::Regular);
    push_text(&mut out, "p3", "execQ2", &fields.exec_q[1], FontChoice::Regular);
    push_text(&mut out, "p3", "execQ3", &fields.exec_q[2], FontChoice::Regular);
    push_text(&mut out, "p3", "execQ4", &fields.exec_q[3], FontChoice::Regular);

    push_text(&mut out, "p4", "ovP1", &fields.ctrl_overview_para1, FontChoice::Regular);
    push_text(&mut out, "p4", "ovP2", &fields.ctrl_overview_para2, FontChoice::Regular);
    push_text(&mut out, "p4", "ovQ1", &fields.overview_q[0], FontChoice::Regular);
    push_text(&mut out, "p4", "ovQ2", &fields.overview_q[1], FontChoice::Regular);

    push_text(&mut out, "p5", "ddP1", &fields.ctrl_deepdive_para1, FontChoice::Regular);
    push_text(&mut out, "p5", "ddP2", &fields.ctrl_deepdive_para2, FontChoice::Regular);
    push_text(&mut out, "p5", "ddQ1", &fields.deepdive_q[0], FontChoice::Regular);
    push_text(&mut out, "p5", "ddQ2", &fields.deepdive_q[1], FontChoice::Regular);

    push_text(&mut out, "p5Themes", "thP1", &fields.themes_para1, FontChoice::Regular);
    push_text(&mut out, "p5Themes", "thP2", &fields.themes_para2, FontChoice::Regular);
    push_text(&mut out, "p5Themes", "thQ1", &fields.themes_q[0], FontChoice::Regular);
    push_text(&mut out, "p5Themes", "thQ2", &fields.themes_q[1], FontChoice::Regular);

    push_text(&mut out, "p6WorkWith", "collabC", &fields.work_with.concealed, FontChoice::Regular);
    push_text(&mut out, "p6WorkWith", "collabT", &fields.work_with.triggered, FontChoice::Regular);
    push_text(&mut out, "p6Q", "workwith_colleagues_q", &fields.workwith_colleagues_q, FontChoice::Regular);
    push_text(&mut out, "p6Q", "workwith_leaders_q", &fields.workwith_leaders_q, FontChoice::Regular);

    push_text(&mut out, "p7Actions", "act1", &fields.actions[0], FontChoice::Regular);
    push_text(&mut out, "p7Actions", "act2", &fields.actions[1], FontChoice::Regular);
    push_text(&mut out, "p7Actions", "act3", &fields.actions[2], FontChoice::Regular);

    out
}

fn push_text(out: &mut Vec<FieldBinding>, page: &str, box_key: &str, value: &str, font: FontChoice) {
    if value.trim().is_empty() {
        return;
    }
    out.push(FieldBinding {
        page: page.to_string(),
        box_key: box_key.to_string(),
        value: FieldValue::Text {
            value: value.to_string(),
        },
        font,
    });
}

/// Split long-form text into two paragraphs: on the first blank line when
/// present, else at the sentence boundary nearest the midpoint, else
/// everything stays in the first paragraph.
pub fn split_two_paras(text: &str) -> (String, String) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return (String::new(), String::new());
    }

    if let Some(pos) = find_blank_line(trimmed) {
        let (a, b) = trimmed.split_at(pos);
        return (a.trim_end().to_string(), b.trim_start().to_string());
    }

    let midpoint = trimmed.len() / 2;
    let bytes = trimmed.as_bytes();
    let mut best: Option<usize> = None;
    for (i, window) in bytes.windows(2).enumerate() {
        if matches!(window[0], b'.' | b'!' | b'?') && window[1] == b' ' {
            let cut = i + 1;
            let closer = match best {
                Some(prev) => cut.abs_diff(midpoint) < prev.abs_diff(midpoint),
                None => true,
            };
            if closer {
                best = Some(cut);
            }
        }
    }

    match best {
        Some(cut) => {
            let (a, b) = trimmed.split_at(cut);
            (a.trim_end().to_string(), b.trim_start().to_string())
        }
        None => (trimmed.to_string(), String::new()),
    }
}

/// Byte offset of the first newline that starts a blank line (a newline
/// followed, after spaces or tabs, by another newline).
fn find_blank_line(text: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find('\n') {
        let nl = search_from + rel;
        let rest = &text[nl + 1..];
        let gap = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        if rest[gap..].starts_with('\n') {
            return Some(nl);
        }
        search_from = nl + 1;
    }
    None
}

/// Prefix reflection-question text with a bullet; empty stays empty.
pub fn bullet_q(value: Option<&Value>) -> String {
    let text = s(value).trim().to_string();
    if text.is_empty() {
        text
    } else {
        format!("• {}", text)
    }
}

/// First alias path that yields non-empty text. Structured blocks flatten
/// before the emptiness check.
fn first_text(root: &Value, paths: &[&[&str]]) -> String {
    for path in paths {
        if let Some(value) = at(root, path) {
            let text = long_text(Some(value));
            if !text.trim().is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// A long-form value: plain text, or a structured block carrying a lead
/// paragraph and ordered reflection questions.
fn long_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(map)) => {
            let lead = s(map.get("lead")).trim().to_string();
            flatten_block(&lead, &block_questions(map))
        }
        other => s(other),
    }
}

/// Two-paragraph form of a long-form value. Structured blocks split at
/// their natural seam (the lead paragraph, then the questions section);
/// plain text goes through `split_two_paras`.
fn long_split(value: Option<&Value>) -> (String, String) {
    match value {
        Some(Value::Object(map)) => {
            let lead = s(map.get("lead")).trim().to_string();
            let tail = flatten_block("", &block_questions(map));
            (lead, tail)
        }
        other => split_two_paras(&s(other)),
    }
}

fn block_questions(map: &serde_json::Map<String, Value>) -> Vec<String> {
    map.get("questions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|q| s(Some(q)).trim().to_string())
                .filter(|q| !q.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Flatten a structured block to one newline-delimited string: the lead
/// paragraph, a marker line, then one numbered line per question.
fn flatten_block(lead: &str, questions: &[String]) -> String {
    let mut out = String::from(lead);
    if !questions.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Reflection questions:");
        for (i, question) in questions.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{}. {}", i + 1, question));
        }
    }
    out
}

/// The highest-scored band name, used as the page 3 descriptor when the
/// payload doesn't carry one.
fn dominant_band(bands: &serde_json::Map<String, Value>) -> Option<String> {
    bands
        .iter()
        .filter_map(|(name, value)| value.as_f64().map(|score| (name, score)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(name, _)| name.clone())
}

/// Coerce a JSON scalar to text: strings pass through, numbers and booleans
/// print, everything else is empty.
fn s(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Walk a path of object keys.
fn at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_name_prefers_identity_object() {
        let payload = json!({
            "identity": { "fullName": "  Ada Lovelace  " },
            "fullName": "ignored",
        });
        assert_eq!(normalize(&payload).full_name, "Ada Lovelace");
    }

    #[test]
    fn test_full_name_falls_back_through_aliases() {
        let payload = json!({ "FullName": "Grace Hopper" });
        assert_eq!(normalize(&payload).full_name, "Grace Hopper");

        let deep = json!({
            "ctrl": { "summary": { "identity": { "fullName": "Deep Name" } } }
        });
        assert_eq!(normalize(&deep).full_name, "Deep Name");
    }

    #[test]
    fn test_date_label_aliases() {
        assert_eq!(
            normalize(&json!({ "dateLbl": "March 2024" })).date_label,
            "March 2024"
        );
        assert_eq!(normalize(&json!({ "Date": "1 Jan" })).date_label, "1 Jan");
    }

    #[test]
    fn test_bands_skip_empty_objects() {
        let payload = json!({
            "ctrl": { "bands": {} },
            "bands": { "Openness": 7 },
        });
        let fields = normalize(&payload);
        assert_eq!(fields.bands.get("Openness"), Some(&json!(7)));
    }

    #[test]
    fn test_dom_desc_falls_back_to_dominant_band() {
        let payload = json!({
            "bands": { "Openness": 5, "Resilience": 9, "Drive": 3 }
        });
        assert_eq!(normalize(&payload).dom_desc, "Resilience");

        let explicit = json!({
            "bands": { "Resilience": 9 },
            "text": { "dom_desc": "Steady under pressure" }
        });
        assert_eq!(normalize(&explicit).dom_desc, "Steady under pressure");
    }

    #[test]
    fn test_split_on_blank_line() {
        let (a, b) = split_two_paras("First paragraph.\n\nSecond paragraph.");
        assert_eq!(a, "First paragraph.");
        assert_eq!(b, "Second paragraph.");
    }

    #[test]
    fn test_split_blank_line_with_interior_spaces() {
        let (a, b) = split_two_paras("One.\n   \nTwo.");
        assert_eq!(a, "One.");
        assert_eq!(b, "Two.");
    }

    #[test]
    fn test_split_at_sentence_nearest_midpoint() {
        // Two candidate boundaries; the one closer to the midpoint wins.
        let text = "Aa. Bb cc dd ee ff gg. Hh.";
        let (a, b) = split_two_paras(text);
        assert_eq!(a, "Aa. Bb cc dd ee ff gg.");
        assert_eq!(b, "Hh.");
    }

    #[test]
    fn test_split_single_sentence_keeps_para2_empty() {
        let (a, b) = split_two_paras("Just one sentence without a break");
        assert_eq!(a, "Just one sentence without a break");
        assert_eq!(b, "");
    }

    #[test]
    fn test_bullet_q() {
        assert_eq!(bullet_q(Some(&json!("What next?"))), "• What next?");
        assert_eq!(bullet_q(Some(&json!("   "))), "");
        assert_eq!(bullet_q(None), "");
    }

    #[test]
    fn test_structured_block_flattens() {
        let payload = json!({
            "text": {
                "exec_summary": {
                    "lead": "You lead with curiosity.",
                    "questions": ["Where does it help?", "Where does it hurt?"]
                }
            }
        });
        let fields = normalize(&payload);
        assert_eq!(fields.exec_summary_para1, "You lead with curiosity.");
        assert_eq!(
            fields.exec_summary_para2,
            "Reflection questions:\n1. Where does it help?\n2. Where does it hurt?"
        );
    }

    #[test]
    fn test_actions_prefer_top_level_alias() {
        let payload = json!({
            "Act1": "Do the thing",
            "text": { "actions1": "ignored", "actions2": "Second action" }
        });
        let fields = normalize(&payload);
        assert_eq!(fields.actions[0], "Do the thing");
        assert_eq!(fields.actions[1], "Second action");
        assert_eq!(fields.actions[2], "");
    }

    #[test]
    fn test_chart_url_deep_chain() {
        let payload = json!({
            "ctrl": { "summary": { "chart": { "spiderUrl": " https://x/c.png " } } }
        });
        assert_eq!(normalize(&payload).chart_url, "https://x/c.png");
    }

    #[test]
    fn test_work_with_and_page6_questions() {
        let payload = json!({
            "text": {
                "adapt_with_colleagues": "With colleagues, slow down.",
                "adapt_with_leaders": "With leaders, speak up.",
                "adapt_with_colleagues_q1": "Who needs to hear this?",
                "adapt_with_leaders_q2": "When did you last try?"
            }
        });
        let fields = normalize(&payload);
        assert_eq!(fields.work_with.concealed, "With colleagues, slow down.");
        assert_eq!(fields.work_with.triggered, "With leaders, speak up.");
        assert_eq!(fields.workwith_colleagues_q, "• Who needs to hear this?");
        assert_eq!(fields.workwith_leaders_q, "• When did you last try?");
    }

    #[test]
    fn test_bindings_draw_order_and_fonts() {
        let payload = json!({
            "fullName": "Ada",
            "dateLbl": "May",
            "spiderChartUrl": "data:image/png;base64,AAAA",
            "text": { "exec_summary": "One. Two." }
        });
        let fields = normalize(&payload);
        let list = bindings(&fields);

        assert_eq!(list[0].page, "p1");
        assert_eq!(list[0].box_key, "fullName");
        assert_eq!(list[0].font, FontChoice::Bold);
        assert_eq!(list[1].box_key, "dateLabel");
        assert_eq!(list[1].font, FontChoice::Regular);
        assert!(matches!(list[2].value, FieldValue::Image { .. }));
        assert_eq!(list[2].page, "p2Chart");

        // Later pages keep their relative order.
        let pages: Vec<&str> = list.iter().map(|b| b.page.as_str()).collect();
        let p3_pos = pages.iter().position(|p| *p == "p3");
        assert!(p3_pos.is_some());
    }

    #[test]
    fn test_bindings_skip_empty_fields() {
        let fields = normalize(&json!({}));
        assert!(bindings(&fields).is_empty());
    }

    #[test]
    fn test_empty_chart_url_emits_no_image() {
        let payload = json!({ "fullName": "Ada" });
        let list = bindings(&normalize(&payload));
        assert!(list
            .iter()
            .all(|b| !matches!(b.value, FieldValue::Image { .. })));
    }
}
