use crate::probe::{as_uint, first_object};
use crate::repair::Repair;
use blockpatch_model::ast::TextAlign;
use serde_json::{Map, Value};

/// Where a node or op may carry its style
pub const STYLE_SOURCES: [&str; 3] = ["textStyle", "text_style", "style"];

/// Style sources for `update_content`, which may also nest it under `block`
pub const UPDATE_STYLE_SOURCES: [&str; 5] = ["textStyle", "text_style", "style", "block.textStyle", "block.style"];

/// Rebuild a canonical `textStyle` object from the first style-like source
///
/// Unknown keys and unreadable values are dropped and logged as repairs;
/// numeric values are carried as-is so range checks stay with the validator.
pub fn recover_style(
    map: &Map<String, Value>,
    sources: &[&str],
    op: usize,
    repairs: &mut Vec<Repair>,
) -> Option<Value> {
    let (raw, source) = first_object(map, sources)?;
    if source != "textStyle" {
        repairs.push(Repair::RelocatedStyle {
            op,
            source: source.to_string(),
        });
    }

    let mut style = Map::new();
    for (key, value) in raw {
        let canonical = canonical_style_key(key);
        let converted = canonical.and_then(|canonical| convert(canonical, value));

        match (canonical, converted) {
            (Some(canonical), Some(converted)) => {
                style.entry(canonical).or_insert(converted);
            }
            _ => repairs.push(Repair::DroppedStyleKey {
                op,
                key: key.clone(),
            }),
        }
    }

    if style.is_empty() {
        None
    } else {
        Some(Value::Object(style))
    }
}

fn canonical_style_key(key: &str) -> Option<&'static str> {
    let squashed: String = key
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();

    match squashed.as_str() {
        "fontsize" | "size" => Some("fontSize"),
        "fontweight" | "weight" => Some("fontWeight"),
        "textalign" | "align" | "alignment" => Some("textAlign"),
        "color" | "colour" | "textcolor" => Some("color"),
        _ => None,
    }
}

fn convert(key: &str, value: &Value) -> Option<Value> {
    match key {
        "fontSize" => as_uint(value).map(Value::from),
        "fontWeight" => match value.as_str().map(|s| s.trim().to_ascii_lowercase()) {
            Some(word) if word == "bold" => Some(Value::from(700)),
            Some(word) if word == "normal" => Some(Value::from(400)),
            _ => as_uint(value).map(Value::from),
        },
        "textAlign" => value
            .as_str()
            .and_then(TextAlign::parse)
            .map(|align| Value::from(align.as_str())),
        "color" => value.as_str().map(Value::from),
        _ => None,
    }
}
