//! Block reconstruction
//!
//! Rebuilds a canonical node object from a nested block or from fields
//! flattened onto the op itself. Only values already present are moved;
//! the exceptions are identities for new blocks and the default heading
//! level.

use crate::ops::OpRepair;
use crate::probe::{first_array, first_non_empty, first_object, first_string, first_uint, lookup};
use crate::repair::Repair;
use crate::style::{recover_style, STYLE_SOURCES};
use crate::op_name::canonical_token;
use blockpatch_model::ast::NodeKind;
use serde_json::{Map, Value};

pub const DEFAULT_HEADING_LEVEL: u64 = 2;

pub(crate) const NODE_KIND_KEYS: [&str; 6] = ["type", "blockType", "block_type", "kind", "nodeType", "node_type"];
pub(crate) const NODE_ID_KEYS: [&str; 5] = ["id", "blockId", "block_id", "nodeId", "node_id"];

const TEXT_KEYS: [&str; 3] = ["text", "content", "value"];
const LEVEL_KEYS: [&str; 3] = ["level", "headingLevel", "heading_level"];
const SRC_KEYS: [&str; 4] = ["src", "url", "imageUrl", "image_url"];
const ALT_KEYS: [&str; 3] = ["alt", "altText", "alt_text"];
const WIDTH_KEYS: [&str; 3] = ["widthPercent", "width_percent", "width"];
const OPTION_KEYS: [&str; 5] = ["option", "options", "config", "chartOption", "chart_option"];
const ITEM_KEYS: [&str; 3] = ["items", "children", "content"];
const COLUMN_KEYS: [&str; 2] = ["columns", "cols"];
const COLUMN_ID_KEYS: [&str; 3] = ["id", "columnId", "column_id"];
const COLUMN_NODE_KEYS: [&str; 3] = ["nodes", "blocks", "children"];

/// How a reconstructed block gets an id when none is present
#[derive(Debug, Clone)]
pub(crate) enum IdPolicy {
    /// Replacement keeps the identity of the block it replaces
    Inherit(String),
    /// The op carried the new block's id outside the block itself
    Lifted { id: String, source: String },
    Generate,
}

/// Kind plus the heading level implied by tokens like `h2`
pub fn parse_kind(token: &str) -> Option<(NodeKind, Option<u64>)> {
    let token = canonical_token(token);
    let parsed = match token.as_str() {
        "heading" | "header" | "title" => (NodeKind::Heading, None),
        "h1" | "heading1" | "heading_1" => (NodeKind::Heading, Some(1)),
        "h2" | "heading2" | "heading_2" => (NodeKind::Heading, Some(2)),
        "h3" | "heading3" | "heading_3" => (NodeKind::Heading, Some(3)),
        "paragraph" | "p" | "para" | "text" => (NodeKind::Paragraph, None),
        "divider" | "hr" | "separator" | "rule" => (NodeKind::Divider, None),
        "image" | "img" | "picture" => (NodeKind::Image, None),
        "chart" | "graph" | "echart" | "echarts" => (NodeKind::Chart, None),
        "rich" | "rich_text" | "mixed" => (NodeKind::Rich, None),
        "columns" | "column" | "multi_column" => (NodeKind::Columns, None),
        _ => return None,
    };
    Some(parsed)
}

fn first_level(map: &Map<String, Value>) -> Option<u64> {
    if let Some(level) = first_uint(map, &LEVEL_KEYS) {
        return Some(level);
    }
    LEVEL_KEYS
        .iter()
        .filter_map(|key| lookup(map, key).and_then(Value::as_str))
        .find_map(|token| parse_kind(token).and_then(|(_, level)| level))
}

fn non_empty_option(map: &Map<String, Value>) -> Option<&Map<String, Value>> {
    first_object(map, &OPTION_KEYS)
        .map(|(option, _)| option)
        .filter(|option| !option.is_empty())
}

impl OpRepair<'_> {
    /// Assemble a canonical node, or `None` when the kind or a required field is missing
    pub(crate) fn build_node(
        &mut self,
        map: &Map<String, Value>,
        kind_keys: &[&str],
        id_keys: &[&str],
        policy: IdPolicy,
    ) -> Option<(Value, NodeKind)> {
        let (token, _) = first_non_empty(map, kind_keys)?;
        let (kind, level_hint) = parse_kind(&token)?;

        let mut out = Map::new();
        out.insert("type".into(), Value::from(kind.as_str()));

        match kind {
            NodeKind::Heading => {
                let (text, _) = first_string(map, &TEXT_KEYS)?;
                let level = first_level(map).or(level_hint).unwrap_or(DEFAULT_HEADING_LEVEL);
                out.insert("level".into(), Value::from(level));
                out.insert("text".into(), Value::from(text));
                self.put_style(&mut out, map);
            }
            NodeKind::Paragraph => {
                let (text, _) = first_string(map, &TEXT_KEYS)?;
                out.insert("text".into(), Value::from(text));
                self.put_style(&mut out, map);
            }
            NodeKind::Divider => {}
            NodeKind::Image => {
                let (src, _) = first_non_empty(map, &SRC_KEYS)?;
                out.insert("src".into(), Value::from(src));
                put_media_fields(&mut out, map);
            }
            NodeKind::Chart => {
                let option = non_empty_option(map)?;
                out.insert("option".into(), Value::Object(option.clone()));
                put_chart_fields(&mut out, map);
            }
            NodeKind::Rich => {
                let items = first_array(map, &ITEM_KEYS)?;
                let items = items.iter().map(|item| self.rich_item(item)).collect();
                out.insert("items".into(), Value::Array(items));
            }
            NodeKind::Columns => {
                let columns = first_array(map, &COLUMN_KEYS)?;
                if let Some(gap) = first_uint(map, &["gap"]) {
                    out.insert("gap".into(), Value::from(gap));
                }
                let mut rebuilt = Vec::with_capacity(columns.len());
                for column in columns {
                    rebuilt.push(self.column(column));
                }
                out.insert("columns".into(), Value::Array(rebuilt));
            }
        }

        let id = match first_non_empty(map, id_keys) {
            Some((id, _)) => id,
            None => self.assign_id(policy),
        };
        out.insert("id".into(), Value::from(id));

        Some((Value::Object(out), kind))
    }

    /// Nested blocks that cannot be rebuilt pass through for the validator to report
    fn nested_node(&mut self, value: &Value) -> Value {
        value
            .as_object()
            .and_then(|map| self.build_node(map, &NODE_KIND_KEYS, &NODE_ID_KEYS, IdPolicy::Generate))
            .map(|(node, _)| node)
            .unwrap_or_else(|| value.clone())
    }

    fn column(&mut self, value: &Value) -> Value {
        let Some(map) = value.as_object() else {
            return value.clone();
        };
        let Some(nodes) = first_array(map, &COLUMN_NODE_KEYS) else {
            return value.clone();
        };

        let mut rebuilt = Vec::with_capacity(nodes.len());
        for node in nodes {
            rebuilt.push(self.nested_node(node));
        }

        let id = match first_non_empty(map, &COLUMN_ID_KEYS) {
            Some((id, _)) => id,
            None => self.assign_id(IdPolicy::Generate),
        };

        let mut out = Map::new();
        out.insert("id".into(), Value::from(id));
        out.insert("nodes".into(), Value::Array(rebuilt));
        Value::Object(out)
    }

    fn rich_item(&mut self, value: &Value) -> Value {
        let Some(map) = value.as_object() else {
            return value.clone();
        };
        let Some((token, _)) = first_non_empty(map, &["type", "kind"]) else {
            return value.clone();
        };

        let mut out = Map::new();
        match canonical_token(&token).as_str() {
            "text" | "paragraph" | "p" => {
                let Some((text, _)) = first_string(map, &TEXT_KEYS) else {
                    return value.clone();
                };
                out.insert("type".into(), Value::from("text"));
                out.insert("text".into(), Value::from(text));
                self.put_style(&mut out, map);
            }
            "image" | "img" | "picture" => {
                let Some((src, _)) = first_non_empty(map, &SRC_KEYS) else {
                    return value.clone();
                };
                out.insert("type".into(), Value::from("image"));
                out.insert("src".into(), Value::from(src));
                put_media_fields(&mut out, map);
            }
            "chart" | "graph" => {
                let Some(option) = non_empty_option(map) else {
                    return value.clone();
                };
                out.insert("type".into(), Value::from("chart"));
                out.insert("option".into(), Value::Object(option.clone()));
                put_chart_fields(&mut out, map);
            }
            _ => return value.clone(),
        }
        Value::Object(out)
    }

    fn put_style(&mut self, out: &mut Map<String, Value>, map: &Map<String, Value>) {
        if let Some(style) = recover_style(map, &STYLE_SOURCES, self.index, self.repairs) {
            out.insert("textStyle".into(), style);
        }
    }

    pub(crate) fn assign_id(&mut self, policy: IdPolicy) -> String {
        match policy {
            IdPolicy::Inherit(id) => {
                self.repairs.push(Repair::InheritedId {
                    op: self.index,
                    id: id.clone(),
                });
                id
            }
            IdPolicy::Lifted { id, source } => {
                self.repairs.push(Repair::RecoveredId {
                    op: self.index,
                    field: "block.id".to_string(),
                    source,
                });
                id
            }
            IdPolicy::Generate => {
                let id = self.normalizer.fresh_id();
                self.repairs.push(Repair::SynthesizedId {
                    op: self.index,
                    id: id.clone(),
                });
                id
            }
        }
    }
}

fn put_media_fields(out: &mut Map<String, Value>, map: &Map<String, Value>) {
    if let Some((alt, _)) = first_string(map, &ALT_KEYS) {
        out.insert("alt".into(), Value::from(alt));
    }
    if let Some((caption, _)) = first_string(map, &["caption"]) {
        out.insert("caption".into(), Value::from(caption));
    }
    if let Some(width) = first_uint(map, &WIDTH_KEYS) {
        out.insert("widthPercent".into(), Value::from(width));
    }
}

fn put_chart_fields(out: &mut Map<String, Value>, map: &Map<String, Value>) {
    if let Some((title, _)) = first_string(map, &["title"]) {
        out.insert("title".into(), Value::from(title));
    }
    if let Some(height) = first_uint(map, &["height"]) {
        out.insert("height".into(), Value::from(height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_tokens() {
        assert_eq!(parse_kind("Heading"), Some((NodeKind::Heading, None)));
        assert_eq!(parse_kind("H3"), Some((NodeKind::Heading, Some(3))));
        assert_eq!(parse_kind("richText"), Some((NodeKind::Rich, None)));
        assert_eq!(parse_kind("hr"), Some((NodeKind::Divider, None)));
        assert_eq!(parse_kind("table"), None);
    }
}
