//! # Patch Validator
//!
//! Strict structural decoding of an untyped candidate into a [`Patch`].
//!
//! Validation only looks at shape: required fields, JSON types, the closed
//! set of `op` and `type` tags, and the numeric/enum ranges of the document
//! model. Whether the referenced ids exist is decided later, when the patch
//! is applied to a concrete document.
//!
//! Every failure names the offending path, e.g.
//! `ops[2].block.columns[0].nodes[1].widthPercent`.

use crate::ast::{Column, Node, NodeKind, RichItem, TextAlign, TextStyle};
use crate::error::StructuralError;
use crate::patch::{Patch, PatchOp, DELETE_BLOCK, INSERT_AFTER, OP_NAMES, REPLACE_BLOCK, UPDATE_CONTENT};
use serde_json::{Map, Value};

type Result<T> = std::result::Result<T, StructuralError>;

const STYLE_KEYS: [&str; 4] = ["fontSize", "fontWeight", "textAlign", "color"];

/// Validate a whole candidate patch (`{"ops": [...]}`)
pub fn validate_patch(candidate: &Value) -> Result<Patch> {
    let root = candidate.as_object().ok_or_else(|| {
        StructuralError::new(
            "$",
            format!("expected an object with an `ops` array, found {}", type_name(candidate)),
        )
    })?;

    let ops = match root.get("ops") {
        Some(Value::Array(ops)) => ops,
        Some(other) => {
            return Err(StructuralError::new(
                "ops",
                format!("expected an array, found {}", type_name(other)),
            ))
        }
        None => return Err(StructuralError::new("ops", "missing field")),
    };

    let ops = ops
        .iter()
        .enumerate()
        .map(|(index, op)| validate_op(op, &format!("ops[{}]", index)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Patch::new(ops))
}

/// Validate a single operation found at `path`
pub fn validate_op(value: &Value, path: &str) -> Result<PatchOp> {
    let fields = Fields::of(value, path)?;
    let name = fields.required_str("op")?;

    let op = match name.as_str() {
        UPDATE_CONTENT => PatchOp::UpdateContent {
            id: fields.required_id("id")?,
            content: fields.required_str("content")?,
            text_style: fields.optional_style("textStyle")?,
        },
        REPLACE_BLOCK => PatchOp::ReplaceBlock {
            id: fields.required_id("id")?,
            block: decode_node(fields.required("block")?, &fields.child("block"))?,
        },
        INSERT_AFTER => PatchOp::InsertAfter {
            after_id: fields.required_id("afterId")?,
            block: decode_node(fields.required("block")?, &fields.child("block"))?,
        },
        DELETE_BLOCK => PatchOp::DeleteBlock {
            id: fields.required_id("id")?,
        },
        other => {
            return Err(StructuralError::new(
                fields.child("op"),
                format!("unknown operation `{}` (expected one of {})", other, OP_NAMES.join(", ")),
            ))
        }
    };

    Ok(op)
}

/// Decode a block and check its constraints, including everything nested in it
pub fn decode_node(value: &Value, path: &str) -> Result<Node> {
    let node = decode_node_shape(value, path)?;
    node.check(path)?;
    Ok(node)
}

fn decode_node_shape(value: &Value, path: &str) -> Result<Node> {
    let fields = Fields::of(value, path)?;
    let token = fields.required_str("type")?;
    let kind = NodeKind::parse(&token).ok_or_else(|| {
        StructuralError::new(fields.child("type"), format!("unknown block type `{}`", token))
    })?;
    let id = fields.required_id("id")?;

    let node = match kind {
        NodeKind::Heading => Node::Heading {
            id,
            level: fields.required_uint("level")?,
            text: fields.required_str("text")?,
            text_style: fields.optional_style("textStyle")?,
        },
        NodeKind::Paragraph => Node::Paragraph {
            id,
            text: fields.required_str("text")?,
            text_style: fields.optional_style("textStyle")?,
        },
        NodeKind::Divider => Node::Divider { id },
        NodeKind::Image => Node::Image {
            id,
            src: fields.required_str("src")?,
            alt: fields.optional_str("alt")?,
            caption: fields.optional_str("caption")?,
            width_percent: fields.optional_uint("widthPercent")?,
        },
        NodeKind::Chart => Node::Chart {
            id,
            title: fields.optional_str("title")?,
            height: fields.optional_uint("height")?,
            option: fields.required_object("option")?.clone(),
        },
        NodeKind::Rich => {
            let items = fields.required_array("items")?;
            let items = items
                .iter()
                .enumerate()
                .map(|(index, item)| decode_rich_item(item, &format!("{}.items[{}]", path, index)))
                .collect::<Result<Vec<_>>>()?;
            Node::Rich { id, items }
        }
        NodeKind::Columns => {
            let columns = fields.required_array("columns")?;
            let columns = columns
                .iter()
                .enumerate()
                .map(|(index, column)| decode_column(column, &format!("{}.columns[{}]", path, index)))
                .collect::<Result<Vec<_>>>()?;
            Node::Columns {
                id,
                gap: fields.optional_uint("gap")?,
                columns,
            }
        }
    };

    Ok(node)
}

fn decode_column(value: &Value, path: &str) -> Result<Column> {
    let fields = Fields::of(value, path)?;
    let id = fields.required_id("id")?;
    let nodes = fields
        .required_array("nodes")?
        .iter()
        .enumerate()
        .map(|(index, node)| decode_node_shape(node, &format!("{}.nodes[{}]", path, index)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Column { id, nodes })
}

fn decode_rich_item(value: &Value, path: &str) -> Result<RichItem> {
    let fields = Fields::of(value, path)?;
    let token = fields.required_str("type")?;

    let item = match token.as_str() {
        "text" => RichItem::Text {
            text: fields.required_str("text")?,
            text_style: fields.optional_style("textStyle")?,
        },
        "image" => RichItem::Image {
            src: fields.required_str("src")?,
            alt: fields.optional_str("alt")?,
            caption: fields.optional_str("caption")?,
            width_percent: fields.optional_uint("widthPercent")?,
        },
        "chart" => RichItem::Chart {
            title: fields.optional_str("title")?,
            height: fields.optional_uint("height")?,
            option: fields.required_object("option")?.clone(),
        },
        other => {
            return Err(StructuralError::new(
                fields.child("type"),
                format!("unknown rich item type `{}` (expected text, image or chart)", other),
            ))
        }
    };

    Ok(item)
}

fn decode_style(value: &Value, path: &str) -> Result<TextStyle> {
    let fields = Fields::of(value, path)?;

    if let Some(key) = fields.map.keys().find(|key| !STYLE_KEYS.contains(&key.as_str())) {
        return Err(StructuralError::new(fields.child(key), "unknown text style key"));
    }

    let text_align = match fields.optional_str("textAlign")? {
        Some(token) => Some(strict_align(&token).ok_or_else(|| {
            StructuralError::new(
                fields.child("textAlign"),
                format!("expected left, center, right or justify, found `{}`", token),
            )
        })?),
        None => None,
    };

    Ok(TextStyle {
        font_size: fields.optional_uint("fontSize")?,
        font_weight: fields.optional_uint("fontWeight")?,
        text_align,
        color: fields.optional_str("color")?,
    })
}

fn strict_align(token: &str) -> Option<TextAlign> {
    // The validator only accepts the canonical spelling
    TextAlign::parse(token).filter(|align| align.as_str() == token)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Field accessor that knows the path of the object it reads from
struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: &'a str,
}

impl<'a> Fields<'a> {
    fn of(value: &'a Value, path: &'a str) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { map, path }),
            other => Err(StructuralError::new(
                path,
                format!("expected an object, found {}", type_name(other)),
            )),
        }
    }

    fn child(&self, key: &str) -> String {
        format!("{}.{}", self.path, key)
    }

    /// A null field counts as absent
    fn optional(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn required(&self, key: &str) -> Result<&'a Value> {
        self.optional(key)
            .ok_or_else(|| StructuralError::new(self.child(key), "missing field"))
    }

    fn expect_str(&self, key: &str, value: &Value) -> Result<String> {
        value.as_str().map(str::to_string).ok_or_else(|| {
            StructuralError::new(
                self.child(key),
                format!("expected a string, found {}", type_name(value)),
            )
        })
    }

    fn required_str(&self, key: &str) -> Result<String> {
        let value = self.required(key)?;
        self.expect_str(key, value)
    }

    fn optional_str(&self, key: &str) -> Result<Option<String>> {
        self.optional(key)
            .map(|value| self.expect_str(key, value))
            .transpose()
    }

    fn required_id(&self, key: &str) -> Result<String> {
        let id = self.required_str(key)?;
        if id.trim().is_empty() {
            return Err(StructuralError::new(self.child(key), "id must not be empty"));
        }
        Ok(id)
    }

    fn expect_uint<T: TryFrom<u64>>(&self, key: &str, value: &Value) -> Result<T> {
        let number = value
            .as_u64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                    .map(|n| n as u64)
            })
            .ok_or_else(|| {
                StructuralError::new(
                    self.child(key),
                    format!("expected a non-negative integer, found {}", value),
                )
            })?;

        T::try_from(number).map_err(|_| {
            StructuralError::new(self.child(key), format!("{} is out of range", number))
        })
    }

    fn required_uint<T: TryFrom<u64>>(&self, key: &str) -> Result<T> {
        let value = self.required(key)?;
        self.expect_uint(key, value)
    }

    fn optional_uint<T: TryFrom<u64>>(&self, key: &str) -> Result<Option<T>> {
        self.optional(key)
            .map(|value| self.expect_uint(key, value))
            .transpose()
    }

    fn required_object(&self, key: &str) -> Result<&'a Map<String, Value>> {
        let value = self.required(key)?;
        value.as_object().ok_or_else(|| {
            StructuralError::new(
                self.child(key),
                format!("expected an object, found {}", type_name(value)),
            )
        })
    }

    fn required_array(&self, key: &str) -> Result<&'a Vec<Value>> {
        let value = self.required(key)?;
        value.as_array().ok_or_else(|| {
            StructuralError::new(
                self.child(key),
                format!("expected an array, found {}", type_name(value)),
            )
        })
    }

    fn optional_style(&self, key: &str) -> Result<Option<TextStyle>> {
        match self.optional(key) {
            Some(value) => decode_style(value, &self.child(key)).map(Some),
            None => Ok(None),
        }
    }
}
