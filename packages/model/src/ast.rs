use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

pub const MIN_HEADING_LEVEL: u8 = 1;
pub const MAX_HEADING_LEVEL: u8 = 3;
pub const MIN_WIDTH_PERCENT: u8 = 10;
pub const MAX_WIDTH_PERCENT: u8 = 100;
pub const MAX_CHART_HEIGHT: u32 = 1200;
pub const MAX_COLUMN_GAP: u32 = 80;
pub const MIN_FONT_SIZE: u16 = 8;
pub const MAX_FONT_SIZE: u16 = 120;

/// Root document: an ordered sequence of blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub nodes: Vec<Node>,
}

/// One typed block of content
///
/// `Columns` is the only recursive kind: each column owns a full nested
/// block sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Node {
    Heading {
        id: String,
        level: u8,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_style: Option<TextStyle>,
    },

    Paragraph {
        id: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_style: Option<TextStyle>,
    },

    Divider { id: String },

    Image {
        id: String,
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width_percent: Option<u8>,
    },

    Chart {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        option: Map<String, Value>,
    },

    /// Mixed text/image/chart group
    Rich { id: String, items: Vec<RichItem> },

    Columns {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gap: Option<u32>,
        columns: Vec<Column>,
    },
}

/// A column inside a `columns` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub nodes: Vec<Node>,
}

/// Item of a `rich` block (items carry no id of their own)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RichItem {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_style: Option<TextStyle>,
    },

    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width_percent: Option<u8>,
    },

    Chart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        option: Map<String, Value>,
    },
}

/// Optional presentation attributes for text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

/// Discriminant of [`Node`], used in messages and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Heading,
    Paragraph,
    Divider,
    Image,
    Chart,
    Rich,
    Columns,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Heading,
        NodeKind::Paragraph,
        NodeKind::Divider,
        NodeKind::Image,
        NodeKind::Chart,
        NodeKind::Rich,
        NodeKind::Columns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Heading => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Divider => "divider",
            NodeKind::Image => "image",
            NodeKind::Chart => "chart",
            NodeKind::Rich => "rich",
            NodeKind::Columns => "columns",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        NodeKind::ALL.into_iter().find(|kind| kind.as_str() == token)
    }

    /// Whether `update_content` is defined for this kind
    pub fn supports_content_update(&self) -> bool {
        matches!(
            self,
            NodeKind::Heading | NodeKind::Paragraph | NodeKind::Image | NodeKind::Rich
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TextAlign {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

impl TextStyle {
    pub fn is_empty(&self) -> bool {
        self.font_size.is_none()
            && self.font_weight.is_none()
            && self.text_align.is_none()
            && self.color.is_none()
    }

    /// Overlay `other` onto `self`; values present in `other` win
    pub fn merged(&self, other: &TextStyle) -> TextStyle {
        TextStyle {
            font_size: other.font_size.or(self.font_size),
            font_weight: other.font_weight.or(self.font_weight),
            text_align: other.text_align.or(self.text_align),
            color: other.color.clone().or_else(|| self.color.clone()),
        }
    }

    pub fn check(&self, path: &str) -> ModelResult<()> {
        if let Some(size) = self.font_size {
            if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
                return Err(ModelError::constraint(
                    format!("{}.fontSize", path),
                    format!("must be between {} and {}, got {}", MIN_FONT_SIZE, MAX_FONT_SIZE, size),
                ));
            }
        }
        if let Some(weight) = self.font_weight {
            if !(100..=900).contains(&weight) || weight % 100 != 0 {
                return Err(ModelError::constraint(
                    format!("{}.fontWeight", path),
                    format!("must be a multiple of 100 between 100 and 900, got {}", weight),
                ));
            }
        }
        Ok(())
    }
}

/// Merge an optional overlay onto an optional base style
pub fn merge_styles(base: Option<&TextStyle>, overlay: Option<&TextStyle>) -> Option<TextStyle> {
    match (base, overlay) {
        (_, None) => base.cloned(),
        (None, Some(overlay)) => Some(overlay.clone()),
        (Some(base), Some(overlay)) => Some(base.merged(overlay)),
    }
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Heading { id, .. }
            | Node::Paragraph { id, .. }
            | Node::Divider { id }
            | Node::Image { id, .. }
            | Node::Chart { id, .. }
            | Node::Rich { id, .. }
            | Node::Columns { id, .. } => id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Heading { .. } => NodeKind::Heading,
            Node::Paragraph { .. } => NodeKind::Paragraph,
            Node::Divider { .. } => NodeKind::Divider,
            Node::Image { .. } => NodeKind::Image,
            Node::Chart { .. } => NodeKind::Chart,
            Node::Rich { .. } => NodeKind::Rich,
            Node::Columns { .. } => NodeKind::Columns,
        }
    }

    /// Nested columns, empty for every kind but `columns`
    pub fn columns(&self) -> &[Column] {
        match self {
            Node::Columns { columns, .. } => columns,
            _ => &[],
        }
    }

    /// Nodes nested one level down, across every column
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.columns().iter().flat_map(|column| column.nodes.iter())
    }

    pub fn columns_mut(&mut self) -> Option<&mut Vec<Column>> {
        match self {
            Node::Columns { columns, .. } => Some(columns),
            _ => None,
        }
    }

    pub fn heading(id: impl Into<String>, level: u8, text: impl Into<String>) -> Self {
        Node::Heading {
            id: id.into(),
            level,
            text: text.into(),
            text_style: None,
        }
    }

    pub fn paragraph(id: impl Into<String>, text: impl Into<String>) -> Self {
        Node::Paragraph {
            id: id.into(),
            text: text.into(),
            text_style: None,
        }
    }

    pub fn divider(id: impl Into<String>) -> Self {
        Node::Divider { id: id.into() }
    }

    pub fn columns_of(id: impl Into<String>, columns: Vec<Column>) -> Self {
        Node::Columns {
            id: id.into(),
            gap: None,
            columns,
        }
    }

    /// Check the numeric/enum constraints of this node and everything nested in it
    pub fn check(&self, path: &str) -> ModelResult<()> {
        if self.id().trim().is_empty() {
            return Err(ModelError::constraint(format!("{}.id", path), "must not be empty"));
        }

        match self {
            Node::Heading { level, text_style, .. } => {
                if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(level) {
                    return Err(ModelError::constraint(
                        format!("{}.level", path),
                        format!("must be 1, 2 or 3, got {}", level),
                    ));
                }
                check_style(text_style.as_ref(), path)
            }
            Node::Paragraph { text_style, .. } => check_style(text_style.as_ref(), path),
            Node::Divider { .. } => Ok(()),
            Node::Image { width_percent, .. } => check_width(*width_percent, path),
            Node::Chart { height, .. } => check_height(*height, path),
            Node::Rich { items, .. } => {
                for (index, item) in items.iter().enumerate() {
                    item.check(&format!("{}.items[{}]", path, index))?;
                }
                Ok(())
            }
            Node::Columns { gap, columns, .. } => {
                if let Some(gap) = gap {
                    if *gap > MAX_COLUMN_GAP {
                        return Err(ModelError::constraint(
                            format!("{}.gap", path),
                            format!("must be at most {}, got {}", MAX_COLUMN_GAP, gap),
                        ));
                    }
                }
                for (index, column) in columns.iter().enumerate() {
                    column.check(&format!("{}.columns[{}]", path, index))?;
                }
                Ok(())
            }
        }
    }
}

impl Column {
    pub fn new(id: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            nodes,
        }
    }

    pub fn check(&self, path: &str) -> ModelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ModelError::constraint(format!("{}.id", path), "must not be empty"));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            node.check(&format!("{}.nodes[{}]", path, index))?;
        }
        Ok(())
    }
}

impl RichItem {
    pub fn check(&self, path: &str) -> ModelResult<()> {
        match self {
            RichItem::Text { text_style, .. } => check_style(text_style.as_ref(), path),
            RichItem::Image { width_percent, .. } => check_width(*width_percent, path),
            RichItem::Chart { height, .. } => check_height(*height, path),
        }
    }
}

fn check_style(style: Option<&TextStyle>, path: &str) -> ModelResult<()> {
    match style {
        Some(style) => style.check(&format!("{}.textStyle", path)),
        None => Ok(()),
    }
}

fn check_width(width_percent: Option<u8>, path: &str) -> ModelResult<()> {
    match width_percent {
        Some(width) if !(MIN_WIDTH_PERCENT..=MAX_WIDTH_PERCENT).contains(&width) => {
            Err(ModelError::constraint(
                format!("{}.widthPercent", path),
                format!(
                    "must be between {} and {}, got {}",
                    MIN_WIDTH_PERCENT, MAX_WIDTH_PERCENT, width
                ),
            ))
        }
        _ => Ok(()),
    }
}

fn check_height(height: Option<u32>, path: &str) -> ModelResult<()> {
    match height {
        Some(height) if height == 0 || height > MAX_CHART_HEIGHT => Err(ModelError::constraint(
            format!("{}.height", path),
            format!("must be between 1 and {}, got {}", MAX_CHART_HEIGHT, height),
        )),
        _ => Ok(()),
    }
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            nodes,
        }
    }

    /// Decode a persisted document and check every tree invariant
    pub fn from_json(source: &str) -> ModelResult<Self> {
        let doc: Document = serde_json::from_str(source)?;
        doc.check()?;
        Ok(doc)
    }

    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Range/enum constraints plus tree-wide id uniqueness
    pub fn check(&self) -> ModelResult<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            node.check(&format!("nodes[{}]", index))?;
        }
        match self.duplicate_id() {
            Some(id) => Err(ModelError::DuplicateId(id)),
            None => Ok(()),
        }
    }

    /// First node or column id that appears more than once in the tree
    pub fn duplicate_id(&self) -> Option<String> {
        let mut seen = HashSet::new();
        first_duplicate(&self.nodes, &mut seen).map(str::to_string)
    }

    /// Depth-first lookup of a node anywhere in the tree
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        find_in(&self.nodes, id)
    }

    /// True if `id` names a node or a column anywhere in the tree
    pub fn contains_id(&self, id: &str) -> bool {
        contains_in(&self.nodes, id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn first_duplicate<'a>(nodes: &'a [Node], seen: &mut HashSet<&'a str>) -> Option<&'a str> {
    for node in nodes {
        if !seen.insert(node.id()) {
            return Some(node.id());
        }
        for column in node.columns() {
            if !seen.insert(column.id.as_str()) {
                return Some(column.id.as_str());
            }
            if let Some(dup) = first_duplicate(&column.nodes, seen) {
                return Some(dup);
            }
        }
    }
    None
}

fn find_in<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    for node in nodes {
        if node.id() == id {
            return Some(node);
        }
        for column in node.columns() {
            if let Some(found) = find_in(&column.nodes, id) {
                return Some(found);
            }
        }
    }
    None
}

fn contains_in(nodes: &[Node], id: &str) -> bool {
    nodes.iter().any(|node| {
        node.id() == id
            || node
                .columns()
                .iter()
                .any(|column| column.id == id || contains_in(&column.nodes, id))
    })
}
