//! # Patch Applier
//!
//! `apply_patch` works on a structural clone of the document, op by op in
//! list order, and only hands the clone back if every op succeeded and the
//! result still has unique ids. A failing op therefore never leaves a
//! half-applied document visible to anyone.
//!
//! Blocks are located by depth-first search over the owning sequences,
//! descending through every column of every `columns` block. Nodes hold no
//! parent links; a location is just `(owning sequence, index)`.

use crate::errors::PatchError;
use blockpatch_model::{merge_styles, Document, Node, Patch, PatchOp, RichItem, TextStyle};
use std::fmt;

/// The sequence that owns a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Root,
    Column(String),
}

/// Position of a block inside its owning sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub container: Container,
    pub index: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.container {
            Container::Root => write!(f, "nodes[{}]", self.index),
            Container::Column(id) => write!(f, "column `{}` nodes[{}]", id, self.index),
        }
    }
}

/// Locate the block with `id` anywhere in the tree
pub fn find_location(nodes: &[Node], id: &str) -> Option<Location> {
    find_in(nodes, id, Container::Root)
}

fn find_in(nodes: &[Node], id: &str, container: Container) -> Option<Location> {
    if let Some(index) = nodes.iter().position(|node| node.id() == id) {
        return Some(Location { container, index });
    }

    nodes.iter().find_map(|node| {
        node.columns()
            .iter()
            .find_map(|column| find_in(&column.nodes, id, Container::Column(column.id.clone())))
    })
}

/// Mutable counterpart of [`find_location`]: the owning sequence and index
fn locate_mut<'a>(nodes: &'a mut Vec<Node>, id: &str) -> Option<(&'a mut Vec<Node>, usize)> {
    if let Some(index) = nodes.iter().position(|node| node.id() == id) {
        return Some((nodes, index));
    }

    for node in nodes.iter_mut() {
        if let Some(columns) = node.columns_mut() {
            for column in columns.iter_mut() {
                if let Some(found) = locate_mut(&mut column.nodes, id) {
                    return Some(found);
                }
            }
        }
    }

    None
}

/// Apply every op of `patch` to a copy of `document`
pub fn apply_patch(document: &Document, patch: &Patch) -> Result<Document, PatchError> {
    let mut next = document.clone();

    for op in &patch.ops {
        apply_op(&mut next.nodes, op)?;
        tracing::debug!(
            document_id = %document.id,
            op = op.name(),
            target = op.target_id(),
            "applied op"
        );
    }

    if let Some(id) = next.duplicate_id() {
        return Err(PatchError::DuplicateId(id));
    }

    Ok(next)
}

fn apply_op(nodes: &mut Vec<Node>, op: &PatchOp) -> Result<(), PatchError> {
    let target = op.target_id();
    let (sequence, index) =
        locate_mut(nodes, target).ok_or_else(|| PatchError::NotFound(target.to_string()))?;

    match op {
        PatchOp::UpdateContent {
            content, text_style, ..
        } => update_content(&mut sequence[index], content, text_style.as_ref()),
        PatchOp::ReplaceBlock { block, .. } => {
            sequence[index] = block.clone();
            Ok(())
        }
        PatchOp::InsertAfter { block, .. } => {
            sequence.insert(index + 1, block.clone());
            Ok(())
        }
        PatchOp::DeleteBlock { .. } => {
            sequence.remove(index);
            Ok(())
        }
    }
}

fn update_content(node: &mut Node, content: &str, style: Option<&TextStyle>) -> Result<(), PatchError> {
    match node {
        Node::Heading { text, text_style, .. } | Node::Paragraph { text, text_style, .. } => {
            *text = content.to_string();
            *text_style = merge_styles(text_style.as_ref(), style);
        }
        Node::Image { caption, .. } => {
            *caption = Some(content.to_string());
        }
        Node::Rich { items, .. } => {
            let first_text = items.iter_mut().find_map(|item| match item {
                RichItem::Text { text, text_style } => Some((text, text_style)),
                _ => None,
            });

            match first_text {
                Some((text, text_style)) => {
                    *text = content.to_string();
                    *text_style = merge_styles(text_style.as_ref(), style);
                }
                None => items.push(RichItem::Text {
                    text: content.to_string(),
                    text_style: style.cloned(),
                }),
            }
        }
        other => {
            return Err(PatchError::Unsupported {
                id: other.id().to_string(),
                kind: other.kind(),
            })
        }
    }

    Ok(())
}
