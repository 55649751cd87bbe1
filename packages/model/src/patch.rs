//! # Patch Language
//!
//! The closed set of operations that can change a document tree. Operations
//! address blocks by id alone; there are no paths.
//!
//! ```json
//! {"ops": [
//!   {"op": "update_content", "id": "p1", "content": "Hi", "textStyle": {"textAlign": "center"}},
//!   {"op": "replace_block", "id": "h1", "block": {"type": "divider", "id": "h1"}},
//!   {"op": "insert_after", "afterId": "p1", "block": {"type": "paragraph", "id": "p2", "text": "More"}},
//!   {"op": "delete_block", "id": "img-3"}
//! ]}
//! ```

use crate::ast::{Node, TextStyle};
use serde::{Deserialize, Serialize};

pub const UPDATE_CONTENT: &str = "update_content";
pub const REPLACE_BLOCK: &str = "replace_block";
pub const INSERT_AFTER: &str = "insert_after";
pub const DELETE_BLOCK: &str = "delete_block";

/// Every valid value of the `op` tag
pub const OP_NAMES: [&str; 4] = [UPDATE_CONTENT, REPLACE_BLOCK, INSERT_AFTER, DELETE_BLOCK];

/// An ordered list of operations applied as one atomic edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub ops: Vec<PatchOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PatchOp {
    /// Replace the text payload of a heading/paragraph/image/rich block
    UpdateContent {
        id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_style: Option<TextStyle>,
    },

    /// Swap the whole block; the kind may change
    ReplaceBlock { id: String, block: Node },

    /// Insert into whichever sequence holds `after_id`, right after it
    InsertAfter { after_id: String, block: Node },

    DeleteBlock { id: String },
}

impl PatchOp {
    pub fn name(&self) -> &'static str {
        match self {
            PatchOp::UpdateContent { .. } => UPDATE_CONTENT,
            PatchOp::ReplaceBlock { .. } => REPLACE_BLOCK,
            PatchOp::InsertAfter { .. } => INSERT_AFTER,
            PatchOp::DeleteBlock { .. } => DELETE_BLOCK,
        }
    }

    /// The id this op addresses (`afterId` for inserts)
    pub fn target_id(&self) -> &str {
        match self {
            PatchOp::UpdateContent { id, .. }
            | PatchOp::ReplaceBlock { id, .. }
            | PatchOp::DeleteBlock { id } => id,
            PatchOp::InsertAfter { after_id, .. } => after_id,
        }
    }

    /// The block carried by replace/insert ops
    pub fn block(&self) -> Option<&Node> {
        match self {
            PatchOp::ReplaceBlock { block, .. } | PatchOp::InsertAfter { block, .. } => Some(block),
            _ => None,
        }
    }
}

impl Patch {
    pub fn new(ops: Vec<PatchOp>) -> Self {
        Self { ops }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn target_ids(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().map(PatchOp::target_id)
    }
}
