use crate::node::{IdPolicy, NODE_ID_KEYS, NODE_KIND_KEYS};
use crate::op_name::canonical_op;
use crate::probe::{first_non_empty, first_object, first_string};
use crate::repair::Repair;
use crate::style::{recover_style, UPDATE_STYLE_SOURCES};
use crate::Normalizer;
use blockpatch_model::patch::{DELETE_BLOCK, INSERT_AFTER, REPLACE_BLOCK, UPDATE_CONTENT};
use serde_json::{Map, Value};

/// Fields that may name the operation, in probe order
pub(crate) const OP_KEYS: [&str; 6] = ["op", "operation", "action", "opType", "op_type", "type"];

const TARGET_ID_KEYS: [&str; 11] = [
    "id",
    "blockId",
    "block_id",
    "targetId",
    "target_id",
    "nodeId",
    "node_id",
    "target",
    "target.id",
    "target.blockId",
    "block.id",
];

const AFTER_ID_KEYS: [&str; 15] = [
    "afterId",
    "after_id",
    "afterBlockId",
    "after_block_id",
    "after",
    "anchorId",
    "anchor_id",
    "target.afterId",
    "target.id",
    "targetId",
    "target_id",
    "target",
    "blockId",
    "block_id",
    "id",
];

const CONTENT_KEYS: [&str; 10] = [
    "content",
    "text",
    "value",
    "newContent",
    "new_content",
    "newText",
    "new_text",
    "content.text",
    "block.text",
    "block.content",
];

const NESTED_BLOCK_KEYS: [&str; 6] = ["block", "newBlock", "new_block", "node", "newNode", "new_node"];
const INLINE_KIND_KEYS: [&str; 6] = ["blockType", "block_type", "nodeType", "node_type", "kind", "type"];
const REPLACE_INLINE_ID_KEYS: [&str; 2] = ["newId", "new_id"];
const INSERT_INLINE_ID_KEYS: [&str; 7] = ["newId", "new_id", "newBlockId", "new_block_id", "id", "blockId", "block_id"];

/// Content of an op that was downgraded because its block could not be rebuilt
pub const DOWNGRADE_MESSAGE: &str =
    "The generated edit could not be turned into a valid block, so the layout was left unchanged.";

/// Per-op repair context: the shared id source plus this op's position
pub(crate) struct OpRepair<'n> {
    pub normalizer: &'n mut Normalizer,
    pub repairs: &'n mut Vec<Repair>,
    pub index: usize,
}

impl OpRepair<'_> {
    /// Reshape one raw op; anything without a recognizable op name is returned unchanged
    pub(crate) fn normalize_op(&mut self, value: &Value) -> Value {
        let Some(map) = value.as_object() else {
            return value.clone();
        };
        let Some((raw, op_key)) = first_non_empty(map, &OP_KEYS) else {
            return value.clone();
        };
        let Some(op) = canonical_op(&raw) else {
            return value.clone();
        };

        if raw != op || op_key != "op" {
            self.repairs.push(Repair::RenamedOp {
                op: self.index,
                from: raw,
                to: op.to_string(),
            });
        }

        match op {
            UPDATE_CONTENT => self.update_content(map),
            REPLACE_BLOCK => self.replace_block(map, op_key),
            INSERT_AFTER => self.insert_after(map, op_key),
            _ => self.delete_block(map),
        }
    }

    fn update_content(&mut self, map: &Map<String, Value>) -> Value {
        let mut out = op_object(UPDATE_CONTENT);
        if let Some(id) = self.recover_id(map, &TARGET_ID_KEYS, "id") {
            out.insert("id".into(), Value::from(id));
        }

        if let Some((content, source)) = first_string(map, &CONTENT_KEYS) {
            if source != "content" {
                self.repairs.push(Repair::RecoveredContent {
                    op: self.index,
                    source: source.to_string(),
                });
            }
            out.insert("content".into(), Value::from(content));
        }

        if let Some(style) = recover_style(map, &UPDATE_STYLE_SOURCES, self.index, self.repairs) {
            out.insert("textStyle".into(), style);
        }

        Value::Object(out)
    }

    fn replace_block(&mut self, map: &Map<String, Value>, op_key: &str) -> Value {
        let id = self.recover_id(map, &TARGET_ID_KEYS, "id");
        let policy = match &id {
            Some(id) => IdPolicy::Inherit(id.clone()),
            None => IdPolicy::Generate,
        };

        match self.recover_block(map, op_key, &REPLACE_INLINE_ID_KEYS, policy) {
            Some(block) => {
                let mut out = op_object(REPLACE_BLOCK);
                if let Some(id) = id {
                    out.insert("id".into(), Value::from(id));
                }
                out.insert("block".into(), block);
                Value::Object(out)
            }
            None => self.downgrade(REPLACE_BLOCK, id),
        }
    }

    fn insert_after(&mut self, map: &Map<String, Value>, op_key: &str) -> Value {
        let after = first_non_empty(map, &AFTER_ID_KEYS);
        if let Some((_, source)) = &after {
            if *source != "afterId" {
                self.repairs.push(Repair::RecoveredId {
                    op: self.index,
                    field: "afterId".to_string(),
                    source: source.to_string(),
                });
            }
        }

        // A field consumed as the anchor cannot also be the new block's id
        let inline_id_keys: Vec<&str> = INSERT_INLINE_ID_KEYS
            .iter()
            .copied()
            .filter(|key| after.as_ref().map_or(true, |(_, source)| source != key))
            .collect();

        let after_id = after.map(|(id, _)| id);
        match self.recover_block(map, op_key, &inline_id_keys, IdPolicy::Generate) {
            Some(block) => {
                let mut out = op_object(INSERT_AFTER);
                if let Some(after_id) = after_id {
                    out.insert("afterId".into(), Value::from(after_id));
                }
                out.insert("block".into(), block);
                Value::Object(out)
            }
            None => self.downgrade(INSERT_AFTER, after_id),
        }
    }

    fn delete_block(&mut self, map: &Map<String, Value>) -> Value {
        let mut out = op_object(DELETE_BLOCK);
        if let Some(id) = self.recover_id(map, &TARGET_ID_KEYS, "id") {
            out.insert("id".into(), Value::from(id));
        }
        Value::Object(out)
    }

    fn recover_id(&mut self, map: &Map<String, Value>, candidates: &[&str], field: &str) -> Option<String> {
        let (id, source) = first_non_empty(map, candidates)?;
        if source != field {
            self.repairs.push(Repair::RecoveredId {
                op: self.index,
                field: field.to_string(),
                source: source.to_string(),
            });
        }
        Some(id)
    }

    /// Nested block first, then fields flattened onto the op
    fn recover_block(
        &mut self,
        map: &Map<String, Value>,
        op_key: &str,
        inline_id_keys: &[&str],
        policy: IdPolicy,
    ) -> Option<Value> {
        if let Some((nested, source)) = first_object(map, &NESTED_BLOCK_KEYS) {
            let nested_policy = match first_non_empty(map, inline_id_keys) {
                Some((id, id_source)) => IdPolicy::Lifted {
                    id,
                    source: id_source.to_string(),
                },
                None => policy.clone(),
            };
            if let Some((block, _)) = self.build_node(nested, &NODE_KIND_KEYS, &NODE_ID_KEYS, nested_policy) {
                if source != "block" {
                    self.repairs.push(Repair::RelocatedBlock {
                        op: self.index,
                        source: source.to_string(),
                    });
                }
                return Some(block);
            }
        }

        let kind_keys: Vec<&str> = INLINE_KIND_KEYS
            .iter()
            .copied()
            .filter(|key| *key != op_key)
            .collect();
        let (block, kind) = self.build_node(map, &kind_keys, inline_id_keys, policy)?;
        self.repairs.push(Repair::ReconstructedNode {
            op: self.index,
            kind: kind.to_string(),
        });
        Some(block)
    }

    fn downgrade(&mut self, from: &str, id: Option<String>) -> Value {
        self.repairs.push(Repair::DowngradedOp {
            op: self.index,
            from: from.to_string(),
        });

        let mut out = op_object(UPDATE_CONTENT);
        if let Some(id) = id {
            out.insert("id".into(), Value::from(id));
        }
        out.insert("content".into(), Value::from(DOWNGRADE_MESSAGE));
        Value::Object(out)
    }
}

fn op_object(name: &str) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("op".into(), Value::from(name));
    out
}
