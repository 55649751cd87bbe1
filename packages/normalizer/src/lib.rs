//! # Provider Normalizer
//!
//! Best-effort reshaping of raw generator output into the canonical patch
//! shape. The output is still an untyped [`Value`]: it must go through
//! `blockpatch_model::validate_patch` before anything is applied.
//!
//! Repairs only rename or relocate values that are already present. The
//! exceptions are ids for newly created blocks and the default level of a
//! heading that names none. An op that cannot be understood at all is
//! passed through unchanged so the validator reports it.

pub mod extract;
mod node;
pub mod op_name;
mod ops;
pub mod probe;
pub mod repair;
pub mod style;

pub use extract::{extract_json, ExtractError};
pub use node::{parse_kind, DEFAULT_HEADING_LEVEL};
pub use op_name::{canonical_op, canonical_token};
pub use ops::DOWNGRADE_MESSAGE;
pub use repair::Repair;

use blockpatch_model::IdGenerator;
use ops::{OpRepair, OP_KEYS};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

const ENVELOPE_KEYS: [&str; 4] = ["operations", "edits", "changes", "actions"];

/// Normalized candidate plus the log of what was changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    pub candidate: Value,
    pub repairs: Vec<Repair>,
}

/// Stateful normalizer; owns the id source for blocks created without ids
pub struct Normalizer {
    generator: IdGenerator,
    taken: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new("blockpatch")
    }
}

impl Normalizer {
    /// `seed_key` prefixes generated ids (usually the document id)
    pub fn new(seed_key: &str) -> Self {
        Self {
            generator: IdGenerator::new(seed_key),
            taken: HashSet::new(),
        }
    }

    /// Ids generated ids must never collide with
    pub fn with_reserved_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taken.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn normalize(&mut self, raw: &Value) -> Normalized {
        let mut repairs = Vec::new();

        let extracted;
        let raw = match raw {
            Value::String(text) => match extract_json(text) {
                Ok(value) => {
                    repairs.push(Repair::ExtractedJson);
                    extracted = value;
                    &extracted
                }
                Err(_) => {
                    return Normalized {
                        candidate: raw.clone(),
                        repairs,
                    }
                }
            },
            other => other,
        };

        let Some(ops) = unwrap_envelope(raw, &mut repairs, 0) else {
            return Normalized {
                candidate: raw.clone(),
                repairs,
            };
        };

        let mut normalized = Vec::with_capacity(ops.len());
        for (index, op) in ops.iter().enumerate() {
            let mut repair = OpRepair {
                normalizer: self,
                repairs: &mut repairs,
                index,
            };
            normalized.push(repair.normalize_op(op));
        }

        for repair in &repairs {
            tracing::debug!(%repair, "normalizer repair");
        }

        let mut candidate = Map::new();
        candidate.insert("ops".into(), Value::Array(normalized));
        Normalized {
            candidate: Value::Object(candidate),
            repairs,
        }
    }

    pub(crate) fn fresh_id(&mut self) -> String {
        let taken = &self.taken;
        let id = self.generator.next_free(|candidate| taken.contains(candidate));
        self.taken.insert(id.clone());
        id
    }
}

/// Normalize with a fresh default normalizer
pub fn normalize(raw: &Value) -> Normalized {
    Normalizer::default().normalize(raw)
}

/// Find the op list inside whatever wrapper the provider used
fn unwrap_envelope(raw: &Value, repairs: &mut Vec<Repair>, depth: usize) -> Option<Vec<Value>> {
    match raw {
        Value::Array(ops) => {
            repairs.push(Repair::Envelope {
                source: "bare array".to_string(),
            });
            Some(ops.clone())
        }
        Value::Object(map) => {
            if let Some(Value::Array(ops)) = map.get("ops") {
                return Some(ops.clone());
            }

            for key in ENVELOPE_KEYS {
                if let Some(Value::Array(ops)) = map.get(key) {
                    repairs.push(Repair::Envelope {
                        source: key.to_string(),
                    });
                    return Some(ops.clone());
                }
            }

            if depth == 0 {
                if let Some(inner @ Value::Object(_)) = map.get("patch") {
                    let ops = unwrap_envelope(inner, repairs, depth + 1)?;
                    repairs.push(Repair::Envelope {
                        source: "patch".to_string(),
                    });
                    return Some(ops);
                }
            }

            let is_single_op = probe::first_non_empty(map, &OP_KEYS)
                .and_then(|(raw, _)| canonical_op(&raw))
                .is_some();
            if is_single_op {
                repairs.push(Repair::Envelope {
                    source: "single op".to_string(),
                });
                return Some(vec![raw.clone()]);
            }

            None
        }
        _ => None,
    }
}
