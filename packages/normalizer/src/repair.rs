use serde::Serialize;
use std::fmt;

/// One change the normalizer made to the raw candidate
///
/// `op` is the index of the operation in the normalized `ops` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "repair", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Repair {
    /// Provider text wrapped the JSON in prose or a code fence
    ExtractedJson,
    /// The op list was found somewhere other than a top-level `ops` array
    Envelope { source: String },
    RenamedOp { op: usize, from: String, to: String },
    RecoveredId { op: usize, field: String, source: String },
    RecoveredContent { op: usize, source: String },
    RelocatedStyle { op: usize, source: String },
    DroppedStyleKey { op: usize, key: String },
    RelocatedBlock { op: usize, source: String },
    ReconstructedNode { op: usize, kind: String },
    InheritedId { op: usize, id: String },
    SynthesizedId { op: usize, id: String },
    DowngradedOp { op: usize, from: String },
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::ExtractedJson => write!(f, "extracted JSON from surrounding text"),
            Repair::Envelope { source } => write!(f, "read op list from {}", source),
            Repair::RenamedOp { op, from, to } => write!(f, "ops[{}]: renamed `{}` to {}", op, from, to),
            Repair::RecoveredId { op, field, source } => {
                write!(f, "ops[{}]: took {} from `{}`", op, field, source)
            }
            Repair::RecoveredContent { op, source } => {
                write!(f, "ops[{}]: took content from `{}`", op, source)
            }
            Repair::RelocatedStyle { op, source } => {
                write!(f, "ops[{}]: took textStyle from `{}`", op, source)
            }
            Repair::DroppedStyleKey { op, key } => write!(f, "ops[{}]: dropped style key `{}`", op, key),
            Repair::RelocatedBlock { op, source } => write!(f, "ops[{}]: took block from `{}`", op, source),
            Repair::ReconstructedNode { op, kind } => {
                write!(f, "ops[{}]: assembled {} block from inline fields", op, kind)
            }
            Repair::InheritedId { op, id } => write!(f, "ops[{}]: replacement block keeps id `{}`", op, id),
            Repair::SynthesizedId { op, id } => write!(f, "ops[{}]: new block id `{}`", op, id),
            Repair::DowngradedOp { op, from } => {
                write!(f, "ops[{}]: could not rebuild block for {}, downgraded to update_content", op, from)
            }
        }
    }
}
