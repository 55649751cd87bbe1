//! Error types for the editor

use blockpatch_model::{NodeKind, StructuralError};
use thiserror::Error;

/// Applying a validated patch to a concrete document failed
///
/// Any of these aborts the whole patch; the input document is never touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("Id not found: {0}")]
    NotFound(String),

    #[error("update_content is not supported on {kind} block `{id}`")]
    Unsupported { id: String, kind: NodeKind },

    #[error("Patch would leave duplicate id `{0}` in the document")]
    DuplicateId(String),
}

/// Any rejection on the way from raw candidate to new document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Patch targets ids outside the selection: {}", .targets.join(", "))]
    OutOfScope { targets: Vec<String> },

    #[error("None of the selected ids exist in the document: {}", .selected.join(", "))]
    SelectionNotFound { selected: Vec<String> },

    #[error(transparent)]
    Patch(#[from] PatchError),
}
