//! # Block Patch Editor
//!
//! Pure, synchronous core of the edit pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ normalizer: raw provider output → candidate │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: strict validation → Patch            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: scope check → apply on a clone      │
//! │  - find blocks by id anywhere in the tree   │
//! │  - reject the whole patch on any failure    │
//! │  - bounded per-document undo snapshots      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blockpatch_editor::{Pipeline, UndoStack};
//!
//! let result = Pipeline::new(&doc).run(&raw, &["p1"])?;
//! store.save(&result.document)?;
//! history.push(doc, Some(instruction));
//! ```

mod apply;
mod errors;
mod pipeline;
mod scope;
mod undo_stack;

pub use apply::{apply_patch, find_location, Container, Location};
pub use errors::{PatchError, PipelineError};
pub use pipeline::{Pipeline, PipelineResult};
pub use scope::{allowed_ids, enforce_scope, in_scope, out_of_scope_targets};
pub use undo_stack::{Snapshot, UndoStack, DEFAULT_CAPACITY};
