//! Document tree, patch language and strict patch validation
//!
//! Everything here is plain data plus invariants; nothing performs I/O.

pub mod ast;
pub mod error;
pub mod id_generator;
pub mod patch;
pub mod seed;
pub mod validate;

pub use ast::{merge_styles, Column, Document, Node, NodeKind, RichItem, TextAlign, TextStyle};
pub use error::{ModelError, ModelResult, StructuralError};
pub use id_generator::IdGenerator;
pub use patch::{Patch, PatchOp};
pub use seed::seed_document;
pub use validate::{validate_patch, validate_op};
