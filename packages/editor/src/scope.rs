//! # Scope Enforcer
//!
//! A patch may only touch what the user selected. The allowed set is every
//! selected id that exists in the document plus all ids nested under it;
//! each op target (`afterId` for inserts) must be in that set.

use crate::errors::PipelineError;
use blockpatch_common::descendant_closure;
use blockpatch_model::{Document, Patch};
use std::collections::HashSet;

/// Selected ids expanded to everything they contain
pub fn allowed_ids<'a, S: AsRef<str>>(document: &'a Document, selected: &[S]) -> HashSet<&'a str> {
    descendant_closure(document, selected.iter().map(|id| id.as_ref()))
}

/// True when every op targets the allowed set; never true for an empty allowed set
pub fn in_scope<S: AsRef<str>>(patch: &Patch, document: &Document, selected: &[S]) -> bool {
    let allowed = allowed_ids(document, selected);
    !allowed.is_empty() && patch.target_ids().all(|target| allowed.contains(target))
}

/// Op targets that fall outside the allowed set, in op order
pub fn out_of_scope_targets<'p, S: AsRef<str>>(
    patch: &'p Patch,
    document: &Document,
    selected: &[S],
) -> Vec<&'p str> {
    let allowed = allowed_ids(document, selected);
    patch
        .target_ids()
        .filter(|target| !allowed.contains(target))
        .collect()
}

/// Reject the patch wholesale unless it is in scope
pub fn enforce_scope<S: AsRef<str>>(
    patch: &Patch,
    document: &Document,
    selected: &[S],
) -> Result<(), PipelineError> {
    let allowed = allowed_ids(document, selected);

    if allowed.is_empty() {
        return Err(PipelineError::SelectionNotFound {
            selected: selected.iter().map(|id| id.as_ref().to_string()).collect(),
        });
    }

    let outside: Vec<String> = patch
        .target_ids()
        .filter(|target| !allowed.contains(target))
        .map(str::to_string)
        .collect();

    if outside.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::OutOfScope { targets: outside })
    }
}
