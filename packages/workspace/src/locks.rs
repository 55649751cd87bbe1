//! Per-document mutual exclusion
//!
//! Every commit and undo for an id runs under that id's lock, so two
//! requests against the same document never interleave their
//! load/apply/store/push steps. Different ids proceed in parallel.
//! A lock handle is created on first use of an id and kept for the life
//! of the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

#[derive(Debug, Default)]
pub struct DocumentLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        match self.locks.lock() {
            Ok(mut locks) => locks.entry(id.to_string()).or_default().clone(),
            // The map itself is never left half-updated
            Err(poisoned) => poisoned.into_inner().entry(id.to_string()).or_default().clone(),
        }
    }

    /// Wait for exclusive access to `id`
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        self.handle(id).lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
