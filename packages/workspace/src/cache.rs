//! In-memory view of the authoritative documents
//!
//! A commit swaps the `Arc`; readers keep whatever snapshot they cloned.
//! Entries are kept for the life of the process once an id has been read
//! or written.

use blockpatch_model::Document;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub document: Arc<Document>,
    pub version: u64,
}

#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: RwLock<HashMap<String, CachedDocument>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<CachedDocument> {
        match self.entries.read() {
            Ok(entries) => entries.get(id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(id).cloned(),
        }
    }

    /// Replace the entry for `id`, returning the new version
    pub fn put(&self, id: &str, document: Document) -> u64 {
        let mut entries = self.write();
        let version = entries.get(id).map(|e| e.version + 1).unwrap_or(0);
        entries.insert(
            id.to_string(),
            CachedDocument {
                document: Arc::new(document),
                version,
            },
        );
        version
    }

    /// Fill an empty entry from a store read
    ///
    /// If another writer filled the entry since the caller's miss, that
    /// entry is kept and returned; `document` may be older than it.
    pub fn get_or_insert(&self, id: &str, document: Document) -> CachedDocument {
        self.write()
            .entry(id.to_string())
            .or_insert_with(|| CachedDocument {
                document: Arc::new(document),
                version: 0,
            })
            .clone()
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CachedDocument>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            // Inserts are single calls, so the map is never half-updated
            tracing::warn!("document cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
