//! Per-document undo stacks
//!
//! A stack is created by the first push for an id and dropped by `clear`.

use blockpatch_editor::{Snapshot, UndoStack};
use blockpatch_model::Document;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug)]
pub struct HistoryStore {
    stacks: Mutex<HashMap<String, UndoStack>>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            stacks: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn with_stack<R>(&self, id: &str, f: impl FnOnce(&mut UndoStack) -> R) -> Option<R> {
        let mut stacks = self.stacks.lock().ok()?;
        let stack = stacks
            .entry(id.to_string())
            .or_insert_with(|| UndoStack::with_capacity(self.capacity));
        Some(f(stack))
    }

    /// Record the pre-commit state of `id`
    pub fn push(&self, id: &str, document: Document, description: Option<String>) {
        let evicted = self.with_stack(id, |stack| stack.push(document, description)).flatten();
        if evicted.is_some() {
            tracing::debug!(document_id = %id, capacity = self.capacity, "evicted oldest undo snapshot");
        }
    }

    pub fn push_snapshot(&self, id: &str, snapshot: Snapshot) {
        self.with_stack(id, |stack| stack.push_snapshot(snapshot));
    }

    pub fn pop(&self, id: &str) -> Option<Snapshot> {
        self.stacks.lock().ok()?.get_mut(id)?.pop()
    }

    pub fn len(&self, id: &str) -> usize {
        self.stacks
            .lock()
            .ok()
            .and_then(|stacks| stacks.get(id).map(UndoStack::len))
            .unwrap_or(0)
    }

    pub fn undo_description(&self, id: &str) -> Option<String> {
        let stacks = self.stacks.lock().ok()?;
        stacks.get(id)?.undo_description().map(str::to_string)
    }

    /// Number of ids that currently hold a stack
    pub fn tracked(&self) -> usize {
        self.stacks.lock().map(|stacks| stacks.len()).unwrap_or(0)
    }

    /// Drop all history for `id`
    pub fn clear(&self, id: &str) {
        if let Ok(mut stacks) = self.stacks.lock() {
            stacks.remove(id);
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(blockpatch_editor::DEFAULT_CAPACITY)
    }
}
