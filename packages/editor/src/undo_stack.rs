//! # Undo Stack
//!
//! Bounded history of pre-mutation document snapshots for one document.
//!
//! ## Design
//!
//! - One applied patch pushes exactly one snapshot, however many ops it had
//! - Once the capacity is exceeded the oldest snapshot is evicted
//! - Popping an empty stack returns `None`; that is "nothing to undo", not an error
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let next = apply_patch(&doc, &patch)?;
//! store.save(&next)?;
//! stack.push(doc, Some("make the intro shorter".into()));
//!
//! if let Some(snapshot) = stack.pop() {
//!     store.save(&snapshot.document)?;
//! }
//! ```

use blockpatch_model::Document;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 20;

/// A document as it was before one applied patch
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: Document,

    /// The instruction that led to the change, if any
    pub description: Option<String>,

    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(document: Document, description: Option<String>) -> Self {
        Self {
            document,
            description,
            taken_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoStack {
    /// Oldest first
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A capacity of 0 is treated as 1
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record the state before a commit; returns the evicted snapshot, if any
    pub fn push(&mut self, document: Document, description: Option<String>) -> Option<Snapshot> {
        self.push_snapshot(Snapshot::new(document, description))
    }

    /// Put a snapshot back on top, e.g. after a failed restore
    pub fn push_snapshot(&mut self, snapshot: Snapshot) -> Option<Snapshot> {
        self.entries.push_back(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Most recent snapshot, removed from the stack
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.peek().and_then(|snapshot| snapshot.description.as_deref())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpatch_model::Node;

    fn version(n: usize) -> Document {
        Document::new("doc", "t", vec![Node::paragraph("p", format!("v{}", n))])
    }

    #[test]
    fn test_empty_stack() {
        let mut stack = UndoStack::new();
        assert_eq!(stack.capacity(), DEFAULT_CAPACITY);
        assert!(!stack.can_undo());
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_pop_returns_most_recent() {
        let mut stack = UndoStack::new();
        stack.push(version(0), None);
        stack.push(version(1), Some("second".to_string()));

        assert_eq!(stack.undo_description(), Some("second"));
        assert_eq!(stack.pop().map(|s| s.document), Some(version(1)));
        assert_eq!(stack.pop().map(|s| s.document), Some(version(0)));
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_oldest_evicted_past_capacity() {
        let mut stack = UndoStack::with_capacity(3);
        for n in 0..3 {
            assert!(stack.push(version(n), None).is_none());
        }

        let evicted = stack.push(version(3), None);
        assert_eq!(evicted.map(|s| s.document), Some(version(0)));
        assert_eq!(stack.len(), 3);

        let remaining: Vec<_> = std::iter::from_fn(|| stack.pop()).map(|s| s.document).collect();
        assert_eq!(remaining, vec![version(3), version(2), version(1)]);
    }

    #[test]
    fn test_push_snapshot_restores_popped_entry() {
        let mut stack = UndoStack::with_capacity(2);
        stack.push(version(0), Some("first".to_string()));

        let popped = stack.pop().unwrap();
        stack.push_snapshot(popped.clone());
        assert_eq!(stack.peek(), Some(&popped));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut stack = UndoStack::with_capacity(0);
        stack.push(version(0), None);
        stack.push(version(1), None);
        assert_eq!(stack.len(), 1);
    }
}
