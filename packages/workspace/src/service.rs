//! # Edit Service
//!
//! Owns the keyed per-document state (cache, undo history, locks) and runs
//! the editing pipeline against it.
//!
//! ## Commit discipline
//!
//! Under the document's lock:
//!
//! ```text
//! load current → pipeline (normalize, validate, scope, apply)
//!              → store.save(new)      fails: nothing else changes
//!              → history.push(old)
//!              → cache.put(new)
//! ```
//!
//! Generation runs before the lock is taken. The candidate it produced is
//! then checked against whatever document is current at commit time.

use crate::cache::DocumentCache;
use crate::generator::{generate_with_timeout, GenerationError, GenerationRequest, GenerationService};
use crate::history::HistoryStore;
use crate::locks::DocumentLocks;
use crate::store::{is_valid_id, DocumentStore, StoreError};
use blockpatch_common::DocumentStats;
use blockpatch_editor::{PatchError, Pipeline, PipelineError};
use blockpatch_model::{seed_document, Document, Patch};
use blockpatch_normalizer::Repair;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl EditError {
    /// Stable name reported to callers as `errorKind`
    pub fn kind(&self) -> &'static str {
        match self {
            EditError::InvalidRequest(_) => "invalid_request",
            EditError::NotFound(_) => "not_found",
            EditError::Pipeline(PipelineError::Structural(_)) => "structural",
            EditError::Pipeline(PipelineError::OutOfScope { .. })
            | EditError::Pipeline(PipelineError::SelectionNotFound { .. }) => "out_of_scope",
            EditError::Pipeline(PipelineError::Patch(PatchError::NotFound(_))) => "not_found",
            EditError::Pipeline(PipelineError::Patch(PatchError::Unsupported { .. })) => {
                "unsupported_operation"
            }
            EditError::Pipeline(PipelineError::Patch(PatchError::DuplicateId(_))) => "duplicate_id",
            EditError::Generation(_) => "generation_service",
            EditError::Storage(StoreError::InvalidId(_)) => "invalid_request",
            EditError::Storage(_) => "storage",
        }
    }
}

/// A committed edit
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub document: Arc<Document>,
    pub version: u64,
    pub patch: Patch,
    pub repairs: Vec<Repair>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    Restored(Arc<Document>),
    NothingToUndo,
}

pub struct EditService {
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn GenerationService>,
    generation_timeout: Duration,
    cache: DocumentCache,
    history: HistoryStore,
    locks: DocumentLocks,
}

impl EditService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn GenerationService>,
        generation_timeout: Duration,
        history_capacity: usize,
    ) -> Self {
        Self {
            store,
            generator,
            generation_timeout,
            cache: DocumentCache::new(),
            history: HistoryStore::new(history_capacity),
            locks: DocumentLocks::new(),
        }
    }

    /// Current authoritative document for `id`
    pub async fn document(&self, id: &str) -> Result<Arc<Document>, EditError> {
        check_document_id(id)?;
        self.current(id).await
    }

    pub fn can_undo(&self, id: &str) -> bool {
        self.history.len(id) > 0
    }

    /// Ask the generation service for a patch and commit it
    pub async fn apply_instruction(
        &self,
        id: &str,
        selected: &[String],
        instruction: &str,
    ) -> Result<EditOutcome, EditError> {
        check_document_id(id)?;
        check_selection(selected)?;
        if instruction.trim().is_empty() {
            return Err(EditError::InvalidRequest("instruction must not be empty".to_string()));
        }

        let snapshot = self.current(id).await?;
        let request = GenerationRequest::new((*snapshot).clone(), selected.to_vec(), instruction);

        let candidate = generate_with_timeout(self.generator.as_ref(), &request, self.generation_timeout)
            .await
            .map_err(|e| {
                tracing::warn!(document_id = %id, kind = e.kind(), error = %e, "generation failed");
                e
            })?;

        self.commit(id, selected, &candidate, Some(instruction.trim().to_string()))
            .await
    }

    /// Commit an already obtained raw candidate
    pub async fn apply_candidate(
        &self,
        id: &str,
        selected: &[String],
        candidate: &Value,
    ) -> Result<EditOutcome, EditError> {
        check_document_id(id)?;
        check_selection(selected)?;
        self.commit(id, selected, candidate, None).await
    }

    /// Restore the state before the most recent commit
    pub async fn undo(&self, id: &str) -> Result<UndoOutcome, EditError> {
        check_document_id(id)?;
        let _guard = self.locks.acquire(id).await;

        let Some(snapshot) = self.history.pop(id) else {
            return Ok(UndoOutcome::NothingToUndo);
        };

        if let Err(e) = self.store.save(id, &snapshot.document).await {
            tracing::warn!(document_id = %id, error = %e, "undo write failed, keeping history entry");
            self.history.push_snapshot(id, snapshot);
            return Err(e.into());
        }

        let age = chrono::Utc::now() - snapshot.taken_at;
        let document = snapshot.document;
        let version = self.cache.put(id, document.clone());
        tracing::info!(
            document_id = %id,
            version,
            snapshot_age_secs = age.num_seconds(),
            remaining = self.history.len(id),
            "undo applied"
        );

        Ok(UndoOutcome::Restored(Arc::new(document)))
    }

    /// Write the seed example under `id`, replacing any existing document
    /// and its history
    pub async fn create_from_seed(&self, id: &str) -> Result<Arc<Document>, EditError> {
        check_document_id(id)?;
        let _guard = self.locks.acquire(id).await;

        let document = seed_document(id);
        self.store.save(id, &document).await?;
        self.history.clear(id);
        self.cache.put(id, document.clone());

        let stats = DocumentStats::of(&document);
        tracing::info!(document_id = %id, nodes = stats.nodes, columns = stats.columns, "seeded document");
        Ok(Arc::new(document))
    }

    async fn current(&self, id: &str) -> Result<Arc<Document>, EditError> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(cached.document);
        }

        let document = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| EditError::NotFound(id.to_string()))?;

        // Reads run unlocked, so a commit may have cached a newer document
        // while this load was in flight
        Ok(self.cache.get_or_insert(id, document).document)
    }

    async fn commit(
        &self,
        id: &str,
        selected: &[String],
        candidate: &Value,
        description: Option<String>,
    ) -> Result<EditOutcome, EditError> {
        let _guard = self.locks.acquire(id).await;
        let current = self.current(id).await?;

        let result = Pipeline::new(&current).run(candidate, selected)?;

        self.store.save(id, &result.document).await.map_err(|e| {
            tracing::warn!(document_id = %id, error = %e, "commit write failed");
            e
        })?;
        self.history.push(id, (*current).clone(), description);
        let version = self.cache.put(id, result.document.clone());

        tracing::info!(
            document_id = %id,
            version,
            op_count = result.patch.len(),
            repairs = result.repairs.len(),
            "committed patch"
        );

        Ok(EditOutcome {
            document: Arc::new(result.document),
            version,
            patch: result.patch,
            repairs: result.repairs,
        })
    }
}

fn check_document_id(id: &str) -> Result<(), EditError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(EditError::InvalidRequest(format!(
            "document id `{}` must be 1-128 characters of [A-Za-z0-9_-]",
            id
        )))
    }
}

fn check_selection(selected: &[String]) -> Result<(), EditError> {
    if selected.iter().all(|id| id.trim().is_empty()) {
        return Err(EditError::InvalidRequest(
            "selectedIds must contain at least one id".to_string(),
        ));
    }
    Ok(())
}
