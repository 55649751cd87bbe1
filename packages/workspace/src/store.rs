//! # Document Store
//!
//! Durable home of the authoritative document for each id.
//!
//! - `FileStore`: one `<id>.json` per document, written atomically
//! - `MemoryStore`: in-process map, with a switch that makes writes fail
//!
//! A persisted file that does not decode as a valid document is reported as
//! not found. It is never coerced into something that loads.

use async_trait::async_trait;
use blockpatch_model::Document;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;

pub const MAX_ID_LEN: usize = 128;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid document id `{0}`: expected 1-128 characters of [A-Za-z0-9_-]")]
    InvalidId(String),

    #[error("Storage I/O error for `{id}`: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode document `{id}`: {message}")]
    Encode { id: String, message: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `None` when the document is missing or its stored form is invalid
    async fn load(&self, id: &str) -> StoreResult<Option<Document>>;

    async fn save(&self, id: &str, document: &Document) -> StoreResult<()>;

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.load(id).await?.is_some())
    }
}

pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn check_id(id: &str) -> StoreResult<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> StoreResult<PathBuf> {
        check_id(id)?;
        Ok(self.root.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn load(&self, id: &str) -> StoreResult<Option<Document>> {
        let path = self.path_for(id)?;

        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    id: id.to_string(),
                    source,
                })
            }
        };

        match Document::from_json(&source) {
            Ok(document) => Ok(Some(document)),
            Err(e) => {
                tracing::warn!(document_id = %id, path = %path.display(), error = %e, "stored document failed to decode");
                Ok(None)
            }
        }
    }

    async fn save(&self, id: &str, document: &Document) -> StoreResult<()> {
        let path = self.path_for(id)?;
        let content = document.to_json_pretty().map_err(|e| StoreError::Encode {
            id: id.to_string(),
            message: e.to_string(),
        })?;
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || write_atomic(&root, &path, &content))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .map_err(|source| StoreError::Io {
                id: id.to_string(),
                source,
            })?;

        tracing::debug!(document_id = %id, "saved document");
        Ok(())
    }
}

/// Temp file in the target directory, synced, then renamed over the target
fn write_atomic(dir: &Path, target: &Path, content: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// In-memory store; stores the encoded form so loads go through decoding
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail until switched off again
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Put raw text under an id, bypassing encoding
    pub fn insert_raw(&self, id: &str, source: impl Into<String>) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(id.to_string(), source.into());
        }
    }

    fn read(&self, id: &str) -> StoreResult<Option<String>> {
        let documents = self
            .documents
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(documents.get(id).cloned())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, id: &str) -> StoreResult<Option<Document>> {
        check_id(id)?;

        let Some(source) = self.read(id)? else {
            return Ok(None);
        };

        match Document::from_json(&source) {
            Ok(document) => Ok(Some(document)),
            Err(e) => {
                tracing::warn!(document_id = %id, error = %e, "stored document failed to decode");
                Ok(None)
            }
        }
    }

    async fn save(&self, id: &str, document: &Document) -> StoreResult<()> {
        check_id(id)?;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                id: id.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "write failure injected"),
            });
        }

        let content = document.to_json_pretty().map_err(|e| StoreError::Encode {
            id: id.to_string(),
            message: e.to_string(),
        })?;

        let mut documents = self
            .documents
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        documents.insert(id.to_string(), content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpatch_model::{seed_document, Node};

    #[test]
    fn test_id_rules() {
        assert!(is_valid_id("report"));
        assert!(is_valid_id("Q3_report-2"));
        assert!(is_valid_id(&"a".repeat(MAX_ID_LEN)));

        assert!(!is_valid_id(""));
        assert!(!is_valid_id("../etc/passwd"));
        assert!(!is_valid_id("with space"));
        assert!(!is_valid_id("dot.json"));
        assert!(!is_valid_id(&"a".repeat(MAX_ID_LEN + 1)));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("docs"));
        let doc = seed_document("report");

        assert_eq!(store.load("report").await.unwrap(), None);
        assert!(!store.exists("report").await.unwrap());

        store.save("report", &doc).await.unwrap();
        assert_eq!(store.load("report").await.unwrap(), Some(doc));
        assert!(dir.path().join("docs/report.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save("doc", &Document::new("doc", "v1", vec![])).await.unwrap();
        let v2 = Document::new("doc", "v2", vec![Node::paragraph("p1", "x")]);
        store.save("doc", &v2).await.unwrap();

        assert_eq!(store.load("doc").await.unwrap(), Some(v2));
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_undecodable_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        assert_eq!(store.load("broken").await.unwrap(), None);

        // Decodes as JSON but breaks a tree invariant
        let dup = r#"{"id":"dup","title":"t","nodes":[
            {"type":"divider","id":"a"},{"type":"divider","id":"a"}]}"#;
        std::fs::write(dir.path().join("dup.json"), dup).unwrap();
        assert_eq!(store.load("dup").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_rejects_bad_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(store.load("../x").await, Err(StoreError::InvalidId(_))));
        assert!(matches!(
            store.save("a/b", &Document::new("a", "t", vec![])).await,
            Err(StoreError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store_failure_injection() {
        let store = MemoryStore::new();
        let doc = seed_document("report");

        store.set_fail_writes(true);
        assert!(matches!(store.save("report", &doc).await, Err(StoreError::Io { .. })));
        assert_eq!(store.load("report").await.unwrap(), None);

        store.set_fail_writes(false);
        store.save("report", &doc).await.unwrap();
        assert_eq!(store.load("report").await.unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn test_memory_store_invalid_raw_is_not_found() {
        let store = MemoryStore::new();
        store.insert_raw("bad", r#"{"id":"bad","title":"t","nodes":[{"type":"heading","id":"h","level":9,"text":"x"}]}"#);
        assert_eq!(store.load("bad").await.unwrap(), None);
    }
}
