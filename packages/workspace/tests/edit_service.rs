//! End-to-end edit service behavior against in-memory and file stores
//!
//! This tests:
//! - instruction → generation → commit → undo
//! - no mutation or history push on any failure
//! - store-failure rollback for commit and undo
//! - per-document serialization of concurrent edits
//! - cold-cache reads racing a commit

use async_trait::async_trait;
use blockpatch_model::{seed_document, Document, Node};
use blockpatch_workspace::{
    DocumentStore, EditService, FileStore, GenerationError, GenerationRequest, GenerationService, MemoryStore,
    StoreError, UndoOutcome,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays canned results and records what it was asked
struct ScriptedGenerator {
    responses: Mutex<Vec<Result<Value, GenerationError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    delay: Duration,
}

impl ScriptedGenerator {
    fn new(responses: Vec<Result<Value, GenerationError>>) -> Arc<Self> {
        Self::with_delay(responses, Duration::ZERO)
    }

    fn with_delay(mut responses: Vec<Result<Value, GenerationError>>, delay: Duration) -> Arc<Self> {
        responses.reverse();
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            delay,
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(GenerationError::MalformedOutput("script exhausted".to_string())))
    }
}

async fn seeded(generator: Arc<ScriptedGenerator>) -> (Arc<MemoryStore>, EditService) {
    let store = Arc::new(MemoryStore::new());
    let service = EditService::new(store.clone(), generator, Duration::from_secs(2), 20);
    service.create_from_seed("report").await.unwrap();
    (store, service)
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn test_instruction_commits_and_undo_restores() {
    let generator = ScriptedGenerator::new(vec![Ok(json!(
        "Here you go:\n```json\n{\"operations\": [{\"type\": \"Update\", \"blockId\": \"intro\", \"text\": \"Short.\"}]}\n```"
    ))]);
    let (store, service) = seeded(generator.clone()).await;

    let outcome = service
        .apply_instruction("report", &ids(&["intro"]), "make it shorter")
        .await
        .unwrap();

    assert_eq!(outcome.patch.len(), 1);
    assert!(!outcome.repairs.is_empty());
    assert_eq!(
        outcome.document.find_node("intro"),
        Some(&Node::paragraph("intro", "Short."))
    );
    assert_eq!(store.load("report").await.unwrap().as_ref(), Some(outcome.document.as_ref()));

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].selected_ids, ids(&["intro"]));
    assert_eq!(requests[0].instruction, "make it shorter");

    match service.undo("report").await.unwrap() {
        UndoOutcome::Restored(document) => assert_eq!(*document, seed_document("report")),
        other => panic!("Expected restore, got {:?}", other),
    }
    assert_eq!(store.load("report").await.unwrap(), Some(seed_document("report")));
    assert_eq!(service.undo("report").await.unwrap(), UndoOutcome::NothingToUndo);
}

#[tokio::test]
async fn test_one_push_per_patch() {
    let (_, service) = seeded(ScriptedGenerator::new(vec![])).await;

    service
        .apply_candidate(
            "report",
            &ids(&["summary"]),
            &json!({"ops": [
                {"op": "delete_block", "id": "summary-image"},
                {"op": "update_content", "id": "summary-text", "content": "Up."},
                {"op": "insert_after", "afterId": "revenue-chart", "block": {"type": "divider", "id": "rule"}}
            ]}),
        )
        .await
        .unwrap();

    assert!(matches!(service.undo("report").await.unwrap(), UndoOutcome::Restored(_)));
    assert_eq!(service.undo("report").await.unwrap(), UndoOutcome::NothingToUndo);
    assert_eq!(*service.document("report").await.unwrap(), seed_document("report"));
}

#[tokio::test]
async fn test_failures_leave_state_untouched() {
    let generator = ScriptedGenerator::new(vec![
        Err(GenerationError::InvalidCredentials("HTTP 401".to_string())),
        Ok(json!({"ops": [{"op": "delete_block", "id": "title"}]})),
        Ok(json!({"ops": [{"op": "update_content", "id": "intro"}]})),
        Ok(json!({"ops": [{"op": "update_content", "id": "divider-1", "content": "x"}]})),
    ]);
    let (store, service) = seeded(generator).await;
    let expected = [
        "generation_service",
        "out_of_scope",
        "structural",
        "unsupported_operation",
    ];

    for kind in expected {
        let err = service
            .apply_instruction("report", &ids(&["intro", "divider-1"]), "edit")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), kind, "{}", err);
    }

    assert!(!service.can_undo("report"));
    assert_eq!(store.load("report").await.unwrap(), Some(seed_document("report")));
}

#[tokio::test]
async fn test_generation_timeout() {
    let generator = ScriptedGenerator::with_delay(vec![Ok(json!({"ops": []}))], Duration::from_secs(5));
    let store = Arc::new(MemoryStore::new());
    let service = EditService::new(store, generator, Duration::from_millis(30), 20);
    service.create_from_seed("report").await.unwrap();

    let err = service
        .apply_instruction("report", &ids(&["intro"]), "shorter")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "generation_service");
    assert!(err.to_string().contains("timed out"));
    assert!(!service.can_undo("report"));
}

#[tokio::test]
async fn test_store_failure_does_not_push_history() {
    let (store, service) = seeded(ScriptedGenerator::new(vec![])).await;
    let delete_intro = json!({"ops": [{"op": "delete_block", "id": "intro"}]});

    store.set_fail_writes(true);
    let err = service
        .apply_candidate("report", &ids(&["intro"]), &delete_intro)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "storage");
    assert!(!service.can_undo("report"));
    assert!(service.document("report").await.unwrap().contains_id("intro"));

    store.set_fail_writes(false);
    service
        .apply_candidate("report", &ids(&["intro"]), &delete_intro)
        .await
        .unwrap();

    store.set_fail_writes(true);
    assert_eq!(service.undo("report").await.unwrap_err().kind(), "storage");
    assert!(service.can_undo("report"));
    assert!(!service.document("report").await.unwrap().contains_id("intro"));

    store.set_fail_writes(false);
    assert!(matches!(service.undo("report").await.unwrap(), UndoOutcome::Restored(_)));
    assert_eq!(store.load("report").await.unwrap(), Some(seed_document("report")));
}

#[tokio::test]
async fn test_concurrent_edits_do_not_lose_updates() {
    let (store, service) = seeded(ScriptedGenerator::new(vec![])).await;
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let candidate = json!({"ops": [{
                "op": "insert_after",
                "afterId": "intro",
                "block": {"type": "paragraph", "id": format!("note-{}", i), "text": "note"}
            }]});
            service
                .apply_candidate("report", &["intro".to_string()], &candidate)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let document = store.load("report").await.unwrap().unwrap();
    for i in 0..8 {
        assert!(document.contains_id(&format!("note-{}", i)));
    }

    for _ in 0..8 {
        assert!(matches!(service.undo("report").await.unwrap(), UndoOutcome::Restored(_)));
    }
    assert_eq!(*service.document("report").await.unwrap(), seed_document("report"));
}

#[tokio::test]
async fn test_file_store_backed_service() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let service = EditService::new(store.clone(), ScriptedGenerator::new(vec![]), Duration::from_secs(1), 20);

    assert_eq!(service.document("report").await.unwrap_err().kind(), "not_found");
    service.create_from_seed("report").await.unwrap();

    service
        .apply_candidate(
            "report",
            &ids(&["title"]),
            &json!([{"op": "replace", "id": "title", "type": "h2", "text": "Q3"}]),
        )
        .await
        .unwrap();

    let reopened = FileStore::new(dir.path()).load("report").await.unwrap().unwrap();
    assert_eq!(reopened.find_node("title"), Some(&Node::heading("title", 2, "Q3")));

    std::fs::write(dir.path().join("broken.json"), "not a document").unwrap();
    let fresh = EditService::new(store, ScriptedGenerator::new(vec![]), Duration::from_secs(1), 20);
    assert_eq!(fresh.document("broken").await.unwrap_err().kind(), "not_found");
}

/// Holds on to the result of its first load for a while before returning it
struct SlowFirstLoad {
    inner: MemoryStore,
    stalled: AtomicBool,
    stall: Duration,
}

#[async_trait]
impl DocumentStore for SlowFirstLoad {
    async fn load(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let document = self.inner.load(id).await?;
        if !self.stalled.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.stall).await;
        }
        Ok(document)
    }

    async fn save(&self, id: &str, document: &Document) -> Result<(), StoreError> {
        self.inner.save(id, document).await
    }
}

#[tokio::test]
async fn test_cold_read_does_not_overwrite_commit() {
    let inner = MemoryStore::new();
    inner.save("report", &seed_document("report")).await.unwrap();
    let store = Arc::new(SlowFirstLoad {
        inner,
        stalled: AtomicBool::new(false),
        stall: Duration::from_millis(200),
    });
    let service = Arc::new(EditService::new(
        store.clone(),
        ScriptedGenerator::new(vec![]),
        Duration::from_secs(1),
        20,
    ));

    let reader = {
        let service = service.clone();
        tokio::spawn(async move { service.document("report").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    service
        .apply_candidate(
            "report",
            &ids(&["intro"]),
            &json!({"ops": [{"op": "delete_block", "id": "intro"}]}),
        )
        .await
        .unwrap();
    reader.await.unwrap().unwrap();

    assert!(!service.document("report").await.unwrap().contains_id("intro"));

    service
        .apply_candidate(
            "report",
            &ids(&["title"]),
            &json!({"ops": [{"op": "update_content", "id": "title", "content": "Q3"}]}),
        )
        .await
        .unwrap();

    let stored = store.load("report").await.unwrap().unwrap();
    assert!(!stored.contains_id("intro"));
    assert!(matches!(stored.find_node("title"), Some(Node::Heading { text, .. }) if text == "Q3"));

    for _ in 0..2 {
        assert!(matches!(service.undo("report").await.unwrap(), UndoOutcome::Restored(_)));
    }
    assert_eq!(store.load("report").await.unwrap(), Some(seed_document("report")));
}
