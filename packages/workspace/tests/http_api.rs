//! Route-level tests driven through `tower::ServiceExt::oneshot`

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use blockpatch_model::seed_document;
use blockpatch_workspace::{router, EditService, GenerationError, GenerationRequest, GenerationService, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Deletes whatever was selected first
struct DeleteSelection;

#[async_trait]
impl GenerationService for DeleteSelection {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        match request.selected_ids.first() {
            Some(id) => Ok(json!({"ops": [{"op": "delete_block", "id": id}]})),
            None => Err(GenerationError::MalformedOutput("nothing selected".to_string())),
        }
    }
}

fn app() -> Router {
    let service = EditService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(DeleteSelection),
        Duration::from_secs(1),
        20,
    );
    router(Arc::new(service))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_get_missing_document() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/documents/report", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorKind"], "not_found");
    assert!(body["message"].as_str().unwrap().contains("report"));
}

#[tokio::test]
async fn test_seed_then_get() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/documents/report/seed", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["document"]["id"], "report");

    let (status, body) = send(&app, "GET", "/api/documents/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document"], serde_json::to_value(seed_document("report")).unwrap());
}

#[tokio::test]
async fn test_instruction_and_undo() {
    let app = app();
    send(&app, "POST", "/api/documents/report/seed", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/documents/report/instruction",
        Some(json!({"selectedIds": ["intro"], "instruction": "remove this"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 1);
    let ids: Vec<&str> = body["document"]["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect();
    assert!(!ids.contains(&"intro"));

    let (status, body) = send(&app, "POST", "/api/documents/report/undo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document"], serde_json::to_value(seed_document("report")).unwrap());

    let (status, body) = send(&app, "POST", "/api/documents/report/undo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"nothingToUndo": true}));
}

#[tokio::test]
async fn test_patch_endpoint_reports_repairs() {
    let app = app();
    send(&app, "POST", "/api/documents/report/seed", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/documents/report/patch",
        Some(json!({
            "selectedIds": ["summary"],
            "candidate": {"ops": [{"op": "Edit", "blockId": "summary-text", "text": "Up 12%"}]}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["repairs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();
    send(&app, "POST", "/api/documents/report/seed", None).await;

    let cases = [
        (json!({"selectedIds": [], "candidate": {"ops": []}}), StatusCode::BAD_REQUEST, "invalid_request"),
        (
            json!({"selectedIds": ["intro"], "candidate": {"ops": [{"op": "delete_block", "id": "title"}]}}),
            StatusCode::CONFLICT,
            "out_of_scope",
        ),
        (
            json!({"selectedIds": ["intro"], "candidate": {"ops": [{"op": "update_content", "id": "intro"}]}}),
            StatusCode::UNPROCESSABLE_ENTITY,
            "structural",
        ),
        (
            json!({"selectedIds": ["summary"], "candidate": {"ops": [{"op": "update_content", "id": "revenue-chart", "content": "x"}]}}),
            StatusCode::UNPROCESSABLE_ENTITY,
            "unsupported_operation",
        ),
        (json!({"candidate": {}}), StatusCode::BAD_REQUEST, "invalid_request"),
    ];

    for (request, status, kind) in cases {
        let (actual, body) = send(&app, "POST", "/api/documents/report/patch", Some(request.clone())).await;
        assert_eq!(actual, status, "{} -> {}", request, body);
        assert_eq!(body["errorKind"], kind);
    }

    let (_, body) = send(&app, "GET", "/api/documents/report", None).await;
    assert_eq!(body["document"], serde_json::to_value(seed_document("report")).unwrap());
}

#[tokio::test]
async fn test_invalid_document_id() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/documents/bad.id/seed", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "invalid_request");
}
