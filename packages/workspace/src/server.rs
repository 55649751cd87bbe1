//! HTTP API over [`EditService`]
//!
//! ```text
//! GET  /api/documents/:id
//! POST /api/documents/:id/instruction   {selectedIds, instruction}
//! POST /api/documents/:id/patch         {selectedIds, candidate}
//! POST /api/documents/:id/undo
//! POST /api/documents/:id/seed
//! ```
//!
//! Successful edits answer `{document}`; failures answer
//! `{errorKind, message}`.

use crate::service::{EditError, EditService, UndoOutcome};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use blockpatch_editor::{PatchError, PipelineError};
use blockpatch_model::Document;
use blockpatch_normalizer::Repair;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionRequest {
    pub selected_ids: Vec<String>,
    pub instruction: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    pub selected_ids: Vec<String>,
    pub candidate: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub document: Document,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<Repair>,
}

impl DocumentResponse {
    fn plain(document: &Document) -> Self {
        Self {
            document: document.clone(),
            version: None,
            repairs: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NothingToUndoResponse {
    pub nothing_to_undo: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_kind: &'static str,
    pub message: String,
}

pub fn status_for(error: &EditError) -> StatusCode {
    match error {
        EditError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        EditError::NotFound(_) => StatusCode::NOT_FOUND,
        EditError::Pipeline(PipelineError::Structural(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        EditError::Pipeline(PipelineError::Patch(PatchError::NotFound(_)))
        | EditError::Pipeline(PipelineError::Patch(PatchError::Unsupported { .. })) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EditError::Pipeline(_) => StatusCode::CONFLICT,
        EditError::Generation(_) => StatusCode::BAD_GATEWAY,
        EditError::Storage(crate::store::StoreError::InvalidId(_)) => StatusCode::BAD_REQUEST,
        EditError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for EditError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let body = ErrorResponse {
            error_kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, EditError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, EditError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| EditError::InvalidRequest(rejection.body_text()))
}

pub fn router(service: Arc<EditService>) -> Router {
    Router::new()
        .route("/api/documents/:id", get(get_document))
        .route("/api/documents/:id/instruction", post(post_instruction))
        .route("/api/documents/:id/patch", post(post_patch))
        .route("/api/documents/:id/undo", post(post_undo))
        .route("/api/documents/:id/seed", post(post_seed))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn get_document(
    State(service): State<Arc<EditService>>,
    Path(id): Path<String>,
) -> ApiResult<DocumentResponse> {
    let document = service.document(&id).await?;
    Ok(Json(DocumentResponse::plain(&document)))
}

async fn post_instruction(
    State(service): State<Arc<EditService>>,
    Path(id): Path<String>,
    payload: Result<Json<InstructionRequest>, JsonRejection>,
) -> ApiResult<DocumentResponse> {
    let request = body(payload)?;
    tracing::info!(document_id = %id, selected = request.selected_ids.len(), "instruction request");

    let outcome = service
        .apply_instruction(&id, &request.selected_ids, &request.instruction)
        .await?;

    Ok(Json(DocumentResponse {
        document: (*outcome.document).clone(),
        version: Some(outcome.version),
        repairs: outcome.repairs,
    }))
}

async fn post_patch(
    State(service): State<Arc<EditService>>,
    Path(id): Path<String>,
    payload: Result<Json<PatchRequest>, JsonRejection>,
) -> ApiResult<DocumentResponse> {
    let request = body(payload)?;

    let outcome = service
        .apply_candidate(&id, &request.selected_ids, &request.candidate)
        .await?;

    Ok(Json(DocumentResponse {
        document: (*outcome.document).clone(),
        version: Some(outcome.version),
        repairs: outcome.repairs,
    }))
}

async fn post_undo(
    State(service): State<Arc<EditService>>,
    Path(id): Path<String>,
) -> Result<Response, EditError> {
    match service.undo(&id).await? {
        UndoOutcome::Restored(document) => Ok(Json(DocumentResponse::plain(&document)).into_response()),
        UndoOutcome::NothingToUndo => Ok(Json(NothingToUndoResponse { nothing_to_undo: true }).into_response()),
    }
}

async fn post_seed(
    State(service): State<Arc<EditService>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<DocumentResponse>), EditError> {
    let document = service.create_from_seed(&id).await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::plain(&document))))
}
