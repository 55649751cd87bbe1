//! # Generation Service
//!
//! The one suspending step of an edit: asking an external model for a patch
//! candidate. Everything it returns still goes through normalization,
//! validation and the scope check before the document is touched.

use async_trait::async_trait;
use blockpatch_model::Document;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub document: Document,
    pub selected_ids: Vec<String>,
    pub instruction: String,
}

impl GenerationRequest {
    pub fn new(document: Document, selected_ids: Vec<String>, instruction: impl Into<String>) -> Self {
        Self {
            document,
            selected_ids,
            instruction: instruction.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation service rejected credentials: {0}")]
    InvalidCredentials(String),

    #[error("Generation service timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Generation service unreachable: {0}")]
    Network(String),

    #[error("Generation service returned unusable output: {0}")]
    MalformedOutput(String),

    #[error("Failed to build generation request: {0}")]
    Request(String),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidCredentials(_) => "invalid_credentials",
            GenerationError::Timeout(_) => "timeout",
            GenerationError::Network(_) => "network",
            GenerationError::MalformedOutput(_) => "malformed_output",
            GenerationError::Request(_) => "request",
        }
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Raw candidate JSON, not yet normalized
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError>;
}

/// Run one generation call under a deadline
///
/// The call is dropped on expiry. Nothing has been mutated at this point, so
/// a timeout is a plain request failure and is never retried here.
pub async fn generate_with_timeout(
    service: &dyn GenerationService,
    request: &GenerationRequest,
    timeout: Duration,
) -> Result<Value, GenerationError> {
    match tokio::time::timeout(timeout, service.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout(timeout)),
    }
}
