use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Failure to decode or check a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid document JSON: {0}")]
    Json(String),

    #[error("Constraint violated at {path}: {message}")]
    Constraint { path: String, message: String },

    #[error("Duplicate id in document tree: {0}")]
    DuplicateId(String),
}

impl ModelError {
    pub fn constraint(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Constraint {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Json(e.to_string())
    }
}

/// A candidate patch failed structural validation
///
/// `path` points at the offending value, e.g. `ops[1].block.columns[0].nodes[2].level`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid patch at {path}: {message}")]
pub struct StructuralError {
    pub path: String,
    pub message: String,
}

impl StructuralError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<ModelError> for StructuralError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Constraint { path, message } => StructuralError { path, message },
            ModelError::DuplicateId(id) => {
                StructuralError::new("$", format!("duplicate id `{}`", id))
            }
            ModelError::Json(message) => StructuralError::new("$", message),
        }
    }
}
