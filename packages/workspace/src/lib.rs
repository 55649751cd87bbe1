//! # Block Patch Workspace
//!
//! The stateful, async side of the engine: where documents live, who may
//! edit them at a time, and how instructions reach a generation service.
//!
//! - [`store`]: durable documents (`FileStore`, `MemoryStore`)
//! - [`cache`], [`history`], [`locks`]: keyed per-document state
//! - [`generator`], [`provider`], [`prompt`]: the external model
//! - [`service`]: `EditService`, the exposed edit/undo operations
//! - [`server`]: axum routes over the service

pub mod cache;
pub mod config;
pub mod generator;
pub mod history;
pub mod locks;
pub mod prompt;
pub mod provider;
pub mod server;
pub mod service;
pub mod store;

pub use cache::{CachedDocument, DocumentCache};
pub use config::{Config, ConfigError, GenerationConfig, ServerConfig, DEFAULT_CONFIG_NAME};
pub use generator::{generate_with_timeout, GenerationError, GenerationRequest, GenerationService};
pub use history::HistoryStore;
pub use locks::DocumentLocks;
pub use provider::ChatCompletionsProvider;
pub use server::router;
pub use service::{EditError, EditOutcome, EditService, UndoOutcome};
pub use store::{DocumentStore, FileStore, MemoryStore, StoreError};
