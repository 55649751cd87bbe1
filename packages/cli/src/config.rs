use anyhow::{Context, Result};
use blockpatch_workspace::{ChatCompletionsProvider, Config, EditService, FileStore, DEFAULT_CONFIG_NAME};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A directory with an optional `blockpatch.config.json` and a document store
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Load config from a directory, falling back to defaults if absent
    pub fn load(cwd: &str) -> Result<Self> {
        let root = PathBuf::from(cwd);
        let config = Config::load(&root)?;
        Ok(Self { root, config })
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(DEFAULT_CONFIG_NAME)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.config.store_path(&self.root)
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(self.store_dir())
    }

    pub fn service(&self) -> Result<EditService> {
        let provider = ChatCompletionsProvider::from_config(&self.config.generation)?;
        Ok(EditService::new(
            Arc::new(self.store()),
            Arc::new(provider),
            self.config.generation.timeout(),
            self.config.history_capacity,
        ))
    }
}

/// Read a candidate file; anything that is not plain JSON is handed to the
/// normalizer as text so it can dig the JSON out
pub fn read_candidate(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(serde_json::from_str(&content).unwrap_or(Value::String(content)))
}

/// `--select a,b --select c` → `[a, b, c]`, blanks dropped
pub fn selection(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
