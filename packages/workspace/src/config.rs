use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "blockpatch.config.json";

pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config value `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Blockpatch configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Directory holding one `<id>.json` per document
    pub store_dir: String,

    /// Undo snapshots kept per document
    pub history_capacity: usize,

    pub generation: GenerationConfig,

    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,

    pub model: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    pub timeout_secs: u64,

    pub temperature: f32,

    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: "documents".to_string(),
            history_capacity: blockpatch_editor::DEFAULT_CAPACITY,
            generation: GenerationConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "BLOCKPATCH_API_KEY".to_string(),
            timeout_secs: 90,
            temperature: 0.2,
            max_tokens: 2048,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

impl Config {
    /// Load config from a directory, falling back to defaults if absent
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if !path.exists() {
            return Ok(Config::default());
        }

        Self::load_file(&path)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "historyCapacity",
                message: "must be at least 1".to_string(),
            });
        }

        let timeout = self.generation.timeout_secs;
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout) {
            return Err(ConfigError::Invalid {
                field: "generation.timeoutSecs",
                message: format!(
                    "must be between {} and {}, got {}",
                    MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, timeout
                ),
            });
        }

        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Store directory resolved against `dir` unless already absolute
    pub fn store_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.store_dir)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "storeDir": "data/docs",
            "historyCapacity": 5,
            "generation": { "model": "local-model", "timeoutSecs": 30 },
            "server": { "port": 8080 }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.store_dir, "data/docs");
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.generation.model, "local-model");
        assert_eq!(config.generation.timeout_secs, 30);
        assert_eq!(config.generation.api_key_env, "BLOCKPATCH_API_KEY");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store_dir, "documents");
        assert_eq!(config.history_capacity, 20);
        assert_eq!(config.generation.timeout(), Duration::from_secs(90));
        assert_eq!(config.server_addr(), "127.0.0.1:3030");
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = Config {
            history_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "historyCapacity", .. })
        ));
    }

    #[test]
    fn test_rejects_timeout_out_of_range() {
        for timeout_secs in [0, 601] {
            let mut config = Config::default();
            config.generation.timeout_secs = timeout_secs;
            assert!(config.validate().is_err(), "timeout {} accepted", timeout_secs);
        }
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{"historyCapacity": 0}"#).unwrap();
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::Invalid { .. })));

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::Parse { .. })));
    }
}
