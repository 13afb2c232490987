//! Configuration loading, validation, and management for medbrief.
//!
//! Loads configuration from `~/.medbrief/config.toml` with environment
//! variable overrides for secrets. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.medbrief/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document index (search service) settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Generation backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Retrieval limits for context assembly
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Chat session settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Document index connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search service
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Index name holding patient documents
    #[serde(default = "default_search_index")]
    pub index: String,

    /// API key. Usually left empty in the file and supplied via
    /// `MEDBRIEF_SEARCH_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-call network timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Generation backend connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the generation service
    #[serde(default = "default_backend_endpoint")]
    pub endpoint: String,

    /// Model deployment name
    #[serde(default = "default_deployment")]
    pub deployment: String,

    /// API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API key. Usually left empty in the file and supplied via
    /// `MEDBRIEF_OPENAI_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-call network timeout in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

/// Retrieval limits used by the context assembler and briefing generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Search limit when a patient scope is given
    #[serde(default = "default_scoped_limit")]
    pub scoped_search_limit: usize,

    /// Search limit for unscoped queries
    #[serde(default = "default_unscoped_limit")]
    pub unscoped_search_limit: usize,

    /// Maximum records rendered into one context block
    #[serde(default = "default_max_context_records")]
    pub max_context_records: usize,

    /// Cap on records fetched for full patient history
    #[serde(default = "default_history_fetch_cap")]
    pub history_fetch_cap: usize,
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of prior turns replayed into each prompt (2 user/assistant pairs)
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Token ceiling per chat completion
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature for chat completions
    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,
}

fn default_search_endpoint() -> String {
    "https://healthcare-search-rag.search.windows.net".into()
}
fn default_search_index() -> String {
    "patients".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_backend_endpoint() -> String {
    "https://api.openai.example.com".into()
}
fn default_deployment() -> String {
    "gpt-4o".into()
}
fn default_api_version() -> String {
    "2025-01-01-preview".into()
}
fn default_backend_timeout_secs() -> u64 {
    120
}
fn default_scoped_limit() -> usize {
    3
}
fn default_unscoped_limit() -> usize {
    5
}
fn default_max_context_records() -> usize {
    8
}
fn default_history_fetch_cap() -> usize {
    50
}
fn default_history_window() -> usize {
    4
}
fn default_chat_max_tokens() -> u32 {
    1000
}
fn default_chat_temperature() -> f32 {
    0.3
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("search", &self.search)
            .field("backend", &self.backend)
            .field("retrieval", &self.retrieval)
            .field("chat", &self.chat)
            .finish()
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("index", &self.index)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            index: default_search_index(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_backend_endpoint(),
            deployment: default_deployment(),
            api_version: default_api_version(),
            api_key: None,
            timeout_secs: default_backend_timeout_secs(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            scoped_search_limit: default_scoped_limit(),
            unscoped_search_limit: default_unscoped_limit(),
            max_context_records: default_max_context_records(),
            history_fetch_cap: default_history_fetch_cap(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_tokens: default_chat_max_tokens(),
            temperature: default_chat_temperature(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            backend: BackendConfig::default(),
            retrieval: RetrievalConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.medbrief/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `MEDBRIEF_SEARCH_KEY` for the document index
    /// - `MEDBRIEF_OPENAI_KEY` (or `AZURE_OPENAI_API_KEY`) for the backend
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.search.api_key.is_none() {
            config.search.api_key = std::env::var("MEDBRIEF_SEARCH_KEY").ok();
        }

        if config.backend.api_key.is_none() {
            config.backend.api_key = std::env::var("MEDBRIEF_OPENAI_KEY")
                .ok()
                .or_else(|| std::env::var("AZURE_OPENAI_API_KEY").ok());
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".medbrief")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "search.endpoint must not be empty".into(),
            ));
        }

        if self.backend.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "backend.endpoint must not be empty".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::ValidationError(
                "chat.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.max_context_records == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.max_context_records must be > 0".into(),
            ));
        }

        if self.chat.history_window % 2 != 0 {
            return Err(ConfigError::ValidationError(
                "chat.history_window must be even (whole user/assistant pairs)".into(),
            ));
        }

        Ok(())
    }

    /// Check if both API keys are available (from config or environment).
    pub fn has_credentials(&self) -> bool {
        self.search.api_key.is_some() && self.backend.api_key.is_some()
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.scoped_search_limit, 3);
        assert_eq!(config.retrieval.unscoped_search_limit, 5);
        assert_eq!(config.retrieval.max_context_records, 8);
        assert_eq!(config.retrieval.history_fetch_cap, 50);
        assert_eq!(config.chat.history_window, 4);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.search.index, config.search.index);
        assert_eq!(back.chat.max_tokens, config.chat.max_tokens);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let partial = r#"
            [search]
            index = "patients_v2"
        "#;
        let config: AppConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.search.index, "patients_v2");
        assert_eq!(config.retrieval.max_context_records, 8);
        assert_eq!(config.backend.deployment, "gpt-4o");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.search.index, "patients");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chat]\ntemperature = 3.5").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn odd_history_window_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chat]\nhistory_window = 3").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("history_window"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.search.api_key = Some("super-secret".into());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
