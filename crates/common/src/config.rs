use crate::error::SimSearchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Embedding backends that can be selected through configuration
pub const EMBEDDER_PROVIDERS: &[&str] = &["ollama", "sentence-embedder"];

/// SimSearch application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Shared bearer token for the HTTP API
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,

    /// Remote location of embedding tables (handle is appended)
    pub table_base_url: String,

    /// Directory for per-request scratch copies of fetched tables
    pub scratch_dir: PathBuf,

    /// Upper bound on a single table download
    pub fetch_timeout_secs: u64,

    /// Embedding backend name
    pub embedder_provider: String,

    /// Embedding backend base URL
    pub embedder_base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Log directory (console only when unset)
    pub log_dir: Option<PathBuf>,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8601,
            auth_token: None,
            table_base_url: "http://localhost:8585/embeddings".to_string(),
            scratch_dir: PathBuf::from("./_temp"),
            fetch_timeout_secs: 30,
            embedder_provider: "ollama".to_string(),
            embedder_base_url: "http://localhost:11434".to_string(),
            embedding_model: "all-minilm".to_string(),
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, SimSearchError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let config = Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")?.unwrap_or(defaults.server_port),
            auth_token: std::env::var("AUTH_TOKEN").ok().filter(|t| !t.is_empty()),
            table_base_url: std::env::var("DB_ENDPOINT").unwrap_or(defaults.table_base_url),
            scratch_dir: Self::get_env_path("SCRATCH_DIR").unwrap_or(defaults.scratch_dir),
            fetch_timeout_secs: Self::get_env_parsed("FETCH_TIMEOUT_SECS")?
                .unwrap_or(defaults.fetch_timeout_secs),
            embedder_provider: std::env::var("EMBEDDER_PROVIDER")
                .unwrap_or(defaults.embedder_provider),
            embedder_base_url: std::env::var("EMBEDDER_BASE_URL")
                .unwrap_or(defaults.embedder_base_url),
            embedding_model: std::env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            log_dir: Self::get_env_path("LOG_DIR"),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    /// Parse a numeric environment variable, rejecting garbage instead of ignoring it
    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, SimSearchError> {
        match std::env::var(key) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| SimSearchError::config(format!("{} has invalid value '{}'", key, raw))),
            Err(_) => Ok(None),
        }
    }

    /// Ensure the scratch directory exists, create if not
    pub fn ensure_directories(&self) -> Result<(), SimSearchError> {
        if !self.scratch_dir.exists() {
            std::fs::create_dir_all(&self.scratch_dir).map_err(|e| {
                SimSearchError::config(format!(
                    "Failed to create scratch directory {}: {}",
                    self.scratch_dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Table download timeout
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SimSearchError> {
        for (name, url) in [
            ("DB_ENDPOINT", &self.table_base_url),
            ("EMBEDDER_BASE_URL", &self.embedder_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SimSearchError::config(format!(
                    "{} must start with http:// or https://",
                    name
                )));
            }
        }

        if !EMBEDDER_PROVIDERS.contains(&self.embedder_provider.as_str()) {
            return Err(SimSearchError::config(format!(
                "Unknown embedder provider '{}' (expected one of {:?})",
                self.embedder_provider, EMBEDDER_PROVIDERS
            )));
        }

        if self.embedding_model.is_empty() {
            return Err(SimSearchError::config("Embedding model name cannot be empty"));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(SimSearchError::config("Server port cannot be 0"));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(SimSearchError::config("Fetch timeout cannot be 0"));
        }

        Ok(())
    }

    /// Token the server authenticates against; required to serve
    pub fn require_auth_token(&self) -> Result<&str, SimSearchError> {
        self.auth_token
            .as_deref()
            .ok_or_else(|| SimSearchError::config("AUTH_TOKEN must be set to serve requests"))
    }
}
