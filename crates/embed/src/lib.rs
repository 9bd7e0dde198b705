//! SimSearch embedding backends
//!
//! `Embedder` abstraction plus HTTP clients for Ollama and the
//! sentence-embedder service.

mod embedder;
mod fixed;
mod ollama;
mod sentence;
mod types;

pub use embedder::{validate_batch, Embedder};
pub use fixed::StaticEmbedder;
pub use ollama::OllamaEmbedder;
pub use sentence::SentenceEmbedderClient;
pub use types::{EmbedBatchRequest, EmbedBatchResponse, EmbedRequest, EmbedResponse, EncodeRequest};

use simsearch_common::{AppConfig, Result, SimSearchError};
use std::sync::Arc;
use std::time::Duration;

/// Timeout for a single embedding call
const EMBED_TIMEOUT: Duration = Duration::from_secs(120);

/// Create the process-wide embedder selected by configuration
pub fn create_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    match config.embedder_provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            &config.embedder_base_url,
            &config.embedding_model,
            EMBED_TIMEOUT,
        )?)),
        "sentence-embedder" => Ok(Arc::new(SentenceEmbedderClient::new(
            &config.embedder_base_url,
            &config.embedding_model,
            EMBED_TIMEOUT,
        )?)),
        other => Err(SimSearchError::config(format!("Unknown embedder provider '{}'", other))),
    }
}
