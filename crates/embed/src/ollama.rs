use async_trait::async_trait;
use reqwest::Client;
use simsearch_common::{Result, SimSearchError};
use std::time::Duration;
use tracing::{debug, info};

use crate::embedder::{validate_batch, Embedder};
use crate::types::{EmbedBatchRequest, EmbedBatchResponse, EmbedRequest, EmbedResponse};

/// Embedder backed by an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    label: String,
    client: Client,
}

impl OllamaEmbedder {
    /// Create new Ollama embedder
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Ollama embedder initialized: {} (model {})", base_url, model);
        Ok(Self {
            label: format!("ollama/{}", model),
            base_url,
            model,
            client,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn name(&self) -> &str {
        &self.label
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        debug!("Generating embedding - Model: {}, Text length: {}", self.model, text.len());

        let request = EmbedRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SimSearchError::embedding(format!("Failed to send embedding request: {}", e.without_url())))?
            .error_for_status()
            .map_err(|e| SimSearchError::embedding(format!("Ollama embedding API error: {}", e.without_url())))?;

        let result: EmbedResponse = response.json().await.map_err(|e| {
            SimSearchError::embedding(format!("Failed to parse embedding response: {}", e.without_url()))
        })?;

        if result.embedding.is_empty() {
            return Err(SimSearchError::embedding("Empty embedding from Ollama"));
        }

        debug!("Received embedding - Dimension: {}", result.embedding.len());
        Ok(result.embedding)
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        debug!("Generating {} embeddings - Model: {}", texts.len(), self.model);

        let request = EmbedBatchRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SimSearchError::embedding(format!("Failed to send batch embedding request: {}", e.without_url())))?
            .error_for_status()
            .map_err(|e| SimSearchError::embedding(format!("Ollama embedding API error: {}", e.without_url())))?;

        let result: EmbedBatchResponse = response.json().await.map_err(|e| {
            SimSearchError::embedding(format!("Failed to parse batch embedding response: {}", e.without_url()))
        })?;

        validate_batch(texts.len(), &result.embeddings)?;
        Ok(result.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simsearch_test_utils::{serve_canned, JSON};

    fn embedder(base_url: &str) -> OllamaEmbedder {
        OllamaEmbedder::new(base_url, "all-minilm", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_embed_single() {
        let base = serve_canned(200, JSON, r#"{"embedding":[0.5,-0.5,1.0]}"#).await.unwrap();
        let vector = embedder(&base).embed("happy").await.unwrap();
        assert_eq!(vector, vec![0.5, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_embed_empty_vector_is_error() {
        let base = serve_canned(200, JSON, r#"{"embedding":[]}"#).await.unwrap();
        let err = embedder(&base).embed("happy").await.unwrap_err();
        assert_eq!(err.kind(), "embedding_unavailable");
    }

    #[tokio::test]
    async fn test_embed_many_checks_count() {
        let base = serve_canned(200, JSON, r#"{"embeddings":[[1.0,0.0]]}"#).await.unwrap();
        let texts = vec!["happy".to_string(), "sad".to_string()];
        assert!(embedder(&base).embed_many(&texts).await.is_err());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_embedding_error() {
        let base = serve_canned(500, JSON, r#"{"error":"model not loaded"}"#).await.unwrap();
        let err = embedder(&base).embed("happy").await.unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert!(!err.public_message().contains(&base), "{}", err.public_message());
    }

    #[test]
    fn test_name_includes_model() {
        let embedder = embedder("http://localhost:11434/");
        assert_eq!(embedder.name(), "ollama/all-minilm");
        assert_eq!(embedder.base_url, "http://localhost:11434");
    }
}
