use async_trait::async_trait;
use reqwest::Client;
use simsearch_common::{Result, SimSearchError};
use std::time::Duration;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::types::EncodeRequest;

/// Embedder backed by a sentence-embedder service exposing `POST /encode`
///
/// The service answers `{"text": ...}` with a bare JSON array.
#[derive(Debug, Clone)]
pub struct SentenceEmbedderClient {
    base_url: String,
    label: String,
    client: Client,
}

impl SentenceEmbedderClient {
    pub fn new(base_url: impl Into<String>, model: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Sentence embedder client initialized: {}", base_url);
        Ok(Self {
            label: format!("sentence-embedder/{}", model),
            base_url,
            client,
        })
    }
}

#[async_trait]
impl Embedder for SentenceEmbedderClient {
    fn name(&self) -> &str {
        &self.label
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/encode", self.base_url);
        debug!("Encoding text - length: {}", text.len());

        let vector: Vec<f32> = self
            .client
            .post(&url)
            .json(&EncodeRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| SimSearchError::embedding(format!("Failed to reach sentence embedder: {}", e.without_url())))?
            .error_for_status()
            .map_err(|e| SimSearchError::embedding(format!("Sentence embedder error: {}", e.without_url())))?
            .json()
            .await
            .map_err(|e| SimSearchError::embedding(format!("Failed to parse encode response: {}", e.without_url())))?;

        if vector.is_empty() {
            return Err(SimSearchError::embedding("Empty embedding from sentence embedder"));
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simsearch_test_utils::{serve_canned, JSON};

    #[tokio::test]
    async fn test_encode_bare_array() {
        let base = serve_canned(200, JSON, "[0.25, 0.75]").await.unwrap();
        let client = SentenceEmbedderClient::new(base, "all-MiniLM-L6-v2", Duration::from_secs(5)).unwrap();

        assert_eq!(client.embed("sad").await.unwrap(), vec![0.25, 0.75]);
        assert_eq!(client.name(), "sentence-embedder/all-MiniLM-L6-v2");
    }

    #[tokio::test]
    async fn test_default_batch_preserves_order() {
        let base = serve_canned(200, JSON, "[1.0, 2.0]").await.unwrap();
        let client = SentenceEmbedderClient::new(base, "m", Duration::from_secs(5)).unwrap();

        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let vectors = client.embed_many(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let client = SentenceEmbedderClient::new("http://127.0.0.1:9", "m", Duration::from_secs(2)).unwrap();
        let err = client.embed("sad").await.unwrap_err();
        assert_eq!(err.kind(), "embedding_unavailable");
    }
}
