use async_trait::async_trait;
use simsearch_common::{Result, SimSearchError};
use std::collections::HashMap;

use crate::embedder::Embedder;

/// Deterministic in-memory embedder
///
/// Maps known texts to fixed vectors. Used for fixtures and offline runs
/// where no model server is available.
#[derive(Debug, Clone, Default)]
pub struct StaticEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl StaticEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a text
    pub fn with(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<f32>)> for StaticEmbedder {
    fn from_iter<I: IntoIterator<Item = (S, Vec<f32>)>>(iter: I) -> Self {
        Self {
            vectors: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    fn name(&self) -> &str {
        "static"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| SimSearchError::embedding(format!("no vector registered for '{}'", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_text() {
        let embedder = StaticEmbedder::new()
            .with("happy", vec![1.0, 0.0])
            .with("sad", vec![0.0, 1.0]);

        assert_eq!(embedder.embed("happy").await.unwrap(), vec![1.0, 0.0]);
        assert!(embedder.embed("bored").await.is_err());
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder: StaticEmbedder = [("angry", vec![-1.0, 0.0])].into_iter().collect();
        let first = embedder.embed("angry").await.unwrap();
        let second = embedder.embed("angry").await.unwrap();
        assert_eq!(first, second);
    }
}
