use async_trait::async_trait;
use simsearch_common::{Result, SimSearchError};

/// Text to fixed-length vector capability
///
/// Implementations must be deterministic for a fixed model: the same text
/// always maps to the same vector, and every vector produced by one
/// configured instance has the same length.
///
/// The trait requires `Send + Sync` so one instance can be shared across
/// request handlers. Backends that cannot serve concurrent calls must
/// serialize them internally.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Backend/model label used in logs and health output
    fn name(&self) -> &str;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, one vector per input in input order
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Check a batch result against its input
///
/// Guards the per-text correspondence callers rely on: one non-empty
/// vector per text, all of the same length.
pub fn validate_batch(input_len: usize, vectors: &[Vec<f32>]) -> Result<()> {
    if vectors.len() != input_len {
        return Err(SimSearchError::embedding(format!(
            "embedder returned {} vectors for {} texts",
            vectors.len(),
            input_len
        )));
    }

    let Some(first) = vectors.first() else {
        return Ok(());
    };
    if first.is_empty() {
        return Err(SimSearchError::embedding("embedder returned an empty vector"));
    }

    if let Some((idx, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != first.len()) {
        return Err(SimSearchError::embedding(format!(
            "embedder returned vector of length {} at position {}, expected {}",
            v.len(),
            idx,
            first.len()
        )));
    }

    Ok(())
}
