use serde::{Deserialize, Serialize};

/// Ollama single-text embedding request (`/api/embeddings`)
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    /// Model name (e.g., "all-minilm", "nomic-embed-text")
    pub model: String,

    /// Text to embed
    pub prompt: String,
}

/// Ollama single-text embedding response
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
}

/// Ollama batch embedding request (`/api/embed`)
#[derive(Debug, Clone, Serialize)]
pub struct EmbedBatchRequest {
    pub model: String,

    /// Texts to embed, answered in the same order
    pub input: Vec<String>,
}

/// Ollama batch embedding response
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedBatchResponse {
    pub embeddings: Vec<Vec<f32>>,
}

/// Sentence-embedder service request (`/encode`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeRequest {
    pub text: String,
}
