use serde::{Deserialize, Serialize};

/// Embedding table record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identifier, unique within a table
    pub id: String,

    /// Embedding vector
    pub vector: Vec<f32>,
}

impl Record {
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
        }
    }
}

/// Labeled corpus row (`id,text`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Identifier the text maps to
    pub id: String,

    /// Text to embed
    pub text: String,
}

impl CorpusEntry {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Ranked similarity match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    /// Record ID
    pub id: String,

    /// Cosine similarity (-1.0 to 1.0, higher is closer)
    pub score: f32,
}

impl RankedMatch {
    pub fn new(id: String, score: f32) -> Self {
        Self { id, score }
    }
}
