/// SimSearch error types
#[derive(Debug, thiserror::Error)]
pub enum SimSearchError {
    /// Missing or incorrect credential
    #[error("Unauthorized: missing or invalid credential")]
    Unauthorized,

    /// Missing or malformed request fields
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Ranking limit below 1
    #[error("Invalid limit {0}: limit must be at least 1")]
    InvalidLimit(usize),

    /// Remote table could not be retrieved
    #[error("Table '{handle}' unavailable: {cause}")]
    RemoteUnavailable { handle: String, cause: String },

    /// Persisted or fetched table is not well formed
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// Vector field is not a bracketed numeric sequence
    #[error("Malformed vector: {0}")]
    MalformedVector(String),

    /// Record vector length differs from the query length
    #[error("Dimension mismatch for '{id}': expected {expected}, got {actual}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    /// Cosine similarity undefined for a zero vector
    #[error("Zero norm: {0}")]
    ZeroNorm(String),

    /// Two entries share an id
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Corpus has no entries
    #[error("Corpus is empty")]
    EmptyCorpus,

    /// Embedder failed or returned an unusable result
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimSearchError {
    /// Create invalid request error
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create remote unavailable error
    pub fn remote_unavailable(handle: impl Into<String>, cause: impl ToString) -> Self {
        Self::RemoteUnavailable {
            handle: handle.into(),
            cause: cause.to_string(),
        }
    }

    /// Create malformed table error
    pub fn malformed_table<S: Into<String>>(msg: S) -> Self {
        Self::MalformedTable(msg.into())
    }

    /// Create malformed vector error
    pub fn malformed_vector<S: Into<String>>(msg: S) -> Self {
        Self::MalformedVector(msg.into())
    }

    /// Create zero norm error
    pub fn zero_norm<S: Into<String>>(msg: S) -> Self {
        Self::ZeroNorm(msg.into())
    }

    /// Create embedding error
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

impl SimSearchError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidLimit(_) => "invalid_limit",
            Self::RemoteUnavailable { .. } => "remote_unavailable",
            Self::MalformedTable(_) => "malformed_table",
            Self::MalformedVector(_) => "malformed_vector",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::ZeroNorm(_) => "zero_norm",
            Self::DuplicateId(_) => "duplicate_id",
            Self::EmptyCorpus => "empty_corpus",
            Self::Embedding(_) => "embedding_unavailable",
            Self::Config(_) => "config",
            Self::Io(_) | Self::Json(_) | Self::Other(_) => "internal",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::InvalidRequest(_) => 400,
            Self::InvalidLimit(_) => 400,
            Self::DuplicateId(_) => 400,
            Self::EmptyCorpus => 400,
            Self::MalformedTable(_) => 422,
            Self::MalformedVector(_) => 422,
            Self::DimensionMismatch { .. } => 422,
            Self::ZeroNorm(_) => 422,
            Self::RemoteUnavailable { .. } => 502,
            Self::Embedding(_) => 503,
            Self::Config(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 500,
            Self::Other(_) => 500,
        }
    }

    /// Whether a caller may reasonably retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. } | Self::Embedding(_))
    }

    /// Message safe to show to a client
    ///
    /// Internal failures can carry filesystem paths, so they are replaced
    /// with a generic message.
    pub fn public_message(&self) -> String {
        match self.status_code() {
            500 => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}
