use serde::{Deserialize, Serialize};
use simsearch_common::{Result, SimSearchError};

/// Result count when a search request omits `limit`
pub const DEFAULT_LIMIT: usize = 10;

/// Raw search request body
///
/// Fields are optional here so that missing ones surface as
/// `InvalidRequest` rather than a framework parse error.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    /// Table handle
    #[serde(default, alias = "embeddings_file_hash")]
    pub table_handle: Option<String>,

    /// Text to search for
    #[serde(default, alias = "text")]
    pub query_text: Option<String>,

    /// Maximum number of matches
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Validated search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub table_handle: String,
    pub query_text: String,
    pub limit: usize,
}

impl SearchRequest {
    /// Parse a JSON body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| SimSearchError::invalid_request(format!("malformed request body: {}", e)))
    }

    /// Check required fields and the limit
    pub fn validate(self) -> Result<SearchParams> {
        let table_handle = self
            .table_handle
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| SimSearchError::invalid_request("'table_handle' is required"))?;

        let query_text = self
            .query_text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SimSearchError::invalid_request("'query_text' is required"))?;

        let limit = match self.limit {
            None => DEFAULT_LIMIT,
            Some(n) if n >= 1 => usize::try_from(n)
                .map_err(|_| SimSearchError::invalid_request(format!("'limit' {} is too large", n)))?,
            Some(n) => {
                return Err(SimSearchError::invalid_request(format!(
                    "'limit' must be at least 1, got {}",
                    n
                )))
            }
        };

        Ok(SearchParams {
            table_handle,
            query_text,
            limit,
        })
    }
}

/// Single-text encode request body
#[derive(Debug, Deserialize)]
pub struct EncodeTextRequest {
    pub text: Option<String>,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error kind
    pub error: String,
    pub message: String,
}

/// Health check body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub embedder: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<SearchParams> {
        SearchRequest::from_json(body.as_bytes())?.validate()
    }

    #[test]
    fn test_defaults_limit() {
        let params = parse(r#"{"table_handle":"Qm1","query_text":"happy"}"#).unwrap();
        assert_eq!(params.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let params = parse(r#"{"embeddings_file_hash":"Qm1","text":"happy","limit":3}"#).unwrap();
        assert_eq!(
            params,
            SearchParams {
                table_handle: "Qm1".to_string(),
                query_text: "happy".to_string(),
                limit: 3,
            }
        );
    }

    #[test]
    fn test_rejects_zero_and_negative_limit() {
        for body in [
            r#"{"table_handle":"Qm1","query_text":"happy","limit":0}"#,
            r#"{"table_handle":"Qm1","query_text":"happy","limit":-2}"#,
            r#"{"table_handle":"Qm1","query_text":"happy","limit":1.5}"#,
            r#"{"table_handle":"Qm1","query_text":"happy","limit":"3"}"#,
        ] {
            let err = parse(body).unwrap_err();
            assert_eq!(err.kind(), "invalid_request", "body {}", body);
        }
    }

    #[test]
    fn test_rejects_missing_fields() {
        for body in [
            r#"{"query_text":"happy"}"#,
            r#"{"table_handle":"Qm1"}"#,
            r#"{"table_handle":"Qm1","query_text":"  "}"#,
            r#"{"table_handle":42,"query_text":"happy"}"#,
            "not json",
        ] {
            assert_eq!(parse(body).unwrap_err().status_code(), 400, "body {}", body);
        }
    }
}
