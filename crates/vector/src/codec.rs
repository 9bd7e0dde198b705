//! Vector field codec
//!
//! A vector is stored in a table cell as a bracketed, comma-separated list
//! of numbers, e.g. `[0.1,-0.25,1.0]`. This is the JSON array form, so
//! encoding uses the shortest representation that parses back to the same
//! `f32`.

use simsearch_common::{Result, SimSearchError};

/// Encode a vector as a bracketed numeric literal
pub fn encode(vector: &[f32]) -> Result<String> {
    if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
        return Err(SimSearchError::malformed_vector(format!(
            "element {} is not finite ({})",
            pos, vector[pos]
        )));
    }

    Ok(serde_json::to_string(vector)?)
}

/// Decode a bracketed numeric literal into a vector
pub fn decode(field: &str) -> Result<Vec<f32>> {
    let trimmed = field.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return Err(SimSearchError::malformed_vector(format!(
            "expected a bracketed list, got '{}'",
            preview(trimmed)
        )));
    }

    let vector: Vec<f32> = serde_json::from_str(trimmed).map_err(|e| {
        SimSearchError::malformed_vector(format!("'{}': {}", preview(trimmed), e))
    })?;

    if vector.is_empty() {
        return Err(SimSearchError::malformed_vector("empty vector"));
    }
    // out-of-range literals parse as infinity
    if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
        return Err(SimSearchError::malformed_vector(format!(
            "element {} of '{}' is out of range",
            pos,
            preview(trimmed)
        )));
    }

    Ok(vector)
}

fn preview(field: &str) -> String {
    const MAX: usize = 40;
    match field.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &field[..idx]),
        None => field.to_string(),
    }
}
