use ndarray::{Array1, ArrayView1};
use simsearch_common::{Result, SimSearchError};
use tracing::debug;

use crate::table::EmbeddingTable;
use crate::types::RankedMatch;

/// Cosine similarity of two equal-length vectors
///
/// Accumulates in `f64` so squared norms of any finite `f32` vector neither
/// overflow nor underflow. Errors instead of returning NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(SimSearchError::DimensionMismatch {
            id: String::new(),
            expected: a.len(),
            actual: b.len(),
        });
    }

    let a = widen(a);
    let b = widen(b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimSearchError::zero_norm("cosine similarity undefined for zero vector"));
    }

    finite_score(a.dot(&b) / (norm_a * norm_b), "")
}

fn widen(v: &[f32]) -> Array1<f64> {
    ArrayView1::from(v).mapv(f64::from)
}

/// Narrow a cosine to `f32`, clamped to [-1, 1]
///
/// Non-finite input elements are the only way to get here with NaN.
fn finite_score(score: f64, id: &str) -> Result<f32> {
    if !score.is_finite() {
        return Err(SimSearchError::malformed_vector(format!(
            "similarity with record '{}' is not finite",
            id
        )));
    }
    Ok(score.clamp(-1.0, 1.0) as f32)
}

/// Rank every record of `table` against `query`, best first
///
/// Ties keep table order, so identical inputs always produce identical
/// output. At most `limit` matches are returned.
pub fn rank(query: &[f32], table: &EmbeddingTable, limit: usize) -> Result<Vec<RankedMatch>> {
    if limit == 0 {
        return Err(SimSearchError::InvalidLimit(limit));
    }

    let q = widen(query);
    let query_norm = q.dot(&q).sqrt();
    if query_norm == 0.0 {
        return Err(SimSearchError::zero_norm("query vector has zero norm"));
    }

    let mut results = Vec::with_capacity(table.len());
    for record in table.records() {
        if record.vector.len() != query.len() {
            return Err(SimSearchError::DimensionMismatch {
                id: record.id.clone(),
                expected: query.len(),
                actual: record.vector.len(),
            });
        }

        let r = widen(&record.vector);
        let record_norm = r.dot(&r).sqrt();
        if record_norm == 0.0 {
            return Err(SimSearchError::zero_norm(format!(
                "record '{}' has zero norm",
                record.id
            )));
        }

        let score = finite_score(q.dot(&r) / (query_norm * record_norm), &record.id)?;
        results.push(RankedMatch::new(record.id.clone(), score));
    }

    // Stable sort: equal scores stay in table order
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(limit);

    debug!(
        "Ranked {} records (limit={}, top={:?})",
        table.len(),
        limit,
        results.first().map(|m| m.id.as_str())
    );
    Ok(results)
}
