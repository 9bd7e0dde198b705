//! Precision@1 evaluation of candidate embedding tables
//!
//! A fixed test set (expected id per text) is embedded once. Each candidate
//! corpus is embedded into its own table and every test vector is ranked
//! against it with `limit = 1`; the candidate scores a point when the top
//! id equals the expected id.

use serde::Serialize;
use simsearch_common::{Result, SimSearchError};
use simsearch_embed::{validate_batch, Embedder};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ranker::rank;
use crate::table::{read_corpus_path, EmbeddingTable};
use crate::types::CorpusEntry;

/// Embedded test case
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCase {
    /// Expected top-1 id
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
}

/// Read-only ground truth for an evaluation run
///
/// Several cases may share an expected id.
#[derive(Debug, Clone)]
pub struct ScoredCorpus {
    cases: Vec<ScoredCase>,
}

impl ScoredCorpus {
    /// Embed the test set
    pub async fn build(corpus: &[CorpusEntry], embedder: &dyn Embedder) -> Result<Self> {
        if corpus.is_empty() {
            return Err(SimSearchError::EmptyCorpus);
        }

        let texts: Vec<String> = corpus.iter().map(|e| e.text.clone()).collect();
        let vectors = embedder.embed_many(&texts).await?;
        validate_batch(texts.len(), &vectors)?;

        let cases = corpus
            .iter()
            .zip(vectors)
            .map(|(entry, vector)| ScoredCase {
                id: entry.id.clone(),
                text: entry.text.clone(),
                vector,
            })
            .collect();

        Ok(Self { cases })
    }

    /// Use already-embedded cases
    pub fn from_cases(cases: Vec<ScoredCase>) -> Result<Self> {
        if cases.is_empty() {
            return Err(SimSearchError::EmptyCorpus);
        }
        Ok(Self { cases })
    }

    pub fn cases(&self) -> &[ScoredCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Evaluation result for one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateReport {
    /// Candidate name (file name for directory runs)
    pub name: String,

    /// Test cases whose top match was the expected id
    pub correct: usize,

    pub total: usize,

    /// `ceil(100 * correct / total)`
    pub accuracy: u32,
}

/// Percentage of correct cases, rounded up
pub fn accuracy_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((100 * correct).div_ceil(total)) as u32
}

/// Scores candidate tables against a fixed test set
pub struct AccuracyHarness {
    test_set: ScoredCorpus,
}

impl AccuracyHarness {
    pub fn new(test_set: ScoredCorpus) -> Self {
        Self { test_set }
    }

    pub fn test_set(&self) -> &ScoredCorpus {
        &self.test_set
    }

    /// Precision@1 of `candidate` over the test set
    pub fn evaluate(&self, name: &str, candidate: &EmbeddingTable) -> Result<CandidateReport> {
        let mut correct = 0;
        for case in self.test_set.cases() {
            let top = rank(&case.vector, candidate, 1)?;
            if top.first().is_some_and(|m| m.id == case.id) {
                correct += 1;
            }
        }

        let total = self.test_set.len();
        let report = CandidateReport {
            name: name.to_string(),
            correct,
            total,
            accuracy: accuracy_percent(correct, total),
        };

        info!(
            "Candidate {}: {}/{} correct ({}%)",
            report.name, report.correct, report.total, report.accuracy
        );
        Ok(report)
    }

    /// Embed and evaluate every `*.csv` candidate corpus in `dir`
    ///
    /// Candidates are processed in file-name order so reports are
    /// reproducible.
    pub async fn run(&self, dir: &Path, embedder: &dyn Embedder) -> Result<Vec<CandidateReport>> {
        let candidates = discover_candidates(dir).await?;
        info!("Evaluating {} candidates from {}", candidates.len(), dir.display());

        let mut reports = Vec::with_capacity(candidates.len());
        for path in candidates {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let corpus = read_corpus_path(&path)?;
            let table = EmbeddingTable::build(&corpus, embedder).await?;
            reports.push(self.evaluate(&name, &table)?);
        }

        Ok(reports)
    }
}

/// `*.csv` files directly inside `dir`, sorted by file name
pub async fn discover_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("csv") {
            found.push(path);
        }
    }

    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use simsearch_embed::StaticEmbedder;

    fn case(id: &str, vector: Vec<f32>) -> ScoredCase {
        ScoredCase {
            id: id.to_string(),
            text: id.to_string(),
            vector,
        }
    }

    fn candidate() -> EmbeddingTable {
        EmbeddingTable::from_records(vec![
            Record::new("happy", vec![1.0, 0.0]),
            Record::new("sad", vec![0.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_accuracy_percent() {
        assert_eq!(accuracy_percent(2, 2), 100);
        assert_eq!(accuracy_percent(1, 2), 50);
        assert_eq!(accuracy_percent(1, 3), 34);
        assert_eq!(accuracy_percent(0, 5), 0);
    }

    #[test]
    fn test_all_correct() {
        let harness = AccuracyHarness::new(
            ScoredCorpus::from_cases(vec![case("happy", vec![0.9, 0.1]), case("sad", vec![0.2, 0.8])]).unwrap(),
        );
        let report = harness.evaluate("a.csv", &candidate()).unwrap();
        assert_eq!(report.accuracy, 100);
        assert_eq!(report.correct, 2);
    }

    #[test]
    fn test_half_correct() {
        let harness = AccuracyHarness::new(
            ScoredCorpus::from_cases(vec![case("happy", vec![0.9, 0.1]), case("sad", vec![0.9, 0.2])]).unwrap(),
        );
        let report = harness.evaluate("b.csv", &candidate()).unwrap();
        assert_eq!(report.correct, 1);
        assert_eq!(report.accuracy, 50);
    }

    #[test]
    fn test_empty_candidate_scores_zero() {
        let harness =
            AccuracyHarness::new(ScoredCorpus::from_cases(vec![case("happy", vec![1.0, 0.0])]).unwrap());
        let report = harness.evaluate("empty", &EmbeddingTable::default()).unwrap();
        assert_eq!(report.accuracy, 0);
    }

    #[test]
    fn test_empty_test_set_rejected() {
        assert!(matches!(
            ScoredCorpus::from_cases(Vec::new()),
            Err(SimSearchError::EmptyCorpus)
        ));
    }

    #[tokio::test]
    async fn test_run_over_directory_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_weak.csv"), "id,text\nhappy,gloomy\nsad,cheerful\n").unwrap();
        std::fs::write(dir.path().join("a_strong.csv"), "id,text\nhappy,cheerful\nsad,gloomy\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let embedder = StaticEmbedder::new()
            .with("joyful", vec![1.0, 0.1])
            .with("down", vec![0.1, 1.0])
            .with("cheerful", vec![1.0, 0.0])
            .with("gloomy", vec![0.0, 1.0]);

        let test_set = ScoredCorpus::build(
            &[CorpusEntry::new("happy", "joyful"), CorpusEntry::new("sad", "down")],
            &embedder,
        )
        .await
        .unwrap();

        let reports = AccuracyHarness::new(test_set)
            .run(dir.path(), &embedder)
            .await
            .unwrap();

        let summary: Vec<_> = reports.iter().map(|r| (r.name.as_str(), r.accuracy)).collect();
        assert_eq!(summary, vec![("a_strong.csv", 100), ("b_weak.csv", 0)]);
    }
}
