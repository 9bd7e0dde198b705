//! SimSearch Vector Search
//!
//! Embedding tables, cosine ranking, remote table retrieval and the
//! accuracy harness.

pub mod accuracy;
pub mod codec;
pub mod ranker;
pub mod store;
pub mod table;
pub mod types;

pub use accuracy::{accuracy_percent, AccuracyHarness, CandidateReport, ScoredCase, ScoredCorpus};
pub use ranker::{cosine_similarity, rank};
pub use store::TableStore;
pub use table::{read_corpus, read_corpus_path, EmbeddingTable};
pub use types::{CorpusEntry, RankedMatch, Record};
