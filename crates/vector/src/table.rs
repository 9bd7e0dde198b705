use sha2::{Digest, Sha256};
use simsearch_common::{Result, SimSearchError};
use simsearch_embed::{validate_batch, Embedder};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::codec;
use crate::types::{CorpusEntry, Record};

/// Column holding record ids in tables and corpora
pub const ID_COLUMN: &str = "id";
/// Column holding encoded vectors in tables
pub const EMBEDDING_COLUMN: &str = "embedding";
/// Column holding texts in corpora
pub const TEXT_COLUMN: &str = "text";

/// Ordered collection of (id, vector) records with unique ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingTable {
    records: Vec<Record>,
}

impl EmbeddingTable {
    /// Create a table from records, rejecting blank or duplicate ids
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        validate_ids(records.iter().map(|r| r.id.as_str()))?;
        Ok(Self { records })
    }

    /// Embed a labeled corpus into a table
    ///
    /// Texts are sent as one batch; the n-th vector belongs to the n-th
    /// corpus entry.
    pub async fn build(corpus: &[CorpusEntry], embedder: &dyn Embedder) -> Result<Self> {
        if corpus.is_empty() {
            return Err(SimSearchError::EmptyCorpus);
        }
        validate_ids(corpus.iter().map(|e| e.id.as_str()))?;

        info!("Embedding {} corpus entries with {}", corpus.len(), embedder.name());

        let texts: Vec<String> = corpus.iter().map(|e| e.text.clone()).collect();
        let vectors = embedder.embed_many(&texts).await?;
        validate_batch(texts.len(), &vectors)?;

        let records = corpus
            .iter()
            .zip(vectors)
            .map(|(entry, vector)| Record::new(entry.id.clone(), vector))
            .collect();

        Ok(Self { records })
    }

    /// Parse a table from `id,embedding` CSV
    ///
    /// Ids are kept exactly as written.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| SimSearchError::malformed_table(format!("unreadable header: {}", e)))?
            .clone();
        let id_col = column_index(&headers, ID_COLUMN)?;
        let embedding_col = column_index(&headers, EMBEDDING_COLUMN)?;

        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for (idx, row) in rdr.records().enumerate() {
            // header is line 1
            let line = idx + 2;
            let row = row.map_err(|e| SimSearchError::malformed_table(format!("line {}: {}", line, e)))?;

            let id = required_field(&row, id_col, ID_COLUMN, line)?;
            check_id(id)?;
            let field = required_field(&row, embedding_col, EMBEDDING_COLUMN, line)?;
            let vector = codec::decode(field).map_err(|e| match e {
                SimSearchError::MalformedVector(msg) => SimSearchError::malformed_vector(format!(
                    "line {} (id '{}'): {}",
                    line, id, msg
                )),
                other => other,
            })?;

            if !seen.insert(id.to_string()) {
                return Err(SimSearchError::DuplicateId(id.to_string()));
            }
            records.push(Record::new(id, vector));
        }

        debug!("Loaded embedding table - {} records", records.len());
        Ok(Self { records })
    }

    /// Load a table from a CSV file
    pub fn load_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::load(std::io::BufReader::new(file))
    }

    /// Write the table as `id,embedding` CSV in table order
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([ID_COLUMN, EMBEDDING_COLUMN]).map_err(csv_write_error)?;
        for record in &self.records {
            let field = codec::encode(&record.vector)?;
            wtr.write_record([record.id.as_str(), field.as_str()])
                .map_err(csv_write_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Save the table to a CSV file
    pub fn save_path(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.save(std::io::BufWriter::new(file))
    }

    /// Serialized table bytes
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.save(&mut buf)?;
        Ok(buf)
    }

    /// SHA-256 of the serialized table, hex encoded
    ///
    /// Suitable as a content-addressed handle when publishing the table.
    pub fn content_hash(&self) -> Result<String> {
        let bytes = self.to_csv_bytes()?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Vector length of the first record
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.vector.len())
    }
}

/// Parse a labeled corpus from `id,text` CSV
pub fn read_corpus<R: Read>(reader: R) -> Result<Vec<CorpusEntry>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| SimSearchError::malformed_table(format!("unreadable header: {}", e)))?
        .clone();
    let id_col = column_index(&headers, ID_COLUMN)?;
    let text_col = column_index(&headers, TEXT_COLUMN)?;

    rdr.records()
        .enumerate()
        .map(|(idx, row)| {
            let line = idx + 2;
            let row = row.map_err(|e| SimSearchError::malformed_table(format!("line {}: {}", line, e)))?;
            let id = required_field(&row, id_col, ID_COLUMN, line)?;
            check_id(id)?;
            let text = row.get(text_col).unwrap_or_default();
            Ok(CorpusEntry::new(id, text))
        })
        .collect()
}

/// Read a labeled corpus from a CSV file
pub fn read_corpus_path(path: &Path) -> Result<Vec<CorpusEntry>> {
    let file = std::fs::File::open(path)?;
    read_corpus(std::io::BufReader::new(file))
}

/// Ids must be non-blank and unique
fn validate_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        check_id(id)?;
        if !seen.insert(id) {
            return Err(SimSearchError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

fn check_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(SimSearchError::malformed_table("blank record id"));
    }
    Ok(())
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| SimSearchError::malformed_table(format!("missing '{}' column", name)))
}

fn required_field<'r>(row: &'r csv::StringRecord, col: usize, name: &str, line: usize) -> Result<&'r str> {
    match row.get(col) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SimSearchError::malformed_table(format!(
            "line {}: empty '{}' field",
            line, name
        ))),
    }
}

fn csv_write_error(e: csv::Error) -> SimSearchError {
    SimSearchError::Io(std::io::Error::from(e))
}
