use futures::StreamExt;
use reqwest::Client;
use simsearch_common::{Result, SimSearchError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::table::EmbeddingTable;

/// Fetches named embedding tables from a remote location
///
/// Every fetch downloads into its own scratch file, which is removed
/// before `fetch` returns, whatever the outcome.
#[derive(Debug, Clone)]
pub struct TableStore {
    base_url: String,
    scratch_dir: PathBuf,
    client: Client,
}

impl TableStore {
    /// Create new table store
    pub fn new(base_url: impl Into<String>, scratch_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Table store initialized: {}", base_url);
        Ok(Self {
            base_url,
            scratch_dir: scratch_dir.into(),
            client,
        })
    }

    /// Retrieval address for a handle
    pub fn table_url(&self, handle: &str) -> String {
        format!("{}/{}", self.base_url, handle)
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Download and parse the table identified by `handle`
    pub async fn fetch(&self, handle: &str) -> Result<EmbeddingTable> {
        validate_handle(handle)?;

        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let scratch = ScratchFile::new(&self.scratch_dir, handle);

        self.download(handle, scratch.path()).await?;

        let bytes = tokio::fs::read(scratch.path()).await?;
        let table = EmbeddingTable::load(bytes.as_slice())?;

        info!("Fetched table '{}' - {} records", handle, table.len());
        Ok(table)
    }

    async fn download(&self, handle: &str, dest: &Path) -> Result<()> {
        let url = self.table_url(handle);
        debug!("Downloading table '{}' from {}", handle, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(handle, e))?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| fetch_error(handle, e))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await?;
        debug!("Downloaded table '{}' - {} bytes", handle, downloaded);
        Ok(())
    }
}

/// Log the full failure and keep only its category in the error
///
/// reqwest errors carry the request URL, which must not reach clients.
fn fetch_error(handle: &str, e: reqwest::Error) -> SimSearchError {
    warn!("Fetching table '{}' failed: {}", handle, e);
    SimSearchError::remote_unavailable(handle, failure_category(&e))
}

fn failure_category(e: &reqwest::Error) -> String {
    if let Some(status) = e.status() {
        format!("remote returned HTTP {}", status.as_u16())
    } else if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else if e.is_body() || e.is_decode() {
        "transfer interrupted".to_string()
    } else {
        "request failed".to_string()
    }
}

/// Reject handles that could escape the scratch directory or the base URL
fn validate_handle(handle: &str) -> Result<()> {
    let valid = !handle.is_empty()
        && !handle.starts_with('.')
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(SimSearchError::invalid_request(format!(
            "invalid table handle '{}'",
            handle
        )))
    }
}

/// Per-call scratch file, removed on drop
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn new(dir: &Path, handle: &str) -> Self {
        Self {
            path: dir.join(format!("{}-{}.csv", handle, Uuid::new_v4())),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {}: {}", self.path.display(), e),
        }
    }
}
