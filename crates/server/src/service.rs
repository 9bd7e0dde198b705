use simsearch_common::Result;
use simsearch_embed::Embedder;
use simsearch_vector::{rank, RankedMatch, TableStore};
use std::sync::Arc;
use tracing::info;

use crate::auth::BearerAuth;
use crate::types::{SearchParams, SearchRequest};

/// Request orchestration: authenticate, embed, fetch, rank
///
/// Holds no per-request state; every call fetches its own table copy.
#[derive(Clone)]
pub struct SearchService {
    auth: BearerAuth,
    embedder: Arc<dyn Embedder>,
    store: TableStore,
}

impl SearchService {
    pub fn new(auth: BearerAuth, embedder: Arc<dyn Embedder>, store: TableStore) -> Self {
        Self {
            auth,
            embedder,
            store,
        }
    }

    /// Handle one search request body presented with `credential`
    pub async fn handle(&self, credential: Option<&str>, body: &[u8]) -> Result<Vec<RankedMatch>> {
        self.auth.verify(credential)?;
        let params = SearchRequest::from_json(body)?.validate()?;
        self.search(params).await
    }

    /// Run an already validated search
    pub async fn search(&self, params: SearchParams) -> Result<Vec<RankedMatch>> {
        let query = self.embedder.embed(&params.query_text).await?;
        let table = self.store.fetch(&params.table_handle).await?;
        let matches = rank(&query, &table, params.limit)?;

        info!(
            "Search on '{}' returned {} of {} records",
            params.table_handle,
            matches.len(),
            table.len()
        );
        Ok(matches)
    }

    pub fn auth(&self) -> &BearerAuth {
        &self.auth
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}
