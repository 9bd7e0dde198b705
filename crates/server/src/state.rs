use simsearch_common::{AppConfig, Result};
use simsearch_embed::Embedder;
use simsearch_vector::TableStore;
use std::sync::Arc;

use crate::auth::BearerAuth;
use crate::service::SearchService;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Search orchestration (owns auth, embedder and table store)
    pub search: SearchService,
}

impl AppState {
    /// Create new application state
    ///
    /// The embedder is created once by the caller and shared read-only by
    /// every worker.
    pub fn new(config: AppConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let auth = BearerAuth::new(config.require_auth_token()?);
        config.ensure_directories()?;
        let store = TableStore::new(
            config.table_base_url.clone(),
            config.scratch_dir.clone(),
            config.fetch_timeout(),
        )?;

        Ok(Self {
            search: SearchService::new(auth, embedder, store),
            config,
        })
    }
}
