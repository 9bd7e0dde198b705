use simsearch_common::AppConfig;
use simsearch_embed::StaticEmbedder;
use simsearch_test_utils::{serve_canned, CSV};
use std::path::Path;
use std::sync::Arc;

use crate::state::AppState;

pub(crate) const TOKEN: &str = "token";

pub(crate) const EMOTIONS_TABLE: &str =
    "id,embedding\n1,\"[1.0, 0.0]\"\n2,\"[0.0, 1.0]\"\n3,\"[-1.0, 0.0]\"\n";

pub(crate) fn emotions_embedder() -> StaticEmbedder {
    StaticEmbedder::new()
        .with("happy", vec![1.0, 0.0])
        .with("sad", vec![0.0, 1.0])
        .with("angry", vec![-1.0, 0.0])
}

/// Serve `body` as a table for every request; returns the base URL
pub(crate) async fn serve_table(body: &'static str) -> String {
    format!("{}/embeddings", serve_canned(200, CSV, body).await.unwrap())
}

pub(crate) fn test_state(base_url: &str, scratch: &Path) -> Arc<AppState> {
    let config = AppConfig {
        auth_token: Some(TOKEN.to_string()),
        table_base_url: base_url.to_string(),
        scratch_dir: scratch.to_path_buf(),
        fetch_timeout_secs: 5,
        ..AppConfig::default()
    };
    Arc::new(AppState::new(config, Arc::new(emotions_embedder())).unwrap())
}
