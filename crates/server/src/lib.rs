//! SimSearch HTTP Server
//!
//! Actix-web REST API for similarity search and text encoding

mod auth;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

pub use auth::{bearer_token, BearerAuth};
pub use error::{ApiError, ApiResult};
pub use service::SearchService;
pub use state::AppState;

use actix_web::{web, App, HttpServer};
use simsearch_common::{AppConfig, Result};
use simsearch_embed::Embedder;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// Start the HTTP server and run until shutdown
pub async fn start_server(config: AppConfig, embedder: Arc<dyn Embedder>) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = Arc::new(AppState::new(config, embedder)?);

    info!("Starting server on http://{}", bind_addr);
    info!("Embedder: {}", state.search.embedder().name());
    info!("Table endpoint: {}", state.config.table_base_url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
