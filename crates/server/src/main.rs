//! keigo-mcp server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use keigo_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db_path = %config.db_path.display(), namespace = %config.namespace, "Starting keigo-mcp on stdio transport");

    let state = Arc::new(state::AppState::open(config)?);
    state.store.purge_expired();

    if let Err(e) = state.config.require_index_source() {
        tracing::warn!(error = %e, "no index source configured");
    }

    match state.reload(false).await {
        Ok(summary) => {
            tracing::info!(documents = summary.documents, source = %summary.origin, "search index ready")
        }
        Err(e) => tracing::warn!(error = %e, "index not loaded; search returns no results until site_reload succeeds"),
    }

    let server = serve_server(handler::KeigoServer::new(state), stdio()).await?;
    server.waiting().await?;

    Ok(())
}
