//! Serve command implementation.

use super::CliResult;
use kvrec_core::{Config, Database, RequestAdapter};
use kvrec_server::{QueryServer, ServerConfig};
use kvrec_storage::InMemoryKv;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

/// Runs the query server until Ctrl-C.
///
/// Without a database path the server runs over an in-memory store.
pub fn run(
    path: Option<&Path>,
    config: &Config,
    bind: SocketAddr,
    cors_origins: Vec<String>,
) -> CliResult<()> {
    let db = match path {
        Some(path) => Database::open_dir(path, config)?,
        None => {
            tracing::warn!("no --path given, serving an in-memory database");
            Database::open(Arc::new(InMemoryKv::new()), config)?
        }
    };
    let adapter = RequestAdapter::new(Arc::new(db), config.adapter);

    let mut server_config = ServerConfig::new(bind);
    for origin in cors_origins {
        server_config = server_config.with_cors_origin(origin);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let server = QueryServer::bind(server_config, adapter).await?;
        server.serve_with_shutdown(shutdown_signal()).await
    })?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
