//! Listener setup and serving.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{build_router, AppState};
use axum::http::HeaderValue;
use axum::Router;
use kvrec_core::RequestAdapter;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP server exposing a [`RequestAdapter`].
pub struct QueryServer {
    listener: TcpListener,
    router: Router,
}

impl QueryServer {
    /// Binds the listener and builds the router.
    pub async fn bind(config: ServerConfig, adapter: RequestAdapter) -> ServerResult<Self> {
        let router = Self::router(&config, adapter);
        let listener = TcpListener::bind(config.bind_addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "query server listening");
        Ok(Self { listener, router })
    }

    /// Builds the full router, layers included, without binding.
    pub fn router(config: &ServerConfig, adapter: RequestAdapter) -> Router {
        build_router(AppState::new(adapter), config)
            .layer(cors_layer(&config.cors_origins))
            .layer(TraceLayer::new_for_http())
    }

    /// Returns the bound address.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until the process is stopped.
    pub async fn serve(self) -> ServerResult<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Serves until `signal` resolves, then drains in-flight requests.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;
        tracing::info!("query server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for QueryServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryServer")
            .field("local_addr", &self.listener.local_addr().ok())
            .finish_non_exhaustive()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
