use crate::auth::require_token;
use crate::handlers::*;
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// API server configuration
#[derive(Clone)]
pub struct Config {
    /// Address to listen on
    pub listen_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
        }
    }
}

/// API server
pub struct ApiServer {
    config: Config,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: Config, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        // Body ceiling one byte above the limit so validation reports 413 itself
        let body_limit = usize::try_from(self.state.size_limit)
            .unwrap_or(usize::MAX)
            .saturating_add(1);

        let document = Router::new()
            .route(
                "/",
                get(get_document).head(head_document).put(put_document),
            )
            .route("/index.html", get(get_view))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                require_token,
            ));

        Router::new()
            // Health check
            .route("/healthz", get(healthz))
            .merge(document)
            .layer(DefaultBodyLimit::max(body_limit))
            // Add tracing and state
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until `token` is cancelled
    pub async fn run(self, token: CancellationToken) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        self.serve(listener, token).await
    }

    /// Serve on an already bound listener until `token` is cancelled
    pub async fn serve(
        self,
        listener: TcpListener,
        token: CancellationToken,
    ) -> Result<(), std::io::Error> {
        let app = self.build_router();

        info!("Starting API server on {}", listener.local_addr()?);
        if self.state.auth_token.is_none() {
            warn!("No auth token configured, document routes are open");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn healthz() -> &'static str {
    "ok"
}
