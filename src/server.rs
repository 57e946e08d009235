//! HTTP surface: router, listener bind, and the serve loop.
//!
//! | Route     | Handler                          |
//! |-----------|----------------------------------|
//! | `/`       | [`dashboard::home`]              |
//! | `/oasis`  | [`ingest::ingest`] (WebSocket)   |
//! | `/feed`   | [`poll::feed`]                   |
//! | `/health` | liveness check                   |
//!
//! There is no shutdown path: [`serve`] returns only when the listener
//! fails.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::RelayConfig;
use crate::store::RelayStore;
use crate::{dashboard, ingest, poll, AppError, Result};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The one relay store both endpoints operate on.
    pub store: RelayStore,
    /// Immutable process configuration.
    pub config: Arc<RelayConfig>,
    /// `host:port` the listener actually bound, as a browser should dial it.
    pub fixed_authority: Arc<str>,
}

impl AppState {
    /// Bundle a store with its configuration and the bound listener address.
    #[must_use]
    pub fn new(store: RelayStore, config: RelayConfig, local: SocketAddr) -> Self {
        Self {
            store,
            config: Arc::new(config),
            fixed_authority: dashboard::reachable_authority(local).into(),
        }
    }
}

/// Handler for `GET /health` — returns 200 OK with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

/// Build the relay router over `state`.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::home))
        .route("/oasis", get(ingest::ingest))
        .route("/feed", get(poll::feed))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind the configured listen address.
///
/// # Errors
///
/// Returns `AppError::Config` if the address is not `host:port` and
/// `AppError::Bind` if the host does not resolve or the socket cannot be
/// bound.
pub async fn bind(config: &RelayConfig) -> Result<TcpListener> {
    let addr = config.bind_addr()?;
    TcpListener::bind(addr.as_str())
        .await
        .map_err(|err| AppError::Bind(format!("failed to bind {addr}: {err}")))
}

/// Serve `store` on an already bound listener until it fails.
///
/// # Errors
///
/// Returns `AppError::Io` if the bound address cannot be read and
/// `AppError::Bind` when the accept loop stops with an error.
pub async fn serve(listener: TcpListener, store: RelayStore, config: RelayConfig) -> Result<()> {
    let local = listener.local_addr()?;
    let state = AppState::new(store, config, local);
    info!(%local, mode = ?state.config.mode, "relay listening");

    axum::serve(listener, router(state))
        .await
        .map_err(|err| AppError::Bind(format!("server error: {err}")))
}

/// Bind `config.listen_addr` and serve with a fresh store.
///
/// # Errors
///
/// Propagates [`bind`] and [`serve`] failures; both are fatal.
pub async fn run(config: RelayConfig) -> Result<()> {
    let listener = bind(&config).await?;
    serve(listener, RelayStore::new(), config).await
}
