//! Read-only REST API over a completed batch.
//!
//! Provides four GET endpoints:
//! - `/summary`: one summary row per scenario
//! - `/scenarios/{name}`: full dispatch result of one scenario
//! - `/switching`: switching price and per-scenario regimes
//! - `/bi-export`: long-format BI table, optionally filtered by `data_type`

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::market::summary::BatchOutcome;

pub use types::{BiRecord, BiQuery, ErrorResponse, RegimeEntry, SwitchingResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once after the batch completes and wrapped in `Arc`; no locks
/// are needed since all data is read-only.
pub struct AppState {
    /// Case name shown in responses (preset name or case file path).
    pub case_name: String,
    /// Batch results served by the endpoints.
    pub outcome: BatchOutcome,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/scenarios/{name}", get(handlers::get_scenario))
        .route("/switching", get(handlers::get_switching))
        .route("/bi-export", get(handlers::get_bi_export))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
