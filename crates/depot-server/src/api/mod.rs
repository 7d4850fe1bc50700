//! HTTP API for publishing and downloading release binaries.
//!
//! # Example
//!
//! ```bash
//! # Start the server
//! depot --port 8080
//!
//! # Inspect the current release
//! curl http://localhost:8080/latest
//!
//! # Rebuild two platforms
//! curl -X POST http://localhost:8080/build \
//!   -H "Authorization: Bearer $UPDATE_SERVER_TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"platforms": ["linux-amd64", "darwin-arm64"]}'
//! ```

pub mod error;
pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use state::ApiState;

/// Create the API router with all endpoints.
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/latest", get(handlers::latest))
        .route("/download/:name", get(handlers::download))
        .route("/health", get(handlers::health))
        .route("/build", post(handlers::build_all))
        .route("/build/:platform", post(handlers::build_one))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
