//! Picito Server — HTTP API over the organization, membership, project
//! and settings services.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use state::{AppState, SharedState};

/// The full application router with request tracing.
pub fn app(state: SharedState) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}
