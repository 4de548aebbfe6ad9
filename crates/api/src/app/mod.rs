//! HTTP application wiring (Axum router + shared services).
//!
//! - `services.rs`: models, triage adapter and case store behind one handle
//! - `routes/`: handlers, one file per endpoint
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: the `{"error": ..}` response shape

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around already-built services.
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(Extension(services)),
    )
}
