//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and dispatcher wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and response mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use onboarding_infra::StoreError;
use onboarding_infra::config::StoreConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(store: StoreConfig) -> Result<Router, StoreError> {
    let services = Arc::new(services::build_services(store).await?);
    Ok(router_with(services))
}

/// Router over already-built services.
pub fn router_with(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router().layer(Extension(services)))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_context)))
}
