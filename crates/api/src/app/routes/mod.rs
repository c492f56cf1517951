use axum::Router;

pub mod actions;
pub mod onboardings;
pub mod system;

/// Router for the record endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/onboardings", onboardings::router())
        .nest("/actions", actions::router())
}
