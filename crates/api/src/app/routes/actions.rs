//! Unbound actions: `POST /actions/:name` with the target id in the body.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};

use onboarding_customers::Action;
use onboarding_infra::{OnboardingRequest, RequestContext};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/:name", post(invoke_action))
}

pub async fn invoke_action(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(name): Path<String>,
    body: Result<Json<dto::ActionRequest>, JsonRejection>,
) -> axum::response::Response {
    let action = match name.parse::<Action>() {
        Ok(action) => action,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let body = match dto::json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let id = match dto::parse_record_id(&body.id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    tracing::debug!(action = action.name(), record_id = %id, "invoking action");

    match services.dispatch(&ctx, OnboardingRequest::action(action, id)).await {
        Ok(response) => dto::response_to_json(StatusCode::OK, response),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
