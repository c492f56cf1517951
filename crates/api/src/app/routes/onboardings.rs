use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use onboarding_customers::Action;
use onboarding_infra::{OnboardingRequest, RequestContext};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_onboarding).get(list_onboardings))
        .route("/:id", get(get_onboarding).patch(update_onboarding))
        .route("/:id/:action", post(invoke_bound_action))
}

pub async fn create_onboarding(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<dto::OnboardingPayload>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let request = OnboardingRequest::Create(body.into());
    match services.dispatch(&ctx, request).await {
        Ok(response) => dto::response_to_json(StatusCode::CREATED, response),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn list_onboardings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    match services.dispatch(&ctx, OnboardingRequest::List).await {
        Ok(response) => dto::response_to_json(StatusCode::OK, response),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn get_onboarding(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_record_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.dispatch(&ctx, OnboardingRequest::Read { id }).await {
        Ok(response) => dto::response_to_json(StatusCode::OK, response),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn update_onboarding(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::OnboardingPayload>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_record_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let request = OnboardingRequest::Update {
        id,
        fields: body.into(),
    };
    match services.dispatch(&ctx, request).await {
        Ok(response) => dto::response_to_json(StatusCode::OK, response),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

/// `POST /onboardings/:id/SubmitForReview`.
pub async fn invoke_bound_action(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path((id, action)): Path<(String, String)>,
) -> axum::response::Response {
    let action = match action.parse::<Action>() {
        Ok(action) => action,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let id = match dto::parse_record_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.dispatch(&ctx, OnboardingRequest::action(action, id)).await {
        Ok(response) => dto::response_to_json(StatusCode::OK, response),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
