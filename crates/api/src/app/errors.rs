use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use onboarding_core::DomainError;
use onboarding_infra::DispatchError;

pub fn dispatch_error_to_response(err: DispatchError) -> axum::response::Response {
    match err {
        DispatchError::Domain(e) => domain_error_to_response(e),
        DispatchError::Store(e) => {
            tracing::error!(error = %e, "record store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    let code = match err {
        DomainError::Validation(_) => "validation_error",
        DomainError::NotFound(_) => "not_found",
        DomainError::Conflict(_) => "conflict",
        DomainError::InvalidId(_) => "invalid_id",
    };
    json_error(status, code, err.message())
}

/// Malformed or mistyped request bodies are validation errors.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
