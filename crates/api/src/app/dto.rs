use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use onboarding_core::RecordId;
use onboarding_customers::{OnboardingFields, OnboardingStatus, deserialize_present};
use onboarding_infra::OnboardingResponse;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /onboardings` and `PATCH /onboardings/:id`.
///
/// Every field is optional. On update, absent keys are left untouched and
/// `country`/`email` sent as `null` are cleared.
#[derive(Debug, Default, Deserialize)]
pub struct OnboardingPayload {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub email: Option<Option<String>>,
    pub status: Option<OnboardingStatus>,
}

impl From<OnboardingPayload> for OnboardingFields {
    fn from(payload: OnboardingPayload) -> Self {
        OnboardingFields {
            country: payload.country,
            email: payload.email,
            status: payload.status,
        }
    }
}

/// Body of `POST /actions/:name`.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    #[serde(alias = "ID")]
    pub id: String,
}

// -------------------------
// Mapping helpers
// -------------------------

/// Unwrap a JSON body, mapping axum's rejection to the JSON error shape.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(value)| value).map_err(errors::json_rejection_to_response)
}

pub fn parse_record_id(raw: &str) -> Result<RecordId, axum::response::Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

pub fn response_to_json(
    status: StatusCode,
    response: OnboardingResponse,
) -> axum::response::Response {
    match response {
        OnboardingResponse::Records(items) => {
            (status, Json(serde_json::json!({ "items": items }))).into_response()
        }
        other => (status, Json(other)).into_response(),
    }
}
