use axum::{
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use onboarding_infra::RequestContext;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Attach a [`RequestContext`] to every request.
///
/// A caller-supplied `x-request-id` is kept when it is a valid UUID; otherwise
/// a fresh one is minted. The id is echoed back on the response.
pub async fn request_context(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ctx = incoming_request_id(req.headers())
        .map(RequestContext::with_request_id)
        .unwrap_or_default();

    let span = tracing::info_span!(
        "request",
        request_id = %ctx.request_id(),
        method = %req.method(),
        path = %req.uri().path()
    );

    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn incoming_request_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(REQUEST_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
