// Request/response logging middleware and the plain-text fallback.
// Response bodies pass through untouched: clients rely on the bare JSON array.

use std::{convert::Infallible, time::Instant};

use axum::{
    body::Body,
    http::{HeaderValue, Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use tracing::{error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Turns a status into its upper snake-case reason, e.g. 404 => "NOT_FOUND"
pub fn status_label(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN STATUS")
        .to_uppercase()
        .replace(' ', "_")
}

/// Middleware that opens a span per request and logs the outcome with its latency
pub async fn request_logger(
    req: Request<Body>,
    next: Next,
) -> Result<Response<Body>, Infallible> {
    let start: Instant = Instant::now();
    let request_id: Uuid = Uuid::new_v4();
    let span: Span = info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path()
    );

    let mut response: Response<Body> = next.run(req).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status: StatusCode = response.status();
    let elapsed_ms: u64 = start.elapsed().as_millis() as u64;
    let label: String = status_label(status);

    span.in_scope(|| {
        if status.is_server_error() {
            error!(code = status.as_u16(), elapsed_ms, "{}", label);
        } else if status.is_client_error() {
            warn!(code = status.as_u16(), elapsed_ms, "{}", label);
        } else {
            info!(code = status.as_u16(), elapsed_ms, "{}", label);
        }
    });

    Ok(response)
}

pub async fn fallback_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested route does not exist")
}
