// Global error handling for HTTP middleware layers

use axum::{
    BoxError,
    http::StatusCode,
    response::IntoResponse,
};
use std::error::Error;
// tower's error type for timeouts
use tower::timeout::error::Elapsed;
// Axum uses http_body_util for length-limiting
use http_body_util::LengthLimitError;
use tracing::{error, warn};

/// Maps errors raised by the middleware stack to plain-text HTTP responses
pub async fn handle_global_error(err: BoxError) -> impl IntoResponse {
    // 413 if the body was too large
    if find_cause::<LengthLimitError>(&*err).is_some() {
        warn!("Request body exceeded the configured limit");
        return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
    }

    // 408 if the request took too long
    if err.is::<Elapsed>() {
        warn!("Request exceeded the global timeout");
        return (StatusCode::REQUEST_TIMEOUT, "Request timeout");
    }

    error!("Unhandled middleware error: {}", format_chain(&*err));
    (StatusCode::INTERNAL_SERVER_ERROR, "Unhandled internal error")
}

/// Helper function to find specific error type in error chain
pub fn find_cause<T: Error + 'static>(err: &dyn Error) -> Option<&T> {
    let mut source: Option<&dyn Error> = err.source();

    while let Some(s) = source {
        if let Some(typed) = s.downcast_ref::<T>() {
            return Some(typed);
        }
        source = s.source();
    }

    None
}

/// Renders an error and all of its sources as `outer: inner: root`
pub fn format_chain(err: &dyn Error) -> String {
    let mut rendered: String = err.to_string();
    let mut source: Option<&dyn Error> = err.source();

    while let Some(s) = source {
        rendered.push_str(": ");
        rendered.push_str(&s.to_string());
        source = s.source();
    }

    rendered
}
