//! Request ID and access logging middleware
//!
//! Every request gets an `X-Request-Id` (reused when the client sent one),
//! runs inside a span carrying that ID, method and path, and is announced
//! with an `incoming request` event. The subscriber adds the timestamp.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{info, Instrument};
use uuid::Uuid;

/// Header name for the request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_id_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        info!(method = %request.method(), path = %request.uri().path(), "incoming request");

        let mut response = next.run(request).await;

        if let Ok(value) = request_id.parse() {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
