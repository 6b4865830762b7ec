//! Error handling middleware support.

use crate::error::{ErrorCause, ErrorResponse};
use axum::{
    body::Body,
    http::{header, HeaderValue, Response},
    response::IntoResponse,
    Json,
};
use tracing::error;

/// Re-render an [`ApiError`](crate::error::ApiError) response so its body
/// carries `request_id`. Other responses pass through untouched.
pub fn render_error(response: Response<Body>, request_id: &str) -> Response<Body> {
    let Some(body) = response.extensions().get::<ErrorResponse>().cloned() else {
        return response;
    };

    let status = response.status();
    if let Some(ErrorCause(cause)) = response.extensions().get::<ErrorCause>() {
        error!(
            request_id = %request_id,
            error_code = %body.error,
            status = %status,
            cause = %cause,
            "Request error"
        );
    }

    let (mut parts, _) = response.into_parts();
    let rendered = Json(body.with_request_id(request_id)).into_response();
    let (rendered_parts, rendered_body) = rendered.into_parts();

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        rendered_parts
            .headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json")),
    );

    Response::from_parts(parts, rendered_body)
}
