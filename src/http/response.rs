//! Responses produced by the HTTP layer itself.
//!
//! # Responsibilities
//! - Map dispatch errors to `500 Internal Server Error`
//! - Show the error chain when development mode asks for it
//! - Answer oversized bodies with `413`

use std::error::Error;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::DispatchError;

/// `500` for an error that escaped the router.
pub fn error_response(err: &DispatchError, show_exceptions: bool) -> Response {
    let body = if show_exceptions {
        error_chain(err)
    } else {
        "Internal Server Error".to_string()
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        body,
    )
        .into_response()
}

/// `413` when the buffered body exceeds `server.max_body_size`.
pub fn payload_too_large() -> Response {
    (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
}

/// The error and each of its sources, one per line.
pub fn error_chain(err: &dyn Error) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}
