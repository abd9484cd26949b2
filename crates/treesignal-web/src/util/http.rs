use std::any::Any;

use axum::Json;
use axum::body::Bytes;
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// JSON error response in the `{"detail": …}` shape of the API contract.
pub fn detail_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            detail: message.into(),
        }),
    )
        .into_response()
}

/// Turns a handler panic into a generic 500 without leaking internals.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::http::Response<Full<Bytes>> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(%details, "handler panicked");

    let mut response = axum::http::Response::new(Full::from(
        r#"{"detail":"internal server error"}"#,
    ));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}
