use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formulab_core::error::{codes, ErrorDetail};
use formulab_core::formula::GenerateResponse;

/// Panic handler for `CatchPanicLayer`: a handler panic still answers with
/// the envelope instead of a dropped connection.
pub fn envelope(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    let request_id = uuid::Uuid::now_v7().to_string();
    tracing::error!(request_id = %request_id, details = %details, "Handler panicked");

    let detail = ErrorDetail {
        error: codes::INTERNAL_ERROR.to_string(),
        message: "An internal error occurred".to_string(),
        trace: details,
        request_id,
    };
    (StatusCode::OK, Json(GenerateResponse::failure(detail, None))).into_response()
}
