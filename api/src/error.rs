use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use formulab_core::error::{self, ErrorDetail, render_chain};
use formulab_core::formula::{GenerateResponse, GenerateResult};

use crate::agent::AgentError;

/// Failures of the generate chain. Every variant renders as the uniform
/// envelope with `ok = false` and transport status 200.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or empty request, rejected before the agent runs
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
    /// The agent exchange failed or produced nothing usable
    #[error(transparent)]
    Integration(#[from] AgentError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (code, result) = match &self {
            AppError::Validation { message, field } => {
                tracing::info!(
                    request_id = %request_id,
                    field = field.as_deref().unwrap_or("body"),
                    "Rejected generate request: {}",
                    message
                );
                (error::codes::VALIDATION_FAILED, None)
            }
            AppError::Integration(err) => {
                tracing::error!(
                    request_id = %request_id,
                    trace = %render_chain(err),
                    "Agent exchange failed"
                );
                let raw = err.partial_raw().unwrap_or_default().to_string();
                (
                    error::codes::INTEGRATION_FAILED,
                    Some(GenerateResult::exchange_failed(raw, err.to_string())),
                )
            }
        };

        let detail = ErrorDetail::from_error(code, &self, request_id);
        (StatusCode::OK, Json(GenerateResponse::failure(detail, result))).into_response()
    }
}
