use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload carried inside the generate envelope.
/// The transport status is always 200; callers inspect `ok` and this payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "validation_failed", "integration_failed")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Rendered error source chain, outermost first
    pub trace: String,
    /// Request ID for correlating with server logs
    pub request_id: String,
}

impl ErrorDetail {
    /// Build a payload from an error, walking its `source()` chain into `trace`.
    pub fn from_error(
        code: &str,
        err: &(dyn std::error::Error + 'static),
        request_id: String,
    ) -> Self {
        Self {
            error: code.to_string(),
            message: err.to_string(),
            trace: render_chain(err),
            request_id,
        }
    }
}

/// Render an error and its causes one per line.
pub fn render_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        current = cause.source();
    }
    out
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const INTEGRATION_FAILED: &str = "integration_failed";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const RATE_LIMITED: &str = "rate_limited";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        inner: std::io::Error,
    }

    #[test]
    fn render_chain_lists_every_cause() {
        let err = Outer {
            inner: std::io::Error::other("disk full"),
        };
        assert_eq!(render_chain(&err), "outer failure\ncaused by: disk full");
    }

    #[test]
    fn from_error_keeps_top_level_message() {
        let err = std::io::Error::other("boom");
        let detail = ErrorDetail::from_error(codes::INTERNAL_ERROR, &err, "req-1".to_string());
        assert_eq!(detail.error, "internal_error");
        assert_eq!(detail.message, "boom");
        assert_eq!(detail.trace, "boom");
        assert_eq!(detail.request_id, "req-1");
    }
}
