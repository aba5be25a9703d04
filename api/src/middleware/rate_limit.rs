use axum::http::{HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use formulab_core::error::{codes, ErrorDetail};
use formulab_core::formula::GenerateResponse;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorError,
    GovernorLayer,
};

type RateLimitLayer = GovernorLayer<SmartIpKeyExtractor, governor::middleware::NoOpMiddleware, axum::body::Body>;

/// Rate limit for POST /generate: 10 requests per minute per IP, burst of 5.
/// Every request costs at least one model call.
pub fn generate_layer() -> RateLimitLayer {
    GovernorLayer::new(
        GovernorConfigBuilder::default()
            .per_second(6) // one token every 6s = 10 per minute
            .burst_size(5)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("invalid governor config for generate"),
    )
    .error_handler(envelope_error_handler)
}

/// Render limiter rejections as the generate envelope, plus `Retry-After`.
fn envelope_error_handler(err: GovernorError) -> Response<axum::body::Body> {
    let (retry_after, message) = match err {
        GovernorError::TooManyRequests { wait_time, .. } => (
            Some(wait_time),
            format!("Too many requests. Retry after {wait_time} seconds."),
        ),
        GovernorError::UnableToExtractKey => (
            None,
            "Unable to determine client identity for rate limiting".to_string(),
        ),
        GovernorError::Other { msg, .. } => (None, msg.unwrap_or_default().to_string()),
    };

    tracing::warn!(retry_after = ?retry_after, "generate request rate limited");

    let detail = ErrorDetail {
        error: codes::RATE_LIMITED.to_string(),
        message: message.clone(),
        trace: message,
        request_id: uuid::Uuid::now_v7().to_string(),
    };
    let mut response =
        (StatusCode::OK, Json(GenerateResponse::failure(detail, None))).into_response();

    if let Some(secs) = retry_after {
        response
            .headers_mut()
            .insert("retry-after", HeaderValue::from(secs));
    }

    response
}
