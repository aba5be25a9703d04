use axum::{Json, Router, routing::get};

use crate::HealthResponse;

/// Liveness routes. Stateless, so they mount on any router state.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(health_check))
}

/// Liveness probe, always 200
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Cosmetics microservice is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
