use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

mod agent;
mod config;
mod error;
mod extract;
mod middleware;
mod persist;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Formulab API",
        version = "0.1.0",
        description = "Accepts a product brief and returns a structured cosmetic formula produced by a language-model agent."
    ),
    paths(routes::health::health_check, routes::generate::generate),
    components(schemas(
        HealthResponse,
        formulab_core::error::ErrorDetail,
        formulab_core::formula::GenerateRequest,
        formulab_core::formula::GenerateResult,
        formulab_core::formula::GenerateResponse,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formulab_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // Build the role pair up front; a backend that cannot be set up is fatal.
    let session = agent::AgentSession::new(settings.model.clone(), settings.exchange.clone());
    if let Err(err) = session.initialize().await {
        tracing::error!(error = %err, "Agent initialization failed");
        std::process::exit(1);
    }

    let app_state = state::AppState {
        agent: Arc::new(session),
        save_path: settings.save_path.clone(),
    };

    let app = Router::new()
        .route("/openapi.json", get(openapi_json))
        .merge(routes::health::router())
        .merge(routes::generate::router().layer(middleware::rate_limit::generate_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(middleware::panic::envelope))
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors::build_cors_layer()),
        )
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("Formulab API listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %err, "Server exited with error");
        std::process::exit(1);
    }
}
