use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// Build a CORS layer from the `FORMULAB_CORS_ORIGINS` env var.
///
/// - Origins: comma-separated list (default: `http://localhost:8000`)
/// - Methods: GET, POST, OPTIONS
/// - Headers: Content-Type
/// - Max age: 3600s
pub fn build_cors_layer() -> CorsLayer {
    let origins_str = std::env::var("FORMULAB_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());

    CorsLayer::new()
        .allow_origin(parse_origins(&origins_str))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([HeaderName::from_static("content-type")])
        .max_age(std::time::Duration::from_secs(3600))
}

fn parse_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_skips_blank_entries() {
        let origins = parse_origins(" http://localhost:8000, ,https://formulab.example ");
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("http://localhost:8000"),
                HeaderValue::from_static("https://formulab.example"),
            ]
        );
    }
}
