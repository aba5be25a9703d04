use axum::extract::State;
use axum::{Json, Router, routing::post};
use formulab_core::error::render_chain;
use formulab_core::formula::{GenerateRequest, GenerateResponse, GenerateResult};
use formulab_core::recovery::recover;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::persist;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate))
}

/// Generate a cosmetic formula from a product brief
///
/// Runs one agent exchange, recovers JSON from the final reply and, when that
/// yields content, regroups it into the canonical display sections. The
/// transport status is always 200; inspect `ok` and `result.parsed`.
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generation envelope", body = GenerateResponse)
    ),
    tag = "generation"
)]
pub async fn generate(
    State(state): State<AppState>,
    AppJson(req): AppJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    validate_message(&req.message)?;

    let raw = state.agent.run(&req.message).await?;
    let recovery = recover(&raw);

    if recovery.succeeded {
        tracing::info!(raw_len = raw.len(), "Recovered formula from agent reply");
    } else {
        tracing::warn!(
            raw_len = raw.len(),
            reason = recovery.failure_reason.as_deref().unwrap_or_default(),
            "Could not recover JSON from agent reply"
        );
    }

    if req.save_file {
        if let Some(formula) = &recovery.value {
            match persist::save_formula(&state.save_path, formula) {
                Ok(()) => tracing::info!(path = %state.save_path.display(), "Saved formula"),
                Err(err) => tracing::warn!(
                    path = %state.save_path.display(),
                    trace = %render_chain(&err),
                    "Failed to save formula"
                ),
            }
        }
    }

    let result = GenerateResult::from(recovery).with_formatted_data();
    Ok(Json(GenerateResponse::success(result)))
}

fn validate_message(message: &str) -> Result<(), AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation {
            message: "`message` must be a non-empty string.".to_string(),
            field: Some("message".to_string()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::agent::{AgentError, FormulaAgent};

    /// Records every brief it receives and answers with a fixed outcome.
    struct StubAgent {
        reply: fn() -> Result<String, AgentError>,
        briefs: Mutex<Vec<String>>,
    }

    impl StubAgent {
        fn new(reply: fn() -> Result<String, AgentError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                briefs: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.briefs.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl FormulaAgent for StubAgent {
        async fn run(&self, message: &str) -> Result<String, AgentError> {
            self.briefs.lock().unwrap().push(message.to_string());
            (self.reply)()
        }
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("formulab-{}-{name}", uuid::Uuid::now_v7()))
    }

    async fn post_generate(agent: Arc<StubAgent>, save_path: PathBuf, body: Body) -> Value {
        let app = router().with_state(AppState { agent, save_path });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/generate")
                    .header("content-type", "application/json")
                    .body(body)
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn json_body(value: Value) -> Body {
        Body::from(value.to_string())
    }

    #[tokio::test]
    async fn blank_message_is_rejected_before_agent_runs() {
        let agent = StubAgent::new(|| Ok("{}".to_string()));

        for message in ["", "   \n\t"] {
            let body = post_generate(
                agent.clone(),
                scratch_path("unused.json"),
                json_body(json!({"message": message})),
            )
            .await;

            assert_eq!(body["ok"], false);
            assert_eq!(body["error"]["error"], "validation_failed");
            assert_eq!(body["result"], Value::Null);
        }
        assert_eq!(agent.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_body_becomes_validation_envelope() {
        let agent = StubAgent::new(|| Ok("{}".to_string()));

        let body = post_generate(
            agent.clone(),
            scratch_path("unused.json"),
            json_body(json!({"save_file": true})),
        )
        .await;

        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["error"], "validation_failed");
        assert!(
            body["error"]["message"]
                .as_str()
                .expect("message")
                .contains("missing field `message`")
        );
        assert_eq!(agent.calls(), 0);
    }

    #[tokio::test]
    async fn recovered_formula_is_categorized() {
        let agent = StubAgent::new(|| {
            Ok("Here you go:\n{\"product_name\": \"Dew Drop\", \"ingredients\": [\"aqua\"], \"ph\": 5.5}\nTERMINATE".to_string())
        });

        let body = post_generate(
            agent.clone(),
            scratch_path("unused.json"),
            json_body(json!({"message": "daytime moisturizer, SPF 30"})),
        )
        .await;

        assert_eq!(body["ok"], true);
        assert_eq!(body["error"], Value::Null);
        let result = &body["result"];
        assert_eq!(result["parsed"], true);
        assert_eq!(result["data"]["product_name"], "Dew Drop");
        assert!(result["raw"].as_str().expect("raw").ends_with("TERMINATE"));
        assert_eq!(
            result["formatted_data"]["Product Name"]["product_name"],
            "Dew Drop"
        );
        assert_eq!(result["formatted_data"]["Additional Information"]["ph"], 5.5);
        assert_eq!(
            agent.briefs.lock().unwrap().as_slice(),
            ["daytime moisturizer, SPF 30"]
        );
    }

    #[tokio::test]
    async fn unrecoverable_reply_is_ok_but_unparsed() {
        let agent = StubAgent::new(|| Ok("I could not produce a formula today.".to_string()));

        let body = post_generate(
            agent,
            scratch_path("unused.json"),
            json_body(json!({"message": "night cream"})),
        )
        .await;

        assert_eq!(body["ok"], true);
        let result = &body["result"];
        assert_eq!(result["parsed"], false);
        assert_eq!(result["data"], Value::Null);
        assert_eq!(result["raw"], "I could not produce a formula today.");
        assert!(
            result["error"]
                .as_str()
                .expect("error")
                .starts_with("Failed to parse JSON-like string.")
        );
        assert!(result.get("formatted_data").is_none());
    }

    #[tokio::test]
    async fn agent_failure_becomes_integration_envelope() {
        let agent = StubAgent::new(|| {
            Err(AgentError::Interrupted {
                turns: 1,
                partial_raw: "{\"name\": \"Half\"}".to_string(),
                source: Box::new(AgentError::NoReplyContent),
            })
        });

        let body = post_generate(
            agent,
            scratch_path("unused.json"),
            json_body(json!({"message": "face mask"})),
        )
        .await;

        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["error"], "integration_failed");
        assert!(
            body["error"]["trace"]
                .as_str()
                .expect("trace")
                .contains("caused by: model reply contained no message content")
        );
        assert_eq!(body["result"]["parsed"], false);
        assert_eq!(body["result"]["raw"], "{\"name\": \"Half\"}");
    }

    #[tokio::test]
    async fn save_file_writes_recovered_formula() {
        let agent = StubAgent::new(|| Ok("{'name': 'Citrus Mist'} TERMINATE".to_string()));
        let path = scratch_path("formula.json");

        let body = post_generate(
            agent,
            path.clone(),
            json_body(json!({"message": "toner", "saveFile": true})),
        )
        .await;

        assert_eq!(body["ok"], true);
        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("saved file"))
                .expect("json");
        assert_eq!(saved, json!({"name": "Citrus Mist"}));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn save_failure_does_not_fail_request() {
        let agent = StubAgent::new(|| Ok("{\"name\": \"Citrus Mist\"}".to_string()));
        let path = scratch_path("missing-dir").join("formula.json");

        let body = post_generate(
            agent,
            path.clone(),
            json_body(json!({"message": "toner", "save_file": true})),
        )
        .await;

        assert_eq!(body["ok"], true);
        assert_eq!(body["result"]["parsed"], true);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn save_file_is_skipped_when_recovery_fails() {
        let agent = StubAgent::new(|| Ok("no json here".to_string()));
        let path = scratch_path("formula.json");

        let body = post_generate(
            agent,
            path.clone(),
            json_body(json!({"message": "toner", "save_file": true})),
        )
        .await;

        assert_eq!(body["ok"], true);
        assert!(!path.exists());
    }
}
