//! Chat-completion backend for the generator role.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::AgentError;
use crate::config::ModelSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A language model that answers a transcript with one reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    model: String,
    api_key: String,
}

impl OpenAiChatModel {
    pub fn connect(settings: &ModelSettings) -> Result<Self, AgentError> {
        let endpoint = completions_endpoint(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AgentError::Init(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, model = %self.model, "chat completion returned non-success status");
            return Err(AgentError::Status { status, body });
        }

        let body = response.json::<ChatCompletionResponse>().await?;
        first_choice_content(body)
    }
}

fn completions_endpoint(base_url: &str) -> Result<reqwest::Url, AgentError> {
    let joined = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    reqwest::Url::parse(&joined)
        .map_err(|e| AgentError::Init(format!("invalid model base URL '{base_url}': {e}")))
}

fn first_choice_content(body: ChatCompletionResponse) -> Result<String, AgentError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(AgentError::NoReplyContent)
}
