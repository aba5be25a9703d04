//! Two-role formula exchange.
//!
//! A generator role (`Formula_Creator`) drafts the formula; a driving role
//! (`User`) opens the conversation with the brief and keeps nudging the
//! generator without human input until a reply ends in the termination
//! sentinel or the auto-reply bound is hit. The roles are built once per
//! [`AgentSession`], behind a `OnceCell` barrier, and every exchange runs on a
//! fresh transcript.

pub mod model;

use std::sync::Arc;

use async_trait::async_trait;
use formulab_core::TERMINATION_SENTINEL;
use tokio::sync::OnceCell;

use crate::config::{ExchangeSettings, ModelSettings};
use model::{ChatMessage, ChatModel, OpenAiChatModel};

pub const GENERATOR_NAME: &str = "Formula_Creator";
pub const DRIVER_NAME: &str = "User";

pub const FORMULA_SYSTEM_PROMPT: &str = "\
You will receive a user's objectives for a cosmetic product and create a product formula that meets them. The formula must include these sections:
1. Product Name: a catchy, relevant name for the product.
2. Description: a short description of the product, its benefits and its target audience.
3. Ingredients: a detailed ingredient list with each ingredient's function and concentration.
4. Instructions for Use: clear, concise directions for using the product.
5. Packaging: packaging suggestions that fit the product's branding and audience.
6. Safety and Regulatory Information: required safety warnings and regulatory notes.
7. Additional Notes: any other relevant information or tips for the user.
Return the formula in a structured format, preferably valid JSON. After the formula is complete, write the word \"TERMINATE\" to end the conversation.
";

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent initialization failed: {0}")]
    Init(String),
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("model reply contained no message content")]
    NoReplyContent,
    #[error("exchange interrupted after {turns} generator turn(s)")]
    Interrupted {
        turns: usize,
        partial_raw: String,
        #[source]
        source: Box<AgentError>,
    },
}

impl AgentError {
    /// Last generator reply obtained before the exchange failed, if any.
    pub fn partial_raw(&self) -> Option<&str> {
        match self {
            AgentError::Interrupted { partial_raw, .. } => Some(partial_raw),
            _ => None,
        }
    }
}

/// Anything that can turn a product brief into the generator's final reply.
#[async_trait]
pub trait FormulaAgent: Send + Sync {
    async fn run(&self, message: &str) -> Result<String, AgentError>;
}

/// True when a reply hands the turn back for good.
pub fn is_termination_msg(content: &str) -> bool {
    content.trim_end().ends_with(TERMINATION_SENTINEL)
}

pub struct GeneratorRole {
    pub name: &'static str,
    pub system_message: String,
}

pub struct DriverRole {
    pub name: &'static str,
    pub max_consecutive_auto_reply: usize,
    pub auto_reply: String,
}

struct RolePair {
    generator: GeneratorRole,
    driver: DriverRole,
    model: Arc<dyn ChatModel>,
}

impl RolePair {
    fn new(model: Arc<dyn ChatModel>, exchange: &ExchangeSettings) -> Self {
        Self {
            generator: GeneratorRole {
                name: GENERATOR_NAME,
                system_message: FORMULA_SYSTEM_PROMPT.to_string(),
            },
            driver: DriverRole {
                name: DRIVER_NAME,
                max_consecutive_auto_reply: exchange.max_consecutive_auto_reply,
                auto_reply: exchange.auto_reply.clone(),
            },
            model,
        }
    }

    async fn exchange(&self, message: &str) -> Result<String, AgentError> {
        let mut transcript = vec![ChatMessage::user(message)];
        let mut auto_replies = 0;
        let mut turns = 0;

        loop {
            let prompt: Vec<ChatMessage> =
                std::iter::once(ChatMessage::system(self.generator.system_message.as_str()))
                    .chain(transcript.iter().cloned())
                    .collect();

            let reply = match self.model.complete(&prompt).await {
                Ok(reply) => reply,
                Err(err) => return Err(interrupted(turns, &transcript, err)),
            };
            turns += 1;

            let terminated = is_termination_msg(&reply);
            tracing::debug!(
                role = self.generator.name,
                turn = turns,
                terminated,
                "generator replied"
            );
            transcript.push(ChatMessage::assistant(reply));

            if terminated || auto_replies >= self.driver.max_consecutive_auto_reply {
                break;
            }

            tracing::debug!(role = self.driver.name, auto_replies, "driver auto-replying");
            transcript.push(ChatMessage::user(self.driver.auto_reply.as_str()));
            auto_replies += 1;
        }

        match transcript.pop() {
            Some(last) if !last.content.trim().is_empty() => Ok(last.content),
            _ => Err(AgentError::NoReplyContent),
        }
    }
}

fn interrupted(turns: usize, transcript: &[ChatMessage], err: AgentError) -> AgentError {
    if turns == 0 {
        return err;
    }
    let partial_raw = transcript
        .iter()
        .rev()
        .find(|m| m.role == model::Role::Assistant)
        .map(|m| m.content.clone())
        .unwrap_or_default();
    AgentError::Interrupted {
        turns,
        partial_raw,
        source: Box::new(err),
    }
}

type Connector = Box<dyn Fn() -> Result<Arc<dyn ChatModel>, AgentError> + Send + Sync>;

/// Process-wide handle to the generator/driver pair.
///
/// Exchanges are not serialized: the roles are immutable once built and each
/// `run` owns its transcript, so concurrent requests never share turns.
pub struct AgentSession {
    exchange: ExchangeSettings,
    connect: Connector,
    roles: OnceCell<RolePair>,
}

impl AgentSession {
    /// Session backed by an OpenAI-compatible endpoint.
    pub fn new(model: ModelSettings, exchange: ExchangeSettings) -> Self {
        Self::with_connector(exchange, move || {
            let client = OpenAiChatModel::connect(&model)?;
            tracing::info!(model = %model.model, base_url = %model.base_url, "chat model configured");
            Ok(Arc::new(client) as Arc<dyn ChatModel>)
        })
    }

    pub fn with_connector(
        exchange: ExchangeSettings,
        connect: impl Fn() -> Result<Arc<dyn ChatModel>, AgentError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            exchange,
            connect: Box::new(connect),
            roles: OnceCell::new(),
        }
    }

    /// Build the role pair now instead of on the first request.
    pub async fn initialize(&self) -> Result<(), AgentError> {
        self.roles().await.map(|_| ())
    }

    async fn roles(&self) -> Result<&RolePair, AgentError> {
        self.roles
            .get_or_try_init(|| async {
                let model = (self.connect)()?;
                Ok::<_, AgentError>(RolePair::new(model, &self.exchange))
            })
            .await
    }
}

#[async_trait]
impl FormulaAgent for AgentSession {
    async fn run(&self, message: &str) -> Result<String, AgentError> {
        let roles = self.roles().await?;
        roles.exchange(message).await
    }
}
