use std::fmt;
use std::path::PathBuf;

const DEFAULT_SAVE_PATH: &str = "formula.json";
const DEFAULT_MAX_AUTO_REPLY: usize = 10;
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_AUTO_REPLY: &str =
    "Continue. When the formula is complete, end your reply with TERMINATE.";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Connection details for the OpenAI-compatible chat endpoint.
#[derive(Clone)]
pub struct ModelSettings {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
}

impl fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSettings")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// How the driving role behaves once the exchange has started.
#[derive(Debug, Clone)]
pub struct ExchangeSettings {
    /// Upper bound on driver replies per exchange
    pub max_consecutive_auto_reply: usize,
    /// Text the driver sends whenever the generator has not terminated yet
    pub auto_reply: String,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            max_consecutive_auto_reply: DEFAULT_MAX_AUTO_REPLY,
            auto_reply: DEFAULT_AUTO_REPLY.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub model: ModelSettings,
    pub exchange: ExchangeSettings,
    pub save_path: PathBuf,
    pub port: u16,
}

impl Settings {
    /// Load settings from the process environment (after `.env` was applied).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Model variables are read in upper case first, then in the lower-case
    /// spelling older `.env` files use (`model_name`, `base_url`, `api_key`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str, legacy: &str| {
            non_empty(name)
                .or_else(|| non_empty(legacy))
                .ok_or(ConfigError::Missing(name))
        };

        let model = ModelSettings {
            model: required("MODEL_NAME", "model_name")?,
            base_url: required("BASE_URL", "base_url")?,
            api_key: required("API_KEY", "api_key")?,
        };

        let mut exchange = ExchangeSettings::default();
        if let Some(raw) = non_empty("AGENT_MAX_AUTO_REPLY") {
            exchange.max_consecutive_auto_reply = parse_var("AGENT_MAX_AUTO_REPLY", raw)?;
        }
        if let Some(text) = non_empty("AGENT_AUTO_REPLY") {
            exchange.auto_reply = text;
        }

        let save_path = non_empty("FORMULA_SAVE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH));

        let port = match non_empty("PORT") {
            Some(raw) => parse_var("PORT", raw)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            model,
            exchange,
            save_path,
            port,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::Invalid { name, value: raw })
}
