use std::time::Duration;

use crate::errors::GenerateError;

/// Model identifier sent with every generation request.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-image-preview";

/// Configuration for the OpenRouter client.
#[derive(Clone, Debug)]
pub struct OpenRouterConfig {
    /// API key used for bearer auth.
    pub api_key: String,
    /// Base URL for the OpenRouter-compatible endpoint.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Default HTTP timeout. Generation legitimately takes 20-60 seconds, so
    /// callers imposing their own deadline should stay at 60 seconds or more.
    pub timeout: Duration,
}

impl OpenRouterConfig {
    /// Creates a config with defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://openrouter.ai".to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self, GenerateError> {
        let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(GenerateError::Config(
                "missing OPENROUTER_API_KEY for the generation client".into(),
            ));
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn chat_completions_url(&self) -> String {
        format!(
            "{}/api/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}
