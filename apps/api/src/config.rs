use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::provider::Provider;

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values; a missing provider key is reported per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmConfig,
}

/// Completion provider settings.
#[derive(Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider_name = get("LLM_PROVIDER").unwrap_or_else(|| "anthropic".to_string());
        let provider = Provider::from_name(&provider_name).ok_or_else(|| {
            anyhow!("LLM_PROVIDER must be 'anthropic' or 'openai', got '{provider_name}'")
        })?;

        let llm = LlmConfig {
            provider,
            api_key: get(provider.credential_var()).filter(|k| !k.trim().is_empty()),
            model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            base_url: get("LLM_BASE_URL"),
            max_tokens: parse_or("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"), 4096)?,
            temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.7)?,
            timeout: Duration::from_secs(parse_or(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                30,
            )?),
            max_retries: parse_or("LLM_MAX_RETRIES", get("LLM_MAX_RETRIES"), 3)?,
            retry_base_delay: Duration::from_millis(parse_or(
                "LLM_RETRY_BASE_DELAY_MS",
                get("LLM_RETRY_BASE_DELAY_MS"),
                1000,
            )?),
        };

        Ok(Config {
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://resumes.db?mode=rwc".to_string()),
            port: parse_or("PORT", get("PORT"), 3000)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
    }
}
