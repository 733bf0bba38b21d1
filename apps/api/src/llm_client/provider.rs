//! Completion providers and their wire formats.
//!
//! Each provider knows its endpoint, credential headers, request body and response
//! envelope. Retry, timeout and error classification live in the client, once.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ResumeError;
use crate::llm_client::prompts::RESUME_PARSER_SYSTEM;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-opus-20240229";

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Supported completion backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAi,
}

/// Per-request generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overrides the provider's default endpoint.
    pub base_url: Option<String>,
}

/// A fully prepared HTTP POST, ready for a [`Transport`](super::transport::Transport).
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub url: String,
    /// Auth and versioning headers. The transport sets the JSON content type.
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// The single completion payload pulled out of a success envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Both providers report failures as `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

impl Provider {
    /// Parses the `LLM_PROVIDER` setting.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Provider::Anthropic),
            "openai" | "open_ai" => Some(Provider::OpenAi),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn credential_var(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Anthropic => ANTHROPIC_DEFAULT_MODEL,
            Provider::OpenAi => OPENAI_DEFAULT_MODEL,
        }
    }

    fn default_url(self) -> &'static str {
        match self {
            Provider::Anthropic => ANTHROPIC_API_URL,
            Provider::OpenAi => OPENAI_API_URL,
        }
    }

    pub fn build_request(
        self,
        settings: &CompletionSettings,
        api_key: &str,
        prompt: &str,
    ) -> ProviderRequest {
        let url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| self.default_url().to_string());

        match self {
            Provider::Anthropic => ProviderRequest {
                url,
                headers: vec![
                    ("x-api-key", api_key.to_string()),
                    ("anthropic-version", ANTHROPIC_VERSION.to_string()),
                ],
                body: json!({
                    "model": settings.model,
                    "max_tokens": settings.max_tokens,
                    "temperature": settings.temperature,
                    "messages": [{"role": "user", "content": prompt}],
                }),
            },
            Provider::OpenAi => ProviderRequest {
                url,
                headers: vec![("authorization", format!("Bearer {api_key}"))],
                body: json!({
                    "model": settings.model,
                    "max_tokens": settings.max_tokens,
                    "temperature": settings.temperature,
                    "messages": [
                        {"role": "system", "content": RESUME_PARSER_SYSTEM},
                        {"role": "user", "content": prompt},
                    ],
                }),
            },
        }
    }

    /// Extracts the completion text from a 2xx response body.
    pub fn parse_reply(self, body: &str) -> Result<ProviderReply, ResumeError> {
        let reply = match self {
            Provider::Anthropic => {
                let response: AnthropicResponse = serde_json::from_str(body)
                    .map_err(|e| ResumeError::InvalidResponse(e.to_string()))?;
                ProviderReply {
                    text: response
                        .content
                        .into_iter()
                        .find(|b| b.block_type == "text")
                        .and_then(|b| b.text)
                        .unwrap_or_default(),
                    input_tokens: response.usage.as_ref().map(|u| u.input_tokens),
                    output_tokens: response.usage.as_ref().map(|u| u.output_tokens),
                }
            }
            Provider::OpenAi => {
                let response: OpenAiResponse = serde_json::from_str(body)
                    .map_err(|e| ResumeError::InvalidResponse(e.to_string()))?;
                ProviderReply {
                    text: response
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.message)
                        .and_then(|m| m.content)
                        .unwrap_or_default(),
                    input_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
                    output_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
                }
            }
        };

        if reply.text.is_empty() {
            return Err(ResumeError::InvalidResponse(
                "completion contained no text".to_string(),
            ));
        }
        Ok(reply)
    }
}

/// Maps a non-2xx provider response to a classified error.
pub fn classify_status(status: u16, body: &str) -> ResumeError {
    let message = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP error! status: {status}"));

    match status {
        401 | 403 => ResumeError::Auth { status, message },
        408 | 504 => ResumeError::Timeout {
            status: Some(status),
        },
        429 => ResumeError::RateLimited { message },
        500..=599 => ResumeError::ServiceUnavailable { status, message },
        _ => ResumeError::Network {
            status: Some(status),
            message,
        },
    }
}
