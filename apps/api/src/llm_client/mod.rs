/// LLM Client — the single point of entry for all completion-provider calls.
///
/// Builds the resume extraction prompt, bounds every attempt with a timeout,
/// retries transient failures with exponential backoff and classifies errors.
/// Provider differences (endpoint, headers, envelope) live in [`provider`].
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::errors::{ErrorKind, ResumeError};

pub mod prompts;
pub mod provider;
pub mod transport;

use self::prompts::build_resume_prompt;
use self::provider::{classify_status, CompletionSettings, Provider, ProviderRequest};
use self::transport::{HttpTransport, Transport};

/// Attempt count, backoff base and per-attempt deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (0-based): `base_delay * 2^attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// One failed attempt, as recorded in the attempt log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    /// 0-based.
    pub attempt: u32,
    pub kind: ErrorKind,
    #[serde(rename = "delay_before_next_ms", serialize_with = "as_millis")]
    pub delay_before_next: Option<Duration>,
}

fn as_millis<S: Serializer>(delay: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match delay {
        Some(d) => s.serialize_some(&(d.as_millis() as u64)),
        None => s.serialize_none(),
    }
}

/// A terminal result plus the failed attempts that preceded it.
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, ResumeError>,
    pub attempts: Vec<AttemptRecord>,
}

impl<T> Attempted<T> {
    /// A failure decided before any attempt was made.
    fn rejected(error: ResumeError) -> Self {
        Self {
            result: Err(error),
            attempts: Vec::new(),
        }
    }
}

/// Runs `operation` under `policy`: each attempt is bounded by `attempt_timeout`,
/// retryable failures are retried after `base_delay * 2^attempt`, and the last failure
/// (or the first non-retryable one) is returned.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Attempted<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ResumeError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = Vec::new();
    let mut attempt = 0;

    loop {
        let result = tokio::time::timeout(policy.attempt_timeout, operation(attempt))
            .await
            .unwrap_or(Err(ResumeError::Timeout { status: None }));

        let error = match result {
            Ok(value) => {
                return Attempted {
                    result: Ok(value),
                    attempts,
                }
            }
            Err(e) => e,
        };

        if attempt + 1 >= max_attempts || !error.is_retryable() {
            warn!(attempt = attempt + 1, kind = ?error.kind(), "Completion attempt failed: {error}");
            attempts.push(AttemptRecord {
                attempt,
                kind: error.kind(),
                delay_before_next: None,
            });
            return Attempted {
                result: Err(error),
                attempts,
            };
        }

        let delay = policy.delay_after(attempt);
        warn!(
            "Completion attempt {} failed ({}), retrying after {}ms...",
            attempt + 1,
            error,
            delay.as_millis()
        );
        attempts.push(AttemptRecord {
            attempt,
            kind: error.kind(),
            delay_before_next: Some(delay),
        });
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// The completion client shared by every pipeline run.
/// Holds read-only configuration only; concurrent calls do not coordinate.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Provider,
    api_key: Option<String>,
    settings: CompletionSettings,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
}

impl CompletionClient {
    pub fn new(
        provider: Provider,
        api_key: Option<String>,
        settings: CompletionSettings,
        policy: RetryPolicy,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            provider,
            api_key,
            settings,
            policy,
            transport,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            config.provider,
            config.api_key.clone(),
            CompletionSettings {
                model: config.model.clone(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                base_url: config.base_url.clone(),
            },
            RetryPolicy {
                max_attempts: config.max_retries,
                base_delay: config.retry_base_delay,
                attempt_timeout: config.timeout,
            },
            Arc::new(HttpTransport::new()?),
        ))
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends `resume_text` for extraction and returns the raw completion text.
    /// The text is not parsed here.
    #[allow(dead_code)]
    pub async fn complete(&self, resume_text: &str) -> Result<String, ResumeError> {
        self.complete_logged(resume_text).await.result
    }

    /// Like [`complete`](Self::complete), also returning the log of failed attempts.
    pub async fn complete_logged(&self, resume_text: &str) -> Attempted<String> {
        if resume_text.trim().is_empty() {
            return Attempted::rejected(ResumeError::EmptyFile);
        }
        let Some(api_key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Attempted::rejected(ResumeError::MissingCredential);
        };

        let prompt = build_resume_prompt(resume_text);
        let request = self.provider.build_request(&self.settings, api_key, &prompt);
        let request = &request;

        retry_with_backoff(&self.policy, move |_| self.attempt(request)).await
    }

    async fn attempt(&self, request: &ProviderRequest) -> Result<String, ResumeError> {
        let response = self.transport.post(request).await?;

        if !(200..300).contains(&response.status) {
            return Err(classify_status(response.status, &response.body));
        }

        let reply = self.provider.parse_reply(&response.body)?;
        debug!(
            provider = self.provider.name(),
            input_tokens = ?reply.input_tokens,
            output_tokens = ?reply.output_tokens,
            "Completion call succeeded"
        );
        Ok(reply.text)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
