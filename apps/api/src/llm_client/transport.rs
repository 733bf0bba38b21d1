use async_trait::async_trait;
use reqwest::Client;

use crate::errors::ResumeError;
use crate::llm_client::provider::ProviderRequest;

/// Status and body of a provider response, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One network round-trip to a completion provider.
///
/// Implementations must be cancel-safe: the client drops the future when an attempt
/// exceeds its time budget.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &ProviderRequest) -> Result<RawResponse, ResumeError>;
}

/// `reqwest`-backed transport used in production.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        // Per-attempt deadlines are enforced by the client, not here.
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: &ProviderRequest) -> Result<RawResponse, ResumeError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(RawResponse { status, body })
    }
}

fn transport_error(e: reqwest::Error) -> ResumeError {
    if e.is_timeout() {
        return ResumeError::Timeout { status: None };
    }
    ResumeError::Network {
        status: None,
        message: e.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use tokio::time::Instant;

    use super::*;

    /// Replays a fixed script of responses, then repeats the last one.
    /// Records the instant of every call.
    pub struct ScriptedTransport {
        script: Mutex<VecDeque<Result<RawResponse, ResumeError>>>,
        last: Mutex<Option<Result<RawResponse, ResumeError>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        pub fn new(script: Vec<Result<RawResponse, ResumeError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn always(response: Result<RawResponse, ResumeError>) -> Arc<Self> {
            Self::new(vec![response])
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post(&self, _request: &ProviderRequest) -> Result<RawResponse, ResumeError> {
            self.calls.lock().unwrap().push(Instant::now());
            let next = self.script.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(next) = next {
                *last = Some(next);
            }
            last.clone().expect("scripted transport needs at least one response")
        }
    }

    /// Never answers.
    #[derive(Default)]
    pub struct StalledTransport {
        calls: AtomicUsize,
    }

    impl StalledTransport {
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StalledTransport {
        async fn post(&self, _request: &ProviderRequest) -> Result<RawResponse, ResumeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    /// A 200 Anthropic envelope carrying `text` as its only content block.
    pub fn anthropic_ok(text: &str) -> Result<RawResponse, ResumeError> {
        Ok(RawResponse {
            status: 200,
            body: json!({
                "id": "msg_test",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": text}],
                "usage": {"input_tokens": 10, "output_tokens": 20}
            })
            .to_string(),
        })
    }

    pub fn status(status: u16, message: &str) -> Result<RawResponse, ResumeError> {
        Ok(RawResponse {
            status,
            body: json!({"error": {"message": message}}).to_string(),
        })
    }

    pub fn connection_reset() -> Result<RawResponse, ResumeError> {
        Err(ResumeError::Network {
            status: None,
            message: "connection reset by peer".into(),
        })
    }
}
