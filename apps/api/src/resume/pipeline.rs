use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::ResumeError;
use crate::llm_client::{strip_json_fences, AttemptRecord, CompletionClient};
use crate::models::resume::ParsedResume;
use crate::resume::extract::{extract_text, TextSource};
use crate::resume::schema::validate_resume;
use crate::resume::upload::{validate_upload, ResumeUpload};

/// Pipeline states. Transitions only move forward; `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Validating,
    Extracting,
    Completing,
    SchemaChecking,
    Done,
    Failed,
}

/// Where a run stopped and why. `stage` is the stage that was active when it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineFailure {
    pub stage: Stage,
    pub error: ResumeError,
}

#[derive(Debug)]
pub struct PipelineReport {
    pub outcome: Result<ParsedResume, PipelineFailure>,
    /// Failed completion attempts, in order.
    pub attempts: Vec<AttemptRecord>,
}

struct StageTracker {
    stage: Stage,
}

impl StageTracker {
    fn enter(&mut self, next: Stage) {
        debug!(from = ?self.stage, to = ?next, "Resume pipeline stage");
        self.stage = next;
    }

    fn fail(&mut self, error: ResumeError) -> PipelineFailure {
        warn!(stage = ?self.stage, kind = ?error.kind(), "Resume pipeline failed: {error}");
        let failure = PipelineFailure {
            stage: self.stage,
            error,
        };
        self.stage = Stage::Failed;
        failure
    }
}

/// upload → validation → text extraction → completion → schema check.
///
/// Does not substitute fallback data on failure; that is the caller's call.
#[derive(Clone)]
pub struct ResumePipeline {
    text_source: Arc<dyn TextSource>,
    client: CompletionClient,
}

impl ResumePipeline {
    pub fn new(text_source: Arc<dyn TextSource>, client: CompletionClient) -> Self {
        Self {
            text_source,
            client,
        }
    }

    /// Produces a [`ParsedResume`] or the first classified failure.
    #[allow(dead_code)]
    pub async fn parse(&self, upload: &ResumeUpload) -> Result<ParsedResume, ResumeError> {
        self.run(upload).await.outcome.map_err(|f| f.error)
    }

    pub async fn run(&self, upload: &ResumeUpload) -> PipelineReport {
        let mut tracker = StageTracker { stage: Stage::Idle };
        let mut attempts = Vec::new();
        let outcome = self.drive(upload, &mut tracker, &mut attempts).await;

        if outcome.is_ok() {
            tracker.enter(Stage::Done);
            info!(
                file = %upload.file_name,
                failed_attempts = attempts.len(),
                "Resume parsed"
            );
        }
        PipelineReport { outcome, attempts }
    }

    async fn drive(
        &self,
        upload: &ResumeUpload,
        tracker: &mut StageTracker,
        attempts: &mut Vec<AttemptRecord>,
    ) -> Result<ParsedResume, PipelineFailure> {
        tracker.enter(Stage::Validating);
        validate_upload(&upload.meta()).map_err(|e| tracker.fail(e))?;

        tracker.enter(Stage::Extracting);
        let text = self
            .extract(upload)
            .await
            .map_err(|e| tracker.fail(e))?;

        tracker.enter(Stage::Completing);
        let completion = self.client.complete_logged(&text).await;
        attempts.extend(completion.attempts);
        let raw = completion.result.map_err(|e| tracker.fail(e))?;

        tracker.enter(Stage::SchemaChecking);
        let candidate: Value = serde_json::from_str(strip_json_fences(&raw))
            .map_err(|e| tracker.fail(ResumeError::Parse(e.to_string())))?;
        validate_resume(candidate).map_err(|e| tracker.fail(e.into()))
    }

    /// Runs the document conversion on the blocking pool.
    async fn extract(&self, upload: &ResumeUpload) -> Result<String, ResumeError> {
        let source = Arc::clone(&self.text_source);
        let bytes = upload.bytes.clone();
        tokio::task::spawn_blocking(move || extract_text(source.as_ref(), &bytes))
            .await
            .map_err(|e| ResumeError::FileError(format!("text extraction aborted: {e}")))?
    }
}
