use sqlx::SqlitePool;

use crate::resume::pipeline::ResumePipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Stateless between runs; concurrent uploads share only read-only configuration.
    pub pipeline: ResumePipeline,
}
