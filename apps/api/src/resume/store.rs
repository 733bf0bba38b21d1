use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::resume::{ResumeRow, StoredResume};

/// Stores `data` verbatim under a fresh id. No schema enforcement at this layer.
pub async fn create_resume(pool: &SqlitePool, data: &Value) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    let payload = serde_json::to_string(data)?;

    sqlx::query("INSERT INTO resumes (id, data, created_at) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(payload)
        .bind(Utc::now())
        .execute(pool)
        .await
        .context("Failed to save resume")?;

    Ok(id)
}

pub async fn get_resume(pool: &SqlitePool, id: &str) -> Result<Option<StoredResume>> {
    let row: Option<ResumeRow> =
        sqlx::query_as("SELECT id, data, created_at FROM resumes WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("Failed to retrieve resume")?;

    row.map(|row| {
        let data = serde_json::from_str(&row.data)
            .with_context(|| format!("Stored resume {} is not valid JSON", row.id))?;
        Ok(StoredResume {
            id: row.id,
            data,
            created_at: row.created_at,
        })
    })
    .transpose()
}
