use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// Tracks one asynchronous bulk-import/embedding run.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BatchJobRow {
    pub id: String,
    pub status: String,
    pub total: i32,
    pub processed: i32,
    pub failed: i32,
    pub failed_items: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Per-item outcome within a batch. Failures are data, not errors: the
/// batch loop records them and keeps going.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub id: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Imported,
    Skipped,
    Failed,
}

impl BatchItemResult {
    pub fn imported(id: &str) -> Self {
        BatchItemResult {
            id: id.to_string(),
            status: ItemStatus::Imported,
            error: None,
        }
    }

    pub fn skipped(id: &str) -> Self {
        BatchItemResult {
            id: id.to_string(),
            status: ItemStatus::Skipped,
            error: None,
        }
    }

    pub fn failed(id: &str, error: impl Into<String>) -> Self {
        BatchItemResult {
            id: id.to_string(),
            status: ItemStatus::Failed,
            error: Some(error.into()),
        }
    }
}
