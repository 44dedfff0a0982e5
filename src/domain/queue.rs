//! `QueueItem` — a URL awaiting fetch within a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "queue_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A URL queued for the first time, produced by seeding or by link
/// extraction. `url` must already be normalized by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItemCreate {
    pub run_id: Uuid,
    pub url: String,
    pub url_hash: String,
    pub depth: i32,
    pub priority: i32,
}

impl QueueItemCreate {
    pub fn new(run_id: Uuid, url: String, url_hash: String, depth: i32) -> Self {
        Self {
            run_id,
            url,
            url_hash,
            depth,
            priority: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueItem {
    pub id: Uuid,
    pub run_id: Uuid,
    pub url: String,
    pub url_hash: String,
    pub depth: i32,
    pub priority: i32,
    pub status: QueueStatus,
    pub worker_id: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
}
