//! `CrawlRun` — one execution attempt against a source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "run_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CrawlRun {
    pub id: Uuid,
    pub source_id: Uuid,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pages_found: i32,
    pub pages_crawled: i32,
    pub pages_failed: i32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters collected in memory during a run and written back at the end
/// of each batch (see the ordering guarantee in spec §5).
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounters {
    pub pages_found: i32,
    pub pages_crawled: i32,
    pub pages_failed: i32,
}

impl RunCounters {
    pub fn record_success(&mut self) {
        self.pages_found += 1;
        self.pages_crawled += 1;
    }

    pub fn record_failure(&mut self) {
        self.pages_found += 1;
        self.pages_failed += 1;
    }
}
