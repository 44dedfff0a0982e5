//! `CrawlSource` — the crawl target.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "source_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    SinglePage,
    FullDomain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "source_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Active,
    Paused,
}

/// Fields required to create a new `CrawlSource`. `domain` is derived from
/// `entry_url` by the repository at insert time, not supplied by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSourceCreate {
    pub entry_url: String,
    pub r#type: SourceType,
    pub frequency: String,
    pub max_pages: Option<i32>,
}

impl CrawlSourceCreate {
    pub fn new(entry_url: impl Into<String>, r#type: SourceType) -> Self {
        Self {
            entry_url: entry_url.into(),
            r#type,
            frequency: "once".to_string(),
            max_pages: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CrawlSource {
    pub id: Uuid,
    pub entry_url: String,
    pub domain: String,
    pub r#type: SourceType,
    pub status: SourceStatus,
    pub max_pages: Option<i32>,
    pub frequency: String,
    pub next_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
