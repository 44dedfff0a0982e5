//! `CrawledPage` — the append-only record of one fetch attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPageCreate {
    pub run_id: Uuid,
    pub source_id: Uuid,
    pub url: String,
    pub url_hash: String,
    pub content: Option<String>,
    pub content_hash: Option<String>,
    pub status_code: Option<i32>,
    pub error: Option<String>,
}

impl CrawledPageCreate {
    /// `content != None` must imply `content_hash != None` (§3 invariant).
    pub fn success(
        run_id: Uuid,
        source_id: Uuid,
        url: String,
        url_hash: String,
        content: String,
        content_hash: String,
        status_code: i32,
    ) -> Self {
        Self {
            run_id,
            source_id,
            url,
            url_hash,
            content: Some(content),
            content_hash: Some(content_hash),
            status_code: Some(status_code),
            error: None,
        }
    }

    pub fn failure(
        run_id: Uuid,
        source_id: Uuid,
        url: String,
        url_hash: String,
        status_code: Option<i32>,
        error: String,
    ) -> Self {
        Self {
            run_id,
            source_id,
            url,
            url_hash,
            content: None,
            content_hash: None,
            status_code,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CrawledPage {
    pub id: Uuid,
    pub run_id: Uuid,
    pub source_id: Uuid,
    pub url: String,
    pub url_hash: String,
    pub content: Option<String>,
    pub content_hash: Option<String>,
    pub status_code: Option<i32>,
    pub error: Option<String>,
    pub crawled_at: DateTime<Utc>,
}
