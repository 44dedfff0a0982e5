use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::CrawlRun;
use crate::error::Result;

#[async_trait]
pub trait RunRepository: Send + Sync {
    async fn create(&self, source_id: Uuid) -> Result<CrawlRun>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<CrawlRun>>;
    async fn mark_started(&self, id: Uuid) -> Result<CrawlRun>;
    async fn update_stats(
        &self,
        id: Uuid,
        pages_found: i32,
        pages_crawled: i32,
        pages_failed: i32,
    ) -> Result<CrawlRun>;
    async fn mark_completed(&self, id: Uuid, error: Option<String>) -> Result<CrawlRun>;
}
