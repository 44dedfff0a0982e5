use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CrawlSource, CrawlSourceCreate};
use crate::error::Result;

#[async_trait]
pub trait SourceRepository: Send + Sync {
    async fn create(&self, source: CrawlSourceCreate) -> Result<CrawlSource>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<CrawlSource>>;
}
