use async_trait::async_trait;

use crate::domain::{CrawledPage, CrawledPageCreate};
use crate::error::Result;

#[async_trait]
pub trait CrawledPageRepository: Send + Sync {
    async fn create_batch(&self, pages: Vec<CrawledPageCreate>) -> Result<Vec<CrawledPage>>;
}
