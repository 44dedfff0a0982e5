use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{QueueItem, QueueItemCreate};
use crate::error::Result;

/// The durable work queue. `claim` must use row-level locking with
/// skip-locked semantics so concurrent claimers never receive the same
/// row (spec §4.5).
#[async_trait]
pub trait QueueRepository: Send + Sync {
    async fn add_batch(&self, items: Vec<QueueItemCreate>) -> Result<Vec<QueueItem>>;

    /// Enqueues a single URL. A thin convenience over `add_batch` for
    /// single-item callers (spec §4.5); `None` means the URL was already
    /// queued for this run (same `(run_id, url_hash)`).
    async fn add(&self, item: QueueItemCreate) -> Result<Option<QueueItem>> {
        Ok(self.add_batch(vec![item]).await?.into_iter().next())
    }

    async fn claim(&self, run_id: Uuid, worker_id: &str, limit: i64) -> Result<Vec<QueueItem>>;
    async fn complete(&self, id: Uuid) -> Result<()>;
    async fn fail(&self, id: Uuid, error: Option<&str>) -> Result<()>;
    async fn reset_stale(&self, timeout_minutes: i64) -> Result<u64>;
    async fn get_pending_count(&self, run_id: Uuid) -> Result<i64>;
}
