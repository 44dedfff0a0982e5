use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{QueueItem, QueueItemCreate};
use crate::error::Result;
use crate::repository::QueueRepository;

pub struct PgQueueRepository {
    pool: PgPool,
}

impl PgQueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueRepository for PgQueueRepository {
    async fn add_batch(&self, items: Vec<QueueItemCreate>) -> Result<Vec<QueueItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(items.len());

        for item in items {
            // Duplicates (same (run_id, url_hash)) are silently absorbed.
            let row = sqlx::query_as::<_, QueueItem>(
                r#"
                insert into crawl_queue (run_id, url, url_hash, depth, priority)
                values ($1, $2, $3, $4, $5)
                on conflict (run_id, url_hash) do nothing
                returning id, run_id, url, url_hash, depth, priority, status,
                          worker_id, claimed_at, attempts, max_attempts, created_at
                "#,
            )
            .bind(item.run_id)
            .bind(&item.url)
            .bind(&item.url_hash)
            .bind(item.depth)
            .bind(item.priority)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = row {
                inserted.push(row);
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn claim(&self, run_id: Uuid, worker_id: &str, limit: i64) -> Result<Vec<QueueItem>> {
        let rows = sqlx::query_as::<_, QueueItem>("select * from claim_queue_items($1, $2, $3)")
            .bind(run_id)
            .bind(worker_id)
            .bind(limit as i32)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn complete(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "update crawl_queue set status = 'completed' where id = $1 and status <> 'completed' and status <> 'failed'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fail(&self, id: Uuid, error: Option<&str>) -> Result<()> {
        let _ = error;
        sqlx::query(
            "update crawl_queue set status = 'failed' where id = $1 and status <> 'completed' and status <> 'failed'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset_stale(&self, timeout_minutes: i64) -> Result<u64> {
        let count: i32 = sqlx::query_scalar("select reset_stale_queue_items($1)")
            .bind(timeout_minutes as i32)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn get_pending_count(&self, run_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "select count(*) from crawl_queue where run_id = $1 and status = 'pending'",
        )
        .bind(run_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
