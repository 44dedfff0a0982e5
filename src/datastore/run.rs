use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::CrawlRun;
use crate::error::Result;
use crate::repository::RunRepository;

pub struct PgRunRepository {
    pool: PgPool,
}

impl PgRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunRepository for PgRunRepository {
    async fn create(&self, source_id: Uuid) -> Result<CrawlRun> {
        let row = sqlx::query_as::<_, CrawlRun>(
            r#"
            insert into crawl_runs (source_id)
            values ($1)
            returning id, source_id, status, started_at, completed_at,
                      pages_found, pages_crawled, pages_failed, error, created_at
            "#,
        )
        .bind(source_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<CrawlRun>> {
        let row = sqlx::query_as::<_, CrawlRun>(
            r#"
            select id, source_id, status, started_at, completed_at,
                   pages_found, pages_crawled, pages_failed, error, created_at
            from crawl_runs where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn mark_started(&self, id: Uuid) -> Result<CrawlRun> {
        let row = sqlx::query_as::<_, CrawlRun>(
            r#"
            update crawl_runs
            set status = 'running', started_at = now()
            where id = $1
            returning id, source_id, status, started_at, completed_at,
                      pages_found, pages_crawled, pages_failed, error, created_at
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_stats(
        &self,
        id: Uuid,
        pages_found: i32,
        pages_crawled: i32,
        pages_failed: i32,
    ) -> Result<CrawlRun> {
        let row = sqlx::query_as::<_, CrawlRun>(
            r#"
            update crawl_runs
            set pages_found = $2, pages_crawled = $3, pages_failed = $4
            where id = $1
            returning id, source_id, status, started_at, completed_at,
                      pages_found, pages_crawled, pages_failed, error, created_at
            "#,
        )
        .bind(id)
        .bind(pages_found)
        .bind(pages_crawled)
        .bind(pages_failed)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn mark_completed(&self, id: Uuid, error: Option<String>) -> Result<CrawlRun> {
        let status = if error.is_some() { "failed" } else { "completed" };

        let row = sqlx::query_as::<_, CrawlRun>(
            r#"
            update crawl_runs
            set status = $2::run_status, completed_at = now(), error = $3
            where id = $1
            returning id, source_id, status, started_at, completed_at,
                      pages_found, pages_crawled, pages_failed, error, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(error)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
