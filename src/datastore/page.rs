use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{CrawledPage, CrawledPageCreate};
use crate::error::Result;
use crate::repository::CrawledPageRepository;

pub struct PgCrawledPageRepository {
    pool: PgPool,
}

impl PgCrawledPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrawledPageRepository for PgCrawledPageRepository {
    async fn create_batch(&self, pages: Vec<CrawledPageCreate>) -> Result<Vec<CrawledPage>> {
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(pages.len());

        for page in pages {
            let row = sqlx::query_as::<_, CrawledPage>(
                r#"
                insert into crawled_pages
                    (run_id, source_id, url, url_hash, content, content_hash, status_code, error)
                values ($1, $2, $3, $4, $5, $6, $7, $8)
                returning id, run_id, source_id, url, url_hash, content, content_hash,
                          status_code, error, crawled_at
                "#,
            )
            .bind(page.run_id)
            .bind(page.source_id)
            .bind(&page.url)
            .bind(&page.url_hash)
            .bind(&page.content)
            .bind(&page.content_hash)
            .bind(page.status_code)
            .bind(&page.error)
            .fetch_one(&mut *tx)
            .await?;

            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }
}
