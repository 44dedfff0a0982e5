use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{CrawlSource, CrawlSourceCreate};
use crate::error::Result;
use crate::repository::SourceRepository;
use crate::url_rules;

pub struct PgSourceRepository {
    pool: PgPool,
}

impl PgSourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceRepository for PgSourceRepository {
    async fn create(&self, source: CrawlSourceCreate) -> Result<CrawlSource> {
        let domain = url_rules::extract_domain(&source.entry_url)?;

        let row = sqlx::query_as::<_, CrawlSource>(
            r#"
            insert into crawl_sources (entry_url, domain, type, frequency, max_pages)
            values ($1, $2, $3, $4, $5)
            returning id, entry_url, domain, type, status, max_pages, frequency, next_run_at, created_at
            "#,
        )
        .bind(&source.entry_url)
        .bind(&domain)
        .bind(source.r#type)
        .bind(&source.frequency)
        .bind(source.max_pages)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<CrawlSource>> {
        let row = sqlx::query_as::<_, CrawlSource>(
            r#"
            select id, entry_url, domain, type, status, max_pages, frequency, next_run_at, created_at
            from crawl_sources where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
