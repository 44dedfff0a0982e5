//! Drives the run state machine: seeds the queue, fans out fetches,
//! extracts links, and batches writes (spec §4.6).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::domain::{
    CrawlSource, CrawlSourceCreate, CrawledPageCreate, QueueItem, QueueItemCreate, RunCounters,
};
use crate::error::{CrawlError, Result};
use crate::fetcher::Fetcher;
use crate::rate_limiter::DomainRateLimiter;
use crate::repository::{CrawledPageRepository, QueueRepository, RunRepository, SourceRepository};
use crate::robots::RobotsHandler;
use crate::sitemap::SitemapParser;
use crate::url_rules;
use crate::{link_extractor, url_rules::content_hash};

/// Tuning knobs for one `start_run` invocation, surfaced on the CLI as
/// `--delay` and `--batch-size` (spec §6).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub worker_id: String,
    pub delay: Duration,
    pub batch_size: i64,
    pub max_depth: i32,
    pub max_pages: i64,
    pub concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            worker_id: "default".to_string(),
            delay: Duration::from_millis(500),
            batch_size: 10,
            max_depth: 10,
            max_pages: 1000,
            concurrency: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlResult {
    pub pages_crawled: i64,
    pub pages_failed: i64,
}

pub struct CrawlOrchestrator {
    source_repo: Arc<dyn SourceRepository>,
    run_repo: Arc<dyn RunRepository>,
    page_repo: Arc<dyn CrawledPageRepository>,
    queue_repo: Arc<dyn QueueRepository>,
    fetcher: Fetcher,
    config: OrchestratorConfig,
}

impl CrawlOrchestrator {
    pub fn new(
        source_repo: Arc<dyn SourceRepository>,
        run_repo: Arc<dyn RunRepository>,
        page_repo: Arc<dyn CrawledPageRepository>,
        queue_repo: Arc<dyn QueueRepository>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            source_repo,
            run_repo,
            page_repo,
            queue_repo,
            fetcher: Fetcher::new(),
            config,
        }
    }

    pub async fn create_source(
        &self,
        entry_url: &str,
        source_type: crate::domain::SourceType,
    ) -> Result<CrawlSource> {
        let source = self
            .source_repo
            .create(CrawlSourceCreate::new(entry_url, source_type))
            .await?;
        tracing::info!(source_id = %source.id, domain = %source.domain, "created source");
        Ok(source)
    }

    pub async fn start_run(&self, source_id: Uuid) -> Result<CrawlResult> {
        let source = self
            .source_repo
            .get_by_id(source_id)
            .await?
            .ok_or(CrawlError::SourceNotFound(source_id))?;

        let run = self.run_repo.create(source.id).await?;
        self.run_repo.mark_started(run.id).await?;
        tracing::info!(run_id = %run.id, source_id = %source.id, "run started");

        match self.drive_run(&source, run.id).await {
            Ok(result) => {
                self.run_repo.mark_completed(run.id, None).await?;
                tracing::info!(run_id = %run.id, pages_crawled = result.pages_crawled, pages_failed = result.pages_failed, "run completed");
                Ok(result)
            }
            Err(err) => {
                // Best-effort: record the failure before propagating it.
                let _ = self
                    .run_repo
                    .mark_completed(run.id, Some(err.to_string()))
                    .await;
                tracing::error!(run_id = %run.id, error = %err, "run failed");
                Err(err)
            }
        }
    }

    async fn drive_run(&self, source: &CrawlSource, run_id: Uuid) -> Result<CrawlResult> {
        let base = url_rules::base_url(&source.entry_url)?;
        let robots = Arc::new(RobotsHandler::fetch(&base, &self.fetcher).await);

        let rate_limiter = DomainRateLimiter::new(self.config.delay);
        if let Some(declared) = robots.crawl_delay() {
            let declared = Duration::from_secs_f64(declared.max(0.0));
            let effective = declared.max(self.config.delay);
            rate_limiter.set_delay(&source.domain, effective).await;
        }

        self.seed_queue(source, run_id, &robots).await?;

        let mut counters = RunCounters::default();
        let max_pages = self.config.max_pages;

        loop {
            if (counters.pages_crawled + counters.pages_failed) as i64 >= max_pages {
                tracing::info!(run_id = %run_id, max_pages, "reached max pages limit, stopping crawl");
                break;
            }

            let claimed = self
                .queue_repo
                .claim(run_id, &self.config.worker_id, self.config.batch_size)
                .await?;

            if claimed.is_empty() {
                tracing::info!(run_id = %run_id, "queue drained, stopping crawl");
                break;
            }

            self.process_batch(source, run_id, &robots, claimed, &rate_limiter, &mut counters)
                .await?;

            self.run_repo
                .update_stats(
                    run_id,
                    counters.pages_found,
                    counters.pages_crawled,
                    counters.pages_failed,
                )
                .await?;
        }

        Ok(CrawlResult {
            pages_crawled: counters.pages_crawled as i64,
            pages_failed: counters.pages_failed as i64,
        })
    }

    async fn seed_queue(
        &self,
        source: &CrawlSource,
        run_id: Uuid,
        robots: &RobotsHandler,
    ) -> Result<()> {
        let sitemap_parser = SitemapParser::new(&self.fetcher);
        let mut candidates = vec![source.entry_url.clone()];
        for sitemap_url in robots.sitemaps() {
            candidates.extend(sitemap_parser.parse(&sitemap_url).await);
        }

        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for candidate in candidates {
            let Ok(normalized) = url_rules::normalize(&candidate) else {
                continue;
            };
            let Ok(domain) = url_rules::extract_domain(&normalized) else {
                continue;
            };
            if domain != source.domain {
                continue;
            }
            if !robots.can_fetch(&normalized) {
                continue;
            }
            let Ok(hash) = url_rules::url_hash(&normalized) else {
                continue;
            };
            if !seen.insert(hash.clone()) {
                continue;
            }
            items.push(QueueItemCreate::new(run_id, normalized, hash, 0));
        }

        let seeded = items.len();
        if !items.is_empty() {
            self.queue_repo.add_batch(items).await?;
        }
        tracing::info!(run_id = %run_id, seeded, "seeded queue");
        Ok(())
    }

    async fn process_batch(
        &self,
        source: &CrawlSource,
        run_id: Uuid,
        robots: &Arc<RobotsHandler>,
        claimed: Vec<QueueItem>,
        rate_limiter: &Arc<DomainRateLimiter>,
        counters: &mut RunCounters,
    ) -> Result<()> {
        let max_depth = self.config.max_depth;
        let concurrency = self.config.concurrency.max(1);

        let fetched: Vec<FetchedItem> = stream::iter(claimed.into_iter())
            .map(|item| {
                let fetcher = self.fetcher.clone();
                let rate_limiter = Arc::clone(rate_limiter);
                let robots = Arc::clone(robots);
                let source_id = source.id;
                let source_domain = source.domain.clone();

                async move {
                    let domain = url_rules::extract_domain(&item.url).unwrap_or_default();
                    rate_limiter.acquire(&domain).await;
                    let outcome = fetcher.download(&item.url).await;

                    let is_success = outcome.is_success();
                    let page = if is_success {
                        let body = outcome.body.clone().unwrap_or_default();
                        let hash = content_hash(body.as_bytes());
                        CrawledPageCreate::success(
                            run_id,
                            source_id,
                            item.url.clone(),
                            item.url_hash.clone(),
                            body,
                            hash,
                            outcome.status_code.unwrap_or(0) as i32,
                        )
                    } else {
                        CrawledPageCreate::failure(
                            run_id,
                            source_id,
                            item.url.clone(),
                            item.url_hash.clone(),
                            outcome.status_code.map(|c| c as i32),
                            outcome
                                .error
                                .clone()
                                .unwrap_or_else(|| "unknown fetch failure".to_string()),
                        )
                    };

                    let mut new_items = Vec::new();
                    if is_success && item.depth + 1 < max_depth {
                        if let Some(body) = &outcome.body {
                            for link in link_extractor::extract_links(body, &item.url) {
                                let Ok(normalized) = url_rules::normalize(&link) else {
                                    continue;
                                };
                                let Ok(domain) = url_rules::extract_domain(&normalized) else {
                                    continue;
                                };
                                if domain != source_domain {
                                    continue;
                                }
                                if !robots.can_fetch(&normalized) {
                                    continue;
                                }
                                let Ok(hash) = url_rules::url_hash(&normalized) else {
                                    continue;
                                };
                                new_items.push(QueueItemCreate::new(
                                    run_id,
                                    normalized,
                                    hash,
                                    item.depth + 1,
                                ));
                            }
                        }
                    }

                    FetchedItem {
                        item_id: item.id,
                        succeeded: is_success,
                        page,
                        new_items,
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        // Per-item completion and dedupe new discoveries before persisting.
        let mut pages = Vec::with_capacity(fetched.len());
        let mut dedup = HashSet::new();
        let mut new_queue_items = Vec::new();
        let mut completion_futures = Vec::with_capacity(fetched.len());

        for fetched_item in fetched {
            if fetched_item.succeeded {
                counters.record_success();
            } else {
                counters.record_failure();
            }
            for candidate in fetched_item.new_items {
                if dedup.insert(candidate.url_hash.clone()) {
                    new_queue_items.push(candidate);
                }
            }
            pages.push(fetched_item.page);

            let queue_repo = Arc::clone(&self.queue_repo);
            let item_id = fetched_item.item_id;
            let succeeded = fetched_item.succeeded;
            completion_futures.push(async move {
                if succeeded {
                    queue_repo.complete(item_id).await
                } else {
                    queue_repo.fail(item_id, None).await
                }
            });
        }

        for result in futures::future::join_all(completion_futures).await {
            result?;
        }

        // Pages are persisted before the new queue items, and both before
        // the run counters are written back (ordering guarantee, §5).
        if !pages.is_empty() {
            self.page_repo.create_batch(pages).await?;
        }
        if !new_queue_items.is_empty() {
            self.queue_repo.add_batch(new_queue_items).await?;
        }

        Ok(())
    }
}

struct FetchedItem {
    item_id: Uuid,
    succeeded: bool,
    page: CrawledPageCreate,
    new_items: Vec<QueueItemCreate>,
}
