//! End-to-end scenarios against a fake HTTP layer (spec §8), exercising
//! the orchestrator with in-memory repositories instead of Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crawlkeep::domain::{
    CrawlRun, CrawlSource, CrawlSourceCreate, CrawledPage, CrawledPageCreate, QueueItem,
    QueueItemCreate, QueueStatus, RunStatus, SourceStatus, SourceType,
};
use crawlkeep::repository::{CrawledPageRepository, QueueRepository, RunRepository, SourceRepository};
use crawlkeep::{url_rules, CrawlOrchestrator, OrchestratorConfig};

#[derive(Default)]
struct InMemorySources {
    inner: Mutex<HashMap<Uuid, CrawlSource>>,
}

#[async_trait]
impl SourceRepository for InMemorySources {
    async fn create(&self, source: CrawlSourceCreate) -> crawlkeep::Result<CrawlSource> {
        let domain = url_rules::extract_domain(&source.entry_url)?;
        let row = CrawlSource {
            id: Uuid::new_v4(),
            entry_url: source.entry_url,
            domain,
            r#type: source.r#type,
            status: SourceStatus::Active,
            max_pages: source.max_pages,
            frequency: source.frequency,
            next_run_at: None,
            created_at: Utc::now(),
        };
        self.inner.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: Uuid) -> crawlkeep::Result<Option<CrawlSource>> {
        Ok(self.inner.lock().await.get(&id).cloned())
    }
}

#[derive(Default)]
struct InMemoryRuns {
    inner: Mutex<HashMap<Uuid, CrawlRun>>,
}

#[async_trait]
impl RunRepository for InMemoryRuns {
    async fn create(&self, source_id: Uuid) -> crawlkeep::Result<CrawlRun> {
        let row = CrawlRun {
            id: Uuid::new_v4(),
            source_id,
            status: RunStatus::Pending,
            started_at: None,
            completed_at: None,
            pages_found: 0,
            pages_crawled: 0,
            pages_failed: 0,
            error: None,
            created_at: Utc::now(),
        };
        self.inner.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: Uuid) -> crawlkeep::Result<Option<CrawlRun>> {
        Ok(self.inner.lock().await.get(&id).cloned())
    }

    async fn mark_started(&self, id: Uuid) -> crawlkeep::Result<CrawlRun> {
        let mut guard = self.inner.lock().await;
        let run = guard.get_mut(&id).expect("run exists");
        run.status = RunStatus::Running;
        run.started_at = Some(Utc::now());
        Ok(run.clone())
    }

    async fn update_stats(
        &self,
        id: Uuid,
        pages_found: i32,
        pages_crawled: i32,
        pages_failed: i32,
    ) -> crawlkeep::Result<CrawlRun> {
        let mut guard = self.inner.lock().await;
        let run = guard.get_mut(&id).expect("run exists");
        run.pages_found = pages_found;
        run.pages_crawled = pages_crawled;
        run.pages_failed = pages_failed;
        Ok(run.clone())
    }

    async fn mark_completed(&self, id: Uuid, error: Option<String>) -> crawlkeep::Result<CrawlRun> {
        let mut guard = self.inner.lock().await;
        let run = guard.get_mut(&id).expect("run exists");
        run.status = if error.is_some() {
            RunStatus::Failed
        } else {
            RunStatus::Completed
        };
        run.completed_at = Some(Utc::now());
        run.error = error;
        Ok(run.clone())
    }
}

#[derive(Default)]
struct InMemoryPages {
    inner: Mutex<Vec<CrawledPage>>,
}

impl InMemoryPages {
    async fn snapshot(&self) -> Vec<CrawledPage> {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl CrawledPageRepository for InMemoryPages {
    async fn create_batch(
        &self,
        pages: Vec<CrawledPageCreate>,
    ) -> crawlkeep::Result<Vec<CrawledPage>> {
        let mut guard = self.inner.lock().await;
        let mut created = Vec::with_capacity(pages.len());
        for page in pages {
            let row = CrawledPage {
                id: Uuid::new_v4(),
                run_id: page.run_id,
                source_id: page.source_id,
                url: page.url,
                url_hash: page.url_hash,
                content: page.content,
                content_hash: page.content_hash,
                status_code: page.status_code,
                error: page.error,
                crawled_at: Utc::now(),
            };
            guard.push(row.clone());
            created.push(row);
        }
        Ok(created)
    }
}

#[derive(Default)]
struct InMemoryQueue {
    inner: Mutex<Vec<QueueItem>>,
}

impl InMemoryQueue {
    async fn snapshot(&self) -> Vec<QueueItem> {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl QueueRepository for InMemoryQueue {
    async fn add_batch(&self, items: Vec<QueueItemCreate>) -> crawlkeep::Result<Vec<QueueItem>> {
        let mut guard = self.inner.lock().await;
        let mut inserted = Vec::new();
        for item in items {
            let exists = guard
                .iter()
                .any(|q| q.run_id == item.run_id && q.url_hash == item.url_hash);
            if exists {
                continue;
            }
            let row = QueueItem {
                id: Uuid::new_v4(),
                run_id: item.run_id,
                url: item.url,
                url_hash: item.url_hash,
                depth: item.depth,
                priority: item.priority,
                status: QueueStatus::Pending,
                worker_id: None,
                claimed_at: None,
                attempts: 0,
                max_attempts: 3,
                created_at: Utc::now(),
            };
            guard.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn claim(
        &self,
        run_id: Uuid,
        worker_id: &str,
        limit: i64,
    ) -> crawlkeep::Result<Vec<QueueItem>> {
        let mut guard = self.inner.lock().await;
        let mut claimed = Vec::new();
        for item in guard.iter_mut() {
            if claimed.len() as i64 >= limit {
                break;
            }
            if item.run_id == run_id && item.status == QueueStatus::Pending {
                item.status = QueueStatus::Processing;
                item.worker_id = Some(worker_id.to_string());
                item.claimed_at = Some(Utc::now());
                item.attempts += 1;
                claimed.push(item.clone());
            }
        }
        Ok(claimed)
    }

    async fn complete(&self, id: Uuid) -> crawlkeep::Result<()> {
        let mut guard = self.inner.lock().await;
        if let Some(item) = guard.iter_mut().find(|q| q.id == id) {
            item.status = QueueStatus::Completed;
        }
        Ok(())
    }

    async fn fail(&self, id: Uuid, _error: Option<&str>) -> crawlkeep::Result<()> {
        let mut guard = self.inner.lock().await;
        if let Some(item) = guard.iter_mut().find(|q| q.id == id) {
            item.status = QueueStatus::Failed;
        }
        Ok(())
    }

    async fn reset_stale(&self, _timeout_minutes: i64) -> crawlkeep::Result<u64> {
        Ok(0)
    }

    async fn get_pending_count(&self, run_id: Uuid) -> crawlkeep::Result<i64> {
        let guard = self.inner.lock().await;
        Ok(guard
            .iter()
            .filter(|q| q.run_id == run_id && q.status == QueueStatus::Pending)
            .count() as i64)
    }
}

struct Harness {
    sources: Arc<InMemorySources>,
    runs: Arc<InMemoryRuns>,
    pages: Arc<InMemoryPages>,
    queue: Arc<InMemoryQueue>,
    orchestrator: CrawlOrchestrator,
}

impl Harness {
    fn new(config: OrchestratorConfig) -> Self {
        let sources = Arc::new(InMemorySources::default());
        let runs = Arc::new(InMemoryRuns::default());
        let pages = Arc::new(InMemoryPages::default());
        let queue = Arc::new(InMemoryQueue::default());
        let orchestrator = CrawlOrchestrator::new(
            sources.clone(),
            runs.clone(),
            pages.clone(),
            queue.clone(),
            config,
        );
        Self {
            sources,
            runs,
            pages,
            queue,
            orchestrator,
        }
    }
}

async fn deny_robots_and_sitemap(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_page_crawl_seeds_one_link_and_stops_at_max_pages() {
    let server = MockServer::start().await;
    deny_robots_and_sitemap(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<html><a href="/a">a</a></html>"#))
        .mount(&server)
        .await;

    let harness = Harness::new(OrchestratorConfig {
        max_pages: 1,
        ..OrchestratorConfig::default()
    });

    let entry_url = format!("{}/", server.uri());
    let source = harness
        .orchestrator
        .create_source(&entry_url, SourceType::FullDomain)
        .await
        .unwrap();

    let result = harness.orchestrator.start_run(source.id).await.unwrap();
    assert_eq!(result.pages_crawled, 1);
    assert_eq!(result.pages_failed, 0);

    let pages = harness.pages.snapshot().await;
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, entry_url.trim_end_matches('/').to_string() + "/");
    assert_eq!(pages[0].status_code, Some(200));

    let queue = harness.queue.snapshot().await;
    assert!(queue
        .iter()
        .any(|q| q.url == format!("{}/a", server.uri()) && q.status == QueueStatus::Pending));
}

#[tokio::test]
async fn fragment_is_stripped_and_not_re_enqueued() {
    let server = MockServer::start().await;
    deny_robots_and_sitemap(&server).await;
    Mock::given(method("GET"))
        .and(path("/p"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<a href="/p#anchor">self</a>"#),
        )
        .mount(&server)
        .await;

    let harness = Harness::new(OrchestratorConfig::default());
    let entry_url = format!("{}/p#top", server.uri());
    let source = harness
        .orchestrator
        .create_source(&entry_url, SourceType::SinglePage)
        .await
        .unwrap();

    harness.orchestrator.start_run(source.id).await.unwrap();

    let pages = harness.pages.snapshot().await;
    assert_eq!(pages.len(), 1);
    assert!(!pages[0].url.contains('#'));
    assert_eq!(pages[0].url, format!("{}/p", server.uri()));

    let queue = harness.queue.snapshot().await;
    assert_eq!(queue.len(), 1, "self-link with only a fragment must not add a second queue row");
}

#[tokio::test]
async fn off_domain_links_are_not_enqueued() {
    let server = MockServer::start().await;
    deny_robots_and_sitemap(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="http://other.test/foo">off</a><a href="/bar">on</a>"#,
        ))
        .mount(&server)
        .await;

    let harness = Harness::new(OrchestratorConfig {
        max_pages: 1,
        ..OrchestratorConfig::default()
    });
    let entry_url = format!("{}/", server.uri());
    let source = harness
        .orchestrator
        .create_source(&entry_url, SourceType::FullDomain)
        .await
        .unwrap();

    harness.orchestrator.start_run(source.id).await.unwrap();

    let queue = harness.queue.snapshot().await;
    assert!(queue.iter().any(|q| q.url == format!("{}/bar", server.uri())));
    assert!(!queue.iter().any(|q| q.url.contains("other.test")));
}

#[tokio::test]
async fn robots_disallowed_path_is_filtered_before_any_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="/private/x">hidden</a><a href="/visible">shown</a>"#,
        ))
        .mount(&server)
        .await;
    // No mock for /private/x or /private/x's descendants: if the orchestrator
    // ever requested it, wiremock would respond 404 and the test would still
    // pass, so the queue snapshot is the only reliable assertion here.

    let harness = Harness::new(OrchestratorConfig {
        max_pages: 1,
        ..OrchestratorConfig::default()
    });
    let entry_url = format!("{}/", server.uri());
    let source = harness
        .orchestrator
        .create_source(&entry_url, SourceType::FullDomain)
        .await
        .unwrap();

    harness.orchestrator.start_run(source.id).await.unwrap();

    let queue = harness.queue.snapshot().await;
    assert!(!queue.iter().any(|q| q.url.contains("/private")));
    assert!(queue.iter().any(|q| q.url == format!("{}/visible", server.uri())));
}

#[tokio::test]
async fn sitemap_index_seeds_all_referenced_urls_at_depth_zero() {
    let server = MockServer::start().await;
    let sitemap_decl = format!("Sitemap: {}/sm.xml\n", server.uri());
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_decl))
        .mount(&server)
        .await;

    let sm1_url = format!("{}/sm-1.xml", server.uri());
    Mock::given(method("GET"))
        .and(path("/sm.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<sitemapindex><sitemap><loc>{sm1_url}</loc></sitemap></sitemapindex>"#
        )))
        .mount(&server)
        .await;

    let u1 = format!("{}/u1", server.uri());
    let u2 = format!("{}/u2", server.uri());
    let u3 = format!("{}/u3", server.uri());
    Mock::given(method("GET"))
        .and(path("/sm-1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<urlset><url><loc>{u1}</loc></url><url><loc>{u2}</loc></url><url><loc>{u3}</loc></url></urlset>"#
        )))
        .mount(&server)
        .await;

    // max_pages=0: the orchestrator must seed the queue but never claim from it.
    let harness = Harness::new(OrchestratorConfig {
        max_pages: 0,
        ..OrchestratorConfig::default()
    });
    let entry_url = format!("{}/", server.uri());
    let source = harness
        .orchestrator
        .create_source(&entry_url, SourceType::FullDomain)
        .await
        .unwrap();

    let result = harness.orchestrator.start_run(source.id).await.unwrap();
    assert_eq!(result.pages_crawled, 0);
    assert_eq!(result.pages_failed, 0);

    let queue = harness.queue.snapshot().await;
    assert_eq!(queue.len(), 4, "entry url plus three sitemap urls");
    assert!(queue.iter().all(|q| q.depth == 0));
    assert!(queue.iter().all(|q| q.status == QueueStatus::Pending));
    for expected in [u1, u2, u3] {
        assert!(queue.iter().any(|q| q.url == expected));
    }
}
