//! `crawlkeep` is a durable, resumable, politeness-aware web crawler.
//!
//! A [`crate::orchestrator::CrawlOrchestrator`] drives a `crate::domain::CrawlRun`
//! against a single domain: it seeds a persistent queue, fans fetches out
//! across a bounded worker pool, extracts links, and records everything
//! through the repository traits in `crate::repository` so a crashed run can
//! resume exactly where it left off.

pub mod config;
pub mod datastore;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod link_extractor;
pub mod orchestrator;
pub mod rate_limiter;
pub mod repository;
pub mod robots;
pub mod sitemap;
pub mod url_rules;

pub use config::Config;
pub use error::{CrawlError, Result};
pub use orchestrator::{CrawlOrchestrator, CrawlResult, OrchestratorConfig};
