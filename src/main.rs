//! CLI entrypoint: wires the Postgres-backed repositories into a
//! [`CrawlOrchestrator`] and dispatches `create` / `run` subcommands.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crawlkeep::datastore::{
    self, PgCrawledPageRepository, PgQueueRepository, PgRunRepository, PgSourceRepository,
};
use crawlkeep::domain::SourceType;
use crawlkeep::{Config, CrawlOrchestrator, OrchestratorConfig};

#[derive(Parser, Debug)]
#[command(name = "crawlkeep", about = "Durable, politeness-aware web crawler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new crawl source.
    Create {
        /// Entry URL to crawl.
        url: String,
        /// Crawl type.
        #[arg(long, value_enum, default_value = "full_domain")]
        r#type: CliSourceType,
    },
    /// Run (or resume) a crawl for an existing source.
    Run {
        /// Source ID to crawl.
        source_id: Uuid,
        /// Minimum delay between requests to the same domain, in seconds.
        #[arg(long, default_value_t = 0.5)]
        delay: f64,
        /// Number of queue items claimed per batch.
        #[arg(long, default_value_t = 10)]
        batch_size: i64,
        /// Maximum link depth from the entry URL.
        #[arg(long, default_value_t = 10)]
        max_depth: i32,
        /// Maximum number of pages to crawl in this run.
        #[arg(long, default_value_t = 1000)]
        max_pages: i64,
        /// Number of concurrent fetches.
        #[arg(long, default_value_t = 10)]
        concurrency: usize,
        /// Identifier recorded against claimed queue items.
        #[arg(long, default_value = "default")]
        worker_id: String,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
#[value(rename_all = "snake_case")]
enum CliSourceType {
    SinglePage,
    FullDomain,
}

impl From<CliSourceType> for SourceType {
    fn from(value: CliSourceType) -> Self {
        match value {
            CliSourceType::SinglePage => SourceType::SinglePage,
            CliSourceType::FullDomain => SourceType::FullDomain,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = datastore::connect(&config).await?;

    let source_repo = Arc::new(PgSourceRepository::new(pool.clone()));
    let run_repo = Arc::new(PgRunRepository::new(pool.clone()));
    let page_repo = Arc::new(PgCrawledPageRepository::new(pool.clone()));
    let queue_repo = Arc::new(PgQueueRepository::new(pool));

    match cli.command {
        Command::Create { url, r#type } => {
            let orchestrator = CrawlOrchestrator::new(
                source_repo,
                run_repo,
                page_repo,
                queue_repo,
                OrchestratorConfig::default(),
            );
            let source = orchestrator.create_source(&url, r#type.into()).await?;
            println!("created source {} ({})", source.id, source.domain);
            Ok(())
        }
        Command::Run {
            source_id,
            delay,
            batch_size,
            max_depth,
            max_pages,
            concurrency,
            worker_id,
        } => {
            let orchestrator_config = OrchestratorConfig {
                worker_id,
                delay: Duration::from_secs_f64(delay.max(0.0)),
                batch_size,
                max_depth,
                max_pages,
                concurrency,
            };
            let orchestrator = CrawlOrchestrator::new(
                source_repo,
                run_repo,
                page_repo,
                queue_repo,
                orchestrator_config,
            );

            match orchestrator.start_run(source_id).await {
                Ok(result) => {
                    tracing::info!(
                        pages_crawled = result.pages_crawled,
                        pages_failed = result.pages_failed,
                        "run finished"
                    );
                    Ok(())
                }
                Err(err) => {
                    tracing::error!(error = %err, "run failed");
                    std::process::exit(1);
                }
            }
        }
    }
}
