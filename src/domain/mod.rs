//! Persistent entities shared between the orchestrator and the datastore.

mod page;
mod queue;
mod run;
mod source;

pub use page::{CrawledPage, CrawledPageCreate};
pub use queue::{QueueItem, QueueItemCreate, QueueStatus};
pub use run::{CrawlRun, RunCounters, RunStatus};
pub use source::{CrawlSource, CrawlSourceCreate, SourceStatus, SourceType};
