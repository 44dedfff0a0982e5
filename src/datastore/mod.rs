//! Concrete Postgres implementations of the repository contracts in
//! `crate::repository`, reached through `DATASTORE_URL` (spec §6).

mod page;
mod pool;
mod queue;
mod run;
mod source;

pub use page::PgCrawledPageRepository;
pub use pool::connect;
pub use queue::PgQueueRepository;
pub use run::PgRunRepository;
pub use source::PgSourceRepository;
