//! Error taxonomy shared across the crawler.

use thiserror::Error;

/// Top-level error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A structural failure to parse a URL.
    #[error("failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A network or HTTP-level failure while fetching a page.
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A parse failure in robots.txt, sitemap XML, or HTML. Callers treat
    /// this as "no data" rather than propagating it further.
    #[error("parse failure: {0}")]
    Parse(String),

    /// The datastore rejected or failed a read/write.
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Startup configuration was missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// `start_run` was called against a source id that doesn't exist.
    #[error("source not found: {0}")]
    SourceNotFound(uuid::Uuid),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
