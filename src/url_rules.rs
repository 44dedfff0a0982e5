//! Pure URL canonicalization and identity rules.
//!
//! URL identity across the whole system is `url_hash`: queue uniqueness,
//! dedup during link extraction, and page lookups all key off of it, so
//! `normalize` has to be a stable, idempotent function of its input.

use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{CrawlError, Result};

/// Lowercases scheme and host, strips the fragment, strips a trailing
/// slash from the path (unless the path is empty or `/`), and preserves
/// query and params verbatim.
pub fn normalize(input: &str) -> Result<String> {
    let mut parsed = Url::parse(input)?;

    parsed.set_fragment(None);

    let scheme = parsed.scheme().to_ascii_lowercase();
    parsed
        .set_scheme(&scheme)
        .map_err(|_| CrawlError::Parse(format!("invalid scheme in {input}")))?;

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_ascii_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| CrawlError::Parse(format!("invalid host in {input}: {e}")))?;
    }

    let path = parsed.path();
    let trimmed = if path.is_empty() || path == "/" {
        "/".to_string()
    } else {
        let without_slash = path.trim_end_matches('/');
        if without_slash.is_empty() {
            "/".to_string()
        } else {
            without_slash.to_string()
        }
    };
    parsed.set_path(&trimmed);

    Ok(parsed.to_string())
}

/// SHA-256 hex digest of the UTF-8 bytes of `normalize(url)`.
pub fn url_hash(input: &str) -> Result<String> {
    let normalized = normalize(input)?;
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 hex digest of raw bytes (used for `CrawledPage::content_hash`).
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// The authority of the parsed URL: host plus an explicit port, e.g.
/// `example.com` or `example.com:8080`. Matches the original's
/// `urlparse(url).netloc`, so a same-host link on a different port is
/// off-domain rather than silently folded into the default-port source.
pub fn extract_domain(input: &str) -> Result<String> {
    let parsed = Url::parse(input)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| CrawlError::Parse(format!("URL has no host: {input}")))?;
    match parsed.port() {
        Some(port) => Ok(format!("{host}:{port}")),
        None => Ok(host.to_string()),
    }
}

/// `scheme://host[:port]`, used to anchor robots.txt and sitemap lookups.
pub fn base_url(input: &str) -> Result<String> {
    let parsed = Url::parse(input)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| CrawlError::Parse(format!("URL has no host: {input}")))?;
    match parsed.port() {
        Some(port) => Ok(format!("{}://{}:{}", parsed.scheme(), host, port)),
        None => Ok(format!("{}://{}", parsed.scheme(), host)),
    }
}
