//! robots.txt handling.
//!
//! Fetches `base_url + "/robots.txt"` once at construction. If the fetch
//! returns 200 with a body, it is parsed as standard robots.txt;
//! otherwise the parser is initialized with an empty ruleset
//! (permissive) — spec §4.4.

use robotstxt::DefaultMatcher;

use crate::fetcher::Fetcher;

const DEFAULT_USER_AGENT: &str = "*";

pub struct RobotsHandler {
    base_url: String,
    content: String,
    crawl_delay: Option<f64>,
    sitemaps: Vec<String>,
}

impl RobotsHandler {
    pub async fn fetch(base_url: &str, fetcher: &Fetcher) -> Self {
        let robots_url = format!("{base_url}/robots.txt");
        let outcome = fetcher.download(&robots_url).await;

        let content = match (&outcome.status_code, &outcome.body) {
            (Some(200), Some(body)) => {
                tracing::info!(url = %robots_url, "loaded robots.txt");
                body.clone()
            }
            _ => {
                tracing::debug!(url = %robots_url, "no robots.txt found, defaulting to permissive");
                String::new()
            }
        };

        let crawl_delay = extract_crawl_delay(&content);
        let sitemaps = extract_sitemaps(&content);

        Self {
            base_url: base_url.to_string(),
            content,
            crawl_delay,
            sitemaps,
        }
    }

    /// Consults the rules for user-agent `*`; on any parse error,
    /// defaults to `true`.
    pub fn can_fetch(&self, url: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }
        DefaultMatcher::default().one_agent_allowed_by_robots(&self.content, DEFAULT_USER_AGENT, url)
    }

    pub fn crawl_delay(&self) -> Option<f64> {
        self.crawl_delay
    }

    /// Sitemap URLs declared in robots.txt; if none are declared,
    /// returns `[base_url + "/sitemap.xml"]`.
    pub fn sitemaps(&self) -> Vec<String> {
        if self.sitemaps.is_empty() {
            vec![format!("{}/sitemap.xml", self.base_url)]
        } else {
            self.sitemaps.clone()
        }
    }
}

/// The `robotstxt` crate matches Allow/Disallow but doesn't expose
/// Crawl-delay, so it's extracted with a manual line scan restricted to
/// the `*` user-agent block.
fn extract_crawl_delay(content: &str) -> Option<f64> {
    let mut in_wildcard_block = false;
    let mut delay = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lowered = line.to_ascii_lowercase();

        if let Some(agent) = lowered.strip_prefix("user-agent:") {
            in_wildcard_block = agent.trim() == "*";
            continue;
        }

        if in_wildcard_block {
            if let Some(value) = lowered.strip_prefix("crawl-delay:") {
                if let Ok(parsed) = value.trim().parse::<f64>() {
                    delay = Some(parsed);
                }
            }
        }
    }

    delay
}

fn extract_sitemaps(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let lowered = line.to_ascii_lowercase();
            lowered
                .strip_prefix("sitemap:")
                .map(|_| line.splitn(2, ':').nth(1).unwrap_or("").trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .collect()
}
