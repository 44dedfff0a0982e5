//! Concurrent HTTP fetcher with rotating user-agent and error classification.
//!
//! The fetcher applies no rate limiting, inspects no robots rules, and
//! never retries — all of that policy belongs to the orchestrator
//! (spec §4.2).

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::Client;

const TIMEOUT: Duration = Duration::from_secs(10);

/// A closed list of five desktop-browser user-agent strings; one is
/// chosen at random per request.
const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// The authoritative record of one fetch attempt.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub body: Option<String>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status_code, Some(code) if (200..300).contains(&code)) && self.body.is_some()
    }
}

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Performs GETs against a single, dedicated `reqwest::Client`. Never
/// shared across concurrent workers (spec §4.2) — each worker in
/// `download_many` builds its own `Fetcher`.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .expect("reqwest client with static configuration always builds");
        Self { client }
    }

    /// Performs one GET with a 10s total timeout and a randomly selected
    /// user-agent. Non-2xx responses propagate `status_code` with
    /// `body=None`; network/timeout failures yield `(None, None, Some(err))`.
    pub async fn download(&self, url: &str) -> FetchOutcome {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, random_user_agent())
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    match resp.text().await {
                        Ok(body) => FetchOutcome {
                            body: Some(body),
                            status_code: Some(status.as_u16()),
                            error: None,
                        },
                        Err(e) => FetchOutcome {
                            body: None,
                            status_code: Some(status.as_u16()),
                            error: Some(format!("failed to read body: {e}")),
                        },
                    }
                } else {
                    FetchOutcome {
                        body: None,
                        status_code: Some(status.as_u16()),
                        error: Some(format!("HTTP {status}")),
                    }
                }
            }
            Err(e) => FetchOutcome {
                body: None,
                status_code: e.status().map(|s| s.as_u16()),
                error: Some(e.to_string()),
            },
        }
    }

    /// Runs up to `max_workers` concurrent downloads on dedicated
    /// clients; results are returned after all complete.
    pub async fn download_many(urls: Vec<String>, max_workers: usize) -> Vec<(String, FetchOutcome)> {
        use futures::stream::{self, StreamExt};

        stream::iter(urls)
            .map(|url| async move {
                let worker = Fetcher::new();
                let outcome = worker.download(&url).await;
                (url, outcome)
            })
            .buffer_unordered(max_workers.max(1))
            .collect()
            .await
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
