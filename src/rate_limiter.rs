//! Per-domain minimum-interval pacing across concurrent workers.
//!
//! `acquire(domain)` blocks until at least `delay(domain)` seconds have
//! elapsed since the most recent successful `acquire(domain)` by any
//! caller. The reservation is recorded *before* sleeping so that
//! overlapping acquires on the same domain chain rather than collide
//! (spec §4.3), and monotonic time is used so wall-clock jumps can't
//! compress the interval.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct DomainRateLimiter {
    default_delay: Duration,
    overrides: Mutex<HashMap<String, Duration>>,
    next_available: Mutex<HashMap<String, Instant>>,
}

impl DomainRateLimiter {
    pub fn new(default_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            default_delay,
            overrides: Mutex::new(HashMap::new()),
            next_available: Mutex::new(HashMap::new()),
        })
    }

    /// Sets a custom delay for a specific domain, used to apply
    /// `Crawl-delay` from robots.txt.
    pub async fn set_delay(&self, domain: &str, delay: Duration) {
        self.overrides.lock().await.insert(domain.to_string(), delay);
    }

    pub async fn delay(&self, domain: &str) -> Duration {
        self.overrides
            .lock()
            .await
            .get(domain)
            .copied()
            .unwrap_or(self.default_delay)
    }

    /// Blocks the caller until the domain's pacing interval has elapsed.
    pub async fn acquire(&self, domain: &str) {
        let delay = self.delay(domain).await;

        let wait_until = {
            let mut next_available = self.next_available.lock().await;
            let now = Instant::now();
            let earliest = next_available.get(domain).copied().unwrap_or(now);
            let start = earliest.max(now);
            let reserved = start + delay;
            next_available.insert(domain.to_string(), reserved);
            start
        };

        tokio::time::sleep_until(wait_until).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[tokio::test(start_paused = true)]
    async fn sequential_acquires_are_spaced_by_delay() {
        let limiter = DomainRateLimiter::new(StdDuration::from_millis(200));

        let start = Instant::now();
        limiter.acquire("x.test").await;
        let first = Instant::now().duration_since(start);
        limiter.acquire("x.test").await;
        let second = Instant::now().duration_since(start);

        assert!(first < StdDuration::from_millis(50));
        assert!(second >= StdDuration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_acquires_on_same_domain_chain() {
        let limiter = DomainRateLimiter::new(StdDuration::from_millis(100));

        let a = Arc::clone(&limiter);
        let b = Arc::clone(&limiter);
        let c = Arc::clone(&limiter);

        let (ta, tb, tc) = tokio::join!(
            async {
                a.acquire("x.test").await;
                Instant::now()
            },
            async {
                b.acquire("x.test").await;
                Instant::now()
            },
            async {
                c.acquire("x.test").await;
                Instant::now()
            },
        );

        let mut times = vec![ta, tb, tc];
        times.sort();
        assert!(times[1].duration_since(times[0]) >= StdDuration::from_millis(100));
        assert!(times[2].duration_since(times[1]) >= StdDuration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn different_domains_do_not_block_each_other() {
        let limiter = DomainRateLimiter::new(StdDuration::from_millis(500));

        limiter.acquire("a.test").await;
        let start = Instant::now();
        limiter.acquire("b.test").await;
        let elapsed = Instant::now().duration_since(start);

        assert!(elapsed < StdDuration::from_millis(50));
    }
}
