use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::Throttle;

/// Longest single sleep; very low rates wake up and re-check at this pace.
const MAX_WAIT: Duration = Duration::from_secs(60);

/// Token bucket pacing the start of probes within one domain search.
///
/// Tokens refill continuously at `per_second` up to `burst`; an empty bucket
/// makes [`RateLimiter::acquire`] sleep until the next token is due.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    per_second: f64,
    capacity: f64,
    bucket: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    /// `None` when the throttle is disabled.
    pub(crate) fn new(throttle: Throttle) -> Option<Self> {
        if !throttle.is_enabled() {
            return None;
        }
        let capacity = f64::from(throttle.burst.max(1));
        Some(Self {
            per_second: throttle.per_second,
            capacity,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                refilled_at: Instant::now(),
            }),
        })
    }

    pub(crate) async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.capacity);
                bucket.refilled_at = now;
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                let secs = (1.0 - bucket.tokens) / self.per_second;
                Duration::try_from_secs_f64(secs).map_or(MAX_WAIT, |wait| wait.min(MAX_WAIT))
            };
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_throttle_has_no_limiter() {
        assert!(RateLimiter::new(Throttle::disabled()).is_none());
        assert!(RateLimiter::new(Throttle::default()).is_some());
    }

    #[tokio::test]
    async fn burst_is_immediate_then_paced() {
        let limiter = RateLimiter::new(Throttle {
            per_second: 20.0,
            burst: 2,
        })
        .expect("enabled");

        let started = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        let burst = started.elapsed();

        limiter.acquire().await;
        let paced = started.elapsed();

        assert!(burst < Duration::from_millis(40), "burst took {burst:?}");
        assert!(paced >= Duration::from_millis(40), "third token after {paced:?}");
    }

    #[tokio::test]
    async fn zero_burst_still_allows_one() {
        let limiter = RateLimiter::new(Throttle {
            per_second: 1.0,
            burst: 0,
        })
        .expect("enabled");
        tokio::time::timeout(Duration::from_millis(200), limiter.acquire())
            .await
            .expect("first token is available");
    }

    #[tokio::test]
    async fn tiny_rate_waits_instead_of_failing() {
        let limiter = RateLimiter::new(Throttle {
            per_second: 1e-300,
            burst: 1,
        })
        .expect("enabled");
        limiter.acquire().await;

        let second = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(second.is_err(), "second token should not be due yet");
    }
}
