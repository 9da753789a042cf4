// Request pacing for the Danbooru API.
//
// Danbooru throttles anonymous and low-level accounts well below what a burst
// of artist predecessor lookups can produce (one lookup per artist edit in a
// batch of up to 1000). Every request waits for its slot here first, which
// keeps us under the limit without needing any retry logic.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Longest wait between two requests, however low the configured rate.
pub const MAX_SPACING: Duration = Duration::from_secs(60);

/// Spaces requests at least `spacing` apart.
#[derive(Clone)]
pub struct RateLimiter {
    spacing: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Allow up to `requests_per_second` requests. Zero, negative and NaN
    /// turn pacing off; tiny rates are capped at `MAX_SPACING`.
    pub fn new(requests_per_second: f64) -> Self {
        let spacing = if requests_per_second > 0.0 {
            Duration::try_from_secs_f64(1.0 / requests_per_second)
                .map_or(MAX_SPACING, |spacing| spacing.min(MAX_SPACING))
        } else {
            Duration::ZERO
        };
        Self {
            spacing,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Wait for the next free slot and claim it.
    pub async fn acquire(&self) {
        if self.spacing.is_zero() {
            return;
        }

        // Claim the slot under the lock, sleep outside it, so concurrent
        // callers queue up one spacing apart instead of all waking together.
        let wait_until = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.spacing);
            slot
        };

        tokio::time::sleep_until(wait_until).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_is_immediate() {
        let limiter = RateLimiter::new(1.0);
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_second_request_waits_for_spacing() {
        let limiter = RateLimiter::new(5.0); // 200ms apart
        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(150),
            "Expected ~200ms delay, got {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_zero_rate_disables_pacing() {
        let limiter = RateLimiter::new(0.0);
        assert_eq!(limiter.spacing(), Duration::ZERO);

        let start = Instant::now();
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_idle_time_is_not_banked() {
        let limiter = RateLimiter::new(10.0); // 100ms apart
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(350)).await;

        // After a long idle period only the next request is free; the one
        // after it still waits its full spacing.
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn test_tiny_rate_is_capped() {
        assert_eq!(RateLimiter::new(1e-20).spacing(), MAX_SPACING);
        assert_eq!(RateLimiter::new(0.001).spacing(), MAX_SPACING);
        assert_eq!(RateLimiter::new(f64::NAN).spacing(), Duration::ZERO);
        assert_eq!(RateLimiter::new(f64::INFINITY).spacing(), Duration::ZERO);
    }
}
