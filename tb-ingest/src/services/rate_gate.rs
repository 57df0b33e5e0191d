//! Shared rate gate for external calls
//!
//! Every external request waits on the same gate before it is issued: trend
//! requests inside `TrendsClient`, recipe and search calls in the resolver.
//! The spacing therefore holds across services and call sites.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::time::Duration;
use tracing::debug;

/// Token bucket admitting one call per interval (burst 1)
pub struct RateGate {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    interval: Duration,
}

impl RateGate {
    /// Gate spacing calls `interval` apart; a zero interval admits immediately
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(RateLimiter::direct);
        Self { limiter, interval }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Gate that never waits
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next call may be issued
    pub async fn admit(&self) {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                debug!(interval = ?self.interval, "Rate gate: waiting");
                limiter.until_ready().await;
            }
        }
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::from_millis(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_zero_interval_has_no_limiter() {
        let gate = RateGate::unlimited();
        assert!(gate.limiter.is_none());
        assert_eq!(gate.interval(), Duration::ZERO);
    }

    #[test]
    fn test_default_interval_is_one_second() {
        assert_eq!(RateGate::default().interval(), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_gate_spaces_admissions() {
        let gate = RateGate::from_millis(100);
        let start = Instant::now();

        // First admission - no wait
        gate.admit().await;
        let first_elapsed = start.elapsed();

        gate.admit().await;
        gate.admit().await;
        let third_elapsed = start.elapsed();

        assert!(first_elapsed < Duration::from_millis(50));
        assert!(third_elapsed >= Duration::from_millis(180));
    }

    #[tokio::test]
    async fn test_unlimited_gate_does_not_wait() {
        let gate = RateGate::unlimited();
        let start = Instant::now();
        for _ in 0..20 {
            gate.admit().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
