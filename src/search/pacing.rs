//! Wait policies between probes and between result pages.
//!
//! The provider enforces two separate constraints: an overall request rate,
//! and a settle period before a freshly issued page token becomes valid.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// Decides how long the aggregator waits before each request.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Called before every probe except the first.
    async fn before_probe(&self);

    /// Called after a page with a continuation token, before requesting it.
    async fn before_next_page(&self);
}

/// Fixed sleeps between probes and pages
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayPacer {
    pub probe_delay: Duration,
    pub page_delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(probe_delay: Duration, page_delay: Duration) -> Self {
        Self {
            probe_delay,
            page_delay,
        }
    }

    /// No waiting at all
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn before_probe(&self) {
        if !self.probe_delay.is_zero() {
            tokio::time::sleep(self.probe_delay).await;
        }
    }

    async fn before_next_page(&self) {
        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
    }
}

/// Token-bucket limit on probe starts plus a fixed page settle delay
pub struct GovernedPacer {
    limiter: DefaultDirectRateLimiter,
    page_delay: Duration,
}

impl GovernedPacer {
    pub fn new(probes_per_second: NonZeroU32, burst: NonZeroU32, page_delay: Duration) -> Self {
        let quota = Quota::per_second(probes_per_second).allow_burst(burst);
        Self {
            limiter: RateLimiter::direct(quota),
            page_delay,
        }
    }
}

#[async_trait]
impl Pacer for GovernedPacer {
    async fn before_probe(&self) {
        self.limiter.until_ready().await;
    }

    async fn before_next_page(&self) {
        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
    }
}
