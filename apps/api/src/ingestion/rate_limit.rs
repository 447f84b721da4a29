//! Request pacing for metered providers.
//!
//! Paid search APIs throttle or ban bursty callers, so every request to one
//! goes through a `RateLimiter` first. One limiter per provider lives in
//! `AppState`; concurrent searches share its spacing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::Config;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Waits until the next request may be sent.
    async fn acquire(&self);
}

/// Grants permits at most once per `interval`. The first permit is immediate.
pub struct FixedIntervalLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl FixedIntervalLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RateLimiter for FixedIntervalLimiter {
    async fn acquire(&self) {
        // Reserve a slot under the lock, sleep outside it.
        let wait_until = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        tokio::time::sleep_until(wait_until).await;
    }
}

/// Never waits. Used when pacing is configured as zero.
pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn acquire(&self) {}
}

/// One shared limiter per metered provider.
#[derive(Clone)]
pub struct PaidLimiters {
    pub serp: Arc<dyn RateLimiter>,
    pub jsearch: Arc<dyn RateLimiter>,
}

impl PaidLimiters {
    pub fn from_config(config: &Config) -> Self {
        Self {
            serp: paced(config.serp_pacing),
            jsearch: paced(config.jsearch_pacing),
        }
    }

    #[cfg(test)]
    pub fn unlimited() -> Self {
        Self {
            serp: Arc::new(Unlimited),
            jsearch: Arc::new(Unlimited),
        }
    }
}

fn paced(interval: Duration) -> Arc<dyn RateLimiter> {
    if interval.is_zero() {
        Arc::new(Unlimited)
    } else {
        Arc::new(FixedIntervalLimiter::new(interval))
    }
}
