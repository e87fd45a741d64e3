//! Outbound request pacing toward the storefront.
//!
//! The pipeline awaits [`Throttle::acquire`] before every storefront
//! request. [`GovernorThrottle`] is a token bucket with a burst of one,
//! so requests are spaced at a fixed interval no matter how many inbound
//! searches run concurrently.

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

#[async_trait]
pub trait Throttle: Send + Sync {
    /// Waits until one more outbound request is allowed.
    async fn acquire(&self);
}

/// Shared fixed-interval limiter.
pub struct GovernorThrottle {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    requests_per_minute: u32,
}

impl GovernorThrottle {
    /// `requests_per_minute` of zero falls back to 60.
    pub fn new(requests_per_minute: u32) -> Self {
        let rpm = if requests_per_minute == 0 { 60 } else { requests_per_minute };
        let rpm = NonZeroU32::new(rpm).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(rpm).allow_burst(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::direct(quota),
            requests_per_minute: rpm.get(),
        }
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }

    /// Non-blocking probe; `true` if a request could go out now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

#[async_trait]
impl Throttle for GovernorThrottle {
    async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

/// No pacing. Used by one-shot CLI runs and tests.
pub struct Unthrottled;

#[async_trait]
impl Throttle for Unthrottled {
    async fn acquire(&self) {}
}
