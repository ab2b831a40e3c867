//! Per-client admission control.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::Quota;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use tokio::task::JoinHandle;
use tracing::debug;

type KeyedLimiter<C> = governor::RateLimiter<
    String,
    DashMapStateStore<String>,
    C,
    NoOpMiddleware<<C as Clock>::Instant>,
>;

/// Token bucket per client key.
///
/// A fresh key starts with `burst` tokens, refilled at `per_second` tokens
/// per second. State lives in a sharded map so keys on different shards never
/// contend, and each check is a single atomic update of the key's state.
/// Idle keys are pruned by [`RateLimiter::retain_recent`].
pub struct RateLimiter<C: Clock = DefaultClock> {
    limiter: KeyedLimiter<C>,
}

impl RateLimiter<DefaultClock> {
    pub fn new(burst: NonZeroU32, per_second: NonZeroU32) -> Self {
        Self::with_clock(burst, per_second, DefaultClock::default())
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(burst: NonZeroU32, per_second: NonZeroU32, clock: C) -> Self {
        let quota = Quota::per_second(per_second).allow_burst(burst);
        Self {
            limiter: governor::RateLimiter::dashmap_with_clock(quota, clock),
        }
    }

    /// Takes one token from `client_key`'s bucket.
    ///
    /// Returns `false` without consuming anything if the bucket is empty.
    pub fn allow(&self, client_key: &str) -> bool {
        self.limiter.check_key(&client_key.to_string()).is_ok()
    }

    /// Drops buckets that have refilled completely.
    ///
    /// A dropped key behaves exactly like a fresh one, so this never changes
    /// an admission decision.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of keys currently holding state.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}

impl<C> RateLimiter<C>
where
    C: Clock + Send + Sync + 'static,
    C::Instant: Send + Sync,
{
    /// Periodically calls [`RateLimiter::retain_recent`] until the runtime shuts down.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let before = self.tracked_keys();
                self.retain_recent();
                debug!(
                    before,
                    after = self.tracked_keys(),
                    "rate limiter sweep"
                );
            }
        })
    }
}
