//! The rate governor.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::rate::telemetry::{parse_rate_limits, RateTelemetry};
use crate::rate::{Bucket, ResourceKey, TELEMETRY_RESOURCE};

/// How long an empty bucket table is trusted before the next refresh, in seconds.
pub const EMPTY_TABLE_TTL_SECONDS: i64 = 15 * 60;

/// What [`RateGovernor::admit`] does when a bucket is exhausted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Fail immediately with [`Error::QuotaExhausted`].
    Fail,
    /// Sleep until the bucket resets, as often as needed.
    Unbounded,
    /// Sleep at most this long in total, then fail.
    Bounded(Duration),
}

#[derive(Default)]
struct GovernorState {
    buckets: HashMap<ResourceKey, Bucket>,
    watermark: Option<DateTime<Utc>>,
}

/// Tracks per-resource call quota and admits calls against it.
///
/// The bucket table is loaded from rate-limit telemetry and trusted until
/// its staleness watermark, the nearest bucket reset. Each admitted call
/// takes one unit from its bucket. Unknown resources are admitted without
/// accounting.
///
/// The state mutex is never held across a sleep or a telemetry call. The
/// refresh mutex is held across the telemetry call, so one refresh runs at a
/// time and callers that find the table stale wait for it.
pub struct RateGovernor {
    enabled: bool,
    clock: Arc<dyn Clock>,
    state: Mutex<GovernorState>,
    refresh: Mutex<()>,
}

// Verify RateGovernor is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RateGovernor>();
};

impl RateGovernor {
    /// Creates a governor. A disabled governor admits every call.
    #[must_use]
    pub fn new(enabled: bool, clock: Arc<dyn Clock>) -> Self {
        Self {
            enabled,
            clock,
            state: Mutex::new(GovernorState::default()),
            refresh: Mutex::new(()),
        }
    }

    /// Returns `false` for sandbox facades, which are not governed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns a copy of the bucket for `key`, if one is known.
    pub async fn bucket(&self, key: &ResourceKey) -> Option<Bucket> {
        self.state.lock().await.buckets.get(key).cloned()
    }

    /// Returns the current staleness watermark.
    pub async fn watermark(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.watermark
    }

    /// Replaces the bucket table and moves the watermark to the nearest reset.
    pub async fn install(&self, buckets: HashMap<ResourceKey, Bucket>) {
        let mut state = self.state.lock().await;
        Self::install_locked(&mut state, buckets, self.clock.now());
    }

    fn install_locked(
        state: &mut GovernorState,
        mut buckets: HashMap<ResourceKey, Bucket>,
        now: DateTime<Utc>,
    ) {
        for bucket in buckets.values_mut() {
            bucket.replenish(now);
        }
        let nearest = buckets
            .values()
            .map(Bucket::reset)
            .filter(|reset| *reset > now)
            .min();
        state.watermark =
            Some(nearest.unwrap_or_else(|| now + Duration::seconds(EMPTY_TABLE_TTL_SECONDS)));
        tracing::debug!(
            buckets = buckets.len(),
            watermark = ?state.watermark,
            "installed rate limit table"
        );
        state.buckets = buckets;
    }

    /// Admits one call to `key`.
    ///
    /// Refreshes the bucket table through `telemetry` first if it is stale,
    /// except when `key` is the telemetry resource itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuotaExhausted`] if the bucket is empty and `wait`
    /// does not allow (further) waiting, or the telemetry call's error if a
    /// refresh fails.
    pub async fn admit(
        &self,
        key: &ResourceKey,
        wait: WaitPolicy,
        telemetry: &dyn RateTelemetry,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        // A deadline past the representable range never arrives.
        let (wait, deadline) = match wait {
            WaitPolicy::Bounded(timeout) => match self.clock.now().checked_add_signed(timeout) {
                Some(deadline) => (wait, Some(deadline)),
                None => (WaitPolicy::Unbounded, None),
            },
            other => (other, None),
        };

        loop {
            self.refresh_if_stale(key, telemetry).await?;

            let (reset, limit) = {
                let mut state = self.state.lock().await;
                let now = self.clock.now();
                let Some(bucket) = state.buckets.get_mut(key) else {
                    return Ok(());
                };
                bucket.replenish(now);
                if bucket.try_take() {
                    return Ok(());
                }
                (bucket.reset(), bucket.limit())
            };

            tracing::debug!(bucket = %key, %reset, "rate limit bucket exhausted");
            let exhausted = || Error::QuotaExhausted {
                resource: key.to_string(),
                reset,
            };
            if limit == 0 {
                return Err(exhausted());
            }

            match (wait, deadline) {
                (WaitPolicy::Unbounded, _) => self.clock.sleep_until(reset).await,
                (WaitPolicy::Bounded(_), Some(deadline)) => {
                    if self.clock.now() >= deadline {
                        return Err(exhausted());
                    }
                    self.clock.sleep_until(reset.min(deadline)).await;
                }
                _ => return Err(exhausted()),
            }
        }
    }

    async fn refresh_if_stale(
        &self,
        key: &ResourceKey,
        telemetry: &dyn RateTelemetry,
    ) -> Result<()> {
        if *key == TELEMETRY_RESOURCE {
            return Ok(());
        }

        if !self.is_stale().await {
            return Ok(());
        }
        let _refresh = self.refresh.lock().await;
        if !self.is_stale().await {
            return Ok(());
        }

        tracing::debug!(bucket = %key, "refreshing rate limit table");
        let payload = telemetry.fetch_rate_limits().await?;

        let mut state = self.state.lock().await;
        Self::install_locked(&mut state, parse_rate_limits(&payload), self.clock.now());
        Ok(())
    }

    async fn is_stale(&self) -> bool {
        let state = self.state.lock().await;
        state
            .watermark
            .map_or(true, |watermark| self.clock.now() >= watermark)
    }
}

impl fmt::Debug for RateGovernor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateGovernor")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ITEM: ResourceKey = ResourceKey::from_static("buy", "browse", "item");

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()
    }

    /// Serves a fixed payload, counting fetches.
    struct Payload {
        body: Value,
        fetches: AtomicUsize,
    }

    impl Payload {
        fn item(limit: u32, reset: DateTime<Utc>) -> Self {
            Self {
                body: json!({
                    "rateLimits": [{
                        "apiContext": "buy",
                        "apiName": "Browse",
                        "resources": [{
                            "name": "item",
                            "rates": [{
                                "limit": limit,
                                "remaining": limit,
                                "reset": reset.to_rfc3339(),
                                "timeWindow": 60
                            }]
                        }]
                    }]
                }),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateTelemetry for Payload {
        async fn fetch_rate_limits(&self) -> Result<Value> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl RateTelemetry for Failing {
        async fn fetch_rate_limits(&self) -> Result<Value> {
            Err(Error::transport(503, "down"))
        }
    }

    /// Never answers.
    struct Hanging;

    #[async_trait]
    impl RateTelemetry for Hanging {
        async fn fetch_rate_limits(&self) -> Result<Value> {
            std::future::pending().await
        }
    }

    /// Serves `payload` once `open` is notified.
    struct Gated {
        payload: Payload,
        open: tokio::sync::Notify,
    }

    #[async_trait]
    impl RateTelemetry for Gated {
        async fn fetch_rate_limits(&self) -> Result<Value> {
            self.open.notified().await;
            self.payload.fetch_rate_limits().await
        }
    }

    fn governor(clock: &ManualClock) -> RateGovernor {
        RateGovernor::new(true, Arc::new(clock.clone()))
    }

    #[tokio::test]
    async fn test_admits_exactly_limit_then_fails() {
        let clock = ManualClock::new(t0());
        let telemetry = Payload::item(5, t0() + Duration::seconds(60));
        let governor = governor(&clock);

        for _ in 0..5 {
            governor.admit(&ITEM, WaitPolicy::Fail, &telemetry).await.unwrap();
        }
        let error = governor
            .admit(&ITEM, WaitPolicy::Fail, &telemetry)
            .await
            .unwrap_err();
        assert_eq!(error.number(), 99_009);
        assert_eq!(telemetry.fetches(), 1);
    }

    #[tokio::test]
    async fn test_disabled_governor_never_fetches() {
        let clock = ManualClock::new(t0());
        let telemetry = Payload::item(0, t0());
        let governor = RateGovernor::new(false, Arc::new(clock));

        governor.admit(&ITEM, WaitPolicy::Fail, &telemetry).await.unwrap();
        assert_eq!(telemetry.fetches(), 0);
    }

    #[tokio::test]
    async fn test_unknown_resource_fails_open() {
        let clock = ManualClock::new(t0());
        let telemetry = Payload::item(1, t0() + Duration::seconds(60));
        let governor = governor(&clock);
        let other = ResourceKey::from_static("sell", "inventory", "sell.inventory");

        for _ in 0..10 {
            governor.admit(&other, WaitPolicy::Fail, &telemetry).await.unwrap();
        }
        assert!(governor.bucket(&other).await.is_none());
    }

    #[tokio::test]
    async fn test_telemetry_resource_never_refreshes() {
        let clock = ManualClock::new(t0());
        let telemetry = Payload::item(5, t0() + Duration::seconds(60));
        let governor = governor(&clock);

        governor
            .admit(&TELEMETRY_RESOURCE, WaitPolicy::Fail, &telemetry)
            .await
            .unwrap();
        assert_eq!(telemetry.fetches(), 0);
        assert_eq!(governor.watermark().await, None);
    }

    #[tokio::test]
    async fn test_watermark_is_nearest_reset() {
        let clock = ManualClock::new(t0());
        let telemetry = Payload::item(5, t0() + Duration::seconds(45));
        let governor = governor(&clock);

        governor.admit(&ITEM, WaitPolicy::Fail, &telemetry).await.unwrap();
        assert_eq!(
            governor.watermark().await,
            Some(t0() + Duration::seconds(45))
        );

        clock.advance(Duration::seconds(45));
        governor.admit(&ITEM, WaitPolicy::Fail, &telemetry).await.unwrap();
        assert_eq!(telemetry.fetches(), 2);
    }

    #[tokio::test]
    async fn test_empty_table_is_trusted_for_fifteen_minutes() {
        let clock = ManualClock::new(t0());
        let governor = governor(&clock);
        let telemetry = Payload {
            body: json!({"rateLimits": []}),
            fetches: AtomicUsize::new(0),
        };

        governor.admit(&ITEM, WaitPolicy::Fail, &telemetry).await.unwrap();
        assert_eq!(
            governor.watermark().await,
            Some(t0() + Duration::minutes(15))
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_propagates_and_stays_stale() {
        let clock = ManualClock::new(t0());
        let governor = governor(&clock);

        let error = governor
            .admit(&ITEM, WaitPolicy::Fail, &Failing)
            .await
            .unwrap_err();
        assert_eq!(error.number(), 99_503);
        assert_eq!(governor.watermark().await, None);

        let telemetry = Payload::item(1, t0() + Duration::seconds(60));
        governor.admit(&ITEM, WaitPolicy::Fail, &telemetry).await.unwrap();
        assert_eq!(telemetry.fetches(), 1);
    }

    #[tokio::test]
    async fn test_unbounded_wait_resumes_at_reset() {
        let clock = ManualClock::new(t0());
        let reset = t0() + Duration::seconds(60);
        let governor = Arc::new(governor(&clock));
        let telemetry = Arc::new(Payload::item(5, reset));

        for _ in 0..5 {
            governor
                .admit(&ITEM, WaitPolicy::Unbounded, telemetry.as_ref())
                .await
                .unwrap();
        }

        let blocked = {
            let governor = Arc::clone(&governor);
            let telemetry = Arc::clone(&telemetry);
            tokio::spawn(async move {
                let key = ITEM;
                governor
                    .admit(&key, WaitPolicy::Unbounded, telemetry.as_ref())
                    .await
            })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!blocked.is_finished());

        clock.set(reset);
        blocked.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_bounded_wait_fails_after_timeout() {
        let clock = ManualClock::new(t0());
        let governor = Arc::new(governor(&clock));
        let telemetry = Arc::new(Payload::item(1, t0() + Duration::seconds(60)));
        let wait = WaitPolicy::Bounded(Duration::seconds(10));

        governor.admit(&ITEM, wait, telemetry.as_ref()).await.unwrap();

        let blocked = {
            let governor = Arc::clone(&governor);
            let telemetry = Arc::clone(&telemetry);
            tokio::spawn(async move {
                let key = ITEM;
                governor.admit(&key, wait, telemetry.as_ref()).await
            })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        clock.advance(Duration::seconds(10));

        let error = blocked.await.unwrap().unwrap_err();
        assert!(matches!(error, Error::QuotaExhausted { .. }));
    }

    #[tokio::test]
    async fn test_bounded_wait_succeeds_when_reset_comes_first() {
        let clock = ManualClock::new(t0());
        let governor = Arc::new(governor(&clock));
        let telemetry = Arc::new(Payload::item(1, t0() + Duration::seconds(5)));
        let wait = WaitPolicy::Bounded(Duration::seconds(30));

        governor.admit(&ITEM, wait, telemetry.as_ref()).await.unwrap();

        let blocked = {
            let governor = Arc::clone(&governor);
            let telemetry = Arc::clone(&telemetry);
            tokio::spawn(async move {
                let key = ITEM;
                governor.admit(&key, wait, telemetry.as_ref()).await
            })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        clock.advance(Duration::seconds(5));

        blocked.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_refresh_does_not_block_later_refreshes() {
        let clock = ManualClock::new(t0());
        let governor = Arc::new(governor(&clock));

        let stuck = {
            let governor = Arc::clone(&governor);
            tokio::spawn(async move {
                let key = ITEM;
                governor.admit(&key, WaitPolicy::Fail, &Hanging).await
            })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        stuck.abort();
        assert!(stuck.await.unwrap_err().is_cancelled());

        let telemetry = Payload::item(1, t0() + Duration::seconds(60));
        governor.admit(&ITEM, WaitPolicy::Fail, &telemetry).await.unwrap();
        let error = governor
            .admit(&ITEM, WaitPolicy::Fail, &telemetry)
            .await
            .unwrap_err();

        assert_eq!(error.number(), 99_009);
        assert_eq!(telemetry.fetches(), 1);
        assert_eq!(
            governor.watermark().await,
            Some(t0() + Duration::seconds(60))
        );
    }

    #[tokio::test]
    async fn test_callers_wait_for_the_first_refresh() {
        let clock = ManualClock::new(t0());
        let governor = Arc::new(governor(&clock));
        let telemetry = Arc::new(Gated {
            payload: Payload::item(1, t0() + Duration::seconds(60)),
            open: tokio::sync::Notify::new(),
        });

        let mut callers = Vec::new();
        for _ in 0..6 {
            let governor = Arc::clone(&governor);
            let telemetry = Arc::clone(&telemetry);
            callers.push(tokio::spawn(async move {
                let key = ITEM;
                governor
                    .admit(&key, WaitPolicy::Fail, telemetry.as_ref())
                    .await
            }));
            tokio::task::yield_now().await;
        }
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(callers.iter().all(|caller| !caller.is_finished()));

        telemetry.open.notify_one();
        let mut admitted = 0;
        for caller in callers {
            if caller.await.unwrap().is_ok() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(telemetry.payload.fetches(), 1);
    }

    #[tokio::test]
    async fn test_huge_bounded_timeout_waits_like_unbounded() {
        let clock = ManualClock::new(t0());
        let reset = t0() + Duration::seconds(60);
        let governor = Arc::new(governor(&clock));
        let telemetry = Arc::new(Payload::item(1, reset));
        let wait = crate::config::ThrottlePolicy::new(true, Some(1e13))
            .unwrap()
            .wait_policy();
        assert!(matches!(wait, WaitPolicy::Bounded(_)));

        governor.admit(&ITEM, wait, telemetry.as_ref()).await.unwrap();

        let blocked = {
            let governor = Arc::clone(&governor);
            let telemetry = Arc::clone(&telemetry);
            tokio::spawn(async move {
                let key = ITEM;
                governor.admit(&key, wait, telemetry.as_ref()).await
            })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!blocked.is_finished());

        clock.set(reset);
        blocked.await.unwrap().unwrap();
    }
}
