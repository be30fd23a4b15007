//! Time sources for token expiry and rate-window arithmetic.
//!
//! Everything time-dependent in the crate reads the current instant and
//! sleeps through a [`Clock`], so tests can drive expiry and quota windows
//! deterministically with a [`ManualClock`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;

/// A source of the current UTC instant that can also suspend the caller.
#[async_trait]
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Suspends the caller until `instant` has been reached.
    ///
    /// Returns immediately if `instant` is not in the future.
    async fn sleep_until(&self, instant: DateTime<Utc>);
}

/// The wall clock, backed by `chrono` and the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_until(&self, instant: DateTime<Utc>) {
        let remaining = instant - Utc::now();
        if let Ok(remaining) = remaining.to_std() {
            tokio::time::sleep(remaining).await;
        }
    }
}

/// A synthetic clock that only moves when told to.
///
/// Sleepers are parked until [`advance`](Self::advance) or
/// [`set`](Self::set) moves the clock to or past their wake-up instant.
/// Clones share the same underlying time.
///
/// # Example
///
/// ```rust
/// use ebay_rest::clock::{Clock, ManualClock};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
/// clock.advance(Duration::minutes(5));
/// assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap());
/// ```
#[derive(Clone)]
pub struct ManualClock {
    time: Arc<watch::Sender<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        let (time, _) = watch::channel(start);
        Self {
            time: Arc::new(time),
        }
    }

    /// Moves the clock forward by `by` and wakes any sleepers that are due.
    pub fn advance(&self, by: Duration) {
        self.time.send_modify(|now| *now += by);
    }

    /// Moves the clock to `instant`; moving backwards is ignored.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.time.send_if_modified(|now| {
            if instant > *now {
                *now = instant;
                true
            } else {
                false
            }
        });
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &*self.time.borrow())
            .finish()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.time.borrow()
    }

    async fn sleep_until(&self, instant: DateTime<Utc>) {
        let mut rx = self.time.subscribe();
        loop {
            if *rx.borrow_and_update() >= instant {
                return;
            }
            // The sender lives in `self`, so `changed` cannot fail while we wait.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
