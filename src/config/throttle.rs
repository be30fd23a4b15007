//! Throttle parameters.

use chrono::Duration;

use crate::error::ConfigError;
use crate::rate::WaitPolicy;

/// The `timeout` value meaning "wait indefinitely".
pub const UNBOUNDED_TIMEOUT: f64 = -1.0;

/// Validated `throttle`/`timeout` combination.
///
/// # Example
///
/// ```rust
/// use ebay_rest::config::ThrottlePolicy;
///
/// assert!(ThrottlePolicy::new(true, Some(-1.0)).is_ok());
/// assert!(ThrottlePolicy::new(true, Some(2.5)).is_ok());
/// assert!(ThrottlePolicy::new(true, Some(0.0)).is_err());
/// assert!(ThrottlePolicy::new(false, Some(2.5)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThrottlePolicy {
    throttle: bool,
    timeout: Option<f64>,
}

fn is_unbounded(timeout: f64) -> bool {
    (timeout - UNBOUNDED_TIMEOUT).abs() < f64::EPSILON
}

impl ThrottlePolicy {
    /// Validates a throttle setting.
    ///
    /// `timeout` is in seconds and must be `-1` or positive. A timeout other
    /// than `-1` requires `throttle`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidThrottle`] for any other combination.
    pub fn new(throttle: bool, timeout: Option<f64>) -> Result<Self, ConfigError> {
        if let Some(timeout) = timeout {
            if !timeout.is_finite() || !(is_unbounded(timeout) || timeout > 0.0) {
                return Err(ConfigError::InvalidThrottle {
                    reason: format!("timeout must be -1 or a positive number of seconds, got {timeout}"),
                });
            }
            if !throttle && !is_unbounded(timeout) {
                return Err(ConfigError::InvalidThrottle {
                    reason: "a timeout requires throttle to be enabled".to_string(),
                });
            }
        }
        Ok(Self { throttle, timeout })
    }

    /// Returns `true` if callers may be blocked waiting for quota.
    #[must_use]
    pub const fn throttle(&self) -> bool {
        self.throttle
    }

    /// Returns the configured timeout in seconds.
    #[must_use]
    pub const fn timeout(&self) -> Option<f64> {
        self.timeout
    }

    /// Returns how the rate governor waits for an exhausted bucket.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn wait_policy(&self) -> WaitPolicy {
        if !self.throttle {
            return WaitPolicy::Fail;
        }
        match self.timeout {
            Some(timeout) if !is_unbounded(timeout) => {
                WaitPolicy::Bounded(Duration::milliseconds((timeout * 1000.0).round() as i64))
            }
            _ => WaitPolicy::Unbounded,
        }
    }
}
