//! Quota buckets and their keys.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Identifies one quota bucket: `(api_context, api_name, resource)`.
///
/// Components are compared case-sensitively; telemetry parsing lower-cases
/// the context and API name.
///
/// # Example
///
/// ```rust
/// use ebay_rest::rate::ResourceKey;
///
/// const BROWSE: ResourceKey = ResourceKey::from_static("buy", "browse", "buy.browse");
/// assert_eq!(BROWSE.to_string(), "buy/browse/buy.browse");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    api_context: Cow<'static, str>,
    api_name: Cow<'static, str>,
    resource: Cow<'static, str>,
}

impl ResourceKey {
    /// Creates a key from static strings, usable in `const` position.
    #[must_use]
    pub const fn from_static(
        api_context: &'static str,
        api_name: &'static str,
        resource: &'static str,
    ) -> Self {
        Self {
            api_context: Cow::Borrowed(api_context),
            api_name: Cow::Borrowed(api_name),
            resource: Cow::Borrowed(resource),
        }
    }

    /// Creates a key from owned strings.
    #[must_use]
    pub fn new(
        api_context: impl Into<String>,
        api_name: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            api_context: Cow::Owned(api_context.into()),
            api_name: Cow::Owned(api_name.into()),
            resource: Cow::Owned(resource.into()),
        }
    }

    /// Returns the API context, e.g. `buy`.
    #[must_use]
    pub fn api_context(&self) -> &str {
        &self.api_context
    }

    /// Returns the API name, e.g. `browse`.
    #[must_use]
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Returns the resource name, e.g. `buy.browse`.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.api_context, self.api_name, self.resource)
    }
}

/// The bucket of the rate-limit telemetry endpoint itself.
pub const TELEMETRY_RESOURCE: ResourceKey =
    ResourceKey::from_static("developer", "analytics", "rate_limit");

/// Remaining call quota of one resource within its window.
///
/// `remaining` never exceeds `limit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    limit: u32,
    remaining: u32,
    reset: DateTime<Utc>,
    window_seconds: i64,
}

impl Bucket {
    /// Creates a bucket; `remaining` is clamped to `limit`.
    #[must_use]
    pub fn new(limit: u32, remaining: u32, reset: DateTime<Utc>, window_seconds: i64) -> Self {
        Self {
            limit,
            remaining: remaining.min(limit),
            reset,
            window_seconds,
        }
    }

    /// Calls allowed per window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Calls still allowed in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// When `remaining` is next refilled to `limit`.
    #[must_use]
    pub const fn reset(&self) -> DateTime<Utc> {
        self.reset
    }

    /// Length of the quota window in seconds.
    #[must_use]
    pub const fn window_seconds(&self) -> i64 {
        self.window_seconds
    }

    /// Refills the bucket if its reset instant has passed.
    ///
    /// The reset instant moves forward by whole windows until it is in the
    /// future; a bucket without a window resets at `now`.
    pub fn replenish(&mut self, now: DateTime<Utc>) {
        if now < self.reset {
            return;
        }
        self.remaining = self.limit;
        if self.window_seconds > 0 {
            let elapsed = (now - self.reset).num_seconds();
            let windows = elapsed / self.window_seconds + 1;
            self.reset += Duration::seconds(windows * self.window_seconds);
        } else {
            self.reset = now;
        }
    }

    /// Takes one call from the bucket, returning `false` if none is left.
    pub fn try_take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
