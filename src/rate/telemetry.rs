//! Rate-limit telemetry.
//!
//! The Developer Analytics `rate_limit` resource reports, per API and
//! resource, the call limit, what is left of it and when it resets:
//!
//! ```json
//! {
//!   "rateLimits": [{
//!     "apiContext": "buy",
//!     "apiName": "Browse",
//!     "apiVersion": "v1",
//!     "resources": [{
//!       "name": "buy.browse",
//!       "rates": [{"count": 12, "limit": 5000, "remaining": 4988,
//!                  "reset": "2024-05-02T07:00:00.000Z", "timeWindow": 86400}]
//!     }]
//!   }]
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::rate::{Bucket, ResourceKey};

/// Fetches the rate-limit telemetry payload.
///
/// The facade implements this by calling the telemetry endpoint, which the
/// governor admits without triggering another refresh.
#[async_trait]
pub trait RateTelemetry: Send + Sync {
    /// Returns the raw telemetry payload.
    ///
    /// # Errors
    ///
    /// Returns any error of the underlying call.
    async fn fetch_rate_limits(&self) -> crate::Result<Value>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitsPayload {
    #[serde(default)]
    rate_limits: Vec<ApiRateLimit>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRateLimit {
    api_context: String,
    api_name: String,
    #[serde(default)]
    resources: Vec<ResourceRateLimit>,
}

#[derive(Deserialize)]
struct ResourceRateLimit {
    name: String,
    #[serde(default)]
    rates: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Rate {
    limit: u32,
    remaining: u32,
    reset: DateTime<Utc>,
    time_window: i64,
}

/// Turns a telemetry payload into a bucket table.
///
/// Context and API names are lower-cased; only the first rate of each
/// resource is used. Rows that do not parse are skipped with a warning.
#[must_use]
pub fn parse_rate_limits(payload: &Value) -> HashMap<ResourceKey, Bucket> {
    let mut table = HashMap::new();
    let parsed = match RateLimitsPayload::deserialize(payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "rate limit telemetry does not parse");
            return table;
        }
    };

    for api in parsed.rate_limits {
        let context = api.api_context.to_lowercase();
        let name = api.api_name.to_lowercase();
        for resource in api.resources {
            let key = ResourceKey::new(context.clone(), name.clone(), resource.name);
            let Some(first) = resource.rates.first() else {
                tracing::warn!(bucket = %key, "rate limit telemetry has no rates");
                continue;
            };
            match Rate::deserialize(first) {
                Ok(rate) => {
                    table.insert(
                        key,
                        Bucket::new(rate.limit, rate.remaining, rate.reset, rate.time_window),
                    );
                }
                Err(e) => {
                    tracing::warn!(bucket = %key, error = %e, "skipping unparseable rate");
                }
            }
        }
    }
    table
}
