//! Per-resource rate governance.
//!
//! eBay limits calls per application, API and resource within a time
//! window. The [`RateGovernor`] keeps a local copy of those quotas, takes one
//! unit per dispatched call, and refreshes its table from the rate-limit
//! telemetry endpoint whenever the nearest bucket reset has passed.
//!
//! # Overview
//!
//! - [`ResourceKey`]: `(api_context, api_name, resource)` bucket key
//! - [`Bucket`]: limit, remaining calls, reset instant and window
//! - [`RateGovernor`]: admission, blocking and refresh
//! - [`WaitPolicy`]: fail, wait indefinitely, or wait up to a timeout
//! - [`RateTelemetry`]: source of the telemetry payload
//! - [`parse_rate_limits`]: telemetry payload to bucket table
//!
//! Sandbox facades are not governed.

mod bucket;
mod governor;
mod telemetry;

pub use bucket::{Bucket, ResourceKey, TELEMETRY_RESOURCE};
pub use governor::{RateGovernor, WaitPolicy, EMPTY_TABLE_TTL_SECONDS};
pub use telemetry::{parse_rate_limits, RateTelemetry};
