//! Developer Analytics API: the rate-limit telemetry endpoint.

use serde::Serialize;

use crate::rate::{ResourceKey, TELEMETRY_RESOURCE};
use crate::rest::{query_pairs, Endpoint, TokenKind};

/// `GET /rate_limit/`, the call quotas of the application.
///
/// The rate governor calls this endpoint to refresh its bucket table; its
/// own admission never triggers a refresh.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetRateLimits {
    /// Restrict to one API context, e.g. `buy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_context: Option<String>,

    /// Restrict to one API, e.g. `browse`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
}

impl Endpoint for GetRateLimits {
    const FAMILY: &'static str = "developer_analytics";
    const NAME: &'static str = "get_rate_limits";
    const BASE_PATH: &'static str = "/developer/analytics/v1_beta";
    const TOKEN: TokenKind = TokenKind::Application;
    const RESOURCE: ResourceKey = TELEMETRY_RESOURCE;

    fn path(&self) -> String {
        "/rate_limit/".to_string()
    }

    fn query(&self) -> Vec<(String, String)> {
        query_pairs(self)
    }
}
