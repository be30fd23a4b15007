//! Sell Fulfillment API.

use serde::Serialize;

use crate::rate::ResourceKey;
use crate::rest::{query_pairs, Endpoint, PagedEndpoint, TokenKind};

/// `GET /order`, the seller's orders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetOrders {
    /// Order filter, e.g. `orderfulfillmentstatus:{NOT_STARTED|IN_PROGRESS}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Specific order ids; when set, `filter` is ignored upstream.
    #[serde(rename = "orderIds", skip_serializing_if = "Vec::is_empty")]
    pub order_ids: Vec<String>,

    /// Response field groups.
    #[serde(rename = "fieldGroups", skip_serializing_if = "Option::is_none")]
    pub field_groups: Option<String>,

    /// Page size (max 200).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Records to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Endpoint for GetOrders {
    const FAMILY: &'static str = "sell_fulfillment";
    const NAME: &'static str = "get_orders";
    const BASE_PATH: &'static str = "/sell/fulfillment/v1";
    const TOKEN: TokenKind = TokenKind::User;
    const RESOURCE: ResourceKey =
        ResourceKey::from_static("sell", "fulfillment", "sell.fulfillment");

    fn path(&self) -> String {
        "/order".to_string()
    }

    fn query(&self) -> Vec<(String, String)> {
        query_pairs(self)
    }
}

impl PagedEndpoint for GetOrders {
    fn offset(&self) -> Option<u64> {
        self.offset
    }

    fn with_page(&self, limit: u32, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..self.clone()
        }
    }
}
