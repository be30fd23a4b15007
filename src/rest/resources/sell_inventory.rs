//! Sell Inventory API.

use serde::Serialize;

use crate::rate::ResourceKey;
use crate::rest::{query_pairs, Endpoint, PagedEndpoint, TokenKind};

/// `GET /inventory_item`, every inventory item of the seller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetInventoryItems {
    /// Page size (max 200).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Records to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Endpoint for GetInventoryItems {
    const FAMILY: &'static str = "sell_inventory";
    const NAME: &'static str = "get_inventory_items";
    const BASE_PATH: &'static str = "/sell/inventory/v1";
    const TOKEN: TokenKind = TokenKind::User;
    const RESOURCE: ResourceKey = ResourceKey::from_static("sell", "inventory", "sell.inventory");

    fn path(&self) -> String {
        "/inventory_item".to_string()
    }

    fn query(&self) -> Vec<(String, String)> {
        query_pairs(self)
    }
}

impl PagedEndpoint for GetInventoryItems {
    fn offset(&self) -> Option<u64> {
        self.offset
    }

    fn with_page(&self, limit: u32, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}
