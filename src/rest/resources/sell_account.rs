//! Sell Account API.

use crate::rate::ResourceKey;
use crate::rest::{Endpoint, TokenKind};

/// `GET /fulfillment_policy?marketplace_id=…`, the seller's fulfillment
/// policies on one marketplace.
///
/// The marketplace argument also selects the `X-EBAY-C-MARKETPLACE-ID`
/// header when it names a known marketplace.
#[derive(Debug, Clone)]
pub struct GetFulfillmentPolicies {
    /// Marketplace id, e.g. `EBAY_DE`.
    pub marketplace_id: String,
}

impl GetFulfillmentPolicies {
    /// Policies on `marketplace_id`.
    #[must_use]
    pub fn new(marketplace_id: impl Into<String>) -> Self {
        Self {
            marketplace_id: marketplace_id.into(),
        }
    }
}

impl Endpoint for GetFulfillmentPolicies {
    const FAMILY: &'static str = "sell_account";
    const NAME: &'static str = "get_fulfillment_policies";
    const BASE_PATH: &'static str = "/sell/account/v1";
    const TOKEN: TokenKind = TokenKind::User;
    const RESOURCE: ResourceKey = ResourceKey::from_static("sell", "account", "sell.account");

    fn path(&self) -> String {
        "/fulfillment_policy".to_string()
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("marketplace_id".to_string(), self.marketplace_id.clone())]
    }

    fn marketplace_argument(&self) -> Option<&str> {
        Some(&self.marketplace_id)
    }
}
