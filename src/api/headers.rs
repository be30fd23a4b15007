//! Request headers derived from the header record.

use crate::config::HeaderRecord;
use crate::reference;
use crate::rest::{Endpoint, TokenKind};

pub const MARKETPLACE_HEADER: &str = "X-EBAY-C-MARKETPLACE-ID";
pub const END_USER_CONTEXT_HEADER: &str = "X-EBAY-C-ENDUSERCTX";

/// Builds the `X-EBAY-C-ENDUSERCTX` value, or `None` if the record has
/// none of its fields.
///
/// `contextualLocation` is itself a `country=..,zip=..` list and is sent
/// percent-encoded.
pub fn end_user_context(header: &HeaderRecord) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(campaign) = &header.affiliate_campaign_id {
        parts.push(format!("affiliateCampaignId={campaign}"));
    }
    if let Some(reference) = &header.affiliate_reference_id {
        parts.push(format!("affiliateReferenceId={reference}"));
    }

    let mut location = Vec::new();
    if let Some(country) = &header.country {
        location.push(format!("country={country}"));
    }
    if let Some(zip) = &header.zip {
        location.push(format!("zip={zip}"));
    }
    if !location.is_empty() {
        parts.push(format!(
            "contextualLocation={}",
            urlencoding::encode(&location.join(","))
        ));
    }

    if let Some(device) = &header.device_id {
        parts.push(format!("deviceId={device}"));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

/// Picks the marketplace header value for one call.
///
/// User-token operations that take a marketplace argument send that
/// argument when it is a known marketplace id; everything else uses the
/// header record.
pub fn marketplace_for<'a, E: Endpoint>(
    endpoint: &'a E,
    header: &'a HeaderRecord,
) -> Option<&'a str> {
    if E::TOKEN == TokenKind::User {
        if let Some(argument) = endpoint
            .marketplace_argument()
            .filter(|id| reference::is_marketplace_id(id))
        {
            return Some(argument);
        }
    }
    header.marketplace_id.as_deref()
}
