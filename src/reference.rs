//! Static reference data for the eBay REST APIs.
//!
//! These tables back header validation and the default OAuth scope sets.
//! They are plain `&'static` slices; lookups are linear, which is fine for
//! tables this small.

/// Prefix that marks a sandbox `cert_id`.
pub const SANDBOX_CERT_PREFIX: &str = "SBX-";

/// Maximum number of records upstream returns on a single page.
pub const MAX_PAGE_SIZE: u32 = 200;

/// A marketplace and the content languages it declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marketplace {
    /// The marketplace identifier, e.g. `EBAY_US`.
    pub id: &'static str,
    /// Languages accepted by the marketplace, most preferred first.
    pub languages: &'static [&'static str],
}

/// Every marketplace the REST APIs accept in `X-EBAY-C-MARKETPLACE-ID`.
pub const MARKETPLACES: &[Marketplace] = &[
    Marketplace { id: "EBAY_AT", languages: &["de-AT"] },
    Marketplace { id: "EBAY_AU", languages: &["en-AU"] },
    Marketplace { id: "EBAY_BE", languages: &["fr-BE", "nl-BE"] },
    Marketplace { id: "EBAY_CA", languages: &["en-CA", "fr-CA"] },
    Marketplace { id: "EBAY_CH", languages: &["de-CH"] },
    Marketplace { id: "EBAY_DE", languages: &["de-DE"] },
    Marketplace { id: "EBAY_ES", languages: &["es-ES"] },
    Marketplace { id: "EBAY_FR", languages: &["fr-FR"] },
    Marketplace { id: "EBAY_GB", languages: &["en-GB"] },
    Marketplace { id: "EBAY_HK", languages: &["zh-HK"] },
    Marketplace { id: "EBAY_IE", languages: &["en-IE"] },
    Marketplace { id: "EBAY_IN", languages: &["en-GB"] },
    Marketplace { id: "EBAY_IT", languages: &["it-IT"] },
    Marketplace { id: "EBAY_MOTORS_US", languages: &["en-US"] },
    Marketplace { id: "EBAY_MY", languages: &["en-US"] },
    Marketplace { id: "EBAY_NL", languages: &["nl-NL"] },
    Marketplace { id: "EBAY_PH", languages: &["en-PH"] },
    Marketplace { id: "EBAY_PL", languages: &["pl-PL"] },
    Marketplace { id: "EBAY_SG", languages: &["en-US"] },
    Marketplace { id: "EBAY_TH", languages: &["th-TH"] },
    Marketplace { id: "EBAY_TW", languages: &["zh-TW"] },
    Marketplace { id: "EBAY_US", languages: &["en-US"] },
    Marketplace { id: "EBAY_VN", languages: &["en-US"] },
];

/// ISO 3166-1 alpha-2 country codes.
pub const COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX", "AZ",
    "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS",
    "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE",
    "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF",
    "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM",
    "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR", "IS", "IT", "JE", "JM",
    "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC",
    "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
    "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA",
    "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG",
    "PH", "PK", "PL", "PM", "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW",
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS",
    "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO",
    "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

/// ISO 4217 currency codes accepted by the REST APIs.
pub const CURRENCY_CODES: &[&str] = &[
    "AED", "ARS", "AUD", "BDT", "BGN", "BHD", "BRL", "CAD", "CHF", "CLP", "CNY", "COP", "CZK", "DKK",
    "DZD", "EGP", "EUR", "GBP", "GEL", "GHS", "HKD", "HRK", "HUF", "IDR", "ILS", "INR", "ISK", "JOD",
    "JPY", "KES", "KRW", "KWD", "KZT", "LKR", "MAD", "MXN", "MYR", "NGN", "NOK", "NZD", "OMR", "PEN",
    "PHP", "PKR", "PLN", "QAR", "RON", "RSD", "RUB", "SAR", "SEK", "SGD", "THB", "TND", "TRY", "TWD",
    "UAH", "USD", "UYU", "VND", "ZAR",
];

/// Scopes an application (client credentials) token may carry.
pub const APPLICATION_SCOPES: &[&str] = &[
    "https://api.ebay.com/oauth/api_scope",
    "https://api.ebay.com/oauth/api_scope/buy.guest.order",
    "https://api.ebay.com/oauth/api_scope/buy.item.feed",
    "https://api.ebay.com/oauth/api_scope/buy.marketing",
    "https://api.ebay.com/oauth/api_scope/buy.product.feed",
    "https://api.ebay.com/oauth/api_scope/buy.marketplace.insights",
    "https://api.ebay.com/oauth/api_scope/buy.proxy.guest.order",
    "https://api.ebay.com/oauth/api_scope/buy.item.bulk",
    "https://api.ebay.com/oauth/api_scope/buy.deal",
];

/// Scopes requested for a user token when the user record names none.
pub const DEFAULT_USER_SCOPES: &[&str] = &[
    "https://api.ebay.com/oauth/api_scope",
    "https://api.ebay.com/oauth/api_scope/sell.marketing",
    "https://api.ebay.com/oauth/api_scope/sell.inventory",
    "https://api.ebay.com/oauth/api_scope/sell.account",
    "https://api.ebay.com/oauth/api_scope/sell.fulfillment",
    "https://api.ebay.com/oauth/api_scope/sell.analytics.readonly",
    "https://api.ebay.com/oauth/api_scope/sell.finances",
    "https://api.ebay.com/oauth/api_scope/sell.payment.dispute",
    "https://api.ebay.com/oauth/api_scope/commerce.identity.readonly",
    "https://api.ebay.com/oauth/api_scope/sell.reputation",
    "https://api.ebay.com/oauth/api_scope/sell.stores",
];

/// Returns `true` if `id` names a known marketplace.
#[must_use]
pub fn is_marketplace_id(id: &str) -> bool {
    MARKETPLACES.iter().any(|m| m.id == id)
}

/// Returns `true` if any marketplace declares `language`.
#[must_use]
pub fn is_language(language: &str) -> bool {
    MARKETPLACES
        .iter()
        .any(|m| m.languages.contains(&language))
}

/// Returns `true` if `code` is a known country code.
#[must_use]
pub fn is_country_code(code: &str) -> bool {
    COUNTRY_CODES.contains(&code)
}

/// Returns `true` if `code` is a known currency code.
#[must_use]
pub fn is_currency_code(code: &str) -> bool {
    CURRENCY_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketplace_lookup() {
        assert!(is_marketplace_id("EBAY_US"));
        assert!(is_marketplace_id("EBAY_MOTORS_US"));
        assert!(!is_marketplace_id("EBAY_XX"));
        assert!(!is_marketplace_id("ebay_us"));
    }

    #[test]
    fn test_languages_are_union_of_marketplaces() {
        assert!(is_language("en-US"));
        assert!(is_language("nl-BE"));
        assert!(is_language("fr-CA"));
        assert!(!is_language("en"));
    }

    #[test]
    fn test_country_and_currency_tables() {
        assert!(is_country_code("US"));
        assert!(is_country_code("DE"));
        assert!(!is_country_code("XX"));
        assert!(is_currency_code("EUR"));
        assert!(!is_currency_code("XXX"));
    }

    #[test]
    fn test_country_codes_are_sorted_and_unique() {
        assert!(COUNTRY_CODES.windows(2).all(|w| w[0] < w[1]));
        assert!(CURRENCY_CODES.windows(2).all(|w| w[0] < w[1]));
    }
}
