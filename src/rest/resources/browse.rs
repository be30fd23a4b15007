//! Buy Browse API: item search and item details.
//!
//! Browse calls use the application token and carry the
//! `X-EBAY-C-ENDUSERCTX` header built from the header record.
//!
//! # Example
//!
//! ```rust,ignore
//! use ebay_rest::rest::resources::{GetItem, Search};
//!
//! let lamps = api.paginate(Search::keywords("desk lamp"), Some(50))?.collect_records().await?;
//! let item = api.call(&GetItem::new("v1|110551991829|0")).await?;
//! ```

use serde::Serialize;

use crate::rate::ResourceKey;
use crate::rest::{path_segment, query_pairs, Endpoint, PagedEndpoint, TokenKind, BROWSE_FAMILY};

const BASE_PATH: &str = "/buy/browse/v1";
const RESOURCE: ResourceKey = ResourceKey::from_static("buy", "browse", "buy.browse");

/// `GET /item_summary/search`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Search {
    /// Keywords.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// Category ids to search in.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<String>,

    /// Field filters, e.g. `price:[10..50],priceCurrency:USD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Sort order, e.g. `price` or `-price`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Response field groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fieldgroups: Option<String>,

    /// Page size (max 200).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Records to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Search {
    /// A keyword search.
    #[must_use]
    pub fn keywords(keywords: impl Into<String>) -> Self {
        Self {
            q: Some(keywords.into()),
            ..Self::default()
        }
    }
}

impl Endpoint for Search {
    const FAMILY: &'static str = BROWSE_FAMILY;
    const NAME: &'static str = "search";
    const BASE_PATH: &'static str = BASE_PATH;
    const TOKEN: TokenKind = TokenKind::Application;
    const RESOURCE: ResourceKey = RESOURCE;

    fn path(&self) -> String {
        "/item_summary/search".to_string()
    }

    fn query(&self) -> Vec<(String, String)> {
        query_pairs(self)
    }
}

impl PagedEndpoint for Search {
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

/// `GET /item/{item_id}`.
#[derive(Debug, Clone, Serialize)]
pub struct GetItem {
    /// RESTful item id, e.g. `v1|110551991829|0`.
    #[serde(skip)]
    pub item_id: String,

    /// Response field groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fieldgroups: Option<String>,
}

impl GetItem {
    /// Details of one item.
    #[must_use]
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            fieldgroups: None,
        }
    }
}

impl Endpoint for GetItem {
    const FAMILY: &'static str = BROWSE_FAMILY;
    const NAME: &'static str = "get_item";
    const BASE_PATH: &'static str = BASE_PATH;
    const TOKEN: TokenKind = TokenKind::Application;
    const RESOURCE: ResourceKey = RESOURCE;

    fn path(&self) -> String {
        format!("/item/{}", path_segment(&self.item_id))
    }

    fn query(&self) -> Vec<(String, String)> {
        query_pairs(self)
    }
}
