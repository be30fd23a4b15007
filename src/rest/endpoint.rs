//! Typed endpoint records.
//!
//! Every eBay REST operation is described by one request record that
//! implements [`Endpoint`]. The associated constants carry what the facade
//! needs to route, authorize and govern the call; the methods carry the
//! per-call arguments.
//!
//! # Example
//!
//! ```rust
//! use ebay_rest::rate::ResourceKey;
//! use ebay_rest::rest::{Endpoint, TokenKind};
//!
//! struct GetCategoryTree {
//!     tree_id: String,
//! }
//!
//! impl Endpoint for GetCategoryTree {
//!     const FAMILY: &'static str = "commerce_taxonomy";
//!     const NAME: &'static str = "get_category_tree";
//!     const BASE_PATH: &'static str = "/commerce/taxonomy/v1";
//!     const TOKEN: TokenKind = TokenKind::Application;
//!     const RESOURCE: ResourceKey =
//!         ResourceKey::from_static("commerce", "taxonomy", "commerce.taxonomy");
//!
//!     fn path(&self) -> String {
//!         format!("/category_tree/{}", self.tree_id)
//!     }
//! }
//!
//! let call = GetCategoryTree { tree_id: "0".to_string() };
//! assert_eq!(call.path(), "/category_tree/0");
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::clients::HttpMethod;
use crate::rate::ResourceKey;

/// Default host template; `{basePath}` is replaced by [`Endpoint::BASE_PATH`].
pub const DEFAULT_HOST: &str = "https://api.ebay.com{basePath}";

/// Family of the Browse API, whose calls carry the end-user context header.
pub const BROWSE_FAMILY: &str = "buy_browse";

/// The kind of access token an endpoint requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Client-credentials token carrying the application scopes.
    Application,
    /// Token acting on behalf of the configured user.
    User,
}

/// A single eBay REST operation.
pub trait Endpoint: Send + Sync {
    /// API family, e.g. [`BROWSE_FAMILY`].
    const FAMILY: &'static str;

    /// Operation name, used in logs.
    const NAME: &'static str;

    /// Host template; may contain the `{basePath}` placeholder.
    const HOST: &'static str = DEFAULT_HOST;

    /// Resource base path substituted into [`HOST`](Self::HOST).
    const BASE_PATH: &'static str;

    /// Token kind the operation requires.
    const TOKEN: TokenKind;

    /// Rate-governor bucket the operation counts against.
    const RESOURCE: ResourceKey;

    /// HTTP method of the operation.
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    /// Path relative to the resolved host, starting with `/`.
    fn path(&self) -> String;

    /// Query parameters, in order.
    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// JSON request body.
    fn body(&self) -> Option<Value> {
        None
    }

    /// Marketplace id passed as an argument of the operation, if any.
    ///
    /// For user-token operations a valid marketplace id here overrides the
    /// header record's `marketplace_id`.
    fn marketplace_argument(&self) -> Option<&str> {
        None
    }
}

/// An operation whose results span pages addressed by `limit`/`offset`.
pub trait PagedEndpoint: Endpoint + Clone {
    /// Offset the caller set on the request, which the paginator rejects.
    fn offset(&self) -> Option<u64>;

    /// Returns a copy requesting `limit` records starting at `offset`.
    #[must_use]
    fn with_page(&self, limit: u32, offset: u64) -> Self;
}

/// Encodes one path segment.
#[must_use]
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Flattens a parameter struct into query pairs, in field order.
///
/// `null` fields are skipped, sequences become comma-separated values and
/// nested objects are sent as JSON text.
pub fn query_pairs<T: Serialize>(params: &T) -> Vec<(String, String)> {
    let fields = match serde_json::to_value(params) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "query parameters do not serialize");
            return Vec::new();
        }
    };

    let mut pairs = Vec::new();
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::String(s) => pairs.push((key, s)),
            Value::Number(n) => pairs.push((key, n.to_string())),
            Value::Bool(b) => pairs.push((key, b.to_string())),
            Value::Array(items) => {
                let values: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                if !values.is_empty() {
                    pairs.push((key, values.join(",")));
                }
            }
            Value::Object(_) => pairs.push((key, value.to_string())),
        }
    }
    pairs
}
