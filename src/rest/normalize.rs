//! Response normalization.
//!
//! Generated stubs decode into records that keep their fields in
//! single-underscore private storage next to a handful of bookkeeping
//! attributes (`swagger_types`, `attribute_map`, ...). [`normalize`] turns
//! such payloads into plain JSON: records become objects keyed by the
//! public field name, bookkeeping is dropped, and everything else is copied.
//!
//! # Example
//!
//! ```rust
//! use ebay_rest::rest::normalize;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "swagger_types": {"title": "str"},
//!     "attribute_map": {"title": "title"},
//!     "_title": "Lamp",
//!     "__internal": 1
//! });
//! assert_eq!(normalize(&raw), json!({"title": "Lamp"}));
//!
//! let plain = json!({"items": [{"title": "Lamp"}], "total": 1});
//! assert_eq!(normalize(&plain), plain);
//! ```

use serde_json::{Map, Value};

/// Attributes that mark an object as a generated record and are never
/// part of its public fields.
pub const BOOKKEEPING_ATTRIBUTES: &[&str] = &[
    "swagger_types",
    "openapi_types",
    "attribute_map",
    "discriminator",
    "local_vars_configuration",
    "_configuration",
];

/// Returns a normalized deep copy of `value`.
#[must_use]
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(fields) if is_record(fields) => Value::Object(normalize_record(fields)),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, field)| (key.clone(), normalize(field)))
                .collect(),
        ),
        leaf => leaf.clone(),
    }
}

/// A record carries a bookkeeping attribute and at least one private field.
fn is_record(fields: &Map<String, Value>) -> bool {
    let is_bookkeeping = |name: &str| BOOKKEEPING_ATTRIBUTES.contains(&name);
    fields.keys().any(|name| is_bookkeeping(name))
        && fields
            .keys()
            .any(|name| !is_bookkeeping(name) && public_name(name).is_some())
}

fn normalize_record(fields: &Map<String, Value>) -> Map<String, Value> {
    let mut public = Map::new();
    for (name, field) in fields {
        if BOOKKEEPING_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        match public_name(name) {
            Some(public_name) => {
                public.insert(public_name.to_string(), normalize(field));
            }
            None => tracing::debug!(attribute = %name, "dropping attribute outside the private-storage convention"),
        }
    }
    public
}

/// Strips exactly one leading underscore.
fn public_name(name: &str) -> Option<&str> {
    let rest = name.strip_prefix('_')?;
    if rest.is_empty() || rest.starts_with('_') {
        return None;
    }
    Some(rest)
}
