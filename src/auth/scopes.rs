//! OAuth scope handling for the eBay APIs.
//!
//! This module provides the [`Scopes`] type. eBay scopes are URIs such as
//! `https://api.ebay.com/oauth/api_scope/sell.inventory` and travel
//! space-separated on the wire.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A set of OAuth scope URIs.
///
/// Scopes are deduplicated and kept in sorted order, so the wire form is
/// stable for equal sets.
///
/// # Serialization
///
/// `Scopes` serializes to and deserializes from a space-separated string:
///
/// ```rust
/// use ebay_rest::auth::Scopes;
///
/// let scopes: Scopes = "https://api.ebay.com/oauth/api_scope".parse().unwrap();
/// let json = serde_json::to_string(&scopes).unwrap();
/// assert_eq!(json, "\"https://api.ebay.com/oauth/api_scope\"");
/// ```
///
/// # Example
///
/// ```rust
/// use ebay_rest::auth::Scopes;
///
/// let scopes = Scopes::from_static(&["b", "a", "b"]);
/// assert_eq!(scopes.len(), 2);
/// assert_eq!(scopes.to_string(), "a b");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Scopes {
    scopes: BTreeSet<String>,
}

impl Scopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a scope set from a static table.
    #[must_use]
    pub fn from_static(scopes: &[&str]) -> Self {
        scopes.iter().map(|s| (*s).to_string()).collect()
    }

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if `scope` is in the set.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Adds a scope.
    pub fn insert(&mut self, scope: impl Into<String>) {
        let scope = scope.into();
        let scope = scope.trim();
        if !scope.is_empty() {
            self.scopes.insert(scope.to_string());
        }
    }

    /// Returns an iterator over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }
}

impl FromIterator<String> for Scopes {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut scopes = Self::new();
        for scope in iter {
            scopes.insert(scope);
        }
        scopes
    }
}

impl From<Vec<String>> for Scopes {
    fn from(scopes: Vec<String>) -> Self {
        scopes.into_iter().collect()
    }
}

impl FromStr for Scopes {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split_whitespace().map(str::to_string).collect())
    }
}

impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(" "))
    }
}

impl Serialize for Scopes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Scopes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
