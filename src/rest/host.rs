//! Host resolution for endpoint calls.
//!
//! Endpoint hosts are templates such as `https://api.ebay.com{basePath}`.
//! Resolution rewrites production hosts to their sandbox counterparts when
//! the application credential is a sandbox one, then fills the
//! `{basePath}` placeholder.
//!
//! # Example
//!
//! ```rust
//! use ebay_rest::rest::resolve_host;
//!
//! let host = resolve_host("https://api.ebay.com{basePath}", "/buy/browse/v1", true);
//! assert_eq!(host, "https://api.sandbox.ebay.com/buy/browse/v1");
//! ```

/// Placeholder for the resource base path in host templates.
pub const BASE_PATH_PLACEHOLDER: &str = "{basePath}";

/// Production hosts and their sandbox counterparts.
const SANDBOX_HOSTS: &[(&str, &str)] = &[
    ("://api.ebay.com", "://api.sandbox.ebay.com"),
    ("://apiz.ebay.com", "://apiz.sandbox.ebay.com"),
    ("://auth.ebay.com", "://auth.sandbox.ebay.com"),
];

/// Resolves a host template for one call.
#[must_use]
pub fn resolve_host(template: &str, base_path: &str, sandbox: bool) -> String {
    let mut host = template.to_string();
    if sandbox {
        for (production, sandbox_host) in SANDBOX_HOSTS {
            host = host.replace(production, sandbox_host);
        }
    }
    if host.contains(BASE_PATH_PLACEHOLDER) {
        host = host.replace(BASE_PATH_PLACEHOLDER, base_path);
    }
    host
}
