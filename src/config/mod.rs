//! Configuration for the eBay REST client.
//!
//! # Overview
//!
//! - [`ConfigDocument`]: the optional JSON document with `applications`,
//!   `users` and `headers` sections
//! - [`RecordSource`]: a caller override for one section, by name or literal
//! - [`resolve_record`]: picks one record per section
//! - [`ApplicationRecord`], [`UserRecord`], [`HeaderRecord`]: validated records
//! - [`ThrottlePolicy`]: validated `throttle`/`timeout` parameters
//!
//! # Example
//!
//! ```json
//! {
//!     "applications": {
//!         "sandbox_1": {
//!             "app_id": "Seller-App-SBX-1234",
//!             "cert_id": "SBX-5678",
//!             "dev_id": "dev-1",
//!             "redirect_uri": "Seller-App-SBX-runame"
//!         }
//!     },
//!     "users": {
//!         "sandbox_1": {"email_or_username": "testuser_seller", "password": "secret"}
//!     },
//!     "headers": {
//!         "US": {"marketplace_id": "EBAY_US", "accept_language": "en-US"}
//!     }
//! }
//! ```

mod document;
mod records;
mod throttle;

pub use document::{resolve_record, ConfigDocument, RecordSource, Section, DEFAULT_CONFIG_FILE};
pub use records::{strip_blank, ApplicationRecord, HeaderRecord, UserRecord};
pub use throttle::{ThrottlePolicy, UNBOUNDED_TIMEOUT};

pub use crate::error::ConfigError;
