//! Endpoint records for the eBay REST APIs.
//!
//! Each module holds the request records of one API family. Every record
//! implements [`Endpoint`](crate::rest::Endpoint); collection operations also
//! implement [`PagedEndpoint`](crate::rest::PagedEndpoint).
//!
//! | Family | Records | Token |
//! |---|---|---|
//! | Buy Browse | [`Search`], [`GetItem`] | application |
//! | Developer Analytics | [`GetRateLimits`] | application |
//! | Sell Inventory | [`GetInventoryItems`] | user |
//! | Sell Fulfillment | [`GetOrders`] | user |
//! | Sell Account | [`GetFulfillmentPolicies`] | user |

mod browse;
mod developer_analytics;
mod sell_account;
mod sell_fulfillment;
mod sell_inventory;

pub use browse::{GetItem, Search};
pub use developer_analytics::GetRateLimits;
pub use sell_account::GetFulfillmentPolicies;
pub use sell_fulfillment::GetOrders;
pub use sell_inventory::GetInventoryItems;
