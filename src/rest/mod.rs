//! Endpoint description, response normalization and pagination.
//!
//! # Overview
//!
//! - [`Endpoint`] and [`PagedEndpoint`]: typed request records, one per
//!   REST operation, dispatched by [`Api::call`](crate::Api::call)
//! - [`resolve_host`]: host templates and the sandbox rewrite
//! - [`normalize`]: turns generated-record payloads into plain JSON
//! - [`Paginator`] and [`PageItem`]: one lazy sequence over every page
//! - [`resources`]: the shipped endpoint records

mod endpoint;
mod host;
mod normalize;
mod pagination;
pub mod resources;

pub use endpoint::{
    path_segment, query_pairs, Endpoint, PagedEndpoint, TokenKind, BROWSE_FAMILY, DEFAULT_HOST,
};
pub use host::{resolve_host, BASE_PATH_PLACEHOLDER};
pub use normalize::{normalize, BOOKKEEPING_ATTRIBUTES};
pub use pagination::{PageItem, Paginator, PAGINATION_CONTROLS};
