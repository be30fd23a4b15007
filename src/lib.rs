//! # eBay REST client core
//!
//! An async client core for the eBay REST APIs. It owns the parts of an
//! eBay integration that are not generated from the API descriptions:
//! credentials and token lifecycle, per-resource rate governance,
//! pagination and response normalization.
//!
//! ## Overview
//!
//! This crate provides:
//! - Configuration resolution from a JSON document or literal records via
//!   [`Api::builder`]
//! - Application and user OAuth tokens, minted and refreshed on demand, with
//!   a pluggable consent handshake ([`auth`])
//! - Rate governance against eBay's call quotas, refreshed from the
//!   Developer Analytics telemetry ([`rate`])
//! - Typed endpoint records and one lazy sequence over paged results
//!   ([`rest`])
//! - A swappable HTTP [`Transport`] with a `reqwest` default ([`clients`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ebay_rest::{Api, PageItem};
//! use ebay_rest::rest::resources::Search;
//!
//! // Reads ebay_rest.json from the working directory.
//! let api = Api::builder()
//!     .application("production_1")
//!     .user("seller")
//!     .header("US")
//!     .build()?;
//!
//! let mut results = api.paginate(Search::keywords("desk lamp"), Some(100))?;
//! while let Some(item) = results.next().await {
//!     if let PageItem::Record(record) = item? {
//!         println!("{}", record["title"]);
//!     }
//! }
//! ```
//!
//! ## Literal Configuration
//!
//! Every section can also be passed inline, in which case no document is
//! read:
//!
//! ```rust,ignore
//! use ebay_rest::Api;
//! use ebay_rest::config::RecordSource;
//! use serde_json::json;
//!
//! let api = Api::builder()
//!     .application(RecordSource::literal(json!({
//!         "app_id": "Seller-App-SBX-1234",
//!         "cert_id": "SBX-5678",
//!         "redirect_uri": "Seller-App-SBX-runame"
//!     }))?)
//!     .user(RecordSource::literal(json!({
//!         "email_or_username": "testuser_seller",
//!         "password": "secret",
//!         "refresh_token": "v^1.1#i^1#..."
//!     }))?)
//!     .header(RecordSource::literal(json!({"marketplace_id": "EBAY_US"}))?)
//!     .build()?;
//! assert!(api.is_sandbox());
//! ```
//!
//! ## Errors
//!
//! Every failure is an [`Error`] with a stable [`number`](Error::number):
//! library errors use 99001 and up, upstream HTTP failures use
//! `99000 + status`.
//!
//! ## Design Principles
//!
//! - **No global state** beyond the registry that shares facades built
//!   with equal arguments
//! - **Fail-fast validation** of every configuration record in
//!   [`ApiBuilder::build`]
//! - **Thread-safe**: [`Api`] is `Send + Sync` and cheap to clone
//! - **Async-first**: designed for use with the Tokio runtime
//! - **Deterministic time**: token expiry and quota windows read a
//!   [`clock::Clock`]

pub mod api;
pub mod auth;
pub mod clients;
pub mod clock;
pub mod config;
pub mod error;
pub mod rate;
pub mod reference;
pub mod rest;

pub use api::{Api, ApiBuilder};
pub use clients::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use config::{ConfigDocument, RecordSource};
pub use error::{ConfigError, Error, RecordProblem, Result};
pub use rest::{Endpoint, PageItem, PagedEndpoint, Paginator, TokenKind};
