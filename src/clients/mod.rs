//! HTTP layer for the eBay REST APIs.
//!
//! # Overview
//!
//! - [`Transport`]: the async seam every request passes through
//! - [`ReqwestTransport`]: the production transport
//! - [`HttpRequest`]: a request to an absolute URL, built with [`HttpRequest::builder`]
//! - [`HttpResponse`]: a response for any status, with the raw body
//! - [`HttpMethod`] and [`DataType`]: method and body encoding
//!
//! A transport never turns an HTTP status into an error. The facade maps
//! non-success statuses to [`crate::Error::Transport`] with the upstream
//! body attached.

mod errors;
mod http_request;
mod http_response;
mod transport;

pub use errors::{HttpError, InvalidHttpRequestError};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use transport::{ReqwestTransport, Transport, SDK_VERSION};
