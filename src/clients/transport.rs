//! The HTTP transport seam.
//!
//! All network traffic goes through a [`Transport`]: token minting, rate-limit
//! telemetry and API calls. [`ReqwestTransport`] is the production
//! implementation; tests substitute a scripted transport.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sends one HTTP request and returns the response.
///
/// Implementations return `Ok` for every status code, including 4xx and
/// 5xx. Only failures that produced no status at all are errors.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Executes `request`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request is invalid or no response was
    /// received.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
///
/// `ReqwestTransport` is `Send + Sync` and cheap to clone.
///
/// # Example
///
/// ```rust,no_run
/// use ebay_rest::clients::{HttpMethod, HttpRequest, ReqwestTransport, Transport};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = ReqwestTransport::new()?;
/// let request = HttpRequest::builder(HttpMethod::Get, "https://api.ebay.com/buy/browse/v1/item/v1%7C1%7C0")
///     .header("Authorization", "Bearer token")
///     .build()?;
///
/// let response = transport.execute(request).await?;
/// println!("{}", response.code);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    user_agent: String,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport with a rustls-backed client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the client cannot be initialised.
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self::with_client(client))
    }

    /// Wraps an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        Self {
            client,
            user_agent: format!("ebay-rest v{SDK_VERSION} | Rust {rust_version}"),
        }
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;
        let body = request.encoded_body()?;

        let mut builder = match request.http_method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        builder = builder
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");
        if let Some(body_type) = &request.body_type {
            builder = builder.header("Content-Type", body_type.as_content_type());
        }
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        tracing::debug!(method = %request.http_method, url = %request.url, "sending request");
        let res = builder.send().await?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body = res.text().await?;

        let response = HttpResponse::new(code, headers, body);
        if !response.is_ok() {
            tracing::debug!(
                code,
                request_id = response.request_id().unwrap_or_default(),
                "upstream returned non-success status"
            );
        }
        Ok(response)
    }
}
