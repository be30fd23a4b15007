//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ebay_rest::clients::{HttpError, HttpRequest, HttpResponse, Transport};
use ebay_rest::RecordSource;
use serde_json::{json, Value};

type Handler = dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync;

/// A transport that answers from a closure and records every request.
///
/// [`MockTransport::new`] answers token requests itself with a fresh
/// two-hour token; [`MockTransport::with_tokens`] leaves them to the handler.
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Answers API calls with `handler` and token requests with a new token.
    pub fn new(
        handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        let counter = Arc::new(Mutex::new(0_u32));
        Self::with_tokens(move |request| {
            if is_token_request(request) {
                let minted = {
                    let mut counter = counter.lock().unwrap();
                    *counter += 1;
                    *counter
                };
                return HttpResponse::json_ok(&json!({
                    "access_token": format!("token-{minted}"),
                    "expires_in": 7200,
                    "token_type": "Application Access Token",
                }));
            }
            handler(request)
        })
    }

    /// Answers every request, token requests included, with `handler`.
    pub fn with_tokens(
        handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every request seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent to the token endpoint.
    pub fn token_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(is_token_request)
            .collect()
    }

    /// Requests whose URL ends with `suffix`.
    pub fn calls_to(&self, suffix: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url.ends_with(suffix))
            .collect()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.requests.lock().map(|r| r.len()).unwrap_or(0))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;
        let response = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}

pub fn is_token_request(request: &HttpRequest) -> bool {
    request.url.ends_with("/identity/v1/oauth2/token")
}

pub fn json_response(status: u16, body: &Value) -> HttpResponse {
    HttpResponse::new(status, HashMap::new(), body.to_string())
}

pub fn not_found(request: &HttpRequest) -> HttpResponse {
    json_response(404, &json!({"errors": [{"message": format!("no route for {}", request.url)}]}))
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

/// A sandbox application record; `app_id` keeps facades of different
/// tests apart.
pub fn sandbox_application(app_id: &str) -> RecordSource {
    RecordSource::literal(json!({
        "app_id": app_id,
        "cert_id": "SBX-cert-0001",
        "dev_id": "dev-0001",
        "redirect_uri": "Seller-runame",
    }))
    .unwrap()
}

pub fn production_application(app_id: &str) -> RecordSource {
    RecordSource::literal(json!({
        "app_id": app_id,
        "cert_id": "PRD-cert-0001",
        "dev_id": "dev-0001",
        "redirect_uri": "Seller-runame",
    }))
    .unwrap()
}

/// A user record with a refresh token that never expires.
pub fn seller() -> RecordSource {
    RecordSource::literal(json!({
        "email_or_username": "seller",
        "password": "pw",
        "refresh_token": "v^1.1#refresh",
    }))
    .unwrap()
}

pub fn us_headers() -> RecordSource {
    RecordSource::literal(json!({
        "marketplace_id": "EBAY_US",
        "accept_language": "en-US",
        "country": "US",
        "zip": "19406",
    }))
    .unwrap()
}

/// One page of a Browse search, answering the requested `limit`/`offset`
/// against `total` records.
pub fn search_page(request: &HttpRequest, total: u64) -> HttpResponse {
    let limit: u64 = request
        .query_value("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(50);
    let offset: u64 = request
        .query_value("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let count = limit.min(total.saturating_sub(offset));
    let items: Vec<Value> = (offset..offset + count)
        .map(|i| json!({"itemId": format!("v1|{i}|0"), "title": format!("Lamp {i}")}))
        .collect();
    json_response(
        200,
        &json!({
            "href": request.url,
            "limit": limit,
            "offset": offset,
            "total": total,
            "itemSummaries": items,
        }),
    )
}
