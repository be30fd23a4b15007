//! HTTP response type.

use std::collections::HashMap;

use serde_json::Value;

/// An HTTP response, for any status code.
///
/// The body is kept as raw text: success bodies are parsed with
/// [`json`](Self::json), error bodies are surfaced verbatim.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lower-cased name.
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response; header names are lower-cased.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: impl Into<String>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(key, values)| (key.to_lowercase(), values))
            .collect();
        Self {
            code,
            headers,
            body: body.into(),
        }
    }

    /// Creates a `200 OK` response carrying `body` as JSON.
    #[must_use]
    pub fn json_ok(body: &Value) -> Self {
        Self::new(200, HashMap::new(), body.to_string())
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Parses the body as JSON; an empty body parses as an empty object.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        if self.body.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(&self.body)
    }

    /// Returns the first value of header `name` (lower-case).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-EBAY-C-REQUEST-ID` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-ebay-c-request-id")
    }
}
