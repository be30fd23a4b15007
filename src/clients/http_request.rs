//! HTTP request types.
//!
//! [`HttpRequest`] describes one call to an absolute URL. Requests are built
//! with [`HttpRequest::builder`] and verified before they are sent.

use std::fmt;

use serde_json::Value;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the REST APIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Content type for HTTP request bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// `application/json`.
    Json,
    /// `application/x-www-form-urlencoded`, used by the token endpoint.
    Form,
}

impl DataType {
    /// Returns the MIME type string for this data type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
        }
    }
}

/// An HTTP request to an absolute URL.
///
/// # Example
///
/// ```rust
/// use ebay_rest::clients::{DataType, HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Post, "https://api.ebay.com/identity/v1/oauth2/token")
///     .body(json!({"grant_type": "client_credentials"}))
///     .body_type(DataType::Form)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.encoded_body().unwrap().as_deref(), Some("grant_type=client_credentials"));
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The absolute URL, without query string.
    pub url: String,
    /// The request body, if any.
    pub body: Option<Value>,
    /// The content type of the body.
    pub body_type: Option<DataType>,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Request headers, in order.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, url)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the URL is relative, a body has
    /// no body type, or a POST/PUT has no body.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(InvalidHttpRequestError::RelativeUrl {
                url: self.url.clone(),
            });
        }

        if self.body.is_some() && self.body_type.is_none() {
            return Err(InvalidHttpRequestError::MissingBodyType);
        }

        if matches!(self.http_method, HttpMethod::Post | HttpMethod::Put) && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }

    /// Returns the value of the first header named `name`, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value of the first query parameter named `name`.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Serializes the body according to its body type.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::UnsupportedFormBody`] if a form body
    /// is not a flat object of scalars.
    pub fn encoded_body(&self) -> Result<Option<String>, InvalidHttpRequestError> {
        let Some(body) = &self.body else {
            return Ok(None);
        };

        match self.body_type {
            Some(DataType::Form) => {
                let object = body
                    .as_object()
                    .ok_or(InvalidHttpRequestError::UnsupportedFormBody)?;
                let mut pairs = Vec::with_capacity(object.len());
                for (key, value) in object {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => return Err(InvalidHttpRequestError::UnsupportedFormBody),
                    };
                    pairs.push(format!(
                        "{}={}",
                        urlencoding::encode(key),
                        urlencoding::encode(&value)
                    ));
                }
                Ok(Some(pairs.join("&")))
            }
            _ => Ok(Some(body.to_string())),
        }
    }
}

/// Builder for [`HttpRequest`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    url: String,
    body: Option<Value>,
    body_type: Option<DataType>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            http_method: method,
            url: url.into(),
            body: None,
            body_type: None,
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Sets the request body.
    ///
    /// When setting a body, you must also set the body type via [`body_type`](Self::body_type).
    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the content type of the request body.
    #[must_use]
    pub const fn body_type(mut self, body_type: DataType) -> Self {
        self.body_type = Some(body_type);
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Appends several query parameters.
    #[must_use]
    pub fn query_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Sets a header, replacing any earlier value with the same name.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    /// Builds and verifies the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if verification fails.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            url: self.url,
            body: self.body,
            body_type: self.body_type,
            query: self.query,
            headers: self.headers,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://api.ebay.com/buy/browse/v1/item_summary/search";

    #[test]
    fn test_builder_creates_valid_get_request() {
        let request = HttpRequest::builder(HttpMethod::Get, URL)
            .query_param("q", "drone")
            .query_param("limit", "10")
            .build()
            .unwrap();

        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.query_value("q"), Some("drone"));
        assert_eq!(request.query_value("limit"), Some("10"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_verify_requires_body_for_post() {
        let result = HttpRequest::builder(HttpMethod::Post, URL).build();

        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "post"
        ));
    }

    #[test]
    fn test_verify_requires_body_type_when_body_present() {
        let result = HttpRequest::builder(HttpMethod::Get, URL)
            .body(json!({"key": "value"}))
            .build();

        assert!(matches!(result, Err(InvalidHttpRequestError::MissingBodyType)));
    }

    #[test]
    fn test_verify_rejects_relative_url() {
        let result = HttpRequest::builder(HttpMethod::Get, "/buy/browse/v1").build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::RelativeUrl { .. })
        ));
    }

    #[test]
    fn test_header_replaces_case_insensitively() {
        let request = HttpRequest::builder(HttpMethod::Get, URL)
            .header("Authorization", "Bearer a")
            .header("authorization", "Bearer b")
            .build()
            .unwrap();

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer b"));
    }

    #[test]
    fn test_form_body_is_url_encoded_in_order() {
        let request = HttpRequest::builder(HttpMethod::Post, URL)
            .body(json!({
                "grant_type": "client_credentials",
                "scope": "https://api.ebay.com/oauth/api_scope a",
            }))
            .body_type(DataType::Form)
            .build()
            .unwrap();

        assert_eq!(
            request.encoded_body().unwrap().unwrap(),
            "grant_type=client_credentials&scope=https%3A%2F%2Fapi.ebay.com%2Foauth%2Fapi_scope%20a"
        );
    }

    #[test]
    fn test_form_body_rejects_nested_values() {
        let request = HttpRequest::builder(HttpMethod::Post, URL)
            .body(json!({"nested": {"a": 1}}))
            .body_type(DataType::Form)
            .build()
            .unwrap();

        assert_eq!(
            request.encoded_body(),
            Err(InvalidHttpRequestError::UnsupportedFormBody)
        );
    }

    #[test]
    fn test_json_body_serializes() {
        let request = HttpRequest::builder(HttpMethod::Put, URL)
            .body(json!({"sku": "A-1"}))
            .body_type(DataType::Json)
            .build()
            .unwrap();

        assert_eq!(
            request.encoded_body().unwrap().as_deref(),
            Some(r#"{"sku":"A-1"}"#)
        );
    }
}
