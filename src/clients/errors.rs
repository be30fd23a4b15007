//! HTTP-level error types.
//!
//! These cover failures that happen before an upstream status is available:
//! requests that fail validation and connection-level errors. A response
//! with a non-2xx status is *not* an [`HttpError`]; the caller decides what a
//! status means.

use thiserror::Error;

/// Error returned when an HTTP request fails validation before sending.
///
/// # Example
///
/// ```rust
/// use ebay_rest::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingBody {
///     method: "post".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Cannot use post without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The request URL is not absolute.
    #[error("Request URL '{url}' must be absolute.")]
    RelativeUrl {
        /// The offending URL.
        url: String,
    },

    /// A form body must be a flat object.
    #[error("Form bodies must be flat JSON objects of scalar values.")]
    UnsupportedFormBody,
}

/// Unified error type for HTTP failures that produced no response.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_error_missing_body_type() {
        let error = InvalidHttpRequestError::MissingBodyType;
        assert_eq!(
            error.to_string(),
            "Cannot set a body without also setting body_type."
        );
    }

    #[test]
    fn test_relative_url_error_names_url() {
        let error = InvalidHttpRequestError::RelativeUrl {
            url: "/identity/v1/oauth2/token".to_string(),
        };
        assert!(error.to_string().contains("/identity/v1/oauth2/token"));
    }

    #[test]
    fn test_http_error_wraps_invalid_request() {
        let error: HttpError = InvalidHttpRequestError::MissingBodyType.into();
        assert!(matches!(
            error,
            HttpError::InvalidRequest(InvalidHttpRequestError::MissingBodyType)
        ));
    }
}
