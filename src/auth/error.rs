//! Token error type.
//!
//! # Example
//!
//! ```rust
//! use ebay_rest::auth::TokenError;
//!
//! let error = TokenError::BlankAccessToken;
//! assert_eq!(error.to_string(), "Token endpoint returned a blank access token");
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::clients::HttpError;

/// Errors that can occur while minting, refreshing or consenting to tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token endpoint answered with a non-success status.
    #[error("Token endpoint returned {status}: {body}")]
    Endpoint {
        /// The HTTP status code returned.
        status: u16,
        /// The response body.
        body: String,
    },

    /// The token endpoint answered 2xx with an empty `access_token`.
    #[error("Token endpoint returned a blank access token")]
    BlankAccessToken,

    /// The token endpoint response could not be decoded.
    #[error("Token endpoint response is malformed: {reason}")]
    MalformedResponse {
        /// What was wrong with the response.
        reason: String,
    },

    /// No scope could be granted to the application.
    #[error("None of the application scopes were granted")]
    NoScopesGranted,

    /// A user token is needed, no refresh credential exists and consent is disabled.
    #[error("User consent is required but disabled; supply a refresh_token in the user record")]
    ConsentDisabled,

    /// The refresh credential has expired and consent is disabled.
    #[error("Refresh token expired at {expired_at} and user consent is disabled")]
    RefreshExpired {
        /// When the refresh credential expired.
        expired_at: DateTime<Utc>,
    },

    /// The consent handshake did not produce an authorization code.
    #[error("User consent failed: {reason}")]
    ConsentFailed {
        /// Why the handshake failed.
        reason: String,
    },

    /// The landing URL carried a `state` that does not match the one sent.
    #[error("Consent state parameter mismatch")]
    StateMismatch,

    /// The token endpoint could not be reached.
    #[error(transparent)]
    Http(#[from] HttpError),
}

// Verify TokenError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_endpoint_error_includes_status_and_body() {
        let error = TokenError::Endpoint {
            status: 401,
            body: r#"{"error":"invalid_client"}"#.to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("invalid_client"));
    }

    #[test]
    fn test_refresh_expired_names_instant() {
        let expired_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let error = TokenError::RefreshExpired { expired_at };
        assert!(error.to_string().contains("2024-03-01"));
    }
}
