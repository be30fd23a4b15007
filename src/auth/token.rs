//! Access tokens and refresh credentials.
//!
//! A token is held with its *declared* expiry; it is treated as expired
//! [`EXPIRY_MARGIN_SECONDS`] earlier to absorb clock skew and in-flight
//! latency.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::auth::TokenError;

/// How long before its declared expiry a token stops being used, in seconds.
pub const EXPIRY_MARGIN_SECONDS: i64 = 300;

fn expiry_margin() -> Duration {
    Duration::seconds(EXPIRY_MARGIN_SECONDS)
}

/// A bearer access token.
///
/// The token value is masked in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expiry: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token with its declared expiry.
    #[must_use]
    pub fn new(value: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expiry,
        }
    }

    /// Returns the bearer token string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the expiry declared by the token endpoint.
    #[must_use]
    pub const fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Returns the instant after which the token is no longer handed out.
    #[must_use]
    pub fn effective_expiry(&self) -> DateTime<Utc> {
        self.expiry - expiry_margin()
    }

    /// Returns `true` if the token may still be used at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.effective_expiry()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"*****")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// A refresh token together with its expiry.
///
/// A credential without a known expiry is assumed to stay valid.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshCredential {
    value: String,
    expiry: Option<DateTime<Utc>>,
}

impl RefreshCredential {
    /// Creates a refresh credential.
    #[must_use]
    pub fn new(value: impl Into<String>, expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expiry,
        }
    }

    /// Returns the refresh token string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the declared expiry, if known.
    #[must_use]
    pub const fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Returns `true` if the credential may still be exchanged at `now`.
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.expiry.map_or(true, |expiry| now < expiry - expiry_margin())
    }
}

impl fmt::Debug for RefreshCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCredential")
            .field("value", &"*****")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Response body of the token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    #[serde(default)]
    pub access_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    /// The refresh token, for authorization-code grants.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the refresh token in seconds.
    #[serde(default)]
    pub refresh_token_expires_in: Option<i64>,
}

impl TokenResponse {
    /// Parses and checks a token endpoint body.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MalformedResponse`] if the body does not decode
    /// and [`TokenError::BlankAccessToken`] if the access token is blank.
    pub fn parse(body: &str) -> Result<Self, TokenError> {
        let response: Self =
            serde_json::from_str(body).map_err(|e| TokenError::MalformedResponse {
                reason: e.to_string(),
            })?;
        if response.access_token.trim().is_empty() {
            return Err(TokenError::BlankAccessToken);
        }
        Ok(response)
    }

    /// Builds the access token, treating `minted_at` as the mint instant.
    #[must_use]
    pub fn access_token(&self, minted_at: DateTime<Utc>) -> AccessToken {
        AccessToken::new(
            self.access_token.clone(),
            minted_at + Duration::seconds(self.expires_in),
        )
    }

    /// Builds the refresh credential, if the response carried one.
    #[must_use]
    pub fn refresh_credential(&self, minted_at: DateTime<Utc>) -> Option<RefreshCredential> {
        self.refresh_token
            .as_ref()
            .filter(|token| !token.trim().is_empty())
            .map(|token| {
                RefreshCredential::new(
                    token.clone(),
                    self.refresh_token_expires_in
                        .map(|seconds| minted_at + Duration::seconds(seconds)),
                )
            })
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"*****")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "*****"))
            .field("refresh_token_expires_in", &self.refresh_token_expires_in)
            .finish()
    }
}
