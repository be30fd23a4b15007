//! The user consent handshake.
//!
//! Obtaining the first refresh token requires a user to sign in on eBay's
//! consent page. That step is delegated to a [`ConsentProvider`]: it is given
//! the authorization URL and the user's login, drives the page (typically a
//! browser automation), and returns the URL the browser landed on. The store
//! then reads the authorization code from the landing URL's query.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use ebay_rest::auth::{ConsentProvider, ConsentRequest, TokenError};
//!
//! #[derive(Debug)]
//! struct Prompt;
//!
//! #[async_trait]
//! impl ConsentProvider for Prompt {
//!     async fn obtain_consent(&self, request: &ConsentRequest) -> Result<String, TokenError> {
//!         println!("Open {} and paste the landing URL", request.authorization_url());
//!         let mut line = String::new();
//!         std::io::stdin()
//!             .read_line(&mut line)
//!             .map_err(|e| TokenError::ConsentFailed { reason: e.to_string() })?;
//!         Ok(line.trim().to_string())
//!     }
//! }
//! ```

use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::auth::{Scopes, StateParam, TokenError};
use crate::config::ApplicationRecord;

/// Production consent page.
pub const AUTHORIZE_URL: &str = "https://auth.ebay.com/oauth2/authorize";

/// Sandbox consent page.
pub const SANDBOX_AUTHORIZE_URL: &str = "https://auth.sandbox.ebay.com/oauth2/authorize";

/// Everything a [`ConsentProvider`] needs to drive the consent page.
///
/// The password is masked in `Debug` output.
#[derive(Clone)]
pub struct ConsentRequest {
    authorization_url: String,
    user_id: String,
    password: String,
}

impl ConsentRequest {
    /// Creates a consent request.
    #[must_use]
    pub fn new(
        authorization_url: impl Into<String>,
        user_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            authorization_url: authorization_url.into(),
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    /// Returns the URL of the consent page.
    #[must_use]
    pub fn authorization_url(&self) -> &str {
        &self.authorization_url
    }

    /// Returns the login id to sign in with.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the password to sign in with.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for ConsentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsentRequest")
            .field("authorization_url", &self.authorization_url)
            .field("user_id", &self.user_id)
            .field("password", &"*****")
            .finish()
    }
}

/// Drives the consent page and reports where the browser landed.
#[async_trait]
pub trait ConsentProvider: Send + Sync + fmt::Debug {
    /// Signs in and grants consent, returning the landing URL.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ConsentFailed`] if the page cannot be driven.
    async fn obtain_consent(&self, request: &ConsentRequest) -> Result<String, TokenError>;
}

/// Builds the consent page URL.
///
/// # Errors
///
/// Returns [`TokenError::ConsentFailed`] if the URL cannot be assembled.
pub fn authorization_url(
    app: &ApplicationRecord,
    scopes: &Scopes,
    state: &StateParam,
) -> Result<String, TokenError> {
    let base = if app.is_sandbox() {
        SANDBOX_AUTHORIZE_URL
    } else {
        AUTHORIZE_URL
    };
    let scope = scopes.to_string();
    let url = Url::parse_with_params(
        base,
        &[
            ("client_id", app.app_id()),
            ("redirect_uri", app.redirect_uri()),
            ("response_type", "code"),
            ("prompt", "login"),
            ("scope", scope.as_str()),
            ("state", state.as_ref()),
        ],
    )
    .map_err(|e| TokenError::ConsentFailed {
        reason: e.to_string(),
    })?;
    Ok(url.into())
}

/// Reads the authorization code from the landing URL.
///
/// `isAuthSuccessful=false` is a failure. Without that flag, a non-empty
/// `code` is success. An echoed `state` must match `expected`.
///
/// # Errors
///
/// Returns [`TokenError::StateMismatch`] for a foreign `state`, and
/// [`TokenError::ConsentFailed`] when no code can be recovered.
pub fn authorization_code(landing_url: &str, expected: &StateParam) -> Result<String, TokenError> {
    let url = Url::parse(landing_url).map_err(|e| TokenError::ConsentFailed {
        reason: format!("landing URL does not parse: {e}"),
    })?;

    let mut code = None;
    let mut state = None;
    let mut successful = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "isAuthSuccessful" => successful = Some(value.into_owned()),
            _ => {}
        }
    }

    if successful.as_deref() == Some("false") {
        return Err(TokenError::ConsentFailed {
            reason: "the consent page reported isAuthSuccessful=false".to_string(),
        });
    }
    if let Some(state) = state {
        if !expected.matches(&state) {
            return Err(TokenError::StateMismatch);
        }
    }
    code.filter(|code| !code.is_empty())
        .ok_or_else(|| TokenError::ConsentFailed {
            reason: "the landing URL carries no authorization code".to_string(),
        })
}
