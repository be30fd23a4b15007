//! OAuth token lifecycle for the eBay REST APIs.
//!
//! # Overview
//!
//! - [`TokenStore`]: mints, caches and refreshes the application and user tokens of one facade
//! - [`Scopes`]: a set of OAuth scope URIs
//! - [`AccessToken`] and [`RefreshCredential`]: tokens with their expiry
//! - [`ConsentProvider`]: the pluggable consent handshake
//! - [`TokenError`]: everything that can go wrong while obtaining a token
//!
//! # Token kinds
//!
//! - **Application tokens** come from the `client_credentials` grant and
//!   carry the application scopes. They are minted on first use.
//! - **User tokens** come from the `refresh_token` grant. The refresh token is
//!   either supplied in the user record or obtained once through the consent
//!   handshake and the `authorization_code` grant.
//!
//! Both kinds are treated as expired five minutes before their declared
//! expiry.

mod consent;
mod error;
mod grants;
mod scopes;
mod state;
mod store;
mod token;

pub use consent::{
    authorization_code, authorization_url, ConsentProvider, ConsentRequest, AUTHORIZE_URL,
    SANDBOX_AUTHORIZE_URL,
};
pub use error::TokenError;
pub use grants::{request_token, token_url, Grant, SANDBOX_TOKEN_URL, TOKEN_URL};
pub use scopes::Scopes;
pub use state::StateParam;
pub use store::{TokenStore, CONSENT_TIMEOUT};
pub use token::{AccessToken, RefreshCredential, TokenResponse, EXPIRY_MARGIN_SECONDS};
