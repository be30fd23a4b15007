//! Requests against the OAuth token endpoint.
//!
//! Three grants are used: `client_credentials` for application tokens,
//! `authorization_code` to turn a consent code into a refresh/access pair,
//! and `refresh_token` to mint user access tokens.

use base64::prelude::*;
use serde_json::{Map, Value};

use crate::auth::token::TokenResponse;
use crate::auth::{Scopes, TokenError};
use crate::clients::{DataType, HttpMethod, HttpRequest, Transport};
use crate::config::ApplicationRecord;

/// Production token endpoint.
pub const TOKEN_URL: &str = "https://api.ebay.com/identity/v1/oauth2/token";

/// Sandbox token endpoint.
pub const SANDBOX_TOKEN_URL: &str = "https://api.sandbox.ebay.com/identity/v1/oauth2/token";

/// A token endpoint grant.
#[derive(Debug)]
pub enum Grant<'a> {
    /// Application token for `scopes`.
    ClientCredentials {
        /// Requested scopes.
        scopes: &'a Scopes,
    },
    /// Exchange a consent code for a refresh/access pair.
    AuthorizationCode {
        /// The authorization code from the landing URL.
        code: &'a str,
    },
    /// User access token from a refresh token.
    RefreshToken {
        /// The refresh token.
        refresh_token: &'a str,
        /// Requested scopes.
        scopes: &'a Scopes,
    },
}

impl Grant<'_> {
    const fn grant_type(&self) -> &'static str {
        match self {
            Self::ClientCredentials { .. } => "client_credentials",
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    fn form(&self, app: &ApplicationRecord) -> Map<String, Value> {
        let mut form = Map::new();
        form.insert("grant_type".to_string(), self.grant_type().into());
        match self {
            Self::ClientCredentials { scopes } => {
                form.insert("scope".to_string(), scopes.to_string().into());
                form.insert("redirect_uri".to_string(), app.redirect_uri().into());
            }
            Self::AuthorizationCode { code } => {
                form.insert("code".to_string(), (*code).into());
                form.insert("redirect_uri".to_string(), app.redirect_uri().into());
            }
            Self::RefreshToken {
                refresh_token,
                scopes,
            } => {
                form.insert("refresh_token".to_string(), (*refresh_token).into());
                form.insert("scope".to_string(), scopes.to_string().into());
            }
        }
        form
    }
}

/// Returns the token endpoint for the application's environment.
#[must_use]
pub fn token_url(app: &ApplicationRecord) -> &'static str {
    if app.is_sandbox() {
        SANDBOX_TOKEN_URL
    } else {
        TOKEN_URL
    }
}

/// Sends `grant` to the token endpoint.
///
/// The client authenticates with HTTP Basic auth over `app_id:cert_id`.
///
/// # Errors
///
/// - [`TokenError::Http`] if the endpoint cannot be reached
/// - [`TokenError::Endpoint`] if it answers with a non-success status
/// - [`TokenError::MalformedResponse`] or [`TokenError::BlankAccessToken`]
///   if the success body is unusable
pub async fn request_token(
    transport: &dyn Transport,
    app: &ApplicationRecord,
    grant: &Grant<'_>,
) -> Result<TokenResponse, TokenError> {
    let credentials = BASE64_STANDARD.encode(format!("{}:{}", app.app_id(), app.cert_id()));
    let request = HttpRequest::builder(HttpMethod::Post, token_url(app))
        .header("Authorization", format!("Basic {credentials}"))
        .body(Value::Object(grant.form(app)))
        .body_type(DataType::Form)
        .build()
        .map_err(crate::clients::HttpError::from)?;

    let response = transport.execute(request).await?;
    if !response.is_ok() {
        tracing::debug!(
            grant = grant.grant_type(),
            status = response.code,
            "token endpoint rejected grant"
        );
        return Err(TokenError::Endpoint {
            status: response.code,
            body: response.body,
        });
    }

    let token = TokenResponse::parse(&response.body)?;
    tracing::debug!(
        grant = grant.grant_type(),
        expires_in = token.expires_in,
        "minted access token"
    );
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpError, HttpResponse};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Recorder {
        requests: Mutex<Vec<HttpRequest>>,
        response: HttpResponse,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn app(cert_id: &str) -> ApplicationRecord {
        ApplicationRecord::from_map(
            json!({"app_id": "app", "cert_id": cert_id, "redirect_uri": "runame"})
                .as_object()
                .unwrap(),
        )
        .unwrap()
    }

    fn recorder(code: u16, body: &str) -> Recorder {
        Recorder {
            requests: Mutex::new(Vec::new()),
            response: HttpResponse::new(code, HashMap::new(), body),
        }
    }

    #[tokio::test]
    async fn test_client_credentials_request_shape() {
        let transport = recorder(200, r#"{"access_token":"v^1.1#app","expires_in":7200}"#);
        let scopes = Scopes::from_static(&["https://api.ebay.com/oauth/api_scope"]);

        let token = request_token(&transport, &app("SBX-1"), &Grant::ClientCredentials { scopes: &scopes })
            .await
            .unwrap();
        assert_eq!(token.access_token, "v^1.1#app");

        let requests = transport.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.url, SANDBOX_TOKEN_URL);
        assert_eq!(
            request.header("Authorization"),
            Some(format!("Basic {}", BASE64_STANDARD.encode("app:SBX-1")).as_str())
        );
        let body = request.encoded_body().unwrap().unwrap();
        assert!(body.starts_with("grant_type=client_credentials&scope=https%3A%2F%2Fapi.ebay.com"));
        assert!(body.ends_with("&redirect_uri=runame"));
    }

    #[tokio::test]
    async fn test_refresh_grant_sends_refresh_token_and_scope() {
        let transport = recorder(200, r#"{"access_token":"v^1.1#user","expires_in":7200}"#);
        let scopes = Scopes::from_static(&["s1"]);

        request_token(
            &transport,
            &app("PRD-1"),
            &Grant::RefreshToken {
                refresh_token: "r-1",
                scopes: &scopes,
            },
        )
        .await
        .unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].url, TOKEN_URL);
        assert_eq!(
            requests[0].encoded_body().unwrap().as_deref(),
            Some("grant_type=refresh_token&refresh_token=r-1&scope=s1")
        );
    }

    #[tokio::test]
    async fn test_error_status_is_endpoint_error() {
        let transport = recorder(400, r#"{"error":"invalid_scope"}"#);
        let scopes = Scopes::from_static(&["bad"]);

        let error = request_token(&transport, &app("PRD-1"), &Grant::ClientCredentials { scopes: &scopes })
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            TokenError::Endpoint { status: 400, ref body } if body.contains("invalid_scope")
        ));
    }

    #[tokio::test]
    async fn test_blank_access_token_is_error() {
        let transport = recorder(200, r#"{"access_token":"","expires_in":7200}"#);

        let error = request_token(&transport, &app("PRD-1"), &Grant::AuthorizationCode { code: "c" })
            .await
            .unwrap_err();

        assert!(matches!(error, TokenError::BlankAccessToken));
    }
}
