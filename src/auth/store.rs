//! The per-facade token store.
//!
//! [`TokenStore`] holds one application token and one user token and hands
//! out their bearer strings. Tokens are minted lazily and replaced once their
//! effective expiry passes. All state sits behind a single async mutex, so
//! concurrent callers that observe an expired token wait for one refresh
//! instead of each minting their own.

use std::fmt;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::Mutex;

use crate::auth::consent::{self, ConsentProvider, ConsentRequest};
use crate::auth::grants::{self, Grant};
use crate::auth::token::{AccessToken, RefreshCredential};
use crate::auth::{Scopes, StateParam, TokenError};
use crate::clients::Transport;
use crate::clock::Clock;
use crate::config::{ApplicationRecord, UserRecord};
use crate::reference;

/// Upper bound on one run of the consent provider.
pub const CONSENT_TIMEOUT: StdDuration = StdDuration::from_secs(300);

#[derive(Default)]
struct TokenState {
    application_scopes: Option<Scopes>,
    application_token: Option<AccessToken>,
    user_token: Option<AccessToken>,
    refresh: Option<RefreshCredential>,
}

/// Holds and refreshes the application and user tokens of one facade.
///
/// # Thread Safety
///
/// `TokenStore` is `Send + Sync`; share it behind an `Arc`.
pub struct TokenStore {
    application: ApplicationRecord,
    user: UserRecord,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    consent: Option<Arc<dyn ConsentProvider>>,
    state: Mutex<TokenState>,
}

// Verify TokenStore is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenStore>();
};

impl TokenStore {
    /// Creates a store.
    ///
    /// A refresh token in `user` is used before any consent is attempted.
    /// Passing `None` for `consent` disables the consent handshake.
    #[must_use]
    pub fn new(
        application: ApplicationRecord,
        user: UserRecord,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        consent: Option<Arc<dyn ConsentProvider>>,
    ) -> Self {
        let refresh = user
            .refresh_token()
            .map(|token| RefreshCredential::new(token, user.refresh_token_expiry()));
        Self {
            application,
            user,
            transport,
            clock,
            consent,
            state: Mutex::new(TokenState {
                refresh,
                ..TokenState::default()
            }),
        }
    }

    /// Returns the application record the store mints for.
    #[must_use]
    pub const fn application(&self) -> &ApplicationRecord {
        &self.application
    }

    /// Returns the scopes requested for user tokens.
    ///
    /// The user record's `scopes` win; otherwise
    /// [`reference::DEFAULT_USER_SCOPES`] is used.
    #[must_use]
    pub fn user_scopes(&self) -> Scopes {
        self.user
            .scopes()
            .cloned()
            .unwrap_or_else(|| Scopes::from_static(reference::DEFAULT_USER_SCOPES))
    }

    /// Returns a fresh application access token.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if scopes cannot be determined or the token
    /// endpoint fails.
    pub async fn current_application_token(&self) -> Result<String, TokenError> {
        let mut state = self.state.lock().await;
        if let Some(token) = &state.application_token {
            if token.is_fresh(self.clock.now()) {
                return Ok(token.value().to_string());
            }
        }

        let scopes = match &state.application_scopes {
            Some(scopes) => scopes.clone(),
            None => {
                let scopes = self.probe_application_scopes().await?;
                state.application_scopes = Some(scopes.clone());
                scopes
            }
        };

        let minted_at = self.clock.now();
        let response = grants::request_token(
            self.transport.as_ref(),
            &self.application,
            &Grant::ClientCredentials { scopes: &scopes },
        )
        .await?;
        let token = response.access_token(minted_at);
        let value = token.value().to_string();
        state.application_token = Some(token);
        Ok(value)
    }

    /// Returns a fresh user access token.
    ///
    /// The first call on a store without a usable refresh credential runs
    /// the consent handshake.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if the refresh or the consent fails, or if
    /// consent is needed but disabled.
    pub async fn current_user_token(&self) -> Result<String, TokenError> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        if let Some(token) = &state.user_token {
            if token.is_fresh(now) {
                return Ok(token.value().to_string());
            }
        }

        let scopes = self.user_scopes();
        let usable = state
            .refresh
            .as_ref()
            .filter(|refresh| refresh.is_usable(now))
            .cloned();

        let refresh = match usable {
            Some(refresh) => refresh,
            None => {
                let Some(provider) = &self.consent else {
                    return Err(match state.refresh.as_ref().and_then(RefreshCredential::expiry) {
                        Some(expired_at) => TokenError::RefreshExpired { expired_at },
                        None => TokenError::ConsentDisabled,
                    });
                };
                let (token, refresh) = self.run_consent(provider.as_ref(), &scopes).await?;
                state.refresh = Some(refresh);
                let value = token.value().to_string();
                state.user_token = Some(token);
                return Ok(value);
            }
        };

        let minted_at = self.clock.now();
        let response = grants::request_token(
            self.transport.as_ref(),
            &self.application,
            &Grant::RefreshToken {
                refresh_token: refresh.value(),
                scopes: &scopes,
            },
        )
        .await?;
        let token = response.access_token(minted_at);
        let value = token.value().to_string();
        state.user_token = Some(token);
        Ok(value)
    }

    /// Determines which application scopes are granted.
    ///
    /// Sandbox grants the full catalog. In production each scope is probed
    /// with its own client-credentials request.
    async fn probe_application_scopes(&self) -> Result<Scopes, TokenError> {
        let catalog = Scopes::from_static(reference::APPLICATION_SCOPES);
        if self.application.is_sandbox() {
            return Ok(catalog);
        }

        let mut granted = Scopes::new();
        for scope in catalog.iter() {
            let single = Scopes::from_static(&[scope]);
            match grants::request_token(
                self.transport.as_ref(),
                &self.application,
                &Grant::ClientCredentials { scopes: &single },
            )
            .await
            {
                Ok(_) => granted.insert(scope),
                Err(TokenError::Endpoint { status, .. }) => {
                    tracing::warn!(scope, status, "application scope not granted");
                }
                Err(e) => return Err(e),
            }
        }

        if granted.is_empty() {
            return Err(TokenError::NoScopesGranted);
        }
        tracing::debug!(
            granted = granted.len(),
            probed = catalog.len(),
            "probed application scopes"
        );
        Ok(granted)
    }

    async fn run_consent(
        &self,
        provider: &dyn ConsentProvider,
        scopes: &Scopes,
    ) -> Result<(AccessToken, RefreshCredential), TokenError> {
        let state = StateParam::new();
        let request = ConsentRequest::new(
            consent::authorization_url(&self.application, scopes, &state)?,
            self.user.email_or_username(),
            self.user.password(),
        );

        tracing::info!(user = self.user.email_or_username(), "starting user consent");
        let landing = tokio::time::timeout(CONSENT_TIMEOUT, provider.obtain_consent(&request))
            .await
            .map_err(|_| TokenError::ConsentFailed {
                reason: format!("no landing URL within {}s", CONSENT_TIMEOUT.as_secs()),
            })??;
        let code = consent::authorization_code(&landing, &state)?;

        let minted_at = self.clock.now();
        let response = grants::request_token(
            self.transport.as_ref(),
            &self.application,
            &Grant::AuthorizationCode { code: &code },
        )
        .await?;
        let refresh =
            response
                .refresh_credential(minted_at)
                .ok_or_else(|| TokenError::MalformedResponse {
                    reason: "authorization code grant returned no refresh_token".to_string(),
                })?;
        tracing::info!(user = self.user.email_or_username(), "user consent granted");

        Ok((response.access_token(minted_at), refresh))
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("application", &self.application)
            .field("user", &self.user)
            .field("consent_enabled", &self.consent.is_some())
            .finish_non_exhaustive()
    }
}
