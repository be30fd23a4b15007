//! The call facade.
//!
//! An [`Api`] resolves its configuration once, then serves every endpoint
//! call: it selects the access token, routes to the production or sandbox
//! host, assembles the eBay headers, gates the call on the rate governor,
//! dispatches it through the [`Transport`] and normalizes the response.
//!
//! # Example
//!
//! ```rust,ignore
//! use ebay_rest::Api;
//! use ebay_rest::rest::resources::GetItem;
//!
//! let api = Api::builder()
//!     .application("production_1")
//!     .user("seller")
//!     .header("US")
//!     .throttle(true)
//!     .timeout(-1.0)
//!     .build()?;
//!
//! let item = api.call(&GetItem::new("v1|110551991829|0")).await?;
//! println!("{}", item["title"]);
//! ```
//!
//! # Shared state
//!
//! Building twice with equal arguments returns handles to the same facade
//! (see [`Api::ptr_eq`]), so tokens and rate buckets are shared per
//! identity. Equal arguments means equal resolved records, equal throttle
//! settings, the same consent flag and the same injected collaborators.

mod headers;
mod registry;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::auth::{ConsentProvider, TokenStore};
use crate::clients::{DataType, HttpError, HttpRequest, ReqwestTransport, Transport};
use crate::clock::{Clock, SystemClock};
use crate::config::{
    resolve_record, strip_blank, ApplicationRecord, ConfigDocument, HeaderRecord, RecordSource,
    Section, ThrottlePolicy, UserRecord,
};
use crate::error::{Error, Result};
use crate::rate::{RateGovernor, RateTelemetry, WaitPolicy};
use crate::rest::resources::GetRateLimits;
use crate::rest::{
    normalize, resolve_host, Endpoint, PagedEndpoint, Paginator, TokenKind, BROWSE_FAMILY,
};

pub use headers::{END_USER_CONTEXT_HEADER, MARKETPLACE_HEADER};

/// The facade over the eBay REST APIs.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Api {
    inner: Arc<ApiInner>,
}

pub(crate) struct ApiInner {
    tokens: TokenStore,
    governor: RateGovernor,
    wait: WaitPolicy,
    headers: HeaderRecord,
    end_user_context: Option<String>,
    transport: Arc<dyn Transport>,
    sandbox: bool,
}

// Verify Api is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Api>();
};

impl Api {
    /// Starts building a facade.
    #[must_use]
    pub fn builder() -> ApiBuilder {
        ApiBuilder::new()
    }

    /// Returns `true` if both handles refer to the same facade.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Returns `true` if the application credential is a sandbox one.
    #[must_use]
    pub fn is_sandbox(&self) -> bool {
        self.inner.sandbox
    }

    /// Returns the validated header record.
    #[must_use]
    pub fn headers(&self) -> &HeaderRecord {
        &self.inner.headers
    }

    /// Returns the rate governor of this facade.
    #[must_use]
    pub fn rate_governor(&self) -> &RateGovernor {
        &self.inner.governor
    }

    /// Returns the token store of this facade.
    #[must_use]
    pub fn token_store(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Calls a single-page endpoint and returns its normalized response.
    ///
    /// # Errors
    ///
    /// Returns a token error if no access token can be obtained,
    /// [`Error::QuotaExhausted`] if the rate governor refuses the call,
    /// [`Error::Transport`] for a non-success upstream status and
    /// [`Error::Http`] if no response was received.
    pub async fn call<E: Endpoint>(&self, endpoint: &E) -> Result<Value> {
        self.inner.dispatch(endpoint, true).await
    }

    /// Walks every page of a paged endpoint.
    ///
    /// `limit` caps the number of records yielded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPagination`] if `endpoint` carries an offset
    /// or `limit` is not positive.
    pub fn paginate<E: PagedEndpoint>(&self, endpoint: E, limit: Option<i64>) -> Result<Paginator<E>> {
        Paginator::new(self.clone(), endpoint, limit)
    }

    pub(crate) async fn call_page<E: Endpoint>(&self, endpoint: &E, gate: bool) -> Result<Value> {
        self.inner.dispatch(endpoint, gate).await
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("app_id", &self.inner.tokens.application().app_id())
            .field("sandbox", &self.inner.sandbox)
            .field("wait", &self.inner.wait)
            .field("headers", &self.inner.headers)
            .finish_non_exhaustive()
    }
}

impl ApiInner {
    async fn access_token(&self, kind: TokenKind) -> Result<String> {
        let token = match kind {
            TokenKind::Application => self.tokens.current_application_token().await?,
            TokenKind::User => self.tokens.current_user_token().await?,
        };
        Ok(token)
    }

    async fn dispatch<E: Endpoint>(&self, endpoint: &E, gate: bool) -> Result<Value> {
        let token = self.access_token(E::TOKEN).await?;

        let host = resolve_host(E::HOST, E::BASE_PATH, self.sandbox);
        let mut builder = HttpRequest::builder(endpoint.method(), format!("{host}{}", endpoint.path()))
            .header("Authorization", format!("Bearer {token}"))
            .query_params(endpoint.query());
        if let Some(marketplace) = headers::marketplace_for(endpoint, &self.headers) {
            builder = builder.header(MARKETPLACE_HEADER, marketplace);
        }
        if let Some(language) = &self.headers.accept_language {
            builder = builder.header("Accept-Language", language);
        }
        if let Some(language) = &self.headers.content_language {
            builder = builder.header("Content-Language", language);
        }
        if E::FAMILY == BROWSE_FAMILY {
            if let Some(context) = &self.end_user_context {
                builder = builder.header(END_USER_CONTEXT_HEADER, context);
            }
        }
        if let Some(body) = endpoint.body() {
            builder = builder.body(body).body_type(DataType::Json);
        }
        let request = builder.build().map_err(HttpError::from)?;

        if gate {
            self.governor.admit(&E::RESOURCE, self.wait, self).await?;
        }

        tracing::debug!(family = E::FAMILY, endpoint = E::NAME, url = %request.url, "calling endpoint");
        let response = self.transport.execute(request).await?;

        if let Some(warning) = response.header("warning") {
            tracing::warn!(family = E::FAMILY, endpoint = E::NAME, warning, "upstream warning");
        }
        if !response.is_ok() {
            tracing::debug!(
                endpoint = E::NAME,
                status = response.code,
                request_id = ?response.request_id(),
                "endpoint call failed"
            );
            return Err(Error::transport(response.code, response.body));
        }

        let payload = response.json().map_err(|e| Error::Decode {
            reason: e.to_string(),
        })?;
        Ok(normalize(&payload))
    }
}

#[async_trait]
impl RateTelemetry for ApiInner {
    async fn fetch_rate_limits(&self) -> Result<Value> {
        self.dispatch(&GetRateLimits::default(), true).await
    }
}

/// Builder for [`Api`].
///
/// Each section (`application`, `user`, `header`) is chosen by record name
/// from the configuration document or given as a literal record. A section
/// left unset must hold exactly one record in the document.
///
/// The document is read from [`config_path`](Self::config_path), supplied
/// directly with [`document`](Self::document), or looked up as
/// [`DEFAULT_CONFIG_FILE`](crate::config::DEFAULT_CONFIG_FILE) in the working
/// directory. It is not read at all when every section is a literal.
#[derive(Default)]
pub struct ApiBuilder {
    application: Option<RecordSource>,
    user: Option<RecordSource>,
    header: Option<RecordSource>,
    config_path: Option<PathBuf>,
    document: Option<ConfigDocument>,
    throttle: bool,
    timeout: Option<f64>,
    allow_get_user_consent: Option<bool>,
    consent_provider: Option<Arc<dyn ConsentProvider>>,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ApiBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses the application record.
    #[must_use]
    pub fn application(mut self, source: impl Into<RecordSource>) -> Self {
        self.application = Some(source.into());
        self
    }

    /// Chooses the user record.
    #[must_use]
    pub fn user(mut self, source: impl Into<RecordSource>) -> Self {
        self.user = Some(source.into());
        self
    }

    /// Chooses the header record.
    #[must_use]
    pub fn header(mut self, source: impl Into<RecordSource>) -> Self {
        self.header = Some(source.into());
        self
    }

    /// Reads the configuration document from `path`.
    #[must_use]
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Uses an already parsed configuration document.
    #[must_use]
    pub fn document(mut self, document: ConfigDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Blocks callers on an exhausted bucket instead of failing them.
    #[must_use]
    pub const fn throttle(mut self, throttle: bool) -> Self {
        self.throttle = throttle;
        self
    }

    /// Bounds the throttle wait, in seconds; `-1` waits indefinitely.
    #[must_use]
    pub const fn timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Allows or forbids the consent handshake for user tokens.
    ///
    /// Allowed by default; it only runs when a
    /// [`consent_provider`](Self::consent_provider) is supplied.
    #[must_use]
    pub const fn allow_get_user_consent(mut self, allow: bool) -> Self {
        self.allow_get_user_consent = Some(allow);
        self
    }

    /// Supplies the consent handshake.
    #[must_use]
    pub fn consent_provider(mut self, provider: Arc<dyn ConsentProvider>) -> Self {
        self.consent_provider = Some(provider);
        self
    }

    /// Replaces the default [`ReqwestTransport`].
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the system clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    fn load_document(&mut self) -> Result<Option<ConfigDocument>> {
        let all_literal = [&self.application, &self.user, &self.header]
            .iter()
            .all(|source| matches!(source, Some(RecordSource::Literal(_))));
        if all_literal {
            return Ok(None);
        }
        if let Some(document) = self.document.take() {
            return Ok(Some(document));
        }
        let document = match &self.config_path {
            Some(path) => Some(ConfigDocument::load(path)?),
            None => ConfigDocument::load_default()?,
        };
        Ok(document)
    }

    /// Resolves and validates the configuration and returns the facade.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document cannot be read, a record
    /// cannot be selected or is invalid, or the throttle settings conflict.
    /// Returns [`Error::Http`] if the default transport cannot be created.
    pub fn build(mut self) -> Result<Api> {
        let document = self.load_document()?;
        let document = document.as_ref();

        let application = strip_blank(&resolve_record(
            Section::Applications,
            document,
            self.application.as_ref(),
        )?);
        let user = strip_blank(&resolve_record(Section::Users, document, self.user.as_ref())?);
        let header = strip_blank(&resolve_record(Section::Headers, document, self.header.as_ref())?);

        let application_record = ApplicationRecord::from_map(&application)?;
        let user_record = UserRecord::from_map(&user)?;
        let header_record = HeaderRecord::from_map(&header)?;
        let policy = ThrottlePolicy::new(self.throttle, self.timeout)?;
        let allow_consent = self.allow_get_user_consent.unwrap_or(true);

        let key = registry_key(
            [&application, &user, &header],
            policy,
            allow_consent,
            [
                self.transport.as_ref().map(identity),
                self.clock.as_ref().map(identity),
                self.consent_provider.as_ref().map(identity),
            ],
        );

        let inner = registry::shared(key, move || {
            let transport: Arc<dyn Transport> = match self.transport {
                Some(transport) => transport,
                None => Arc::new(ReqwestTransport::new()?),
            };
            let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
            let consent = if allow_consent {
                self.consent_provider
            } else {
                None
            };
            let sandbox = application_record.is_sandbox();

            tracing::debug!(
                app_id = application_record.app_id(),
                sandbox,
                throttle = policy.throttle(),
                "building facade"
            );

            Ok(ApiInner {
                end_user_context: headers::end_user_context(&header_record),
                tokens: TokenStore::new(
                    application_record,
                    user_record,
                    Arc::clone(&transport),
                    Arc::clone(&clock),
                    consent,
                ),
                governor: RateGovernor::new(!sandbox, clock),
                wait: policy.wait_policy(),
                headers: header_record,
                transport,
                sandbox,
            })
        })?;

        Ok(Api { inner })
    }
}

impl fmt::Debug for ApiBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiBuilder")
            .field("application", &self.application.as_ref().map(source_label))
            .field("user", &self.user.as_ref().map(source_label))
            .field("header", &self.header.as_ref().map(source_label))
            .field("config_path", &self.config_path)
            .field("throttle", &self.throttle)
            .field("timeout", &self.timeout)
            .field("allow_get_user_consent", &self.allow_get_user_consent)
            .finish_non_exhaustive()
    }
}

fn source_label(source: &RecordSource) -> &str {
    match source {
        RecordSource::Named(name) => name,
        RecordSource::Literal(_) => "<literal>",
    }
}

fn identity<T: ?Sized>(shared: &Arc<T>) -> usize {
    Arc::as_ptr(shared).cast::<()>() as usize
}

/// Serializes the construction arguments with record keys sorted.
fn registry_key(
    records: [&Map<String, Value>; 3],
    policy: ThrottlePolicy,
    allow_consent: bool,
    collaborators: [Option<usize>; 3],
) -> String {
    let records: Vec<BTreeMap<&String, &Value>> =
        records.iter().map(|record| record.iter().collect()).collect();
    serde_json::json!({
        "records": records,
        "throttle": policy.throttle(),
        "timeout": policy.timeout(),
        "allow_get_user_consent": allow_consent,
        "collaborators": collaborators,
    })
    .to_string()
}
