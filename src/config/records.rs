//! Validated credential, user and header records.
//!
//! Records arrive as JSON objects, either from the configuration document or
//! as caller literals. Keys whose value is the empty string are stripped
//! first; the remainder is validated against the fixed key set of each
//! section.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::auth::Scopes;
use crate::error::{ConfigError, RecordProblem};
use crate::reference;

const APPLICATION_KEYS: &[&str] = &["app_id", "cert_id", "dev_id", "redirect_uri"];
const USER_KEYS: &[&str] = &[
    "email_or_username",
    "password",
    "scopes",
    "refresh_token",
    "refresh_token_expiry",
];
const HEADER_KEYS: &[&str] = &[
    "accept_language",
    "affiliate_campaign_id",
    "affiliate_reference_id",
    "content_language",
    "country",
    "currency",
    "device_id",
    "marketplace_id",
    "zip",
];

/// Removes keys whose value is the empty string.
#[must_use]
pub fn strip_blank(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .filter(|(_, value)| value.as_str() != Some(""))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

struct RecordReader<'a> {
    section: &'static str,
    record: &'a Map<String, Value>,
}

impl<'a> RecordReader<'a> {
    const fn new(section: &'static str, record: &'a Map<String, Value>) -> Self {
        Self { section, record }
    }

    fn invalid(&self, key: &str, problem: RecordProblem) -> ConfigError {
        ConfigError::InvalidRecord {
            section: self.section,
            key: key.to_string(),
            problem,
        }
    }

    fn reject_unknown(&self, allowed: &[&str]) -> Result<(), ConfigError> {
        match self.record.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(key) => Err(self.invalid(key, RecordProblem::Unknown)),
            None => Ok(()),
        }
    }

    fn optional_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match self.record.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Err(self.invalid(key, RecordProblem::Empty))
            }
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(key, RecordProblem::WrongKind { expected: "string" })),
        }
    }

    fn required_string(&self, key: &str) -> Result<String, ConfigError> {
        self.optional_string(key)?
            .ok_or_else(|| self.invalid(key, RecordProblem::Missing))
    }

    fn optional_scopes(&self, key: &str) -> Result<Option<Scopes>, ConfigError> {
        let wrong_kind = || {
            self.invalid(
                key,
                RecordProblem::WrongKind {
                    expected: "sequence of strings",
                },
            )
        };
        match self.record.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let mut scopes = Scopes::new();
                for item in items {
                    scopes.insert(item.as_str().ok_or_else(wrong_kind)?);
                }
                if scopes.is_empty() {
                    return Err(self.invalid(key, RecordProblem::Empty));
                }
                Ok(Some(scopes))
            }
            Some(_) => Err(wrong_kind()),
        }
    }

    fn optional_instant(&self, key: &str) -> Result<Option<DateTime<Utc>>, ConfigError> {
        let Some(raw) = self.optional_string(key)? else {
            return Ok(None);
        };
        parse_instant(&raw).map(Some).ok_or_else(|| {
            self.invalid(
                key,
                RecordProblem::WrongKind {
                    expected: "ISO-8601 instant",
                },
            )
        })
    }
}

/// Parses an ISO-8601 instant; values without an offset are taken as UTC.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// The application credential record.
///
/// The `cert_id` is masked in `Debug` output.
///
/// # Example
///
/// ```rust
/// use ebay_rest::config::ApplicationRecord;
/// use serde_json::json;
///
/// let record = json!({
///     "app_id": "MyApp-1234",
///     "cert_id": "SBX-abcdef",
///     "dev_id": "",
///     "redirect_uri": "My_Name-MyApp-PRD-runame",
/// });
/// let app = ApplicationRecord::from_map(record.as_object().unwrap()).unwrap();
///
/// assert!(app.is_sandbox());
/// assert_eq!(app.dev_id(), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    app_id: String,
    cert_id: String,
    dev_id: Option<String>,
    redirect_uri: String,
}

impl ApplicationRecord {
    /// Validates an application record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRecord`] if a required key is missing,
    /// blank or not a string, or an unknown key is present.
    pub fn from_map(record: &Map<String, Value>) -> Result<Self, ConfigError> {
        let record = strip_blank(record);
        let reader = RecordReader::new("applications", &record);
        reader.reject_unknown(APPLICATION_KEYS)?;
        Ok(Self {
            app_id: reader.required_string("app_id")?,
            cert_id: reader.required_string("cert_id")?,
            dev_id: reader.optional_string("dev_id")?,
            redirect_uri: reader.required_string("redirect_uri")?,
        })
    }

    /// Returns the application (client) id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the certificate id (client secret).
    #[must_use]
    pub fn cert_id(&self) -> &str {
        &self.cert_id
    }

    /// Returns the developer id, if configured.
    #[must_use]
    pub fn dev_id(&self) -> Option<&str> {
        self.dev_id.as_deref()
    }

    /// Returns the redirect URI name (`RuName`).
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns `true` if the `cert_id` carries the sandbox prefix.
    #[must_use]
    pub fn is_sandbox(&self) -> bool {
        self.cert_id.starts_with(reference::SANDBOX_CERT_PREFIX)
    }
}

impl fmt::Debug for ApplicationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationRecord")
            .field("app_id", &self.app_id)
            .field("cert_id", &"*****")
            .field("dev_id", &self.dev_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// The user record used for user tokens.
///
/// `password` and `refresh_token` are masked in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    email_or_username: String,
    password: String,
    scopes: Option<Scopes>,
    refresh_token: Option<String>,
    refresh_token_expiry: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Validates a user record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRecord`] if a required key is missing or
    /// blank, `scopes` is not a sequence of strings, `refresh_token_expiry`
    /// is not an ISO-8601 instant, or an unknown key is present.
    pub fn from_map(record: &Map<String, Value>) -> Result<Self, ConfigError> {
        let record = strip_blank(record);
        let reader = RecordReader::new("users", &record);
        reader.reject_unknown(USER_KEYS)?;
        Ok(Self {
            email_or_username: reader.required_string("email_or_username")?,
            password: reader.required_string("password")?,
            scopes: reader.optional_scopes("scopes")?,
            refresh_token: reader.optional_string("refresh_token")?,
            refresh_token_expiry: reader.optional_instant("refresh_token_expiry")?,
        })
    }

    /// Returns the login id.
    #[must_use]
    pub fn email_or_username(&self) -> &str {
        &self.email_or_username
    }

    /// Returns the login password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the caller-requested scopes, if any.
    #[must_use]
    pub const fn scopes(&self) -> Option<&Scopes> {
        self.scopes.as_ref()
    }

    /// Returns the pre-supplied refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the pre-supplied refresh token expiry, if any.
    #[must_use]
    pub const fn refresh_token_expiry(&self) -> Option<DateTime<Utc>> {
        self.refresh_token_expiry
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("email_or_username", &self.email_or_username)
            .field("password", &"*****")
            .field("scopes", &self.scopes)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "*****"))
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

/// Default request header values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderRecord {
    /// `Accept-Language` value.
    pub accept_language: Option<String>,
    /// Affiliate campaign id for the end-user context.
    pub affiliate_campaign_id: Option<String>,
    /// Affiliate reference id for the end-user context.
    pub affiliate_reference_id: Option<String>,
    /// `Content-Language` value.
    pub content_language: Option<String>,
    /// Buyer country, ISO 3166 alpha-2.
    pub country: Option<String>,
    /// Currency, ISO 4217.
    pub currency: Option<String>,
    /// Device id for the end-user context.
    pub device_id: Option<String>,
    /// Default `X-EBAY-C-MARKETPLACE-ID`.
    pub marketplace_id: Option<String>,
    /// Buyer postal code.
    pub zip: Option<String>,
}

impl HeaderRecord {
    /// Validates a header record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] if a key is unknown, a value
    /// is not a string, or an enumerated value is outside its allowed set.
    pub fn from_map(record: &Map<String, Value>) -> Result<Self, ConfigError> {
        let record = strip_blank(record);
        let mut header = Self::default();

        for (key, value) in &record {
            let Some(value) = value.as_str() else {
                return Err(ConfigError::InvalidHeader {
                    key: key.clone(),
                    reason: "value must be a string".to_string(),
                });
            };

            let allowed = match key.as_str() {
                "accept_language" | "content_language" => reference::is_language(value),
                "country" => reference::is_country_code(value),
                "currency" => reference::is_currency_code(value),
                "marketplace_id" => reference::is_marketplace_id(value),
                other if HEADER_KEYS.contains(&other) => true,
                _ => {
                    return Err(ConfigError::InvalidHeader {
                        key: key.clone(),
                        reason: "unknown header key".to_string(),
                    })
                }
            };
            if !allowed {
                return Err(ConfigError::InvalidHeader {
                    key: key.clone(),
                    reason: format!("'{value}' is not an allowed value"),
                });
            }

            let slot = match key.as_str() {
                "accept_language" => &mut header.accept_language,
                "affiliate_campaign_id" => &mut header.affiliate_campaign_id,
                "affiliate_reference_id" => &mut header.affiliate_reference_id,
                "content_language" => &mut header.content_language,
                "country" => &mut header.country,
                "currency" => &mut header.currency,
                "device_id" => &mut header.device_id,
                "marketplace_id" => &mut header.marketplace_id,
                _ => &mut header.zip,
            };
            *slot = Some(value.to_string());
        }

        Ok(header)
    }
}
