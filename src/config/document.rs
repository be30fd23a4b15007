//! The on-disk configuration document and record selection.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ebay_rest.json";

/// One of the three record sections of the configuration document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// Application credentials.
    Applications,
    /// User logins.
    Users,
    /// Default request headers.
    Headers,
}

impl Section {
    /// All sections, in document order.
    pub const ALL: [Self; 3] = [Self::Applications, Self::Users, Self::Headers];

    /// Returns the section key used in the document.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Applications => "applications",
            Self::Users => "users",
            Self::Headers => "headers",
        }
    }
}

/// How the caller picks the record for one section.
///
/// # Example
///
/// ```rust
/// use ebay_rest::config::RecordSource;
/// use serde_json::json;
///
/// let named = RecordSource::from("sandbox_1");
/// let literal = RecordSource::literal(json!({"marketplace_id": "EBAY_US"})).unwrap();
///
/// assert!(matches!(named, RecordSource::Named(ref name) if name == "sandbox_1"));
/// assert!(matches!(literal, RecordSource::Literal(_)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum RecordSource {
    /// The name of a record in the document's matching section.
    Named(String),
    /// A record given directly.
    Literal(Map<String, Value>),
}

impl RecordSource {
    /// Wraps a JSON object as a literal record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] if `value` is not an object.
    pub fn literal(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => Ok(Self::Literal(map)),
            other => Err(ConfigError::Malformed {
                reason: format!("a literal record must be an object, got {other}"),
            }),
        }
    }
}

impl From<&str> for RecordSource {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for RecordSource {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Map<String, Value>> for RecordSource {
    fn from(record: Map<String, Value>) -> Self {
        Self::Literal(record)
    }
}

/// A parsed configuration document.
///
/// The document is a JSON object with up to three keys, `applications`,
/// `users` and `headers`, each mapping record names to records.
///
/// # Example
///
/// ```rust
/// use ebay_rest::config::ConfigDocument;
///
/// let document: ConfigDocument = r#"{
///     "applications": {"production_1": {"app_id": "a", "cert_id": "c", "redirect_uri": "r"}},
///     "users": {},
///     "headers": {"US": {"marketplace_id": "EBAY_US"}}
/// }"#
/// .parse()
/// .unwrap();
///
/// assert_eq!(document.record_names(ebay_rest::config::Section::Headers), Some(vec!["US".to_string()]));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unreadable`] if the file cannot be read and
    /// [`ConfigError::Malformed`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        text.parse()
    }

    /// Loads [`DEFAULT_CONFIG_FILE`] from the working directory if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if !path.is_file() {
            tracing::debug!(file = DEFAULT_CONFIG_FILE, "no configuration document found");
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Returns the records of `section`, if the section is present.
    #[must_use]
    pub fn section(&self, section: Section) -> Option<&Map<String, Value>> {
        self.root.get(section.name()).and_then(Value::as_object)
    }

    /// Returns the sorted record names of `section`, if the section is present.
    #[must_use]
    pub fn record_names(&self, section: Section) -> Option<Vec<String>> {
        self.section(section).map(|records| {
            let mut names: Vec<String> = records.keys().cloned().collect();
            names.sort();
            names
        })
    }
}

impl std::str::FromStr for ConfigDocument {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })?;
        let Value::Object(root) = value else {
            return Err(ConfigError::Malformed {
                reason: "the document root must be an object".to_string(),
            });
        };

        for (key, records) in &root {
            if !Section::ALL.iter().any(|section| section.name() == key) {
                return Err(ConfigError::Malformed {
                    reason: format!("unexpected top-level key '{key}'"),
                });
            }
            let Some(records) = records.as_object() else {
                return Err(ConfigError::Malformed {
                    reason: format!("section '{key}' must be an object of named records"),
                });
            };
            if let Some((name, _)) = records.iter().find(|(_, record)| !record.is_object()) {
                return Err(ConfigError::Malformed {
                    reason: format!("record '{name}' in section '{key}' must be an object"),
                });
            }
        }

        Ok(Self { root })
    }
}

/// Selects the record for `section`.
///
/// A literal override is taken as is. A named override must exist in the
/// document's section. Without an override the section must hold exactly
/// one record.
///
/// # Errors
///
/// - [`ConfigError::Missing`] if there is neither a document nor a literal
/// - [`ConfigError::Malformed`] if the document lacks the section
/// - [`ConfigError::UnknownRecord`] if a named record is absent
/// - [`ConfigError::Ambiguous`] if the section holds zero or several records
///   and no override was given
pub fn resolve_record(
    section: Section,
    document: Option<&ConfigDocument>,
    source: Option<&RecordSource>,
) -> Result<Map<String, Value>, ConfigError> {
    if let Some(RecordSource::Literal(record)) = source {
        return Ok(record.clone());
    }

    let document = document.ok_or(ConfigError::Missing)?;
    let records = document
        .section(section)
        .ok_or_else(|| ConfigError::Malformed {
            reason: format!("section '{}' is absent", section.name()),
        })?;
    let available = document.record_names(section).unwrap_or_default();

    match source {
        Some(RecordSource::Named(name)) => records
            .get(name)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownRecord {
                section: section.name(),
                name: name.clone(),
                available,
            }),
        _ => {
            let mut iter = records.values();
            match (iter.next(), iter.next()) {
                (Some(Value::Object(record)), None) => Ok(record.clone()),
                _ => Err(ConfigError::Ambiguous {
                    section: section.name(),
                    available,
                }),
            }
        }
    }
}
