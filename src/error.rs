//! Error types for the eBay REST client core.
//!
//! Configuration problems are reported as [`ConfigError`]; everything that can
//! go wrong while serving a call surfaces as the crate-wide [`Error`], which
//! wraps the per-concern errors and carries a stable error number.
//!
//! # Error numbers
//!
//! | Number | Meaning |
//! |---|---|
//! | 99000 | transport failed before an HTTP status was received |
//! | 99001 | configuration document cannot be opened |
//! | 99002 | configuration missing |
//! | 99003 | configuration malformed or named record absent |
//! | 99004 | record selection ambiguous |
//! | 99005 | record invalid |
//! | 99006 | header invalid |
//! | 99007 | throttle parameters invalid |
//! | 99008 | token error |
//! | 99009 | quota exhausted |
//! | 99010 | pagination input invalid |
//! | 99011 | success response body is not JSON |
//! | 99100–99599 | upstream HTTP status, `99000 + status` |
//!
//! # Example
//!
//! ```rust
//! use ebay_rest::{ConfigError, Error};
//!
//! let error = Error::from(ConfigError::Missing);
//! assert_eq!(error.number(), 99002);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::TokenError;
use crate::clients::HttpError;

/// Base of the transport error band; the upstream status is added to it.
pub const TRANSPORT_ERROR_BASE: u32 = 99_000;

/// What is wrong with a single key of a configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordProblem {
    /// A required key is absent.
    Missing,
    /// A required key is present but blank.
    Empty,
    /// The value has the wrong kind.
    WrongKind {
        /// The kind that was expected, e.g. `"string"`.
        expected: &'static str,
    },
    /// The key is not recognised for this section.
    Unknown,
}

impl fmt::Display for RecordProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("is required but missing"),
            Self::Empty => f.write_str("is required but empty"),
            Self::WrongKind { expected } => write!(f, "must be a {expected}"),
            Self::Unknown => f.write_str("is not a recognised key"),
        }
    }
}

/// Errors that can occur while resolving and validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document could not be opened or read.
    #[error("Unable to open configuration file '{path}': {reason}")]
    Unreadable {
        /// The path that was tried.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// Neither a configuration document nor literal records were supplied.
    #[error("No configuration document found. Supply a document or literal records for the applications, users and headers sections.")]
    Missing,

    /// The document does not parse, or an expected section is absent.
    #[error("Configuration document is malformed: {reason}")]
    Malformed {
        /// What is wrong with the document.
        reason: String,
    },

    /// A section override names a record that the document does not hold.
    #[error("Section '{section}' has no record named '{name}'. Available: {}", .available.join(", "))]
    UnknownRecord {
        /// The section that was searched.
        section: &'static str,
        /// The requested record name.
        name: String,
        /// Record names present in the section, sorted.
        available: Vec<String>,
    },

    /// A section was left unset and does not hold exactly one record.
    #[error("Section '{section}' needs an explicit record choice. Available: {}", .available.join(", "))]
    Ambiguous {
        /// The section that needs a choice.
        section: &'static str,
        /// Record names present in the section, sorted.
        available: Vec<String>,
    },

    /// A record key is missing, empty, of the wrong kind, or unknown.
    #[error("Record in section '{section}' is invalid: key '{key}' {problem}")]
    InvalidRecord {
        /// The section the record came from.
        section: &'static str,
        /// The offending key.
        key: String,
        /// What is wrong with it.
        problem: RecordProblem,
    },

    /// A header key is unknown or its value is outside the allowed set.
    #[error("Header '{key}' is invalid: {reason}")]
    InvalidHeader {
        /// The header record key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The `throttle`/`timeout` combination is not allowed.
    #[error("Invalid throttling parameters: {reason}")]
    InvalidThrottle {
        /// Why the combination was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Returns the stable error number for this error.
    #[must_use]
    pub const fn number(&self) -> u32 {
        match self {
            Self::Unreadable { .. } => 99_001,
            Self::Missing => 99_002,
            Self::Malformed { .. } | Self::UnknownRecord { .. } => 99_003,
            Self::Ambiguous { .. } => 99_004,
            Self::InvalidRecord { .. } => 99_005,
            Self::InvalidHeader { .. } => 99_006,
            Self::InvalidThrottle { .. } => 99_007,
        }
    }
}

/// The crate-wide error type.
///
/// Every variant maps to a stable [`number`](Self::number) and splits into a
/// short [`reason`](Self::reason) and a [`detail`](Self::detail).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be resolved or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A token could not be obtained or refreshed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The rate governor could not admit the call within the allowed wait.
    #[error("Call quota exhausted for {resource}; it resets at {reset}")]
    QuotaExhausted {
        /// The bucket key, as `context/api/resource`.
        resource: String,
        /// When the bucket is refilled.
        reset: DateTime<Utc>,
    },

    /// Upstream answered with a non-success HTTP status.
    #[error("Upstream returned {status} {reason}: {body}")]
    Transport {
        /// The HTTP status code.
        status: u16,
        /// The upstream reason phrase.
        reason: String,
        /// The upstream response body.
        body: String,
    },

    /// The request never produced an HTTP status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The caller passed an unsupported pagination argument.
    #[error("Invalid pagination input: {reason}")]
    InvalidPagination {
        /// What was wrong with the input.
        reason: String,
    },

    /// A success response did not carry a JSON body.
    #[error("Response body could not be decoded: {reason}")]
    Decode {
        /// The decoder's message.
        reason: String,
    },
}

impl Error {
    /// Builds a transport error from an upstream status and body.
    #[must_use]
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        Self::Transport {
            status,
            reason,
            body: body.into(),
        }
    }

    /// Returns the stable error number.
    #[must_use]
    pub fn number(&self) -> u32 {
        match self {
            Self::Config(e) => e.number(),
            Self::Token(_) => 99_008,
            Self::QuotaExhausted { .. } => 99_009,
            Self::InvalidPagination { .. } => 99_010,
            Self::Decode { .. } => 99_011,
            Self::Http(_) => TRANSPORT_ERROR_BASE,
            Self::Transport { status, .. } => {
                if (100..=599).contains(status) {
                    TRANSPORT_ERROR_BASE + u32::from(*status)
                } else {
                    TRANSPORT_ERROR_BASE
                }
            }
        }
    }

    /// Returns the short, human-readable reason.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Config(e) => match e {
                ConfigError::Unreadable { .. } => "Unable to open configuration",
                ConfigError::Missing => "Configuration missing",
                ConfigError::Malformed { .. } | ConfigError::UnknownRecord { .. } => {
                    "Configuration section problem"
                }
                ConfigError::Ambiguous { .. } => "Record selection ambiguous",
                ConfigError::InvalidRecord { .. } => "Record invalid",
                ConfigError::InvalidHeader { .. } => "Header invalid",
                ConfigError::InvalidThrottle { .. } => "Throttle parameters invalid",
            }
            .to_string(),
            Self::Token(_) => "Token error".to_string(),
            Self::QuotaExhausted { .. } => "Quota exhausted".to_string(),
            Self::InvalidPagination { .. } => "Pagination input invalid".to_string(),
            Self::Decode { .. } => "Response undecodable".to_string(),
            Self::Http(_) => "Transport failed".to_string(),
            Self::Transport { reason, .. } => reason.clone(),
        }
    }

    /// Returns the detail text.
    ///
    /// For transport errors this is the upstream body; for ambiguous or
    /// unknown record selections it is the sorted, comma-separated list of
    /// available record names.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Transport { body, .. } => body.clone(),
            Self::Config(
                ConfigError::Ambiguous { available, .. }
                | ConfigError::UnknownRecord { available, .. },
            ) => available.join(", "),
            other => other.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_number_offsets_status() {
        let error = Error::transport(429, "rate");
        assert_eq!(error.number(), 99_429);
        assert_eq!(error.reason(), "Too Many Requests");
        assert_eq!(error.detail(), "rate");
    }

    #[test]
    fn test_transport_error_out_of_band_status_uses_base() {
        let error = Error::Transport {
            status: 42,
            reason: "odd".to_string(),
            body: String::new(),
        };
        assert_eq!(error.number(), TRANSPORT_ERROR_BASE);
    }

    #[test]
    fn test_config_error_numbers_are_distinct() {
        let errors = [
            ConfigError::Unreadable {
                path: "x".to_string(),
                reason: "y".to_string(),
            },
            ConfigError::Missing,
            ConfigError::Malformed {
                reason: "bad".to_string(),
            },
            ConfigError::Ambiguous {
                section: "applications",
                available: vec![],
            },
            ConfigError::InvalidRecord {
                section: "users",
                key: "password".to_string(),
                problem: RecordProblem::Missing,
            },
            ConfigError::InvalidHeader {
                key: "country".to_string(),
                reason: "unknown".to_string(),
            },
            ConfigError::InvalidThrottle {
                reason: "bad".to_string(),
            },
        ];
        let mut numbers: Vec<u32> = errors.iter().map(ConfigError::number).collect();
        numbers.dedup();
        assert_eq!(numbers, vec![99_001, 99_002, 99_003, 99_004, 99_005, 99_006, 99_007]);
    }

    #[test]
    fn test_ambiguous_detail_lists_available_names() {
        let error = Error::from(ConfigError::Ambiguous {
            section: "applications",
            available: vec!["production".to_string(), "sandbox".to_string()],
        });
        assert_eq!(error.number(), 99_004);
        assert_eq!(error.detail(), "production, sandbox");
        assert!(error.to_string().contains("applications"));
    }

    #[test]
    fn test_record_problem_messages() {
        let error = ConfigError::InvalidRecord {
            section: "users",
            key: "scopes".to_string(),
            problem: RecordProblem::WrongKind {
                expected: "sequence of strings",
            },
        };
        let message = error.to_string();
        assert!(message.contains("scopes"));
        assert!(message.contains("sequence of strings"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<ConfigError>();
    }
}
