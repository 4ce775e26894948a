//! Error types for lifecycle operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single validation finding, addressed by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// JSON pointer of the offending attribute (`""` for the whole record).
    pub path: String,
    /// What is wrong with it.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic for an attribute path.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn status_suffix(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Errors surfaced by lifecycle adapters to the reconciliation host.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Local schema or value constraint violations, found before any remote call.
    #[error("validation failed: {}", join_diagnostics(.0))]
    Validation(Vec<Diagnostic>),

    /// The remote API rejected the call or could not be reached.
    #[error("remote API error{}: {message}", status_suffix(*.status))]
    Remote {
        /// HTTP status code, when the server answered.
        status: Option<u16>,
        /// Message reported by the API or the transport.
        message: String,
    },

    /// A record could not be converted to or from its typed model.
    #[error("invalid record: {0}")]
    Decode(String),

    /// The host asked for a resource type nobody registered.
    #[error("unknown resource type: {0}")]
    UnknownType(String),

    /// Import identifier does not have the expected shape.
    #[error("invalid import identifier {id:?}: {reason}")]
    InvalidImportId {
        /// The identifier as given.
        id: String,
        /// Expected format.
        reason: String,
    },

    /// Operation not available for this resource or provider setup.
    #[error("{0}")]
    Unsupported(String),
}

impl Error {
    /// Create a remote error.
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Create a validation error holding a single diagnostic.
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![Diagnostic::new(path, message)])
    }

    /// Whether the remote API reported the object as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                status: Some(404),
                ..
            }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_diagnostics() {
        let err = Error::Validation(vec![
            Diagnostic::new("/status", "must be between 0 and 1"),
            Diagnostic::new("", "record is empty"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: /status: must be between 0 and 1; record is empty"
        );
    }

    #[test]
    fn test_remote_display_with_status() {
        let err = Error::remote(Some(400), "username is mandatory");
        assert_eq!(
            err.to_string(),
            "remote API error (HTTP 400): username is mandatory"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_remote_display_without_status() {
        let err = Error::remote(None, "connection refused");
        assert_eq!(err.to_string(), "remote API error: connection refused");
    }

    #[test]
    fn test_not_found() {
        assert!(Error::remote(Some(404), "not found").is_not_found());
        assert!(!Error::Decode("x".into()).is_not_found());
    }
}
