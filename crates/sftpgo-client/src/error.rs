//! Error types for SFTPGo API calls.
//!
//! Errors keep the HTTP status code so callers can special-case "not
//! found" (a vanished object) without parsing messages. Nothing here is
//! retried; the category only drives user feedback.

use std::fmt;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Could not reach the server or the connection broke.
    Network,
    /// Credentials rejected or missing permission.
    Auth,
    /// Object does not exist.
    NotFound,
    /// Object already exists or conflicts with another one.
    Conflict,
    /// Server rejected the request content.
    Rejected,
    /// Server failed while handling the request.
    Server,
    /// Response body did not match the expected shape.
    Format,
    /// Client configuration is incomplete.
    Config,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Cannot reach the SFTPGo server",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Object not found",
            Self::Conflict => "Object already exists",
            Self::Rejected => "Request rejected by the server",
            Self::Server => "Server error",
            Self::Format => "Unexpected response format",
            Self::Config => "Invalid client configuration",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the host URL and that the server is running",
            Self::Auth => "Check the username/password or API key and admin permissions",
            Self::NotFound => "Refresh state, the object may have been removed outside this tool",
            Self::Conflict => "Import the existing object instead of creating it",
            Self::Rejected => "Check the attribute values against the server documentation",
            Self::Server => "Check the server logs",
            Self::Format => "The server version may not be supported",
            Self::Config => "Set the missing value in the provider block or environment",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Server answered with a non-2xx status.
    #[error("SFTPGo API error (HTTP {code}): {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// Request could not be sent or the response not received.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("invalid API response: {0}")]
    Decode(String),

    /// Missing or inconsistent connection settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Build a status error from a response body.
    ///
    /// SFTPGo error bodies are `{"message": ..., "error": ...}`; both are
    /// joined when present, the raw body is used otherwise.
    pub fn status(code: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .map(|v| {
                ["message", "error"]
                    .iter()
                    .filter_map(|k| v.get(*k).and_then(|m| m.as_str()))
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
                    .join(": ")
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.trim().to_string());
        Self::Status { code, message }
    }

    /// HTTP status code, when the server answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the server reported the object as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Status { code, .. } => match code {
                401 | 403 => ErrorCategory::Auth,
                404 => ErrorCategory::NotFound,
                409 => ErrorCategory::Conflict,
                400..=499 => ErrorCategory::Rejected,
                _ => ErrorCategory::Server,
            },
            Self::Transport(_) => ErrorCategory::Network,
            Self::Decode(_) => ErrorCategory::Format,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Status {
                code,
                message: format!("HTTP {code}"),
            },
            other => Self::Transport(other.to_string()),
        }
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
    fn test_status_message_from_body() {
        let err = Error::status(
            400,
            r#"{"message":"Unable to add user","error":"invalid username"}"#,
        );
        match &err {
            Error::Status { code, message } => {
                assert_eq!(*code, 400);
                assert_eq!(message, "Unable to add user: invalid username");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.category(), ErrorCategory::Rejected);
    }

    #[test]
    fn test_status_raw_body() {
        let err = Error::status(502, "bad gateway\n");
        assert!(err.to_string().contains("bad gateway"));
        assert_eq!(err.category(), ErrorCategory::Server);
    }

    #[test]
    fn test_not_found() {
        let err = Error::status(404, r#"{"error":"not found"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(!Error::Transport("refused".into()).is_not_found());
    }

    #[test]
    fn test_categories() {
        assert_eq!(Error::status(401, "").category(), ErrorCategory::Auth);
        assert_eq!(Error::status(409, "").category(), ErrorCategory::Conflict);
        assert_eq!(
            Error::Transport("x".into()).category(),
            ErrorCategory::Network
        );
        assert_eq!(Error::Config("x".into()).category(), ErrorCategory::Config);
        assert!(!ErrorCategory::Conflict.advice().is_empty());
    }

    #[test]
    fn test_from_json_error() {
        let err: Error = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
