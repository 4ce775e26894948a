//! Transports carrying API requests.
//!
//! [`Transport`] is the seam between typed API calls and the wire. The
//! real implementation is [`http::HttpTransport`]; tests use
//! [`MockTransport`], an in-memory stand-in for an SFTPGo server.
//!
//! ```
//! use sftpgo_client::transport::{Method, MockTransport, Request, Transport};
//!
//! let mock = MockTransport::new();
//! let response = mock.send(Request::new(Method::Get, "users/nobody")).unwrap();
//! assert_eq!(response.status, 404);
//! ```

pub mod http;
mod mock;

pub use mock::MockTransport;

use crate::error::Result;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// One API request. `path` is relative to `/api/v2` with each segment
/// already escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response: status plus body text, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to an SFTPGo server.
///
/// Non-2xx statuses are returned as responses, not errors; only failures
/// to exchange the request at all are errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> Result<Response>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let req = Request::new(Method::Get, "users")
            .query("offset", 0)
            .query("limit", 100);
        assert_eq!(req.query[1], ("limit".to_string(), "100".to_string()));
        assert!(req.body.is_none());

        let req = Request::new(Method::Post, "roles").json(json!({"name": "r"}));
        assert_eq!(req.body.unwrap()["name"], "r");
    }

    #[test]
    fn test_response_success() {
        assert!(Response::new(201, "").is_success());
        assert!(!Response::new(404, "").is_success());
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
