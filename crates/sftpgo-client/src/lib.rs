//! # sftpgo-client
//!
//! Blocking client for the SFTPGo REST API (`/api/v2`).
//!
//! This crate provides:
//! - Connection settings with `SFTPGO_*` environment fallbacks
//! - API key or token authentication over `ureq`
//! - Wire models for users, folders, groups, roles, admins, event actions,
//!   event rules, IP list entries and the license
//! - Typed CRUD calls and paginated listing
//! - An in-memory [`MockTransport`] for tests
//!
//! ## Example
//!
//! ```no_run
//! use sftpgo_client::{Client, ClientConfig, models::Role};
//!
//! let config = ClientConfig {
//!     host: Some("http://127.0.0.1:8080".into()),
//!     ..Default::default()
//! }
//! .with_env()
//! .unwrap();
//! let client = Client::new(&config).unwrap();
//!
//! for role in client.list::<Role>().unwrap() {
//!     println!("{}", role.name);
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod transport;

pub use config::{ClientConfig, Edition};
pub use error::{Error, ErrorCategory, Result};
pub use transport::MockTransport;

use models::{ApiObject, IpListEntry, License};
use serde::de::DeserializeOwned;
use serde_json::json;
use transport::http::HttpTransport;
use transport::{Method, Request, Response, Transport};

/// Page size used by list calls.
pub const PAGE_SIZE: usize = 100;

/// SFTPGo API client.
///
/// Shared by every lifecycle call; the only mutable state is the cached
/// access token inside the HTTP transport.
pub struct Client {
    transport: Box<dyn Transport>,
    edition: Edition,
}

impl Client {
    /// Create a client talking HTTP to the configured host.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            transport: Box::new(transport),
            edition: config.edition()?,
        })
    }

    /// Create a client with a custom transport (useful for testing).
    #[must_use]
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            edition: Edition::Community,
        }
    }

    #[must_use]
    pub fn with_edition(mut self, edition: Edition) -> Self {
        self.edition = edition;
        self
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    // =========================================================================
    // Keyed collections
    // =========================================================================

    /// Fetch an object by key.
    pub fn get<T: ApiObject>(&self, key: &str) -> Result<T> {
        self.call_json(Request::new(Method::Get, object_path(T::ENDPOINT, key)))
    }

    /// Fetch an object by key, `None` when it does not exist.
    pub fn find<T: ApiObject>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Ok(object) => Ok(Some(object)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn create<T: ApiObject>(&self, object: &T) -> Result<()> {
        let body = serde_json::to_value(object)?;
        self.call(Request::new(Method::Post, T::ENDPOINT).json(body))?;
        Ok(())
    }

    /// Replace the object stored under `object.key()`.
    pub fn update<T: ApiObject>(&self, object: &T) -> Result<()> {
        let body = serde_json::to_value(object)?;
        let path = object_path(T::ENDPOINT, object.key());
        self.call(Request::new(Method::Put, path).json(body))?;
        Ok(())
    }

    pub fn delete<T: ApiObject>(&self, key: &str) -> Result<()> {
        self.call(Request::new(Method::Delete, object_path(T::ENDPOINT, key)))?;
        Ok(())
    }

    /// Every object of a collection, in key order.
    ///
    /// Pages are requested until one comes back short, so a collection
    /// whose size is a multiple of [`PAGE_SIZE`] costs one empty request.
    pub fn list<T: ApiObject>(&self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        loop {
            let page: Vec<T> = self.call_json(
                Request::new(Method::Get, T::ENDPOINT)
                    .query("offset", all.len())
                    .query("limit", PAGE_SIZE)
                    .query("order", "ASC"),
            )?;
            let short = page.len() < PAGE_SIZE;
            all.extend(page);
            if short {
                break;
            }
        }
        log::debug!("Listed {} objects from {}", all.len(), T::ENDPOINT);
        Ok(all)
    }

    // =========================================================================
    // IP lists
    // =========================================================================

    pub fn get_ip_entry(&self, list_type: i64, ipornet: &str) -> Result<IpListEntry> {
        self.call_json(Request::new(Method::Get, ip_entry_path(list_type, ipornet)))
    }

    pub fn find_ip_entry(&self, list_type: i64, ipornet: &str) -> Result<Option<IpListEntry>> {
        match self.get_ip_entry(list_type, ipornet) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn create_ip_entry(&self, entry: &IpListEntry) -> Result<()> {
        let body = serde_json::to_value(entry)?;
        self.call(Request::new(Method::Post, format!("iplists/{}", entry.list_type)).json(body))?;
        Ok(())
    }

    pub fn update_ip_entry(&self, entry: &IpListEntry) -> Result<()> {
        let body = serde_json::to_value(entry)?;
        self.call(
            Request::new(Method::Put, ip_entry_path(entry.list_type, &entry.ipornet)).json(body),
        )?;
        Ok(())
    }

    pub fn delete_ip_entry(&self, list_type: i64, ipornet: &str) -> Result<()> {
        self.call(Request::new(Method::Delete, ip_entry_path(list_type, ipornet)))?;
        Ok(())
    }

    /// Every entry of one list. Pages are addressed by the last network
    /// seen rather than by offset.
    pub fn list_ip_entries(&self, list_type: i64) -> Result<Vec<IpListEntry>> {
        let mut all: Vec<IpListEntry> = Vec::new();
        loop {
            let mut request = Request::new(Method::Get, format!("iplists/{list_type}"))
                .query("limit", PAGE_SIZE)
                .query("order", "ASC");
            if let Some(last) = all.last() {
                request = request.query("from", &last.ipornet);
            }
            let page: Vec<IpListEntry> = self.call_json(request)?;
            let short = page.len() < PAGE_SIZE;
            all.extend(page);
            if short {
                break;
            }
        }
        Ok(all)
    }

    // =========================================================================
    // License
    // =========================================================================

    pub fn get_license(&self) -> Result<License> {
        self.call_json(Request::new(Method::Get, "license"))
    }

    pub fn install_license(&self, key: &str) -> Result<()> {
        self.call(Request::new(Method::Post, "license").json(json!({ "key": key })))?;
        Ok(())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn call(&self, request: Request) -> Result<Response> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request)?;
        if !response.is_success() {
            log::debug!("{method} {path} failed with HTTP {}", response.status);
            return Err(Error::status(response.status, &response.body));
        }
        Ok(response)
    }

    fn call_json<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let path = request.path.clone();
        let response = self.call(request)?;
        serde_json::from_str(&response.body).map_err(|e| Error::Decode(format!("{path}: {e}")))
    }
}

fn escape(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn object_path(endpoint: &str, key: &str) -> String {
    format!("{endpoint}/{}", escape(key))
}

fn ip_entry_path(list_type: i64, ipornet: &str) -> String {
    format!("iplists/{list_type}/{}", escape(ipornet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};
    use serde_json::json;

    fn client() -> (MockTransport, Client) {
        let mock = MockTransport::new();
        let client = Client::with_transport(Box::new(mock.clone()));
        (mock, client)
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let (_, client) = client();
        let err = client.get::<Role>("nope").unwrap_err();
        assert!(err.is_not_found());
        assert!(client.find::<Role>("nope").unwrap().is_none());
    }

    #[test]
    fn test_create_get_update_delete() {
        let (mock, client) = client();
        let role = Role {
            name: "ops".into(),
            description: "operators".into(),
            ..Default::default()
        };
        client.create(&role).unwrap();
        let fetched: Role = client.get("ops").unwrap();
        assert_eq!(fetched.description, "operators");
        assert!(fetched.id > 0);

        client
            .update(&Role {
                description: "changed".into(),
                ..fetched
            })
            .unwrap();
        assert_eq!(client.get::<Role>("ops").unwrap().description, "changed");

        client.delete::<Role>("ops").unwrap();
        assert_eq!(mock.count("roles"), 0);
        assert!(client.delete::<Role>("ops").unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_create_is_conflict() {
        let (_, client) = client();
        let role = Role {
            name: "ops".into(),
            ..Default::default()
        };
        client.create(&role).unwrap();
        let err = client.create(&role).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_keys_are_escaped() {
        let (mock, client) = client();
        mock.insert("users", json!({"username": "a b/c"}));
        let user: User = client.get("a b/c").unwrap();
        assert_eq!(user.username, "a b/c");
        assert_eq!(mock.requests(), vec!["GET users/a%20b%2Fc"]);
    }

    #[test]
    fn test_list_exact_page_multiple() {
        let (mock, client) = client();
        for i in 0..(2 * PAGE_SIZE) {
            mock.insert("roles", json!({"name": format!("role{i:04}")}));
        }
        let roles = client.list::<Role>().unwrap();
        assert_eq!(roles.len(), 2 * PAGE_SIZE);
        assert_eq!(roles[0].name, "role0000");
        assert_eq!(roles[2 * PAGE_SIZE - 1].name, "role0199");
        assert_eq!(
            mock.requests(),
            vec![
                "GET roles?offset=0&limit=100&order=ASC",
                "GET roles?offset=100&limit=100&order=ASC",
                "GET roles?offset=200&limit=100&order=ASC",
            ]
        );
    }

    #[test]
    fn test_list_partial_page() {
        let (mock, client) = client();
        for i in 0..(PAGE_SIZE + 1) {
            mock.insert("roles", json!({"name": format!("role{i:04}")}));
        }
        let roles = client.list::<Role>().unwrap();
        assert_eq!(roles.len(), PAGE_SIZE + 1);
        let mut names: Vec<_> = roles.iter().map(|r| r.name.clone()).collect();
        names.dedup();
        assert_eq!(names.len(), PAGE_SIZE + 1);
        assert_eq!(mock.requests().len(), 2);
    }

    #[test]
    fn test_ip_entries_cursor_pagination() {
        let (mock, client) = client();
        for i in 0..PAGE_SIZE {
            let net = format!("10.0.{}.{}/32", i / 256, i % 256);
            mock.insert("iplists/2", json!({"ipornet": net, "type": 2, "mode": 1}));
        }
        let entries = client.list_ip_entries(2).unwrap();
        assert_eq!(entries.len(), PAGE_SIZE);
        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].contains(&format!(
            "from={}",
            entries.last().unwrap().ipornet
        )));
    }

    #[test]
    fn test_ip_entry_crud() {
        let (_, client) = client();
        let entry = IpListEntry {
            ipornet: "192.168.1.0/24".into(),
            list_type: 1,
            mode: 1,
            ..Default::default()
        };
        client.create_ip_entry(&entry).unwrap();
        let fetched = client.get_ip_entry(1, "192.168.1.0/24").unwrap();
        assert_eq!(fetched.id(), "1:192.168.1.0/24");

        client
            .update_ip_entry(&IpListEntry {
                description: "office".into(),
                ..fetched
            })
            .unwrap();
        assert_eq!(
            client.get_ip_entry(1, "192.168.1.0/24").unwrap().description,
            "office"
        );
        client.delete_ip_entry(1, "192.168.1.0/24").unwrap();
        let missing = client.find_ip_entry(1, "192.168.1.0/24").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_license() {
        let (_, client) = client();
        assert!(client.get_license().unwrap_err().is_not_found());
        client.install_license("AAAA-BBBB-CCCC").unwrap();
        assert!(client.get_license().unwrap().key.ends_with("CCCC"));
    }

    #[test]
    fn test_status_error_message() {
        let (mock, client) = client();
        mock.fail_next(400, "invalid permissions");
        let err = client.list::<Role>().unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert!(err.to_string().contains("invalid permissions"));
    }
}
