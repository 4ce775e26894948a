//! In-memory SFTPGo emulation for tests.

use super::{Method, Request, Response, Transport};
use crate::error::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default and maximum page size of list endpoints.
const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 500;

const FS_CONFIGS: [&str; 7] = [
    "osconfig",
    "s3config",
    "gcsconfig",
    "azblobconfig",
    "cryptconfig",
    "sftpconfig",
    "httpconfig",
];

const ACTION_OPTIONS: [&str; 8] = [
    "http_config",
    "cmd_config",
    "email_config",
    "retention_config",
    "fs_config",
    "pwd_expiration_config",
    "user_inactivity_config",
    "idp_config",
];

/// Collections and the field holding their key.
const COLLECTIONS: [(&str, &str); 7] = [
    ("users", "username"),
    ("admins", "username"),
    ("folders", "name"),
    ("groups", "name"),
    ("roles", "name"),
    ("eventactions", "name"),
    ("eventrules", "name"),
];

/// Mock SFTPGo server.
///
/// Behaves like the real API where the provider depends on it: plaintext
/// secrets come back encrypted, user and admin passwords are never
/// returned, the license key is masked, inactive sub-configs are echoed
/// empty, missing objects answer 404 and duplicates 409, and list
/// endpoints paginate. Clones share the same server.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    server: Arc<Mutex<MockServer>>,
}

#[derive(Debug, Default)]
struct MockServer {
    collections: HashMap<String, BTreeMap<String, Value>>,
    ip_lists: BTreeMap<i64, BTreeMap<String, Value>>,
    license: Option<Value>,
    next_id: i64,
    clock: i64,
    requests: Vec<String>,
    failures: VecDeque<(u16, String)>,
}

impl MockTransport {
    /// Create an empty server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockServer> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an object directly, as if created through the API.
    pub fn insert(&self, collection: &str, object: Value) {
        let mut server = self.lock();
        if let Some(ip_type) = collection.strip_prefix("iplists/") {
            let ip_type = ip_type.parse().unwrap_or_default();
            let key = str_field(&object, "ipornet");
            let stored = server.store(collection, object, None);
            server
                .ip_lists
                .entry(ip_type)
                .or_default()
                .insert(key, stored);
        } else if let Some(field) = key_field(collection) {
            let key = str_field(&object, field);
            let stored = server.store(collection, object, None);
            server
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(key, stored);
        }
    }

    /// Delete an object behind the provider's back.
    pub fn remove(&self, collection: &str, key: &str) -> bool {
        let mut server = self.lock();
        if let Some(ip_type) = collection.strip_prefix("iplists/") {
            let ip_type: i64 = ip_type.parse().unwrap_or_default();
            return server
                .ip_lists
                .get_mut(&ip_type)
                .and_then(|l| l.remove(key))
                .is_some();
        }
        server
            .collections
            .get_mut(collection)
            .and_then(|c| c.remove(key))
            .is_some()
    }

    /// Stored object, as the server holds it.
    pub fn stored(&self, collection: &str, key: &str) -> Option<Value> {
        let server = self.lock();
        if let Some(ip_type) = collection.strip_prefix("iplists/") {
            let ip_type: i64 = ip_type.parse().unwrap_or_default();
            return server.ip_lists.get(&ip_type)?.get(key).cloned();
        }
        server.collections.get(collection)?.get(key).cloned()
    }

    /// Number of objects in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Requests received so far, as `METHOD path?query`.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    /// Answer the next request with an error status.
    pub fn fail_next(&self, status: u16, message: impl Into<String>) {
        self.lock().failures.push_back((status, message.into()));
    }
}

impl Transport for MockTransport {
    fn send(&self, request: Request) -> Result<Response> {
        let mut server = self.lock();
        server.requests.push(describe(&request));
        if let Some((status, message)) = server.failures.pop_front() {
            return Ok(error(status, &message));
        }
        Ok(server.handle(&request))
    }
}

impl MockServer {
    fn handle(&mut self, request: &Request) -> Response {
        let segments: Vec<String> = request
            .path
            .trim_matches('/')
            .split('/')
            .map(|s| {
                urlencoding::decode(s)
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            })
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match (request.method, segments.as_slice()) {
            (Method::Get, ["license"]) => match &self.license {
                Some(license) => ok(200, license.clone()),
                None => error(404, "no license installed"),
            },
            (Method::Post, ["license"]) => self.install_license(request.body.as_ref()),
            (_, ["iplists", ip_type, rest @ ..]) => match ip_type.parse::<i64>() {
                Ok(ip_type @ 1..=3) => self.handle_ip_list(request, ip_type, rest),
                _ => error(400, &format!("invalid list type {ip_type:?}")),
            },
            (_, [collection, rest @ ..]) => match key_field(collection) {
                Some(field) => self.handle_collection(request, collection, field, rest),
                None => error(404, "not found"),
            },
            _ => error(404, "not found"),
        }
    }

    fn handle_collection(
        &mut self,
        request: &Request,
        collection: &str,
        field: &str,
        rest: &[&str],
    ) -> Response {
        match (request.method, rest) {
            (Method::Get, []) => {
                let items: Vec<Value> = self
                    .collections
                    .get(collection)
                    .map(|c| c.values().cloned().collect())
                    .unwrap_or_default();
                let offset = query_usize(request, "offset").unwrap_or(0);
                let limit = query_usize(request, "limit")
                    .unwrap_or(DEFAULT_LIMIT)
                    .clamp(1, MAX_LIMIT);
                let mut items = items;
                if query(request, "order") == Some("DESC") {
                    items.reverse();
                }
                let page: Vec<Value> = items.into_iter().skip(offset).take(limit).collect();
                ok(200, Value::Array(page))
            }
            (Method::Post, []) => {
                let Some(body) = request.body.clone() else {
                    return error(400, "missing body");
                };
                let key = str_field(&body, field);
                if key.is_empty() {
                    return error(400, &format!("{field} is mandatory"));
                }
                if self
                    .collections
                    .get(collection)
                    .is_some_and(|c| c.contains_key(&key))
                {
                    return error(409, &format!("{key:?} already exists"));
                }
                let stored = self.store(collection, body, None);
                self.collections
                    .entry(collection.to_string())
                    .or_default()
                    .insert(key, stored.clone());
                ok(201, stored)
            }
            (Method::Get, [key]) => {
                match self.collections.get(collection).and_then(|c| c.get(*key)) {
                    Some(found) => ok(200, found.clone()),
                    None => error(404, &format!("{key:?} not found")),
                }
            }
            (Method::Put, [key]) => {
                let Some(existing) = self
                    .collections
                    .get(collection)
                    .and_then(|c| c.get(*key))
                    .cloned()
                else {
                    return error(404, &format!("{key:?} not found"));
                };
                let Some(mut body) = request.body.clone() else {
                    return error(400, "missing body");
                };
                if let Some(obj) = body.as_object_mut() {
                    obj.insert(field.to_string(), Value::String((*key).to_string()));
                }
                let stored = self.store(collection, body, Some(&existing));
                self.collections
                    .entry(collection.to_string())
                    .or_default()
                    .insert((*key).to_string(), stored);
                message(200, "updated")
            }
            (Method::Delete, [key]) => {
                match self
                    .collections
                    .get_mut(collection)
                    .and_then(|c| c.remove(*key))
                {
                    Some(_) => message(200, "deleted"),
                    None => error(404, &format!("{key:?} not found")),
                }
            }
            _ => error(405, "method not allowed"),
        }
    }

    fn handle_ip_list(&mut self, request: &Request, ip_type: i64, rest: &[&str]) -> Response {
        let collection = format!("iplists/{ip_type}");
        match (request.method, rest) {
            (Method::Get, []) => {
                let from = query(request, "from").unwrap_or_default().to_string();
                let limit = query_usize(request, "limit")
                    .unwrap_or(DEFAULT_LIMIT)
                    .clamp(1, MAX_LIMIT);
                let page: Vec<Value> = self
                    .ip_lists
                    .get(&ip_type)
                    .map(|list| {
                        list.iter()
                            .filter(|(k, _)| from.is_empty() || k.as_str() > from.as_str())
                            .take(limit)
                            .map(|(_, v)| v.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                ok(200, Value::Array(page))
            }
            (Method::Post, []) => {
                let Some(body) = request.body.clone() else {
                    return error(400, "missing body");
                };
                let key = str_field(&body, "ipornet");
                if key.is_empty() {
                    return error(400, "ipornet is mandatory");
                }
                if body.get("type").and_then(Value::as_i64) != Some(ip_type) {
                    return error(400, "type does not match the list");
                }
                let list = self.ip_lists.entry(ip_type).or_default();
                if list.contains_key(&key) {
                    return error(409, &format!("{key:?} already exists"));
                }
                let stored = self.store(&collection, body, None);
                self.ip_lists
                    .entry(ip_type)
                    .or_default()
                    .insert(key, stored.clone());
                ok(201, stored)
            }
            (Method::Get, [key]) => match self.ip_lists.get(&ip_type).and_then(|l| l.get(*key)) {
                Some(found) => ok(200, found.clone()),
                None => error(404, &format!("{key:?} not found")),
            },
            (Method::Put, [key]) => {
                let Some(existing) = self
                    .ip_lists
                    .get(&ip_type)
                    .and_then(|l| l.get(*key))
                    .cloned()
                else {
                    return error(404, &format!("{key:?} not found"));
                };
                let Some(mut body) = request.body.clone() else {
                    return error(400, "missing body");
                };
                if let Some(obj) = body.as_object_mut() {
                    obj.insert("ipornet".to_string(), Value::String((*key).to_string()));
                    obj.insert("type".to_string(), json!(ip_type));
                }
                let stored = self.store(&collection, body, Some(&existing));
                self.ip_lists
                    .entry(ip_type)
                    .or_default()
                    .insert((*key).to_string(), stored);
                message(200, "updated")
            }
            (Method::Delete, [key]) => {
                match self.ip_lists.get_mut(&ip_type).and_then(|l| l.remove(*key)) {
                    Some(_) => message(200, "deleted"),
                    None => error(404, &format!("{key:?} not found")),
                }
            }
            _ => error(405, "method not allowed"),
        }
    }

    fn install_license(&mut self, body: Option<&Value>) -> Response {
        let key: Vec<char> = body
            .map(|b| str_field(b, "key"))
            .unwrap_or_default()
            .chars()
            .collect();
        if key.len() < 8 {
            return error(400, "invalid license key");
        }
        self.clock += 1000;
        let hidden = key.len() - 4;
        let visible: String = key[hidden..].iter().collect();
        let license = json!({
            "key": format!("{}{visible}", "*".repeat(hidden)),
            "type": 1,
            "valid_from": self.clock,
            "valid_to": self.clock + 365 * 24 * 3_600_000,
        });
        self.license = Some(license.clone());
        ok(201, license)
    }

    /// Turn a request body into the stored representation.
    fn store(&mut self, collection: &str, mut object: Value, existing: Option<&Value>) -> Value {
        self.clock += 1000;
        let now = self.clock;
        encrypt_secrets(&mut object);

        let Some(obj) = object.as_object_mut() else {
            return object;
        };
        let is_ip_list = collection.starts_with("iplists/");
        if !is_ip_list {
            let id = match existing.and_then(|e| e.get("id")).and_then(Value::as_i64) {
                Some(id) => id,
                None => {
                    self.next_id += 1;
                    self.next_id
                }
            };
            obj.insert("id".to_string(), json!(id));
        }
        if collection != "folders" && collection != "eventactions" {
            let created = existing
                .and_then(|e| e.get("created_at"))
                .cloned()
                .unwrap_or_else(|| json!(now));
            obj.insert("created_at".to_string(), created);
            obj.insert("updated_at".to_string(), json!(now));
        }

        match collection {
            "users" | "admins" => {
                let password = obj
                    .remove("password")
                    .and_then(|p| p.as_str().map(str::to_string))
                    .unwrap_or_default();
                if collection == "users" {
                    let had = existing
                        .and_then(|e| e.get("has_password"))
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    obj.insert("has_password".to_string(), json!(had || !password.is_empty()));
                    fill_filesystem(obj.entry("filesystem").or_insert_with(|| json!({})));
                }
            }
            "folders" => {
                fill_filesystem(obj.entry("filesystem").or_insert_with(|| json!({})));
                obj.entry("users").or_insert_with(|| json!([]));
            }
            "groups" => {
                let settings = obj.entry("user_settings").or_insert_with(|| json!({}));
                if let Some(settings) = settings.as_object_mut() {
                    fill_filesystem(settings.entry("filesystem").or_insert_with(|| json!({})));
                }
            }
            "eventactions" => {
                let options = obj.entry("options").or_insert_with(|| json!({}));
                if let Some(options) = options.as_object_mut() {
                    for name in ACTION_OPTIONS {
                        options.entry(name).or_insert_with(|| json!({}));
                    }
                }
                obj.entry("rules").or_insert_with(|| json!([]));
            }
            "eventrules" => {
                if let Some(Value::Array(actions)) = obj.get_mut("actions") {
                    actions.sort_by_key(|a| a.get("order").and_then(Value::as_i64).unwrap_or(0));
                }
            }
            _ => {}
        }
        object
    }
}

/// Replace every plaintext secret object with an encrypted one.
fn encrypt_secrets(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            if is_plain_secret(obj) {
                let payload = obj
                    .get("payload")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let sealed = format!("$sb${}", STANDARD.encode(payload));
                obj.insert("status".to_string(), json!("Secretbox"));
                obj.insert("payload".to_string(), json!(sealed));
                return;
            }
            for v in obj.values_mut() {
                encrypt_secrets(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(encrypt_secrets),
        _ => {}
    }
}

fn is_plain_secret(obj: &Map<String, Value>) -> bool {
    obj.get("status").and_then(Value::as_str) == Some("Plain")
        && obj.get("payload").is_some_and(Value::is_string)
}

/// The server echoes every provider config, active or not.
fn fill_filesystem(fs: &mut Value) {
    if let Some(fs) = fs.as_object_mut() {
        fs.entry("provider").or_insert_with(|| json!(0));
        for name in FS_CONFIGS {
            fs.entry(name).or_insert_with(|| json!({}));
        }
    }
}

fn key_field(collection: &str) -> Option<&'static str> {
    COLLECTIONS
        .iter()
        .find(|(name, _)| *name == collection)
        .map(|(_, field)| *field)
}

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn query<'a>(request: &'a Request, key: &str) -> Option<&'a str> {
    request
        .query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn query_usize(request: &Request, key: &str) -> Option<usize> {
    query(request, key).and_then(|v| v.parse().ok())
}

fn describe(request: &Request) -> String {
    let mut line = format!("{} {}", request.method, request.path);
    if !request.query.is_empty() {
        let query: Vec<String> = request
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        line.push('?');
        line.push_str(&query.join("&"));
    }
    line
}

fn ok(status: u16, body: Value) -> Response {
    Response::new(status, body.to_string())
}

fn message(status: u16, text: &str) -> Response {
    ok(status, json!({ "message": text }))
}

fn error(status: u16, text: &str) -> Response {
    ok(status, json!({ "message": "", "error": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(mock: &MockTransport, request: Request) -> (u16, Value) {
        let response = mock.send(request).unwrap();
        let body = serde_json::from_str(&response.body).unwrap_or(Value::Null);
        (response.status, body)
    }

    #[test]
    fn test_crud_cycle() {
        let mock = MockTransport::new();
        let (status, created) = send(
            &mock,
            Request::new(Method::Post, "roles").json(json!({"name": "ops"})),
        );
        assert_eq!(status, 201);
        assert_eq!(created["id"], 1);

        let (status, _) = send(
            &mock,
            Request::new(Method::Post, "roles").json(json!({"name": "ops"})),
        );
        assert_eq!(status, 409);

        let (status, _) = send(
            &mock,
            Request::new(Method::Put, "roles/ops").json(json!({"name": "ops", "description": "d"})),
        );
        assert_eq!(status, 200);
        assert_eq!(mock.stored("roles", "ops").unwrap()["description"], "d");
        assert_eq!(mock.stored("roles", "ops").unwrap()["id"], 1);

        assert_eq!(send(&mock, Request::new(Method::Delete, "roles/ops")).0, 200);
        assert_eq!(send(&mock, Request::new(Method::Delete, "roles/ops")).0, 404);
        assert_eq!(send(&mock, Request::new(Method::Get, "roles/ops")).0, 404);
    }

    #[test]
    fn test_secrets_encrypted_and_passwords_hidden() {
        let mock = MockTransport::new();
        send(
            &mock,
            Request::new(Method::Post, "users").json(json!({
                "username": "alice",
                "password": "pw",
                "filesystem": {
                    "provider": 1,
                    "s3config": {"access_secret": {"status": "Plain", "payload": "s3"}}
                }
            })),
        );
        let stored = mock.stored("users", "alice").unwrap();
        assert!(stored.get("password").is_none());
        assert_eq!(stored["has_password"], true);
        let secret = &stored["filesystem"]["s3config"]["access_secret"];
        assert_eq!(secret["status"], "Secretbox");
        assert_ne!(secret["payload"], "s3");
        assert_eq!(stored["filesystem"]["gcsconfig"], json!({}));
    }

    #[test]
    fn test_event_action_echoes_all_options() {
        let mock = MockTransport::new();
        send(
            &mock,
            Request::new(Method::Post, "eventactions").json(json!({
                "name": "notify", "type": 1, "options": {"http_config": {"endpoint": "http://x"}}
            })),
        );
        let stored = mock.stored("eventactions", "notify").unwrap();
        assert_eq!(stored["options"]["cmd_config"], json!({}));
        assert_eq!(stored["options"]["http_config"]["endpoint"], "http://x");
    }

    #[test]
    fn test_offset_pagination() {
        let mock = MockTransport::new();
        for i in 0..5 {
            mock.insert("roles", json!({"name": format!("r{i}")}));
        }
        let (_, page) = send(
            &mock,
            Request::new(Method::Get, "roles").query("offset", 3).query("limit", 2),
        );
        let names: Vec<&str> = page
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["r3", "r4"]);
    }

    #[test]
    fn test_ip_list_cursor() {
        let mock = MockTransport::new();
        for net in ["10.0.0.1/32", "10.0.0.2/32", "10.0.0.3/32"] {
            mock.insert("iplists/1", json!({"ipornet": net, "type": 1, "mode": 1}));
        }
        let (_, page) = send(
            &mock,
            Request::new(Method::Get, "iplists/1").query("from", "10.0.0.1/32").query("limit", 1),
        );
        assert_eq!(page[0]["ipornet"], "10.0.0.2/32");

        let (status, found) = send(&mock, Request::new(Method::Get, "iplists/1/10.0.0.3%2F32"));
        assert_eq!(status, 200);
        assert_eq!(found["ipornet"], "10.0.0.3/32");
        assert_eq!(send(&mock, Request::new(Method::Get, "iplists/9")).0, 400);
    }

    #[test]
    fn test_license_masked() {
        let mock = MockTransport::new();
        assert_eq!(send(&mock, Request::new(Method::Get, "license")).0, 404);
        send(
            &mock,
            Request::new(Method::Post, "license").json(json!({"key": "ABCD-EFGH-1234"})),
        );
        let (_, license) = send(&mock, Request::new(Method::Get, "license"));
        assert_eq!(license["key"], "**********1234");
    }

    #[test]
    fn test_fail_next_and_request_log() {
        let mock = MockTransport::new();
        mock.fail_next(500, "boom");
        let (status, body) = send(&mock, Request::new(Method::Get, "users"));
        assert_eq!(status, 500);
        assert_eq!(body["error"], "boom");
        assert_eq!(send(&mock, Request::new(Method::Get, "users").query("limit", 1)).0, 200);
        assert_eq!(mock.requests(), vec!["GET users", "GET users?limit=1"]);
    }
}
