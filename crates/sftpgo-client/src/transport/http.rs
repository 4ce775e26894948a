//! HTTP transport over `ureq`.
//!
//! Authenticates with the API key header when one is configured.
//! Otherwise it exchanges username and password for a bearer token at
//! `/api/v2/token` and reuses that token until shortly before it expires.

use super::{Method, Request, Response, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::KeyValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use std::sync::Mutex;
use ureq::{Agent, RequestBuilder};

/// Path prefix of every REST endpoint.
pub const API_PREFIX: &str = "/api/v2";

const API_KEY_HEADER: &str = "X-SFTPGO-API-KEY";
const USER_AGENT: &str = concat!("sftpgo-provider/", env!("CARGO_PKG_VERSION"));

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

enum Credentials {
    ApiKey(String),
    Login { username: String, password: String },
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_at: String,
}

/// Blocking HTTP transport.
pub struct HttpTransport {
    agent: Agent,
    base_url: String,
    credentials: Credentials,
    headers: Vec<KeyValue>,
    token: Mutex<Option<CachedToken>>,
}

impl HttpTransport {
    /// Create a transport from validated settings.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let agent_config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout()))
            .build();

        let credentials = match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Credentials::ApiKey(key.to_string()),
            None => Credentials::Login {
                username: config.username.clone().unwrap_or_default(),
                password: config.password.clone().unwrap_or_default(),
            },
        };

        Ok(Self {
            agent: Agent::new_with_config(agent_config),
            base_url: config.base_url(),
            credentials,
            headers: config.headers.clone().unwrap_or_default(),
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    /// Common headers plus the configured extra ones.
    fn decorate<B>(&self, mut builder: RequestBuilder<B>) -> RequestBuilder<B> {
        builder = builder
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);
        for h in &self.headers {
            builder = builder.header(h.key.as_str(), h.value.as_str());
        }
        builder
    }

    /// Authorization header for the next request.
    fn authorization(&self) -> Result<(&'static str, String)> {
        match &self.credentials {
            Credentials::ApiKey(key) => Ok((API_KEY_HEADER, key.clone())),
            Credentials::Login { username, password } => {
                let mut cached = self
                    .token
                    .lock()
                    .map_err(|_| Error::Transport("token cache poisoned".to_string()))?;
                if let Some(token) = cached.as_ref()
                    && token.is_fresh(Utc::now())
                {
                    return Ok(("Authorization", format!("Bearer {}", token.value)));
                }
                let token = self.fetch_token(username, password)?;
                let header = format!("Bearer {}", token.value);
                *cached = Some(token);
                Ok(("Authorization", header))
            }
        }
    }

    fn fetch_token(&self, username: &str, password: &str) -> Result<CachedToken> {
        let url = self.url("token");
        log::debug!("GET {url}");
        let basic = STANDARD.encode(format!("{username}:{password}"));

        let mut response = self
            .decorate(self.agent.get(&url))
            .header("Authorization", format!("Basic {basic}"))
            .call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        if !(200..300).contains(&status) {
            return Err(Error::status(status, &body));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        let expires_at = DateTime::parse_from_rfc3339(&token.expires_at)
            .map_err(|e| Error::Decode(format!("token expires_at {:?}: {e}", token.expires_at)))?
            .with_timezone(&Utc);
        log::debug!("Obtained access token valid until {expires_at}");
        Ok(CachedToken {
            value: token.access_token,
            expires_at,
        })
    }

    fn forget_token(&self) {
        if let Ok(mut cached) = self.token.lock() {
            *cached = None;
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> Result<Response> {
        let url = self.url(&request.path);
        let (auth_name, auth_value) = self.authorization()?;
        log::debug!("{} {url}", request.method);

        let result = match request.method {
            Method::Get | Method::Delete => {
                let mut builder = if request.method == Method::Get {
                    self.agent.get(&url)
                } else {
                    self.agent.delete(&url)
                };
                builder = self
                    .decorate(builder)
                    .header(auth_name, auth_value.as_str());
                for (k, v) in &request.query {
                    builder = builder.query(k, v);
                }
                builder.call()
            }
            Method::Post | Method::Put => {
                let mut builder = if request.method == Method::Post {
                    self.agent.post(&url)
                } else {
                    self.agent.put(&url)
                };
                builder = self
                    .decorate(builder)
                    .header(auth_name, auth_value.as_str());
                for (k, v) in &request.query {
                    builder = builder.query(k, v);
                }
                match &request.body {
                    Some(body) => builder.send_json(body),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        log::debug!("{} {url} -> {status}", request.method);

        if status == 401 && matches!(self.credentials, Credentials::Login { .. }) {
            self.forget_token();
        }
        Ok(Response::new(status, body))
    }
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}{API_PREFIX}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
