//! Connection settings.
//!
//! Values come from the provider block first; anything left unset falls
//! back to the matching `SFTPGO_*` environment variable.

use crate::error::{Error, Result};
use crate::models::KeyValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default global request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_HOST: &str = "SFTPGO_HOST";
pub const ENV_USERNAME: &str = "SFTPGO_USERNAME";
pub const ENV_PASSWORD: &str = "SFTPGO_PASSWORD";
pub const ENV_API_KEY: &str = "SFTPGO_API_KEY";
pub const ENV_HEADERS: &str = "SFTPGO_HEADERS";
pub const ENV_EDITION: &str = "SFTPGO_EDITION";

/// SFTPGo edition the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edition {
    #[default]
    Community,
    Enterprise,
}

impl Edition {
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::Community),
            1 => Ok(Self::Enterprise),
            other => Err(Error::Config(format!(
                "edition must be 0 (community) or 1 (enterprise), got {other}"
            ))),
        }
    }
}

/// Provider connection block.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://127.0.0.1:8080`.
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Used instead of username/password when set.
    pub api_key: Option<String>,
    /// Extra headers sent with every request.
    pub headers: Option<Vec<KeyValue>>,
    /// 0 community, 1 enterprise.
    pub edition: Option<i64>,
    /// Global request timeout in seconds.
    pub timeout: Option<u64>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hidden = |v: &Option<String>| v.as_ref().map(|_| "(sensitive)");
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &hidden(&self.password))
            .field("api_key", &hidden(&self.api_key))
            .field(
                "headers",
                &self
                    .headers
                    .as_ref()
                    .map(|h| h.iter().map(|kv| kv.key.as_str()).collect::<Vec<_>>()),
            )
            .field("edition", &self.edition)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Fill unset values from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Fill unset values through `lookup`. Values already set win.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if self.host.is_none() {
            self.host = get(ENV_HOST);
        }
        if self.username.is_none() {
            self.username = get(ENV_USERNAME);
        }
        if self.password.is_none() {
            self.password = get(ENV_PASSWORD);
        }
        if self.api_key.is_none() {
            self.api_key = get(ENV_API_KEY);
        }
        if self.headers.is_none()
            && let Some(raw) = get(ENV_HEADERS)
        {
            let headers: Vec<KeyValue> = serde_json::from_str(&raw).map_err(|e| {
                Error::Config(format!(
                    "{ENV_HEADERS} must be a JSON array of {{\"key\", \"value\"}} objects: {e}"
                ))
            })?;
            self.headers = Some(headers);
        }
        if self.edition.is_none()
            && let Some(raw) = get(ENV_EDITION)
        {
            let code = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::Config(format!("{ENV_EDITION} must be 0 or 1, got {raw:?}")))?;
            self.edition = Some(code);
        }
        Ok(self)
    }

    /// Check that the settings are usable for a connection.
    pub fn validate(&self) -> Result<()> {
        let host = self.host.as_deref().unwrap_or_default();
        if host.is_empty() {
            return Err(Error::Config(format!(
                "host is required (set it in the provider block or {ENV_HOST})"
            )));
        }
        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(Error::Config(format!(
                "host must start with http:// or https://, got {host:?}"
            )));
        }
        let has_key = self.api_key.as_deref().is_some_and(|k| !k.is_empty());
        let has_login = self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty());
        if !has_key && !has_login {
            return Err(Error::Config(
                "either api_key or username and password are required".to_string(),
            ));
        }
        if let Some(headers) = &self.headers
            && headers.iter().any(|h| h.key.trim().is_empty())
        {
            return Err(Error::Config("header keys cannot be empty".to_string()));
        }
        self.edition()?;
        Ok(())
    }

    /// Host without trailing slash.
    pub fn base_url(&self) -> String {
        self.host
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string()
    }

    pub fn edition(&self) -> Result<Edition> {
        Edition::from_code(self.edition.unwrap_or(0))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_fallbacks() {
        let config = ClientConfig::default()
            .with_env_from(env(&[
                (ENV_HOST, "http://localhost:8080"),
                (ENV_USERNAME, "admin"),
                (ENV_PASSWORD, "secret"),
                (ENV_HEADERS, r#"[{"key":"X-Tenant","value":"a"}]"#),
                (ENV_EDITION, "1"),
            ]))
            .unwrap();
        assert_eq!(config.host.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.headers.unwrap()[0].key, "X-Tenant");
        assert_eq!(config.edition, Some(1));
    }

    #[test]
    fn test_config_values_win() {
        let config = ClientConfig {
            host: Some("https://sftp.example.com".into()),
            ..Default::default()
        }
        .with_env_from(env(&[(ENV_HOST, "http://other")]))
        .unwrap();
        assert_eq!(config.host.as_deref(), Some("https://sftp.example.com"));
    }

    #[test]
    fn test_bad_env_values() {
        assert!(matches!(
            ClientConfig::default().with_env_from(env(&[(ENV_HEADERS, "{}")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ClientConfig::default().with_env_from(env(&[(ENV_EDITION, "pro")])),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate() {
        let mut config = ClientConfig {
            host: Some("http://localhost:8080/".into()),
            api_key: Some("key".into()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), "http://localhost:8080");

        config.api_key = None;
        config.username = Some("admin".into());
        assert!(config.validate().is_err());

        config.password = Some("pw".into());
        assert!(config.validate().is_ok());

        config.edition = Some(3);
        assert!(config.validate().is_err());

        config.edition = None;
        config.host = Some("localhost".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = ClientConfig {
            password: Some("hunter2".into()),
            api_key: Some("abc".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("abc"));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.edition().unwrap(), Edition::Community);
    }
}
