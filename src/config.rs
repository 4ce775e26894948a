//! Configuration file loading.
//!
//! One TOML document holds the `[provider]` connection block and any
//! number of `[resource.<type>.<label>]` tables:
//!
//! ```toml
//! [provider]
//! host = "http://127.0.0.1:8080"
//! username = "admin"
//!
//! [resource.sftpgo_user.alice]
//! username = "alice"
//! home_dir = "/srv/sftpgo/alice"
//! permissions = { "/" = ["*"] }
//! ```

use anyhow::{Context, Result, bail};
use declarative::{Address, Declared};
use serde::Deserialize;
use serde_json::Value;
use sftpgo_client::ClientConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "sftpgo.toml";

/// Default state file name
pub const DEFAULT_STATE_FILE: &str = "sftpgo.state.json";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    provider: ClientConfig,
    resource: BTreeMap<String, BTreeMap<String, Value>>,
}

/// A parsed configuration file.
#[derive(Debug, Default)]
pub struct ProviderFile {
    pub provider: ClientConfig,
    /// Resource blocks, sorted by type then label.
    pub resources: Vec<Declared>,
}

impl ProviderFile {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let file = Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        log::debug!(
            "Loaded {} resource blocks from {}",
            file.resources.len(),
            path.display()
        );
        Ok(file)
    }

    /// Parse TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut resources = Vec::new();
        for (resource_type, blocks) in raw.resource {
            for (label, config) in blocks {
                if !config.is_object() {
                    bail!("resource.{resource_type}.{label} must be a table");
                }
                resources.push(Declared {
                    address: Address::new(resource_type.as_str(), label),
                    config,
                });
            }
        }
        Ok(Self {
            provider: raw.provider,
            resources,
        })
    }

    /// Find the block declared at `address`.
    pub fn find(&self, address: &Address) -> Option<&Declared> {
        self.resources.iter().find(|d| &d.address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[provider]
host = "http://127.0.0.1:8080"
api_key = "key"
headers = [{ key = "X-Tenant", value = "acme" }]

[resource.sftpgo_folder.shared]
name = "shared"
mapped_path = "/srv/shared"

[resource.sftpgo_user.alice]
username = "alice"
status = 1
home_dir = "/srv/alice"
permissions = { "/" = ["*"], "/shared" = ["list", "download"] }

[resource.sftpgo_user.bob]
username = "bob"
"#;

    #[test]
    fn test_parse_sample() {
        let file = ProviderFile::parse(SAMPLE).unwrap();
        assert_eq!(file.provider.host.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(file.provider.headers.as_ref().map(Vec::len), Some(1));

        let addresses: Vec<String> = file
            .resources
            .iter()
            .map(|d| d.address.to_string())
            .collect();
        assert_eq!(
            addresses,
            vec!["sftpgo_folder.shared", "sftpgo_user.alice", "sftpgo_user.bob"]
        );

        let alice = file.find(&Address::new("sftpgo_user", "alice")).unwrap();
        assert_eq!(alice.config["status"], json!(1));
        assert_eq!(alice.config["permissions"]["/shared"], json!(["list", "download"]));
    }

    #[test]
    fn test_empty_file() {
        let file = ProviderFile::parse("").unwrap();
        assert!(file.resources.is_empty());
        assert!(file.provider.host.is_none());
    }

    #[test]
    fn test_unknown_top_level_table_rejected() {
        assert!(ProviderFile::parse("[resources.sftpgo_user.a]\nusername = \"a\"").is_err());
        assert!(ProviderFile::parse("[provider]\nhostname = \"x\"").is_err());
    }

    #[test]
    fn test_block_must_be_table() {
        let err = ProviderFile::parse("[resource.sftpgo_role]\nops = 1").unwrap_err();
        assert_eq!(err.to_string(), "resource.sftpgo_role.ops must be a table");
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let loaded = ProviderFile::load(file.path()).unwrap();
        assert_eq!(loaded.resources.len(), 3);

        let missing = ProviderFile::load(Path::new("/nonexistent/sftpgo.toml")).unwrap_err();
        assert!(missing.to_string().contains("Could not read"));
    }
}
