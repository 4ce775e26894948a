//! Storage backend of users, groups and virtual folders.

use super::Secret;
use serde::{Deserialize, Serialize};

/// Filesystem block. `provider` selects which sub-config is meaningful:
/// 0 local, 1 S3, 2 GCS, 3 Azure Blob, 4 encrypted local, 5 SFTP, 6 HTTP.
///
/// The server echoes empty sub-configs for inactive providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filesystem {
    pub provider: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osconfig: Option<OsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3config: Option<S3Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcsconfig: Option<GcsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azblobconfig: Option<AzBlobConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptconfig: Option<CryptConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sftpconfig: Option<SftpFsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub httpconfig: Option<HttpFsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsConfig {
    pub read_buffer_size: i64,
    pub write_buffer_size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_secret: Option<Secret>,
    pub role_arn: String,
    pub endpoint: String,
    pub storage_class: String,
    pub acl: String,
    pub key_prefix: String,
    pub upload_part_size: i64,
    pub upload_concurrency: i64,
    pub upload_part_max_time: i64,
    pub download_part_size: i64,
    pub download_concurrency: i64,
    pub download_part_max_time: i64,
    pub force_path_style: bool,
    pub skip_tls_verify: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsConfig {
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Secret>,
    pub automatic_credentials: i64,
    pub storage_class: String,
    pub acl: String,
    pub key_prefix: String,
    pub upload_part_size: i64,
    pub upload_part_max_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzBlobConfig {
    pub container: String,
    pub account_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_key: Option<Secret>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sas_url: Option<Secret>,
    pub endpoint: String,
    pub key_prefix: String,
    pub upload_part_size: i64,
    pub upload_concurrency: i64,
    pub download_part_size: i64,
    pub download_concurrency: i64,
    pub use_emulator: bool,
    pub access_tier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<Secret>,
    pub read_buffer_size: i64,
    pub write_buffer_size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SftpFsConfig {
    pub endpoint: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Secret>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_passphrase: Option<Secret>,
    pub fingerprints: Vec<String>,
    pub prefix: String,
    pub disable_concurrent_reads: bool,
    pub buffer_size: i64,
    pub equality_check_mode: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpFsConfig {
    pub endpoint: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<Secret>,
    pub skip_tls_verify: bool,
    pub equality_check_mode: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inactive_configs_omitted() {
        let fs = Filesystem {
            provider: 1,
            s3config: Some(S3Config {
                bucket: "b".into(),
                access_secret: Some(Secret::plain("s")),
                ..Default::default()
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&fs).unwrap();
        assert!(value.get("gcsconfig").is_none());
        assert_eq!(value["s3config"]["access_secret"]["status"], "Plain");
    }

    #[test]
    fn test_decode_server_echo() {
        let fs: Filesystem = serde_json::from_value(json!({
            "provider": 0,
            "osconfig": {},
            "s3config": {},
            "cryptconfig": {"passphrase": {}}
        }))
        .unwrap();
        assert_eq!(fs.provider, 0);
        assert!(fs.s3config.is_some());
        assert!(fs.cryptconfig.unwrap().passphrase.unwrap().is_empty());
    }
}
