use serde::{Deserialize, Serialize};

/// Per-user restrictions, also used as group defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFilters {
    pub allowed_ip: Vec<String>,
    pub denied_ip: Vec<String>,
    pub denied_login_methods: Vec<String>,
    pub denied_protocols: Vec<String>,
    pub file_patterns: Vec<PatternsFilter>,
    pub max_upload_file_size: i64,
    pub tls_username: String,
    pub hooks: HooksFilter,
    pub disable_fs_checks: bool,
    pub web_client: Vec<String>,
    pub allow_api_key_auth: bool,
    pub user_type: String,
    pub bandwidth_limits: Vec<BandwidthLimit>,
    pub external_auth_cache_time: i64,
    pub start_directory: String,
    pub two_factor_protocols: Vec<String>,
    pub ftp_security: i64,
    pub is_anonymous: bool,
    pub default_shares_expiration: i64,
    pub max_shares_expiration: i64,
    pub password_expiration: i64,
    pub password_strength: i64,
    pub require_password_change: bool,
}

/// Allowed/denied shell patterns for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsFilter {
    pub path: String,
    pub allowed_patterns: Vec<String>,
    pub denied_patterns: Vec<String>,
    pub deny_policy: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksFilter {
    pub external_auth_disabled: bool,
    pub pre_login_disabled: bool,
    pub check_password_disabled: bool,
}

/// Bandwidth override for a set of source networks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandwidthLimit {
    pub sources: Vec<String>,
    pub upload_bandwidth: i64,
    pub download_bandwidth: i64,
}
