use super::{ApiObject, KeyValue, Secret};
use serde::{Deserialize, Serialize};

/// Event action: something the event manager can run.
///
/// `type` selects which entry of `options` applies:
/// 1 HTTP, 2 command, 3 email, 4 backup, 5 user quota reset,
/// 6 folder quota reset, 7 transfer quota reset, 8 data retention check,
/// 9 filesystem, 11 password expiration check, 12 user expiration check,
/// 13 identity provider account check, 14 user inactivity check,
/// 15 log rotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventAction {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub action_type: i64,
    pub options: ActionOptions,
    /// Rules referencing this action.
    pub rules: Vec<String>,
}

impl ApiObject for EventAction {
    const ENDPOINT: &'static str = "eventactions";

    fn key(&self) -> &str {
        &self.name
    }
}

/// Per-type configuration. The server echoes every entry, populated or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_config: Option<HttpConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd_config: Option<CmdConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_config: Option<EmailConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_config: Option<RetentionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_config: Option<FsActionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwd_expiration_config: Option<PwdExpirationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_inactivity_config: Option<UserInactivityConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idp_config: Option<IdpConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub endpoint: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    pub headers: Vec<KeyValue>,
    pub timeout: i64,
    pub skip_tls_verify: bool,
    pub method: String,
    pub query_parameters: Vec<KeyValue>,
    pub body: String,
    pub parts: Vec<HttpPart>,
}

/// One part of a multipart HTTP body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpPart {
    pub name: String,
    pub filepath: String,
    pub headers: Vec<KeyValue>,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmdConfig {
    pub cmd: String,
    pub args: Vec<String>,
    pub timeout: i64,
    pub env_vars: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub recipients: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    /// 0 text/plain, 1 text/html.
    pub content_type: i64,
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub folders: Vec<FolderRetention>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderRetention {
    pub path: String,
    /// Hours; 0 excludes the path.
    pub retention: i64,
    pub delete_empty_dirs: bool,
}

/// Filesystem action. `type`: 1 rename, 2 delete, 3 mkdirs, 4 exist,
/// 5 compress, 6 copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsActionConfig {
    #[serde(rename = "type")]
    pub fs_type: i64,
    pub renames: Vec<KeyValue>,
    pub deletes: Vec<String>,
    pub mkdirs: Vec<String>,
    pub exist: Vec<String>,
    pub compress: FsCompress,
    pub copy: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsCompress {
    pub name: String,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwdExpirationConfig {
    /// Days before expiration to notify.
    pub threshold: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInactivityConfig {
    pub disable_threshold: i64,
    pub delete_threshold: i64,
}

/// Identity provider account check. `mode`: 0 create or update, 1 create only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdpConfig {
    pub mode: i64,
    pub template_user: String,
    pub template_admin: String,
}
