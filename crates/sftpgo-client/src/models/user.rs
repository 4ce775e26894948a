use super::{ApiObject, Filesystem, UserFilters, VirtualFolder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SFTPGo user.
///
/// `password` is write-only: it is sent on create/update and never
/// returned, the server only reports `has_password`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub status: i64,
    pub username: String,
    pub email: String,
    pub description: String,
    pub expiration_date: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    pub has_password: bool,
    pub public_keys: Vec<String>,
    pub home_dir: String,
    pub uid: i64,
    pub gid: i64,
    pub max_sessions: i64,
    pub quota_size: i64,
    pub quota_files: i64,
    pub permissions: BTreeMap<String, Vec<String>>,
    pub used_quota_size: i64,
    pub used_quota_files: i64,
    pub last_quota_update: i64,
    pub upload_bandwidth: i64,
    pub download_bandwidth: i64,
    pub upload_data_transfer: i64,
    pub download_data_transfer: i64,
    pub total_data_transfer: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_login: i64,
    pub filters: UserFilters,
    pub filesystem: Filesystem,
    pub virtual_folders: Vec<VirtualFolder>,
    pub groups: Vec<GroupMapping>,
    pub additional_info: String,
    pub role: String,
}

impl ApiObject for User {
    const ENDPOINT: &'static str = "users";

    fn key(&self) -> &str {
        &self.username
    }
}

/// Membership of a user in a group. `type`: 1 primary, 2 secondary,
/// 3 membership only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMapping {
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: i64,
}
