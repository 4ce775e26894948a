use super::{ApiObject, Filesystem, UserFilters, VirtualFolder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group of users sharing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_settings: GroupUserSettings,
    pub virtual_folders: Vec<VirtualFolder>,
    pub users: Vec<String>,
    pub admins: Vec<String>,
}

impl ApiObject for Group {
    const ENDPOINT: &'static str = "groups";

    fn key(&self) -> &str {
        &self.name
    }
}

/// Settings applied to the members of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupUserSettings {
    pub home_dir: String,
    pub max_sessions: i64,
    pub quota_size: i64,
    pub quota_files: i64,
    pub permissions: BTreeMap<String, Vec<String>>,
    pub upload_bandwidth: i64,
    pub download_bandwidth: i64,
    pub upload_data_transfer: i64,
    pub download_data_transfer: i64,
    pub total_data_transfer: i64,
    pub expires_in: i64,
    pub filters: UserFilters,
    pub filesystem: Filesystem,
}
