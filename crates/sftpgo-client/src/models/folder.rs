use super::{ApiObject, Filesystem};
use serde::{Deserialize, Serialize};

/// Virtual folder definition, shareable between users and groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub mapped_path: String,
    pub description: String,
    pub used_quota_size: i64,
    pub used_quota_files: i64,
    pub last_quota_update: i64,
    pub users: Vec<String>,
    pub groups: Vec<String>,
    pub filesystem: Filesystem,
}

impl ApiObject for Folder {
    const ENDPOINT: &'static str = "folders";

    fn key(&self) -> &str {
        &self.name
    }
}

/// Mount of a folder inside a user's or group's namespace.
///
/// `quota_size`/`quota_files`: -1 means included in the owner's quota,
/// 0 unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualFolder {
    pub name: String,
    pub virtual_path: String,
    pub quota_size: i64,
    pub quota_files: i64,
}
