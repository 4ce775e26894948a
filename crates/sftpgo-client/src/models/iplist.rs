use serde::{Deserialize, Serialize};

/// IP list entry, addressed by list type and network.
///
/// `type`: 1 allow list, 2 defender, 3 rate limiter safe list.
/// `mode`: 1 allow, 2 deny (defender list only).
/// `protocols`: bitmask of 1 SSH, 2 FTP, 4 WebDAV, 8 HTTP; 0 means all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpListEntry {
    pub ipornet: String,
    pub description: String,
    #[serde(rename = "type")]
    pub list_type: i64,
    pub mode: i64,
    pub protocols: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl IpListEntry {
    /// Import identifier, `{type}:{ipornet}`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.list_type, self.ipornet)
    }
}
