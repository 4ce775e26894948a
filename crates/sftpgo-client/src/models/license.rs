use serde::{Deserialize, Serialize};

/// Enterprise license. The server returns `key` partially masked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub key: String,
    #[serde(rename = "type")]
    pub license_type: i64,
    pub valid_from: i64,
    pub valid_to: i64,
}
