//! Wire representations of SFTPGo objects.
//!
//! These mirror the JSON the REST API speaks. Fields the server omits
//! decode to their zero value, so every struct is `#[serde(default)]`.

mod action;
mod admin;
mod filesystem;
mod filters;
mod folder;
mod group;
mod iplist;
mod license;
mod role;
mod rule;
mod user;

pub use action::{
    ActionOptions, CmdConfig, EmailConfig, EventAction, FolderRetention, FsActionConfig,
    FsCompress, HttpConfig, HttpPart, IdpConfig, PwdExpirationConfig, RetentionConfig,
    UserInactivityConfig,
};
pub use admin::{Admin, AdminFilters, AdminGroupMapping, AdminGroupOptions, AdminPreferences};
pub use filesystem::{
    AzBlobConfig, CryptConfig, Filesystem, GcsConfig, HttpFsConfig, OsConfig, S3Config,
    SftpFsConfig,
};
pub use filters::{BandwidthLimit, HooksFilter, PatternsFilter, UserFilters};
pub use folder::{Folder, VirtualFolder};
pub use group::{Group, GroupUserSettings};
pub use iplist::IpListEntry;
pub use license::License;
pub use role::Role;
pub use rule::{
    ConditionOptions, ConditionPattern, EventConditions, EventRule, RuleAction, RuleActionOptions,
    Schedule,
};
pub use user::{GroupMapping, User};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// An object stored in a keyed SFTPGo collection.
pub trait ApiObject: Serialize + DeserializeOwned {
    /// Collection path below `/api/v2`, e.g. `users`.
    const ENDPOINT: &'static str;

    /// Key addressing the object inside its collection.
    fn key(&self) -> &str;
}

/// Status of a secret sent in plaintext.
pub const SECRET_PLAIN: &str = "Plain";

/// SFTPGo secret object.
///
/// Sent with `status = "Plain"` and the cleartext payload; the server
/// answers with an encrypted payload and a different status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Secret {
    pub status: String,
    pub payload: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub additional_data: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub mode: i64,
}

impl Secret {
    /// Wrap a cleartext value.
    pub fn plain(payload: impl Into<String>) -> Self {
        Self {
            status: SECRET_PLAIN.to_string(),
            payload: payload.into(),
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        self.status == SECRET_PLAIN
    }

    /// No payload, whatever the status.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Generic name/value pair used for headers, env vars and renames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub(crate) fn is_zero(v: &i64) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_secret_wire_shape() {
        let value = serde_json::to_value(Secret::plain("pw")).unwrap();
        assert_eq!(value, json!({"status": "Plain", "payload": "pw"}));
    }

    #[test]
    fn test_encrypted_secret_decodes() {
        let secret: Secret = serde_json::from_value(json!({
            "status": "Secretbox",
            "payload": "$sb$abc",
            "key": "k",
            "additional_data": "alice",
            "mode": 1
        }))
        .unwrap();
        assert!(!secret.is_plain());
        assert!(!secret.is_empty());
        assert_eq!(secret.additional_data, "alice");
    }
}
