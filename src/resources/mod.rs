//! Lifecycle adapters, one per SFTPGo object kind.
//!
//! Every adapter converts between a configuration record (what authors
//! write, also what state stores) and the wire object the REST API speaks.
//! Decoding always sets every non-secret attribute so a refreshed record
//! compares cleanly against configuration.

pub mod admin;
pub mod event_action;
pub mod event_rule;
pub mod filesystem;
pub mod folder;
pub mod group;
pub mod ip_list_entry;
pub mod license;
pub mod role;
pub mod shared;
pub mod user;

use declarative::{Error, Result};

pub use admin::AdminResource;
pub use event_action::EventActionResource;
pub use event_rule::EventRuleResource;
pub use folder::FolderResource;
pub use group::GroupResource;
pub use ip_list_entry::IpListEntryResource;
pub use license::LicenseResource;
pub use role::RoleResource;
pub use user::UserResource;

/// Reject an empty import identifier.
pub fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidImportId {
            id: id.to_string(),
            reason: format!("{what} must not be empty"),
        });
    }
    Ok(trimmed)
}
