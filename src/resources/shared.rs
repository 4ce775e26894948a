//! Helpers shared by the lifecycle adapters.

use declarative::{Attribute, AttributeType, Diagnostics, Error, Result, Schema};
use regex::Regex;
use sftpgo_client::models::{
    AdminFilters, BandwidthLimit, GroupMapping, KeyValue, PatternsFilter, UserFilters,
    VirtualFolder,
};
use std::sync::LazyLock;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9\-_.~@]+$").expect("USERNAME_RE is a valid regex pattern")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("EMAIL_RE is a valid regex pattern")
});

pub const USER_PERMISSIONS: &[&str] = &[
    "*",
    "list",
    "download",
    "upload",
    "overwrite",
    "delete",
    "delete_files",
    "delete_dirs",
    "rename",
    "rename_files",
    "rename_dirs",
    "create_dirs",
    "create_symlinks",
    "chmod",
    "chown",
    "chtimes",
    "copy",
];

pub const LOGIN_METHODS: &[&str] = &[
    "publickey",
    "password",
    "password-over-SSH",
    "keyboard-interactive",
    "publickey+password",
    "publickey+keyboard-interactive",
    "TLSCertificate",
    "TLSCertificate+password",
];

pub const PROTOCOLS: &[&str] = &["SSH", "FTP", "DAV", "HTTP"];

// ============================================================================
// Error mapping
// ============================================================================

/// Convert a client error, keeping the HTTP status.
pub fn remote(err: sftpgo_client::Error) -> Error {
    if !err.is_not_found() {
        let category = err.category();
        log::info!("{category}: {}", category.advice());
    }
    Error::remote(err.status_code(), err.to_string())
}

/// Treat "not found" as already deleted.
pub fn deleted(result: sftpgo_client::Result<()>, what: &str) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => {
            log::info!("{what} was already gone");
            Ok(())
        }
        Err(e) => Err(remote(e)),
    }
}

// ============================================================================
// Value checks
// ============================================================================

pub fn check_username(d: &mut Diagnostics, path: &str, name: &str) {
    if name.is_empty() {
        d.push(path, "must not be empty");
    } else if !USERNAME_RE.is_match(name) {
        d.push(
            path,
            "may only contain letters, digits and the characters - _ . ~ @",
        );
    }
}

pub fn check_email(d: &mut Diagnostics, path: &str, email: Option<&str>) {
    if let Some(email) = email.filter(|e| !e.is_empty())
        && !EMAIL_RE.is_match(email)
    {
        d.push(path, format!("{email:?} is not a valid email address"));
    }
}

/// Filters shared by users and group user settings.
pub fn check_filters(d: &mut Diagnostics, path: &str, filters: &UserFilters) {
    d.each_one_of(
        &format!("{path}/denied_login_methods"),
        &filters.denied_login_methods,
        LOGIN_METHODS,
    )
    .each_one_of(
        &format!("{path}/denied_protocols"),
        &filters.denied_protocols,
        PROTOCOLS,
    )
    .each_one_of(
        &format!("{path}/two_factor_protocols"),
        &filters.two_factor_protocols,
        &["SSH", "FTP", "HTTP"],
    )
    .int_at_least(
        &format!("{path}/max_upload_file_size"),
        Some(filters.max_upload_file_size),
        0,
    )
    .int_between(
        &format!("{path}/ftp_security"),
        Some(filters.ftp_security),
        0,
        1,
    )
    .int_between(
        &format!("{path}/password_strength"),
        Some(filters.password_strength),
        0,
        80,
    );
    if !filters.user_type.is_empty() {
        d.str_one_of(
            &format!("{path}/user_type"),
            Some(&filters.user_type),
            &["LDAPUser", "OSUser"],
        );
    }
    for (i, pattern) in filters.file_patterns.iter().enumerate() {
        d.not_empty(&format!("{path}/file_patterns/{i}/path"), Some(&pattern.path))
            .int_between(
                &format!("{path}/file_patterns/{i}/deny_policy"),
                Some(pattern.deny_policy),
                0,
                1,
            );
    }
}

/// Permissions keyed by directory; the root directory is mandatory.
pub fn check_permissions<'a>(
    d: &mut Diagnostics,
    path: &str,
    permissions: impl IntoIterator<Item = (&'a String, &'a Vec<String>)>,
) {
    let mut has_root = false;
    for (dir, perms) in permissions {
        has_root |= dir == "/";
        let entry = format!("{path}/{}", pointer_segment(dir));
        if !dir.starts_with('/') {
            d.push(&entry, "directory must be an absolute path");
        }
        if perms.is_empty() {
            d.push(&entry, "must grant at least one permission");
        }
        d.each_one_of(&entry, perms, USER_PERMISSIONS)
            .unique(&entry, perms);
    }
    if !has_root {
        d.push(path, "permissions for \"/\" are required");
    }
}

/// Escape a map key for use inside a JSON pointer.
pub fn pointer_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

pub fn check_virtual_folders(d: &mut Diagnostics, path: &str, folders: &[VirtualFolder]) {
    let paths: Vec<&str> = folders.iter().map(|f| f.virtual_path.as_str()).collect();
    d.unique(path, &paths);
    for (i, folder) in folders.iter().enumerate() {
        d.not_empty(&format!("{path}/{i}/name"), Some(&folder.name));
        if !folder.virtual_path.starts_with('/') || folder.virtual_path == "/" {
            d.push(
                format!("{path}/{i}/virtual_path"),
                "must be an absolute path other than \"/\"",
            );
        }
        d.int_at_least(&format!("{path}/{i}/quota_size"), Some(folder.quota_size), -1)
            .int_at_least(&format!("{path}/{i}/quota_files"), Some(folder.quota_files), -1);
    }
}

// ============================================================================
// Nested schemas
// ============================================================================

pub fn key_value_list() -> AttributeType {
    AttributeType::ObjectList(
        Schema::v0()
            .with(Attribute::required("key", AttributeType::String))
            .with(Attribute::optional("value", AttributeType::String)),
    )
}

pub fn permissions() -> AttributeType {
    AttributeType::Map(Box::new(AttributeType::string_list()))
}

pub fn virtual_folders() -> AttributeType {
    AttributeType::ObjectList(
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String))
            .with(Attribute::required("virtual_path", AttributeType::String))
            .with(
                Attribute::optional("quota_size", AttributeType::Int)
                    .describe("-1 included in the owner quota, 0 unlimited"),
            )
            .with(Attribute::optional("quota_files", AttributeType::Int)),
    )
}

pub fn group_mappings() -> AttributeType {
    AttributeType::ObjectList(
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String))
            .with(
                Attribute::required("type", AttributeType::Int)
                    .describe("1 primary, 2 secondary, 3 membership only"),
            ),
    )
}

pub fn user_filters() -> AttributeType {
    let patterns = Schema::v0()
        .with(Attribute::required("path", AttributeType::String))
        .with(Attribute::optional("allowed_patterns", AttributeType::string_list()))
        .with(Attribute::optional("denied_patterns", AttributeType::string_list()))
        .with(Attribute::optional("deny_policy", AttributeType::Int));
    let hooks = Schema::v0()
        .with(Attribute::optional("external_auth_disabled", AttributeType::Bool))
        .with(Attribute::optional("pre_login_disabled", AttributeType::Bool))
        .with(Attribute::optional("check_password_disabled", AttributeType::Bool));
    let bandwidth = Schema::v0()
        .with(Attribute::required("sources", AttributeType::string_list()))
        .with(Attribute::optional("upload_bandwidth", AttributeType::Int))
        .with(Attribute::optional("download_bandwidth", AttributeType::Int));

    AttributeType::Object(
        Schema::v0()
            .with(Attribute::optional("allowed_ip", AttributeType::string_list()))
            .with(Attribute::optional("denied_ip", AttributeType::string_list()))
            .with(Attribute::optional("denied_login_methods", AttributeType::string_list()))
            .with(Attribute::optional("denied_protocols", AttributeType::string_list()))
            .with(Attribute::optional("file_patterns", AttributeType::ObjectList(patterns)))
            .with(Attribute::optional("max_upload_file_size", AttributeType::Int))
            .with(Attribute::optional("tls_username", AttributeType::String))
            .with(Attribute::optional("hooks", AttributeType::Object(hooks)))
            .with(Attribute::optional("disable_fs_checks", AttributeType::Bool))
            .with(Attribute::optional("web_client", AttributeType::string_list()))
            .with(Attribute::optional("allow_api_key_auth", AttributeType::Bool))
            .with(Attribute::optional("user_type", AttributeType::String))
            .with(Attribute::optional("bandwidth_limits", AttributeType::ObjectList(bandwidth)))
            .with(Attribute::optional("external_auth_cache_time", AttributeType::Int))
            .with(Attribute::optional("start_directory", AttributeType::String))
            .with(Attribute::optional("two_factor_protocols", AttributeType::string_list()))
            .with(Attribute::optional("ftp_security", AttributeType::Int))
            .with(Attribute::optional("is_anonymous", AttributeType::Bool))
            .with(Attribute::optional("default_shares_expiration", AttributeType::Int))
            .with(Attribute::optional("max_shares_expiration", AttributeType::Int))
            .with(Attribute::optional("password_expiration", AttributeType::Int))
            .with(Attribute::optional("password_strength", AttributeType::Int))
            .with(Attribute::optional("require_password_change", AttributeType::Bool)),
    )
}

pub fn admin_filters() -> AttributeType {
    let preferences = Schema::v0()
        .with(Attribute::optional("hide_user_page_sections", AttributeType::Int))
        .with(Attribute::optional("default_users_expiration", AttributeType::Int));
    AttributeType::Object(
        Schema::v0()
            .with(Attribute::optional("allow_list", AttributeType::string_list()))
            .with(Attribute::optional("allow_api_key_auth", AttributeType::Bool))
            .with(Attribute::optional("require_two_factor", AttributeType::Bool))
            .with(Attribute::optional("require_password_change", AttributeType::Bool))
            .with(Attribute::optional("preferences", AttributeType::Object(preferences))),
    )
}

// Keeps the nested schemas honest against the wire structs they describe.
#[cfg(test)]
pub(crate) fn assert_schema_covers<T: serde::Serialize + Default>(ty: &AttributeType) {
    let value = serde_json::to_value(T::default()).unwrap();
    let wrapped = Schema::v0().with(Attribute::optional("x", ty.clone()));
    let config = match ty {
        AttributeType::ObjectList(_) => serde_json::json!({ "x": [value] }),
        _ => serde_json::json!({ "x": value }),
    };
    let diagnostics: Vec<_> = wrapped
        .check_config(&config)
        .into_iter()
        .filter(|d| d.message == "unsupported attribute" || d.message.starts_with("expected"))
        .collect();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_remote_keeps_status() {
        let err = remote(sftpgo_client::Error::status(404, r#"{"error":"gone"}"#));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_deleted_accepts_not_found() {
        assert!(deleted(Err(sftpgo_client::Error::status(404, "")), "user").is_ok());
        assert!(deleted(Err(sftpgo_client::Error::status(500, "")), "user").is_err());
    }

    #[test]
    fn test_username_rules() {
        let mut d = Diagnostics::new();
        check_username(&mut d, "/username", "alice.b-1");
        assert!(d.is_empty());
        check_username(&mut d, "/username", "bad name");
        check_username(&mut d, "/username", "");
        assert_eq!(d.into_vec().len(), 2);
    }

    #[test]
    fn test_email() {
        let mut d = Diagnostics::new();
        check_email(&mut d, "/email", Some("ops@example.com"));
        check_email(&mut d, "/email", Some(""));
        check_email(&mut d, "/email", None);
        assert!(d.is_empty());
        check_email(&mut d, "/email", Some("nope"));
        assert_eq!(d.into_vec()[0].path, "/email");
    }

    #[test]
    fn test_permissions_need_root() {
        let mut perms = BTreeMap::new();
        perms.insert("/data".to_string(), vec!["list".to_string()]);
        let mut d = Diagnostics::new();
        check_permissions(&mut d, "/permissions", &perms);
        assert_eq!(d.into_vec()[0].message, "permissions for \"/\" are required");

        perms.insert("/".to_string(), vec!["*".to_string(), "fly".to_string()]);
        let mut d = Diagnostics::new();
        check_permissions(&mut d, "/permissions", &perms);
        let items = d.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "/permissions/~1/1");
    }

    #[test]
    fn test_virtual_folders() {
        let folders = vec![
            VirtualFolder {
                name: "shared".into(),
                virtual_path: "/shared".into(),
                quota_size: -1,
                quota_files: -1,
            },
            VirtualFolder {
                name: "other".into(),
                virtual_path: "/shared".into(),
                ..Default::default()
            },
        ];
        let mut d = Diagnostics::new();
        check_virtual_folders(&mut d, "/virtual_folders", &folders);
        assert_eq!(d.into_vec().len(), 1);
    }

    #[test]
    fn test_filters() {
        let filters = UserFilters {
            denied_protocols: vec!["FTP".into(), "GOPHER".into()],
            user_type: "LDAPUser".into(),
            ..Default::default()
        };
        let mut d = Diagnostics::new();
        check_filters(&mut d, "/filters", &filters);
        assert_eq!(d.into_vec()[0].path, "/filters/denied_protocols/1");
    }

    #[test]
    fn test_nested_schemas_cover_wire_structs() {
        assert_schema_covers::<UserFilters>(&user_filters());
        assert_schema_covers::<AdminFilters>(&admin_filters());
        assert_schema_covers::<VirtualFolder>(&virtual_folders());
        assert_schema_covers::<GroupMapping>(&group_mappings());
        assert_schema_covers::<KeyValue>(&key_value_list());
        assert_schema_covers::<PatternsFilter>(&match user_filters() {
            AttributeType::Object(s) => s.attribute("file_patterns").unwrap().ty.clone(),
            _ => unreachable!(),
        });
        assert_schema_covers::<BandwidthLimit>(&match user_filters() {
            AttributeType::Object(s) => s.attribute("bandwidth_limits").unwrap().ty.clone(),
            _ => unreachable!(),
        });
    }
}
