use super::ApiObject;
use serde::{Deserialize, Serialize};

/// SFTPGo administrator. `password` is write-only like the user one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Admin {
    pub id: i64,
    pub status: i64,
    pub username: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    pub email: String,
    pub permissions: Vec<String>,
    pub filters: AdminFilters,
    pub additional_info: String,
    pub groups: Vec<AdminGroupMapping>,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_login: i64,
}

impl ApiObject for Admin {
    const ENDPOINT: &'static str = "admins";

    fn key(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminFilters {
    pub allow_list: Vec<String>,
    pub allow_api_key_auth: bool,
    pub require_two_factor: bool,
    pub require_password_change: bool,
    pub preferences: AdminPreferences,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminPreferences {
    pub hide_user_page_sections: i64,
    pub default_users_expiration: i64,
}

/// Group an admin adds new users to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminGroupMapping {
    pub name: String,
    pub options: AdminGroupOptions,
}

/// `add_to_users_as`: 0 membership, 1 primary, 2 secondary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminGroupOptions {
    pub add_to_users_as: i64,
}
