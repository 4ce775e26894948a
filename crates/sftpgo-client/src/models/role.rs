use super::ApiObject;
use serde::{Deserialize, Serialize};

/// Role restricting admins to the users sharing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub users: Vec<String>,
    pub admins: Vec<String>,
}

impl ApiObject for Role {
    const ENDPOINT: &'static str = "roles";

    fn key(&self) -> &str {
        &self.name
    }
}
