//! `sftpgo_admin`: WebAdmin/REST administrators.

use super::require_id;
use super::shared::{self, deleted, remote};
use declarative::{Attribute, AttributeType, Diagnostic, Diagnostics, Lifecycle, Result, Schema};
use serde::{Deserialize, Serialize};
use sftpgo_client::Client;
use sftpgo_client::models::{Admin, AdminFilters, AdminGroupMapping};

pub const ADMIN_PERMISSIONS: &[&str] = &[
    "*",
    "add_users",
    "edit_users",
    "del_users",
    "view_users",
    "view_conns",
    "close_conns",
    "view_status",
    "manage_admins",
    "manage_groups",
    "manage_folders",
    "manage_apikeys",
    "quota_scans",
    "manage_system",
    "manage_defender",
    "view_defender",
    "manage_ip_lists",
    "retention_checks",
    "metadata_checks",
    "view_events",
    "manage_event_rules",
    "manage_roles",
    "disable_mfa",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminModel {
    pub username: String,
    pub status: Option<i64>,
    pub description: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub permissions: Vec<String>,
    pub filters: Option<AdminFilters>,
    pub additional_info: Option<String>,
    pub groups: Option<Vec<AdminGroupMapping>>,
    pub role: Option<String>,
    pub id: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub last_login: Option<i64>,
}

pub struct AdminResource;

fn encode(model: &AdminModel) -> Admin {
    Admin {
        username: model.username.clone(),
        status: model.status.unwrap_or(1),
        description: model.description.clone().unwrap_or_default(),
        password: model.password.clone().unwrap_or_default(),
        email: model.email.clone().unwrap_or_default(),
        permissions: model.permissions.clone(),
        filters: model.filters.clone().unwrap_or_default(),
        additional_info: model.additional_info.clone().unwrap_or_default(),
        groups: model.groups.clone().unwrap_or_default(),
        role: model.role.clone().unwrap_or_default(),
        ..Admin::default()
    }
}

pub fn decode(admin: Admin) -> AdminModel {
    AdminModel {
        username: admin.username,
        status: Some(admin.status),
        description: Some(admin.description),
        password: None,
        email: Some(admin.email),
        permissions: admin.permissions,
        filters: Some(admin.filters),
        additional_info: Some(admin.additional_info),
        groups: Some(admin.groups),
        role: Some(admin.role),
        id: Some(admin.id),
        created_at: Some(admin.created_at),
        updated_at: Some(admin.updated_at),
        last_login: Some(admin.last_login),
    }
}

fn group_mappings() -> AttributeType {
    let options = Schema::v0().with(
        Attribute::optional("add_to_users_as", AttributeType::Int)
            .describe("0 membership, 1 primary, 2 secondary"),
    );
    AttributeType::ObjectList(
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String))
            .with(Attribute::optional("options", AttributeType::Object(options))),
    )
}

impl Lifecycle for AdminResource {
    type Client = Client;
    type Model = AdminModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_admin"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with(Attribute::required("username", AttributeType::String).force_new())
            .with(Attribute::optional_computed("status", AttributeType::Int))
            .with(Attribute::optional("description", AttributeType::String))
            .with(Attribute::optional("password", AttributeType::String).sensitive())
            .with(Attribute::optional("email", AttributeType::String))
            .with(Attribute::required("permissions", AttributeType::string_list()))
            .with(Attribute::optional("filters", shared::admin_filters()))
            .with(Attribute::optional("additional_info", AttributeType::String))
            .with(Attribute::optional("groups", group_mappings()))
            .with(Attribute::optional("role", AttributeType::String))
            .with(Attribute::computed("id", AttributeType::Int))
            .with(Attribute::computed("created_at", AttributeType::Int))
            .with(Attribute::computed("updated_at", AttributeType::Int))
            .with(Attribute::computed("last_login", AttributeType::Int))
    }

    fn identity(&self, model: &AdminModel) -> String {
        model.username.clone()
    }

    fn validate(&self, model: &AdminModel) -> Vec<Diagnostic> {
        let mut d = Diagnostics::new();
        shared::check_username(&mut d, "/username", &model.username);
        shared::check_email(&mut d, "/email", model.email.as_deref());
        d.int_between("/status", model.status, 0, 1)
            .ensure(
                !model.permissions.is_empty(),
                "/permissions",
                "must grant at least one permission",
            )
            .each_one_of("/permissions", &model.permissions, ADMIN_PERMISSIONS)
            .unique("/permissions", &model.permissions);
        if let Some(groups) = &model.groups {
            for (i, group) in groups.iter().enumerate() {
                d.not_empty(&format!("/groups/{i}/name"), Some(&group.name))
                    .int_between(
                        &format!("/groups/{i}/options/add_to_users_as"),
                        Some(group.options.add_to_users_as),
                        0,
                        2,
                    );
            }
        }
        d.into_vec()
    }

    fn secret_paths(&self, _model: &AdminModel) -> Vec<String> {
        vec!["/password".to_string()]
    }

    fn create(&self, client: &Client, plan: &AdminModel) -> Result<AdminModel> {
        log::debug!("Creating admin {}", plan.username);
        client.create(&encode(plan)).map_err(remote)?;
        let admin: Admin = client.get(&plan.username).map_err(remote)?;
        self.preserve_secrets(decode(admin), plan)
    }

    fn read(&self, client: &Client, state: &AdminModel) -> Result<Option<AdminModel>> {
        match client.find::<Admin>(&state.username).map_err(remote)? {
            Some(admin) => Ok(Some(self.preserve_secrets(decode(admin), state)?)),
            None => Ok(None),
        }
    }

    fn update(
        &self,
        client: &Client,
        plan: &AdminModel,
        _prior: &AdminModel,
    ) -> Result<AdminModel> {
        log::debug!("Updating admin {}", plan.username);
        client.update(&encode(plan)).map_err(remote)?;
        let admin: Admin = client.get(&plan.username).map_err(remote)?;
        self.preserve_secrets(decode(admin), plan)
    }

    fn delete(&self, client: &Client, state: &AdminModel) -> Result<()> {
        deleted(
            client.delete::<Admin>(&state.username),
            &format!("admin {}", state.username),
        )
    }

    fn import(&self, id: &str) -> Result<AdminModel> {
        Ok(AdminModel {
            username: require_id(id, "admin username")?.to_string(),
            ..AdminModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::shared::assert_schema_covers;
    use crate::resources::testing::client;
    use sftpgo_client::models::AdminGroupOptions;

    fn plan() -> AdminModel {
        AdminModel {
            username: "ops".into(),
            password: Some("mypassword".into()),
            email: Some("ops@example.com".into()),
            permissions: vec!["view_users".into(), "view_conns".into()],
            groups: Some(vec![AdminGroupMapping {
                name: "engineering".into(),
                options: AdminGroupOptions { add_to_users_as: 1 },
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_then_read() {
        let (mock, client) = client();
        let created = AdminResource.create(&client, &plan()).unwrap();
        assert_eq!(created.status, Some(1));
        assert_eq!(created.password.as_deref(), Some("mypassword"));
        assert_eq!(created.permissions, plan().permissions);
        let stored = mock.stored("admins", "ops").unwrap();
        assert!(stored.get("password").is_none());

        let read = AdminResource.read(&client, &created).unwrap().unwrap();
        assert_eq!(read, created);
    }

    #[test]
    fn test_password_change() {
        let (_mock, client) = client();
        let created = AdminResource.create(&client, &plan()).unwrap();
        let changed = AdminModel {
            password: Some("mynewpassword".into()),
            ..plan()
        };
        let updated = AdminResource.update(&client, &changed, &created).unwrap();
        let read = AdminResource.read(&client, &updated).unwrap().unwrap();
        assert_eq!(read.password.as_deref(), Some("mynewpassword"));
    }

    #[test]
    fn test_import_has_no_password() {
        let (_mock, client) = client();
        AdminResource.create(&client, &plan()).unwrap();
        let seeded = AdminResource.import("ops").unwrap();
        let read = AdminResource.read(&client, &seeded).unwrap().unwrap();
        assert_eq!(read.password, None);
        assert_eq!(read.email.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (mock, client) = client();
        let created = AdminResource.create(&client, &plan()).unwrap();
        AdminResource.delete(&client, &created).unwrap();
        assert!(mock.stored("admins", "ops").is_none());
        AdminResource.delete(&client, &created).unwrap();
    }

    #[test]
    fn test_validate_permissions() {
        let model = AdminModel {
            permissions: vec!["view_users".into(), "fly".into(), "view_users".into()],
            ..plan()
        };
        let diagnostics = AdminResource.validate(&model);
        let paths: Vec<&str> = diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["/permissions/1", "/permissions"]);
        assert_eq!(diagnostics[1].message, "duplicate value view_users");

        let empty = AdminModel {
            permissions: Vec::new(),
            ..plan()
        };
        assert_eq!(AdminResource.validate(&empty)[0].path, "/permissions");
    }

    #[test]
    fn test_group_mapping_schema() {
        assert_schema_covers::<AdminGroupMapping>(&group_mappings());
    }
}
