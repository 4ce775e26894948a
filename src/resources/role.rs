//! `sftpgo_role`: scopes admins to the users sharing the role.

use super::require_id;
use super::shared::{deleted, remote};
use declarative::{Attribute, AttributeType, Diagnostic, Diagnostics, Lifecycle, Result, Schema};
use serde::{Deserialize, Serialize};
use sftpgo_client::Client;
use sftpgo_client::models::Role;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleModel {
    pub name: String,
    pub description: Option<String>,
    pub id: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub users: Option<Vec<String>>,
    pub admins: Option<Vec<String>>,
}

pub struct RoleResource;

fn encode(model: &RoleModel) -> Role {
    Role {
        name: model.name.clone(),
        description: model.description.clone().unwrap_or_default(),
        ..Role::default()
    }
}

pub fn decode(role: Role) -> RoleModel {
    RoleModel {
        name: role.name,
        description: Some(role.description),
        id: Some(role.id),
        created_at: Some(role.created_at),
        updated_at: Some(role.updated_at),
        users: Some(role.users),
        admins: Some(role.admins),
    }
}

impl Lifecycle for RoleResource {
    type Client = Client;
    type Model = RoleModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_role"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String).force_new())
            .with(Attribute::optional("description", AttributeType::String))
            .with(Attribute::computed("id", AttributeType::Int))
            .with(Attribute::computed("created_at", AttributeType::Int))
            .with(Attribute::computed("updated_at", AttributeType::Int))
            .with(
                Attribute::computed("users", AttributeType::string_list())
                    .describe("Users assigned to the role"),
            )
            .with(
                Attribute::computed("admins", AttributeType::string_list())
                    .describe("Admins assigned to the role"),
            )
    }

    fn identity(&self, model: &RoleModel) -> String {
        model.name.clone()
    }

    fn validate(&self, model: &RoleModel) -> Vec<Diagnostic> {
        let mut d = Diagnostics::new();
        d.not_empty("/name", Some(&model.name));
        d.into_vec()
    }

    fn create(&self, client: &Client, plan: &RoleModel) -> Result<RoleModel> {
        log::debug!("Creating role {}", plan.name);
        client.create(&encode(plan)).map_err(remote)?;
        let role: Role = client.get(&plan.name).map_err(remote)?;
        Ok(decode(role))
    }

    fn read(&self, client: &Client, state: &RoleModel) -> Result<Option<RoleModel>> {
        let found: Option<Role> = client.find(&state.name).map_err(remote)?;
        Ok(found.map(decode))
    }

    fn update(&self, client: &Client, plan: &RoleModel, _prior: &RoleModel) -> Result<RoleModel> {
        log::debug!("Updating role {}", plan.name);
        client.update(&encode(plan)).map_err(remote)?;
        let role: Role = client.get(&plan.name).map_err(remote)?;
        Ok(decode(role))
    }

    fn delete(&self, client: &Client, state: &RoleModel) -> Result<()> {
        deleted(client.delete::<Role>(&state.name), &format!("role {}", state.name))
    }

    fn import(&self, id: &str) -> Result<RoleModel> {
        Ok(RoleModel {
            name: require_id(id, "role name")?.to_string(),
            ..RoleModel::default()
        })
    }
}
