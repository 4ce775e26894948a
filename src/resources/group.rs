//! `sftpgo_group`: settings inherited by member users.

use super::filesystem::{self, FilesystemModel};
use super::require_id;
use super::shared::{self, deleted, remote};
use declarative::{Attribute, AttributeType, Diagnostic, Diagnostics, Lifecycle, Result, Schema};
use serde::{Deserialize, Serialize};
use sftpgo_client::Client;
use sftpgo_client::models::{Group, GroupUserSettings, UserFilters, VirtualFolder};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupModel {
    pub name: String,
    pub description: Option<String>,
    pub user_settings: Option<UserSettingsModel>,
    pub virtual_folders: Option<Vec<VirtualFolder>>,
    pub id: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub users: Option<Vec<String>>,
    pub admins: Option<Vec<String>>,
}

/// Defaults applied to the group's members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettingsModel {
    pub home_dir: Option<String>,
    pub max_sessions: Option<i64>,
    pub quota_size: Option<i64>,
    pub quota_files: Option<i64>,
    pub permissions: Option<BTreeMap<String, Vec<String>>>,
    pub upload_bandwidth: Option<i64>,
    pub download_bandwidth: Option<i64>,
    pub upload_data_transfer: Option<i64>,
    pub download_data_transfer: Option<i64>,
    pub total_data_transfer: Option<i64>,
    pub expires_in: Option<i64>,
    pub filters: Option<UserFilters>,
    pub filesystem: Option<FilesystemModel>,
}

pub struct GroupResource;

fn encode(model: &GroupModel) -> Group {
    let settings = model.user_settings.clone().unwrap_or_default();
    Group {
        name: model.name.clone(),
        description: model.description.clone().unwrap_or_default(),
        user_settings: GroupUserSettings {
            home_dir: settings.home_dir.unwrap_or_default(),
            max_sessions: settings.max_sessions.unwrap_or_default(),
            quota_size: settings.quota_size.unwrap_or_default(),
            quota_files: settings.quota_files.unwrap_or_default(),
            permissions: settings.permissions.unwrap_or_default(),
            upload_bandwidth: settings.upload_bandwidth.unwrap_or_default(),
            download_bandwidth: settings.download_bandwidth.unwrap_or_default(),
            upload_data_transfer: settings.upload_data_transfer.unwrap_or_default(),
            download_data_transfer: settings.download_data_transfer.unwrap_or_default(),
            total_data_transfer: settings.total_data_transfer.unwrap_or_default(),
            expires_in: settings.expires_in.unwrap_or_default(),
            filters: settings.filters.unwrap_or_default(),
            filesystem: filesystem::encode(settings.filesystem.as_ref()),
        },
        virtual_folders: model.virtual_folders.clone().unwrap_or_default(),
        ..Group::default()
    }
}

pub fn decode(group: Group) -> GroupModel {
    let s = group.user_settings;
    GroupModel {
        name: group.name,
        description: Some(group.description),
        user_settings: Some(UserSettingsModel {
            home_dir: Some(s.home_dir),
            max_sessions: Some(s.max_sessions),
            quota_size: Some(s.quota_size),
            quota_files: Some(s.quota_files),
            permissions: Some(s.permissions),
            upload_bandwidth: Some(s.upload_bandwidth),
            download_bandwidth: Some(s.download_bandwidth),
            upload_data_transfer: Some(s.upload_data_transfer),
            download_data_transfer: Some(s.download_data_transfer),
            total_data_transfer: Some(s.total_data_transfer),
            expires_in: Some(s.expires_in),
            filters: Some(s.filters),
            filesystem: Some(FilesystemModel::from_wire(s.filesystem)),
        }),
        virtual_folders: Some(group.virtual_folders),
        id: Some(group.id),
        created_at: Some(group.created_at),
        updated_at: Some(group.updated_at),
        users: Some(group.users),
        admins: Some(group.admins),
    }
}

fn user_settings_schema() -> AttributeType {
    let i = |name| Attribute::optional(name, AttributeType::Int);
    AttributeType::Object(
        Schema::v0()
            .with(Attribute::optional("home_dir", AttributeType::String))
            .with(i("max_sessions"))
            .with(i("quota_size"))
            .with(i("quota_files"))
            .with(Attribute::optional("permissions", shared::permissions()))
            .with(i("upload_bandwidth"))
            .with(i("download_bandwidth"))
            .with(i("upload_data_transfer"))
            .with(i("download_data_transfer"))
            .with(i("total_data_transfer"))
            .with(i("expires_in").describe("Days before member accounts expire"))
            .with(Attribute::optional("filters", shared::user_filters()))
            .with(Attribute::optional("filesystem", filesystem::schema())),
    )
}

impl Lifecycle for GroupResource {
    type Client = Client;
    type Model = GroupModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_group"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String).force_new())
            .with(Attribute::optional("description", AttributeType::String))
            .with(Attribute::optional_computed("user_settings", user_settings_schema()))
            .with(Attribute::optional("virtual_folders", shared::virtual_folders()))
            .with(Attribute::computed("id", AttributeType::Int))
            .with(Attribute::computed("created_at", AttributeType::Int))
            .with(Attribute::computed("updated_at", AttributeType::Int))
            .with(Attribute::computed("users", AttributeType::string_list()))
            .with(Attribute::computed("admins", AttributeType::string_list()))
    }

    fn identity(&self, model: &GroupModel) -> String {
        model.name.clone()
    }

    fn validate(&self, model: &GroupModel) -> Vec<Diagnostic> {
        let mut d = Diagnostics::new();
        d.not_empty("/name", Some(&model.name));
        if let Some(s) = &model.user_settings {
            d.int_at_least("/user_settings/max_sessions", s.max_sessions, 0)
                .int_at_least("/user_settings/quota_size", s.quota_size, 0)
                .int_at_least("/user_settings/quota_files", s.quota_files, 0)
                .int_at_least("/user_settings/expires_in", s.expires_in, 0);
            // Unlike users, "/" may be left to the member.
            if let Some(permissions) = &s.permissions {
                for (dir, perms) in permissions {
                    let entry =
                        format!("/user_settings/permissions/{}", shared::pointer_segment(dir));
                    d.each_one_of(&entry, perms, shared::USER_PERMISSIONS);
                }
            }
            if let Some(filters) = &s.filters {
                shared::check_filters(&mut d, "/user_settings/filters", filters);
            }
            if let Some(fs) = &s.filesystem {
                filesystem::validate(&mut d, "/user_settings/filesystem", fs);
            }
        }
        if let Some(folders) = &model.virtual_folders {
            shared::check_virtual_folders(&mut d, "/virtual_folders", folders);
        }
        d.into_vec()
    }

    fn secret_paths(&self, model: &GroupModel) -> Vec<String> {
        model
            .user_settings
            .as_ref()
            .and_then(|s| s.filesystem.as_ref())
            .map(|fs| fs.secret_paths("/user_settings/filesystem"))
            .unwrap_or_default()
    }

    fn create(&self, client: &Client, plan: &GroupModel) -> Result<GroupModel> {
        log::debug!("Creating group {}", plan.name);
        client.create(&encode(plan)).map_err(remote)?;
        let group: Group = client.get(&plan.name).map_err(remote)?;
        self.preserve_secrets(decode(group), plan)
    }

    fn read(&self, client: &Client, state: &GroupModel) -> Result<Option<GroupModel>> {
        match client.find::<Group>(&state.name).map_err(remote)? {
            Some(group) => Ok(Some(self.preserve_secrets(decode(group), state)?)),
            None => Ok(None),
        }
    }

    fn update(
        &self,
        client: &Client,
        plan: &GroupModel,
        _prior: &GroupModel,
    ) -> Result<GroupModel> {
        log::debug!("Updating group {}", plan.name);
        client.update(&encode(plan)).map_err(remote)?;
        let group: Group = client.get(&plan.name).map_err(remote)?;
        self.preserve_secrets(decode(group), plan)
    }

    fn delete(&self, client: &Client, state: &GroupModel) -> Result<()> {
        deleted(client.delete::<Group>(&state.name), &format!("group {}", state.name))
    }

    fn import(&self, id: &str) -> Result<GroupModel> {
        Ok(GroupModel {
            name: require_id(id, "group name")?.to_string(),
            ..GroupModel::default()
        })
    }
}
