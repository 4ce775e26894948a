//! `sftpgo_user`: end-user accounts.
//!
//! The password is write-only on the server side: it is sent when set and
//! never returned, so the record keeps whatever configuration supplied.

use super::filesystem::{self, FilesystemModel};
use super::require_id;
use super::shared::{self, deleted, remote};
use declarative::{Attribute, AttributeType, Diagnostic, Diagnostics, Lifecycle, Result, Schema};
use serde::{Deserialize, Serialize};
use sftpgo_client::Client;
use sftpgo_client::models::{GroupMapping, User, UserFilters, VirtualFolder};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserModel {
    pub username: String,
    pub status: Option<i64>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub expiration_date: Option<i64>,
    pub password: Option<String>,
    pub public_keys: Option<Vec<String>>,
    pub home_dir: Option<String>,
    pub uid: Option<i64>,
    pub gid: Option<i64>,
    pub max_sessions: Option<i64>,
    pub quota_size: Option<i64>,
    pub quota_files: Option<i64>,
    pub permissions: Option<BTreeMap<String, Vec<String>>>,
    pub upload_bandwidth: Option<i64>,
    pub download_bandwidth: Option<i64>,
    pub upload_data_transfer: Option<i64>,
    pub download_data_transfer: Option<i64>,
    pub total_data_transfer: Option<i64>,
    pub filters: Option<UserFilters>,
    pub filesystem: Option<FilesystemModel>,
    pub virtual_folders: Option<Vec<VirtualFolder>>,
    pub groups: Option<Vec<GroupMapping>>,
    pub additional_info: Option<String>,
    pub role: Option<String>,
    pub id: Option<i64>,
    pub has_password: Option<bool>,
    pub used_quota_size: Option<i64>,
    pub used_quota_files: Option<i64>,
    pub last_quota_update: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub last_login: Option<i64>,
}

pub struct UserResource;

fn encode(model: &UserModel) -> User {
    User {
        username: model.username.clone(),
        status: model.status.unwrap_or(1),
        email: model.email.clone().unwrap_or_default(),
        description: model.description.clone().unwrap_or_default(),
        expiration_date: model.expiration_date.unwrap_or_default(),
        password: model.password.clone().unwrap_or_default(),
        public_keys: model.public_keys.clone().unwrap_or_default(),
        home_dir: model.home_dir.clone().unwrap_or_default(),
        uid: model.uid.unwrap_or_default(),
        gid: model.gid.unwrap_or_default(),
        max_sessions: model.max_sessions.unwrap_or_default(),
        quota_size: model.quota_size.unwrap_or_default(),
        quota_files: model.quota_files.unwrap_or_default(),
        permissions: model.permissions.clone().unwrap_or_default(),
        upload_bandwidth: model.upload_bandwidth.unwrap_or_default(),
        download_bandwidth: model.download_bandwidth.unwrap_or_default(),
        upload_data_transfer: model.upload_data_transfer.unwrap_or_default(),
        download_data_transfer: model.download_data_transfer.unwrap_or_default(),
        total_data_transfer: model.total_data_transfer.unwrap_or_default(),
        filters: model.filters.clone().unwrap_or_default(),
        filesystem: filesystem::encode(model.filesystem.as_ref()),
        virtual_folders: model.virtual_folders.clone().unwrap_or_default(),
        groups: model.groups.clone().unwrap_or_default(),
        additional_info: model.additional_info.clone().unwrap_or_default(),
        role: model.role.clone().unwrap_or_default(),
        ..User::default()
    }
}

pub fn decode(user: User) -> UserModel {
    UserModel {
        username: user.username,
        status: Some(user.status),
        email: Some(user.email),
        description: Some(user.description),
        expiration_date: Some(user.expiration_date),
        password: None,
        public_keys: Some(user.public_keys),
        home_dir: Some(user.home_dir),
        uid: Some(user.uid),
        gid: Some(user.gid),
        max_sessions: Some(user.max_sessions),
        quota_size: Some(user.quota_size),
        quota_files: Some(user.quota_files),
        permissions: Some(user.permissions),
        upload_bandwidth: Some(user.upload_bandwidth),
        download_bandwidth: Some(user.download_bandwidth),
        upload_data_transfer: Some(user.upload_data_transfer),
        download_data_transfer: Some(user.download_data_transfer),
        total_data_transfer: Some(user.total_data_transfer),
        filters: Some(user.filters),
        filesystem: Some(FilesystemModel::from_wire(user.filesystem)),
        virtual_folders: Some(user.virtual_folders),
        groups: Some(user.groups),
        additional_info: Some(user.additional_info),
        role: Some(user.role),
        id: Some(user.id),
        has_password: Some(user.has_password),
        used_quota_size: Some(user.used_quota_size),
        used_quota_files: Some(user.used_quota_files),
        last_quota_update: Some(user.last_quota_update),
        created_at: Some(user.created_at),
        updated_at: Some(user.updated_at),
        last_login: Some(user.last_login),
    }
}

impl Lifecycle for UserResource {
    type Client = Client;
    type Model = UserModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_user"
    }

    fn schema(&self) -> Schema {
        let s = |name| Attribute::optional(name, AttributeType::String);
        let i = |name| Attribute::optional(name, AttributeType::Int);
        let computed = |name| Attribute::computed(name, AttributeType::Int);

        Schema::v0()
            .with(Attribute::required("username", AttributeType::String).force_new())
            .with(
                Attribute::optional_computed("status", AttributeType::Int)
                    .describe("1 enabled, 0 disabled"),
            )
            .with(s("email"))
            .with(s("description"))
            .with(i("expiration_date").describe("Unix timestamp in milliseconds, 0 never"))
            .with(s("password").sensitive())
            .with(Attribute::optional("public_keys", AttributeType::string_list()))
            .with(Attribute::optional_computed("home_dir", AttributeType::String))
            .with(i("uid"))
            .with(i("gid"))
            .with(i("max_sessions"))
            .with(i("quota_size"))
            .with(i("quota_files"))
            .with(Attribute::optional_computed("permissions", shared::permissions()))
            .with(i("upload_bandwidth"))
            .with(i("download_bandwidth"))
            .with(i("upload_data_transfer"))
            .with(i("download_data_transfer"))
            .with(i("total_data_transfer"))
            .with(Attribute::optional("filters", shared::user_filters()))
            .with(Attribute::optional_computed("filesystem", filesystem::schema()))
            .with(Attribute::optional("virtual_folders", shared::virtual_folders()))
            .with(Attribute::optional("groups", shared::group_mappings()))
            .with(s("additional_info"))
            .with(s("role"))
            .with(computed("id"))
            .with(Attribute::computed("has_password", AttributeType::Bool))
            .with(computed("used_quota_size"))
            .with(computed("used_quota_files"))
            .with(computed("last_quota_update"))
            .with(computed("created_at"))
            .with(computed("updated_at"))
            .with(computed("last_login"))
    }

    fn identity(&self, model: &UserModel) -> String {
        model.username.clone()
    }

    fn validate(&self, model: &UserModel) -> Vec<Diagnostic> {
        let mut d = Diagnostics::new();
        shared::check_username(&mut d, "/username", &model.username);
        shared::check_email(&mut d, "/email", model.email.as_deref());
        d.int_between("/status", model.status, 0, 1)
            .int_at_least("/expiration_date", model.expiration_date, 0)
            .int_at_least("/uid", model.uid, 0)
            .int_at_least("/gid", model.gid, 0)
            .int_at_least("/max_sessions", model.max_sessions, 0)
            .int_at_least("/quota_size", model.quota_size, 0)
            .int_at_least("/quota_files", model.quota_files, 0);

        if let Some(home) = model.home_dir.as_deref().filter(|h| !h.is_empty())
            && !home.starts_with('/')
        {
            d.push("/home_dir", "must be an absolute path");
        }
        if let Some(permissions) = &model.permissions {
            shared::check_permissions(&mut d, "/permissions", permissions);
        }
        if let Some(filters) = &model.filters {
            shared::check_filters(&mut d, "/filters", filters);
        }
        if let Some(fs) = &model.filesystem {
            filesystem::validate(&mut d, "/filesystem", fs);
        }
        if let Some(folders) = &model.virtual_folders {
            shared::check_virtual_folders(&mut d, "/virtual_folders", folders);
        }
        if let Some(groups) = &model.groups {
            let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
            d.unique("/groups", &names);
            for (i, group) in groups.iter().enumerate() {
                d.not_empty(&format!("/groups/{i}/name"), Some(&group.name))
                    .int_between(&format!("/groups/{i}/type"), Some(group.group_type), 1, 3);
            }
            if groups.iter().filter(|g| g.group_type == 1).count() > 1 {
                d.push("/groups", "at most one primary group is allowed");
            }
        }
        d.into_vec()
    }

    fn secret_paths(&self, model: &UserModel) -> Vec<String> {
        let mut paths = vec!["/password".to_string()];
        if let Some(fs) = &model.filesystem {
            paths.extend(fs.secret_paths("/filesystem"));
        }
        paths
    }

    fn create(&self, client: &Client, plan: &UserModel) -> Result<UserModel> {
        log::debug!("Creating user {}", plan.username);
        client.create(&encode(plan)).map_err(remote)?;
        let user: User = client.get(&plan.username).map_err(remote)?;
        self.preserve_secrets(decode(user), plan)
    }

    fn read(&self, client: &Client, state: &UserModel) -> Result<Option<UserModel>> {
        match client.find::<User>(&state.username).map_err(remote)? {
            Some(user) => Ok(Some(self.preserve_secrets(decode(user), state)?)),
            None => Ok(None),
        }
    }

    fn update(&self, client: &Client, plan: &UserModel, _prior: &UserModel) -> Result<UserModel> {
        log::debug!("Updating user {}", plan.username);
        client.update(&encode(plan)).map_err(remote)?;
        let user: User = client.get(&plan.username).map_err(remote)?;
        self.preserve_secrets(decode(user), plan)
    }

    fn delete(&self, client: &Client, state: &UserModel) -> Result<()> {
        deleted(
            client.delete::<User>(&state.username),
            &format!("user {}", state.username),
        )
    }

    fn import(&self, id: &str) -> Result<UserModel> {
        Ok(UserModel {
            username: require_id(id, "username")?.to_string(),
            ..UserModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::filesystem::S3Fs;
    use crate::resources::testing::client;

    fn plan() -> UserModel {
        UserModel {
            username: "alice".into(),
            email: Some("alice@example.com".into()),
            password: Some("mypassword".into()),
            home_dir: Some("/srv/sftpgo/alice".into()),
            permissions: Some(BTreeMap::from([(
                "/".to_string(),
                vec!["*".to_string()],
            )])),
            public_keys: Some(vec!["ssh-ed25519 AAAAC3Nza alice@laptop".into()]),
            quota_size: Some(1 << 30),
            ..Default::default()
        }
    }

    fn on_s3(secret: &str) -> UserModel {
        UserModel {
            filesystem: Some(FilesystemModel {
                provider: 1,
                s3config: Some(S3Fs {
                    bucket: "home".into(),
                    region: "eu-west-1".into(),
                    access_key: "AKIA".into(),
                    access_secret: Some(secret.into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..plan()
        }
    }

    #[test]
    fn test_create_then_read() {
        let (mock, client) = client();
        let created = UserResource.create(&client, &plan()).unwrap();
        assert_eq!(created.status, Some(1));
        assert_eq!(created.password.as_deref(), Some("mypassword"));
        assert_eq!(created.has_password, Some(true));
        assert_eq!(created.quota_size, Some(1 << 30));
        assert_eq!(created.public_keys.as_ref().unwrap().len(), 1);

        let stored = mock.stored("users", "alice").unwrap();
        assert!(stored.get("password").is_none());

        let read = UserResource.read(&client, &created).unwrap().unwrap();
        assert_eq!(read, created);
    }

    #[test]
    fn test_password_change() {
        let (_mock, client) = client();
        let created = UserResource.create(&client, &plan()).unwrap();
        let changed = UserModel {
            password: Some("mynewpassword".into()),
            ..plan()
        };
        let updated = UserResource.update(&client, &changed, &created).unwrap();
        let read = UserResource.read(&client, &updated).unwrap().unwrap();
        assert_eq!(read.password.as_deref(), Some("mynewpassword"));
    }

    #[test]
    fn test_filesystem_secret_change() {
        let (_mock, client) = client();
        let created = UserResource.create(&client, &on_s3("mypassword")).unwrap();
        let updated = UserResource
            .update(&client, &on_s3("mynewpassword"), &created)
            .unwrap();
        let read = UserResource.read(&client, &updated).unwrap().unwrap();
        let s3 = read.filesystem.unwrap().s3config.unwrap();
        assert_eq!(s3.access_secret.as_deref(), Some("mynewpassword"));
        assert_eq!(s3.bucket, "home");
    }

    #[test]
    fn test_import_then_read() {
        let (_mock, client) = client();
        let created = UserResource.create(&client, &plan()).unwrap();
        let seeded = UserResource.import("alice").unwrap();
        let read = UserResource.read(&client, &seeded).unwrap().unwrap();
        assert_eq!(read.password, None);
        assert_eq!(
            read,
            UserModel {
                password: None,
                ..created
            }
        );
    }

    #[test]
    fn test_read_missing() {
        let (_mock, client) = client();
        let created = UserResource.create(&client, &plan()).unwrap();
        UserResource.delete(&client, &created).unwrap();
        UserResource.delete(&client, &created).unwrap();
        assert!(UserResource.read(&client, &created).unwrap().is_none());
    }

    #[test]
    fn test_validate() {
        let model = UserModel {
            username: "bad name".into(),
            status: Some(3),
            permissions: Some(BTreeMap::from([(
                "/data".to_string(),
                vec!["list".to_string()],
            )])),
            groups: Some(vec![
                GroupMapping {
                    name: "a".into(),
                    group_type: 1,
                },
                GroupMapping {
                    name: "b".into(),
                    group_type: 1,
                },
            ]),
            ..Default::default()
        };
        let paths: Vec<String> = UserResource
            .validate(&model)
            .into_iter()
            .map(|d| d.path)
            .collect();
        assert_eq!(paths, vec!["/username", "/status", "/permissions", "/groups"]);
    }

    #[test]
    fn test_secret_paths_follow_backend() {
        assert_eq!(UserResource.secret_paths(&plan()), vec!["/password"]);
        assert_eq!(
            UserResource.secret_paths(&on_s3("x")),
            vec!["/password", "/filesystem/s3config/access_secret"]
        );
    }
}
