//! `sftpgo_folder`: virtual folders mounted into users and groups.

use super::filesystem::{self, FilesystemModel};
use super::require_id;
use super::shared::{deleted, remote};
use declarative::{Attribute, AttributeType, Diagnostic, Diagnostics, Lifecycle, Result, Schema};
use serde::{Deserialize, Serialize};
use sftpgo_client::Client;
use sftpgo_client::models::Folder;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderModel {
    pub name: String,
    pub mapped_path: Option<String>,
    pub description: Option<String>,
    pub filesystem: Option<FilesystemModel>,
    pub id: Option<i64>,
    pub used_quota_size: Option<i64>,
    pub used_quota_files: Option<i64>,
    pub last_quota_update: Option<i64>,
    pub users: Option<Vec<String>>,
    pub groups: Option<Vec<String>>,
}

pub struct FolderResource;

fn encode(model: &FolderModel) -> Folder {
    Folder {
        name: model.name.clone(),
        mapped_path: model.mapped_path.clone().unwrap_or_default(),
        description: model.description.clone().unwrap_or_default(),
        filesystem: filesystem::encode(model.filesystem.as_ref()),
        ..Folder::default()
    }
}

pub fn decode(folder: Folder) -> FolderModel {
    FolderModel {
        name: folder.name,
        mapped_path: Some(folder.mapped_path),
        description: Some(folder.description),
        filesystem: Some(FilesystemModel::from_wire(folder.filesystem)),
        id: Some(folder.id),
        used_quota_size: Some(folder.used_quota_size),
        used_quota_files: Some(folder.used_quota_files),
        last_quota_update: Some(folder.last_quota_update),
        users: Some(folder.users),
        groups: Some(folder.groups),
    }
}

impl Lifecycle for FolderResource {
    type Client = Client;
    type Model = FolderModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_folder"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String).force_new())
            .with(
                Attribute::optional("mapped_path", AttributeType::String)
                    .describe("Absolute path on the server for local filesystems"),
            )
            .with(Attribute::optional("description", AttributeType::String))
            .with(Attribute::optional_computed("filesystem", filesystem::schema()))
            .with(Attribute::computed("id", AttributeType::Int))
            .with(Attribute::computed("used_quota_size", AttributeType::Int))
            .with(Attribute::computed("used_quota_files", AttributeType::Int))
            .with(Attribute::computed("last_quota_update", AttributeType::Int))
            .with(Attribute::computed("users", AttributeType::string_list()))
            .with(Attribute::computed("groups", AttributeType::string_list()))
    }

    fn identity(&self, model: &FolderModel) -> String {
        model.name.clone()
    }

    fn validate(&self, model: &FolderModel) -> Vec<Diagnostic> {
        let mut d = Diagnostics::new();
        d.not_empty("/name", Some(&model.name));
        if let Some(path) = model.mapped_path.as_deref().filter(|p| !p.is_empty())
            && !path.starts_with('/')
        {
            d.push("/mapped_path", "must be an absolute path");
        }
        if let Some(fs) = &model.filesystem {
            filesystem::validate(&mut d, "/filesystem", fs);
        }
        d.into_vec()
    }

    fn secret_paths(&self, model: &FolderModel) -> Vec<String> {
        model
            .filesystem
            .as_ref()
            .map(|fs| fs.secret_paths("/filesystem"))
            .unwrap_or_default()
    }

    fn create(&self, client: &Client, plan: &FolderModel) -> Result<FolderModel> {
        log::debug!("Creating folder {}", plan.name);
        client.create(&encode(plan)).map_err(remote)?;
        let folder: Folder = client.get(&plan.name).map_err(remote)?;
        self.preserve_secrets(decode(folder), plan)
    }

    fn read(&self, client: &Client, state: &FolderModel) -> Result<Option<FolderModel>> {
        match client.find::<Folder>(&state.name).map_err(remote)? {
            Some(folder) => Ok(Some(self.preserve_secrets(decode(folder), state)?)),
            None => Ok(None),
        }
    }

    fn update(
        &self,
        client: &Client,
        plan: &FolderModel,
        _prior: &FolderModel,
    ) -> Result<FolderModel> {
        log::debug!("Updating folder {}", plan.name);
        client.update(&encode(plan)).map_err(remote)?;
        let folder: Folder = client.get(&plan.name).map_err(remote)?;
        self.preserve_secrets(decode(folder), plan)
    }

    fn delete(&self, client: &Client, state: &FolderModel) -> Result<()> {
        deleted(client.delete::<Folder>(&state.name), &format!("folder {}", state.name))
    }

    fn import(&self, id: &str) -> Result<FolderModel> {
        Ok(FolderModel {
            name: require_id(id, "folder name")?.to_string(),
            ..FolderModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::filesystem::{CryptFs, S3Fs};
    use crate::resources::testing::client;

    fn local() -> FolderModel {
        FolderModel {
            name: "shared".into(),
            mapped_path: Some("/srv/shared".into()),
            description: Some("team files".into()),
            ..Default::default()
        }
    }

    fn encrypted(passphrase: &str) -> FolderModel {
        FolderModel {
            name: "vault".into(),
            mapped_path: Some("/srv/vault".into()),
            filesystem: Some(FilesystemModel {
                provider: 4,
                cryptconfig: Some(CryptFs {
                    passphrase: Some(passphrase.into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_then_read() {
        let (_mock, client) = client();
        let created = FolderResource.create(&client, &local()).unwrap();
        assert_eq!(created.mapped_path.as_deref(), Some("/srv/shared"));
        let fs = created.filesystem.as_ref().unwrap();
        assert_eq!(fs.provider, 0);
        assert!(fs.s3config.is_none());

        let read = FolderResource.read(&client, &created).unwrap().unwrap();
        assert_eq!(read, created);
    }

    #[test]
    fn test_secret_kept_in_plaintext() {
        let (mock, client) = client();
        let created = FolderResource.create(&client, &encrypted("mypassword")).unwrap();
        let crypt = created
            .filesystem
            .as_ref()
            .unwrap()
            .cryptconfig
            .as_ref()
            .unwrap();
        assert_eq!(crypt.passphrase.as_deref(), Some("mypassword"));

        let stored = mock.stored("folders", "vault").unwrap();
        assert_eq!(stored["filesystem"]["cryptconfig"]["passphrase"]["status"], "Secretbox");

        let updated = FolderResource
            .update(&client, &encrypted("mynewpassword"), &created)
            .unwrap();
        let read = FolderResource.read(&client, &updated).unwrap().unwrap();
        let crypt = read.filesystem.unwrap().cryptconfig.unwrap();
        assert_eq!(crypt.passphrase.as_deref(), Some("mynewpassword"));
    }

    #[test]
    fn test_import_keeps_secret_echo() {
        let (_mock, client) = client();
        FolderResource.create(&client, &encrypted("mypassword")).unwrap();

        let seeded = FolderResource.import("vault").unwrap();
        let read = FolderResource.read(&client, &seeded).unwrap().unwrap();
        let passphrase = read
            .filesystem
            .unwrap()
            .cryptconfig
            .unwrap()
            .passphrase
            .unwrap();
        assert!(passphrase.starts_with("$sb$"));
        assert_ne!(passphrase, "mypassword");
    }

    #[test]
    fn test_validate_discriminator() {
        let mut model = local();
        model.filesystem = Some(FilesystemModel {
            provider: 0,
            s3config: Some(S3Fs::default()),
            ..Default::default()
        });
        model.mapped_path = Some("relative".into());
        let diagnostics = FolderResource.validate(&model);
        let paths: Vec<&str> = diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["/mapped_path", "/filesystem/s3config"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_mock, client) = client();
        let created = FolderResource.create(&client, &local()).unwrap();
        FolderResource.delete(&client, &created).unwrap();
        FolderResource.delete(&client, &created).unwrap();
    }
}
