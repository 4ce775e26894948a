//! `sftpgo_license`: Enterprise license key.
//!
//! The server answers with a masked key, so the configured key is kept in
//! state. There is no uninstall endpoint: removing the block only forgets
//! the license locally.

use super::require_id;
use super::shared::remote;
use declarative::{Attribute, AttributeType, Error, Lifecycle, Result, Schema};
use serde::{Deserialize, Serialize};
use sftpgo_client::models::License;
use sftpgo_client::{Client, Edition};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseModel {
    pub key: String,
    #[serde(rename = "type")]
    pub license_type: Option<i64>,
    pub valid_from: Option<i64>,
    pub valid_to: Option<i64>,
}

pub struct LicenseResource;

pub fn decode(license: License) -> LicenseModel {
    LicenseModel {
        key: license.key,
        license_type: Some(license.license_type),
        valid_from: Some(license.valid_from),
        valid_to: Some(license.valid_to),
    }
}

fn require_enterprise(client: &Client) -> Result<()> {
    match client.edition() {
        Edition::Enterprise => Ok(()),
        Edition::Community => Err(Error::Unsupported(
            "sftpgo_license requires the Enterprise edition (set edition = 1)".to_string(),
        )),
    }
}

impl LicenseResource {
    fn install(&self, client: &Client, plan: &LicenseModel) -> Result<LicenseModel> {
        require_enterprise(client)?;
        client.install_license(&plan.key).map_err(remote)?;
        let license = client.get_license().map_err(remote)?;
        log::info!("License installed, valid until {}", license.valid_to);
        self.preserve_secrets(decode(license), plan)
    }
}

impl Lifecycle for LicenseResource {
    type Client = Client;
    type Model = LicenseModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_license"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with(
                Attribute::required("key", AttributeType::String)
                    .sensitive()
                    .force_new(),
            )
            .with(Attribute::computed("type", AttributeType::Int))
            .with(
                Attribute::computed("valid_from", AttributeType::Int)
                    .describe("Unix timestamp in milliseconds"),
            )
            .with(Attribute::computed("valid_to", AttributeType::Int))
    }

    fn identity(&self, model: &LicenseModel) -> String {
        model.key.clone()
    }

    fn secret_paths(&self, _model: &LicenseModel) -> Vec<String> {
        vec!["/key".to_string()]
    }

    fn create(&self, client: &Client, plan: &LicenseModel) -> Result<LicenseModel> {
        self.install(client, plan)
    }

    fn read(&self, client: &Client, state: &LicenseModel) -> Result<Option<LicenseModel>> {
        require_enterprise(client)?;
        match client.get_license() {
            Ok(license) => Ok(Some(self.preserve_secrets(decode(license), state)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(remote(e)),
        }
    }

    fn update(
        &self,
        client: &Client,
        plan: &LicenseModel,
        _prior: &LicenseModel,
    ) -> Result<LicenseModel> {
        self.install(client, plan)
    }

    fn delete(&self, _client: &Client, _state: &LicenseModel) -> Result<()> {
        log::info!("License removed from state only; it stays installed on the server");
        Ok(())
    }

    fn import(&self, id: &str) -> Result<LicenseModel> {
        Ok(LicenseModel {
            key: require_id(id, "license key")?.to_string(),
            ..LicenseModel::default()
        })
    }
}
