//! `sftpgo_ip_list_entry`: allow list, defender and rate limiter entries.

use super::shared::{deleted, remote};
use declarative::{
    Attribute, AttributeType, Diagnostic, Diagnostics, Error, Lifecycle, Result, Schema,
};
use serde::{Deserialize, Serialize};
use sftpgo_client::Client;
use sftpgo_client::models::IpListEntry;
use std::net::IpAddr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpListEntryModel {
    pub ipornet: String,
    #[serde(rename = "type")]
    pub list_type: i64,
    pub description: Option<String>,
    pub mode: Option<i64>,
    pub protocols: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

pub struct IpListEntryResource;

fn encode(model: &IpListEntryModel) -> IpListEntry {
    IpListEntry {
        ipornet: model.ipornet.clone(),
        list_type: model.list_type,
        description: model.description.clone().unwrap_or_default(),
        mode: model.mode.unwrap_or(1),
        protocols: model.protocols.unwrap_or_default(),
        ..IpListEntry::default()
    }
}

pub fn decode(entry: IpListEntry) -> IpListEntryModel {
    IpListEntryModel {
        ipornet: entry.ipornet,
        list_type: entry.list_type,
        description: Some(entry.description),
        mode: Some(entry.mode),
        protocols: Some(entry.protocols),
        created_at: Some(entry.created_at),
        updated_at: Some(entry.updated_at),
    }
}

/// Accepts a bare address or a CIDR network.
fn is_ip_or_net(value: &str) -> bool {
    match value.split_once('/') {
        Some((addr, bits)) => match (addr.parse::<IpAddr>(), bits.parse::<u8>()) {
            (Ok(IpAddr::V4(_)), Ok(bits)) => bits <= 32,
            (Ok(IpAddr::V6(_)), Ok(bits)) => bits <= 128,
            _ => false,
        },
        None => value.parse::<IpAddr>().is_ok(),
    }
}

/// Split `{type}:{ipornet}`. IPv6 networks contain colons, so only the
/// first one separates.
fn parse_id(id: &str) -> Result<(i64, &str)> {
    let invalid = |reason: &str| Error::InvalidImportId {
        id: id.to_string(),
        reason: reason.to_string(),
    };
    let (list_type, ipornet) = id
        .split_once(':')
        .ok_or_else(|| invalid("expected <type>:<ipornet>"))?;
    let list_type = list_type
        .parse::<i64>()
        .ok()
        .filter(|t| (1..=3).contains(t))
        .ok_or_else(|| invalid("type must be 1, 2 or 3"))?;
    if ipornet.is_empty() {
        return Err(invalid("expected <type>:<ipornet>"));
    }
    Ok((list_type, ipornet))
}

impl Lifecycle for IpListEntryResource {
    type Client = Client;
    type Model = IpListEntryModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_ip_list_entry"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with(
                Attribute::required("ipornet", AttributeType::String)
                    .force_new()
                    .describe("IP address or CIDR network"),
            )
            .with(
                Attribute::required("type", AttributeType::Int)
                    .force_new()
                    .describe("1 allow list, 2 defender, 3 rate limiter safe list"),
            )
            .with(Attribute::optional("description", AttributeType::String))
            .with(
                Attribute::optional_computed("mode", AttributeType::Int)
                    .describe("1 allow, 2 deny; deny is only valid for the defender list"),
            )
            .with(
                Attribute::optional("protocols", AttributeType::Int)
                    .describe("Bitmask: 1 SSH, 2 FTP, 4 WebDAV, 8 HTTP; 0 all"),
            )
            .with(Attribute::computed("created_at", AttributeType::Int))
            .with(Attribute::computed("updated_at", AttributeType::Int))
    }

    fn identity(&self, model: &IpListEntryModel) -> String {
        format!("{}:{}", model.list_type, model.ipornet)
    }

    fn validate(&self, model: &IpListEntryModel) -> Vec<Diagnostic> {
        let mut d = Diagnostics::new();
        if !is_ip_or_net(&model.ipornet) {
            d.push(
                "/ipornet",
                format!("{:?} is not an IP address or CIDR network", model.ipornet),
            );
        }
        d.int_between("/type", Some(model.list_type), 1, 3)
            .int_between("/mode", model.mode, 1, 2)
            .int_between("/protocols", model.protocols, 0, 15);
        if model.mode == Some(2) && model.list_type != 2 {
            d.push("/mode", "deny is only valid for the defender list (type 2)");
        }
        d.into_vec()
    }

    fn create(&self, client: &Client, plan: &IpListEntryModel) -> Result<IpListEntryModel> {
        log::debug!("Creating IP list entry {}", self.identity(plan));
        client.create_ip_entry(&encode(plan)).map_err(remote)?;
        let entry = client
            .get_ip_entry(plan.list_type, &plan.ipornet)
            .map_err(remote)?;
        Ok(decode(entry))
    }

    fn read(&self, client: &Client, state: &IpListEntryModel) -> Result<Option<IpListEntryModel>> {
        let found = client
            .find_ip_entry(state.list_type, &state.ipornet)
            .map_err(remote)?;
        Ok(found.map(decode))
    }

    fn update(
        &self,
        client: &Client,
        plan: &IpListEntryModel,
        _prior: &IpListEntryModel,
    ) -> Result<IpListEntryModel> {
        log::debug!("Updating IP list entry {}", self.identity(plan));
        client.update_ip_entry(&encode(plan)).map_err(remote)?;
        let entry = client
            .get_ip_entry(plan.list_type, &plan.ipornet)
            .map_err(remote)?;
        Ok(decode(entry))
    }

    fn delete(&self, client: &Client, state: &IpListEntryModel) -> Result<()> {
        deleted(
            client.delete_ip_entry(state.list_type, &state.ipornet),
            &format!("IP list entry {}", self.identity(state)),
        )
    }

    fn import(&self, id: &str) -> Result<IpListEntryModel> {
        let (list_type, ipornet) = parse_id(id)?;
        Ok(IpListEntryModel {
            ipornet: ipornet.to_string(),
            list_type,
            ..IpListEntryModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::client;

    fn defender(mode: i64) -> IpListEntryModel {
        IpListEntryModel {
            ipornet: "203.0.113.0/24".into(),
            list_type: 2,
            description: Some("scanner".into()),
            mode: Some(mode),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_then_read() {
        let (mock, client) = client();
        let created = IpListEntryResource.create(&client, &defender(2)).unwrap();
        assert_eq!(created.mode, Some(2));
        assert_eq!(created.protocols, Some(0));
        assert!(mock.stored("iplists/2", "203.0.113.0/24").is_some());

        let read = IpListEntryResource
            .read(&client, &created)
            .unwrap()
            .unwrap();
        assert_eq!(read, created);
    }

    #[test]
    fn test_update_keeps_identity() {
        let (_mock, client) = client();
        let created = IpListEntryResource.create(&client, &defender(2)).unwrap();
        let changed = IpListEntryModel {
            protocols: Some(3),
            ..defender(1)
        };
        let updated = IpListEntryResource.update(&client, &changed, &created).unwrap();
        assert_eq!(updated.mode, Some(1));
        assert_eq!(updated.protocols, Some(3));
        assert_eq!(IpListEntryResource.identity(&updated), "2:203.0.113.0/24");
    }

    #[test]
    fn test_import_ipv6() {
        let (_mock, client) = client();
        let entry = IpListEntryModel {
            ipornet: "2001:db8::/32".into(),
            list_type: 1,
            ..Default::default()
        };
        let created = IpListEntryResource.create(&client, &entry).unwrap();
        let seeded = IpListEntryResource.import("1:2001:db8::/32").unwrap();
        assert_eq!(seeded.ipornet, "2001:db8::/32");
        assert_eq!(seeded.list_type, 1);
        let read = IpListEntryResource.read(&client, &seeded).unwrap().unwrap();
        assert_eq!(read, created);
    }

    #[test]
    fn test_import_rejects_malformed_ids() {
        for id in ["203.0.113.7", "4:203.0.113.7", "x:1.2.3.4", "1:"] {
            assert!(
                matches!(
                    IpListEntryResource.import(id),
                    Err(Error::InvalidImportId { .. })
                ),
                "{id}"
            );
        }
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (mock, client) = client();
        let created = IpListEntryResource.create(&client, &defender(1)).unwrap();
        IpListEntryResource.delete(&client, &created).unwrap();
        IpListEntryResource.delete(&client, &created).unwrap();
        assert!(mock.stored("iplists/2", "203.0.113.0/24").is_none());
    }

    #[test]
    fn test_validate() {
        let entry = IpListEntryModel {
            ipornet: "300.1.2.3".into(),
            list_type: 1,
            mode: Some(2),
            protocols: Some(16),
            ..Default::default()
        };
        let paths: Vec<String> = IpListEntryResource
            .validate(&entry)
            .into_iter()
            .map(|d| d.path)
            .collect();
        assert_eq!(paths, vec!["/ipornet", "/protocols", "/mode"]);

        assert!(is_ip_or_net("10.0.0.1"));
        assert!(is_ip_or_net("fd00::/8"));
        assert!(!is_ip_or_net("10.0.0.0/33"));
        assert!(IpListEntryResource.validate(&defender(2)).is_empty());
    }
}
