//! State commands: import, refresh, show.

use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::{Address, Registry, StateFile, TrackedResource, secrets};
use serde_json::Value;
use sftpgo_client::Client;

use super::parse_address;
use crate::Context;
use crate::config::ProviderFile;
use crate::provider;
use crate::ui;

// ============================================================================
// Import
// ============================================================================

pub fn import(ctx: &Context, address: &str, id: &str) -> Result<()> {
    let address = parse_address(address)?;
    let file = ProviderFile::load(&ctx.config)?;
    let mut state = StateFile::load(&ctx.state)?;
    let client = provider::connect(&file.provider)?;

    let tracked = import_into(&provider::registry(), &client, &mut state, &address, id)?;
    state.save(&ctx.state)?;

    ui::success(&format!("Imported {address} ({})", tracked.id));
    if file.find(&address).is_none() {
        ui::warn(&format!(
            "{address} is not declared in {}; the next apply will delete it",
            ctx.config.display()
        ));
    }
    Ok(())
}

/// Seed a record from `id`, read it and start tracking it.
///
/// Secrets cannot be read back, so they stay unset until the next apply
/// writes the configured values.
fn import_into(
    registry: &Registry<Client>,
    client: &Client,
    state: &mut StateFile,
    address: &Address,
    id: &str,
) -> Result<TrackedResource> {
    if state.get(address).is_some() {
        bail!("{address} is already tracked");
    }
    let resource = registry.get(&address.resource_type)?;
    let seed = resource.import(id)?;
    let Some(record) = resource
        .read(client, &seed)
        .with_context(|| format!("Failed to read {address}"))?
    else {
        bail!("{} {id:?} does not exist on the server", address.resource_type);
    };

    let tracked = TrackedResource {
        address: address.clone(),
        id: resource.identity(&record)?,
        attributes: record,
    };
    log::info!("Tracking {address} as {}", tracked.id);
    state.upsert(tracked.clone());
    Ok(tracked)
}

// ============================================================================
// Refresh
// ============================================================================

/// Outcome of a refresh
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub vanished: Vec<Address>,
}

pub fn refresh(ctx: &Context) -> Result<()> {
    let file = ProviderFile::load(&ctx.config)?;
    let mut state = StateFile::load(&ctx.state)?;
    let client = provider::connect(&file.provider)?;

    let summary = refresh_state(&provider::registry(), &client, &mut state)?;
    state.save(&ctx.state)?;

    for address in &summary.vanished {
        ui::warn(&format!("{address} no longer exists; dropped from state"));
    }
    ui::success(&format!(
        "Refreshed {}",
        ui::count(summary.refreshed, "resource")
    ));
    Ok(())
}

fn refresh_state(
    registry: &Registry<Client>,
    client: &Client,
    state: &mut StateFile,
) -> Result<RefreshSummary> {
    let mut summary = RefreshSummary::default();
    for tracked in state.resources.clone() {
        let resource = registry.get(&tracked.address.resource_type)?;
        let read = resource
            .read(client, &tracked.attributes)
            .with_context(|| format!("Failed to refresh {}", tracked.address))?;
        match read {
            Some(attributes) => {
                state.upsert(TrackedResource {
                    attributes,
                    ..tracked
                });
                summary.refreshed += 1;
            }
            None => {
                log::info!("{} vanished", tracked.address);
                state.remove(&tracked.address);
                summary.vanished.push(tracked.address);
            }
        }
    }
    Ok(summary)
}

// ============================================================================
// Show
// ============================================================================

pub fn show(ctx: &Context, address: Option<&str>, json: bool) -> Result<()> {
    let state = StateFile::load(&ctx.state)?;
    let registry = provider::registry();
    let filter = address.map(parse_address).transpose()?;

    let mut shown = Vec::new();
    for tracked in &state.resources {
        if filter.as_ref().is_some_and(|a| a != &tracked.address) {
            continue;
        }
        shown.push(redacted(&registry, tracked)?);
    }
    if let Some(address) = &filter
        && shown.is_empty()
    {
        bail!("{address} is not tracked");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }
    if shown.is_empty() {
        ui::info("No resources tracked");
        return Ok(());
    }

    ui::header(&format!(
        "State (serial {}, {})",
        state.serial,
        ui::count(shown.len(), "resource")
    ));
    for tracked in &shown {
        ui::section(&tracked.address.to_string());
        ui::kv("id", &tracked.id);
        if let Value::Object(attributes) = &tracked.attributes {
            for (name, value) in attributes.iter().filter(|(_, v)| !v.is_null()) {
                ui::kv(name, &ui::format_value(value, false));
            }
        }
    }
    if !ctx.quiet {
        println!();
        ui::dim(&format!("Last updated {}", state.last_updated.to_rfc3339()));
        ui::dim("Secrets are shown as (sensitive)");
    }
    Ok(())
}

/// Copy of a tracked record with every secret replaced.
fn redacted(registry: &Registry<Client>, tracked: &TrackedResource) -> Result<TrackedResource> {
    let resource = registry.get(&tracked.address.resource_type)?;
    let mut paths = resource.schema().sensitive_paths();
    paths.extend(resource.secret_paths(&tracked.attributes)?);

    let mut attributes = tracked.attributes.clone();
    secrets::redact(&mut attributes, &paths);
    Ok(TrackedResource {
        attributes,
        ..tracked.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::client;
    use serde_json::json;

    fn seed_user(mock: &sftpgo_client::MockTransport, username: &str) {
        mock.insert(
            "users",
            json!({
                "username": username,
                "status": 1,
                "home_dir": format!("/srv/{username}"),
                "permissions": {"/": ["*"]}
            }),
        );
    }

    #[test]
    fn test_import_tracks_remote_object() {
        let (mock, client) = client();
        seed_user(&mock, "alice");
        let mut state = StateFile::default();
        let address = Address::new("sftpgo_user", "alice");

        let tracked = import_into(&provider::registry(), &client, &mut state, &address, "alice")
            .unwrap();
        assert_eq!(tracked.id, "alice");
        assert_eq!(tracked.attributes["home_dir"], "/srv/alice");
        assert_eq!(tracked.attributes["password"], Value::Null);
        assert!(state.get(&address).is_some());

        let again = import_into(&provider::registry(), &client, &mut state, &address, "alice");
        assert!(again.unwrap_err().to_string().contains("already tracked"));
    }

    #[test]
    fn test_import_missing_object() {
        let (_mock, client) = client();
        let mut state = StateFile::default();
        let err = import_into(
            &provider::registry(),
            &client,
            &mut state,
            &Address::new("sftpgo_role", "ops"),
            "ops",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "sftpgo_role \"ops\" does not exist on the server");
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_import_ip_entry_identity() {
        let (mock, client) = client();
        mock.insert(
            "iplists/2",
            json!({"ipornet": "198.51.100.0/24", "type": 2, "mode": 2}),
        );
        let mut state = StateFile::default();
        let tracked = import_into(
            &provider::registry(),
            &client,
            &mut state,
            &Address::new("sftpgo_ip_list_entry", "scanner"),
            "2:198.51.100.0/24",
        )
        .unwrap();
        assert_eq!(tracked.id, "2:198.51.100.0/24");
        assert_eq!(tracked.attributes["mode"], 2);
    }

    #[test]
    fn test_refresh_drops_vanished() {
        let (mock, client) = client();
        seed_user(&mock, "alice");
        seed_user(&mock, "bob");
        let registry = provider::registry();
        let mut state = StateFile::default();
        for name in ["alice", "bob"] {
            let address = Address::new("sftpgo_user", name);
            import_into(&registry, &client, &mut state, &address, name).unwrap();
        }

        mock.remove("users", "bob");
        let summary = refresh_state(&registry, &client, &mut state).unwrap();
        assert_eq!(summary.refreshed, 1);
        assert_eq!(summary.vanished, vec![Address::new("sftpgo_user", "bob")]);
        assert_eq!(state.resources.len(), 1);
    }

    #[test]
    fn test_redacted_hides_nested_secrets() {
        let registry = provider::registry();
        let tracked = TrackedResource {
            address: Address::new("sftpgo_user", "alice"),
            id: "alice".into(),
            attributes: json!({
                "username": "alice",
                "password": "hunter22",
                "filesystem": {
                    "provider": 2,
                    "gcsconfig": {"bucket": "b", "credentials": "{\"k\":1}"}
                }
            }),
        };
        let shown = redacted(&registry, &tracked).unwrap();
        assert_eq!(shown.attributes["password"], "(sensitive)");
        assert_eq!(shown.attributes["filesystem"]["gcsconfig"]["credentials"], "(sensitive)");
        assert_eq!(shown.attributes["filesystem"]["gcsconfig"]["bucket"], "b");
        assert_eq!(tracked.attributes["password"], "hunter22");
    }
}
