//! Provider wiring: the registry of resource kinds and the API connection.

use crate::resources::{
    AdminResource, EventActionResource, EventRuleResource, FolderResource, GroupResource,
    IpListEntryResource, LicenseResource, RoleResource, UserResource,
};
use anyhow::{Context, Result};
use declarative::Registry;
use sftpgo_client::{Client, ClientConfig};

/// Every resource kind, in dependency order.
///
/// Roles and folders come before the groups and users that reference
/// them; event actions before the rules that run them.
pub fn registry() -> Registry<Client> {
    Registry::new()
        .register(RoleResource)
        .register(FolderResource)
        .register(GroupResource)
        .register(UserResource)
        .register(AdminResource)
        .register(EventActionResource)
        .register(EventRuleResource)
        .register(IpListEntryResource)
        .register(LicenseResource)
}

/// Fill environment fallbacks, validate and open a client.
pub fn connect(config: &ClientConfig) -> Result<Client> {
    let config = config
        .clone()
        .with_env()
        .context("Invalid provider environment")?;
    config.validate().context("Invalid provider configuration")?;
    log::debug!("Connecting to {}", config.base_url());
    Client::new(&config).context("Failed to create API client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let registry = registry();
        assert_eq!(
            registry.type_names(),
            vec![
                "sftpgo_role",
                "sftpgo_folder",
                "sftpgo_group",
                "sftpgo_user",
                "sftpgo_admin",
                "sftpgo_event_action",
                "sftpgo_event_rule",
                "sftpgo_ip_list_entry",
                "sftpgo_license",
            ]
        );
        assert!(registry.tier("sftpgo_folder") < registry.tier("sftpgo_user"));
        assert!(registry.tier("sftpgo_event_action") < registry.tier("sftpgo_event_rule"));
    }

    #[test]
    fn test_every_schema_has_an_identity_attribute() {
        for resource in registry().iter() {
            let schema = resource.schema();
            let force_new = schema.attributes.iter().filter(|a| a.force_new).count();
            assert!(force_new > 0, "{}", resource.type_name());
        }
    }
}
