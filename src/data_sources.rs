//! Read-only list queries.
//!
//! Each source returns every object of one collection, decoded the same
//! way the matching resource decodes it, aggregated across pages.

use crate::resources::{
    admin, event_action, event_rule, folder, group, ip_list_entry, role, shared::remote, user,
};
use declarative::{Attribute, AttributeType, Diagnostics, Error, Result, Schema};
use serde::Serialize;
use serde_json::Value;
use sftpgo_client::Client;
use sftpgo_client::models::{Admin, EventAction, EventRule, Folder, Group, Role, User};

/// A named query over the remote API.
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Arguments accepted by [`DataSource::read`].
    fn arguments(&self) -> Schema {
        Schema::v0()
    }

    fn read(&self, client: &Client, args: &Value) -> Result<Vec<Value>>;
}

/// Whole-collection listing of a keyed object kind.
struct Listing<W, M> {
    name: &'static str,
    list: fn(&Client) -> sftpgo_client::Result<Vec<W>>,
    decode: fn(W) -> M,
}

impl<W, M: Serialize> DataSource for Listing<W, M> {
    fn type_name(&self) -> &'static str {
        self.name
    }

    fn read(&self, client: &Client, args: &Value) -> Result<Vec<Value>> {
        check_args(&self.arguments(), args)?;
        let objects = (self.list)(client).map_err(remote)?;
        log::debug!("{} returned {} objects", self.name, objects.len());
        objects
            .into_iter()
            .map(|o| Ok(serde_json::to_value((self.decode)(o))?))
            .collect()
    }
}

/// Entries of one IP list, selected by the `type` argument.
struct IpListEntries;

impl DataSource for IpListEntries {
    fn type_name(&self) -> &'static str {
        "sftpgo_ip_list_entries"
    }

    fn arguments(&self) -> Schema {
        Schema::v0().with(
            Attribute::required("type", AttributeType::Int)
                .describe("1 allow list, 2 defender, 3 rate limiter safe list"),
        )
    }

    fn read(&self, client: &Client, args: &Value) -> Result<Vec<Value>> {
        check_args(&self.arguments(), args)?;
        let list_type = args.get("type").and_then(Value::as_i64);
        let mut d = Diagnostics::new();
        d.int_between("/type", list_type, 1, 3);
        d.into_result()?;

        let entries = client
            .list_ip_entries(list_type.unwrap_or_default())
            .map_err(remote)?;
        entries
            .into_iter()
            .map(|e| Ok(serde_json::to_value(ip_list_entry::decode(e))?))
            .collect()
    }
}

fn check_args(schema: &Schema, args: &Value) -> Result<()> {
    let empty = Value::Object(serde_json::Map::new());
    let args = if args.is_null() { &empty } else { args };
    let diagnostics = schema.check_config(args);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(diagnostics))
    }
}

/// Every data source, in the order they are documented.
pub fn all() -> Vec<Box<dyn DataSource>> {
    vec![
        Box::new(Listing {
            name: "sftpgo_users",
            list: Client::list::<User>,
            decode: user::decode,
        }),
        Box::new(Listing {
            name: "sftpgo_folders",
            list: Client::list::<Folder>,
            decode: folder::decode,
        }),
        Box::new(Listing {
            name: "sftpgo_groups",
            list: Client::list::<Group>,
            decode: group::decode,
        }),
        Box::new(Listing {
            name: "sftpgo_roles",
            list: Client::list::<Role>,
            decode: role::decode,
        }),
        Box::new(Listing {
            name: "sftpgo_admins",
            list: Client::list::<Admin>,
            decode: admin::decode,
        }),
        Box::new(Listing {
            name: "sftpgo_event_actions",
            list: Client::list::<EventAction>,
            decode: event_action::decode,
        }),
        Box::new(Listing {
            name: "sftpgo_event_rules",
            list: Client::list::<EventRule>,
            decode: event_rule::decode,
        }),
        Box::new(IpListEntries),
    ]
}

/// Look up a data source by type name.
pub fn find(name: &str) -> Result<Box<dyn DataSource>> {
    all()
        .into_iter()
        .find(|s| s.type_name() == name)
        .ok_or_else(|| Error::UnknownType(name.to_string()))
}
