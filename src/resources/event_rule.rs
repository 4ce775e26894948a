//! `sftpgo_event_rule`: triggers wired to ordered event actions.

use super::require_id;
use super::shared::{deleted, remote};
use declarative::{Attribute, AttributeType, Diagnostic, Diagnostics, Lifecycle, Result, Schema};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sftpgo_client::Client;
use sftpgo_client::models::{EventConditions, EventRule, RuleAction, RuleActionOptions};
use std::sync::LazyLock;

static CRON_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z*/,\-]+$").expect("CRON_FIELD_RE is a valid regex pattern")
});

pub const FS_EVENTS: &[&str] = &[
    "upload",
    "pre-upload",
    "first-upload",
    "download",
    "pre-download",
    "first-download",
    "delete",
    "pre-delete",
    "rename",
    "mkdir",
    "rmdir",
    "copy",
    "ssh_cmd",
];

pub const PROVIDER_EVENTS: &[&str] = &["add", "update", "delete"];

const CONDITION_PROTOCOLS: &[&str] = &[
    "SFTP",
    "SCP",
    "SSH",
    "FTP",
    "DAV",
    "HTTP",
    "HTTPShare",
    "OIDC",
];

const PROVIDER_OBJECTS: &[&str] = &[
    "user",
    "folder",
    "group",
    "admin",
    "api_key",
    "share",
    "event_action",
    "event_rule",
    "role",
    "ip_list_entry",
    "configs",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRuleModel {
    pub name: String,
    pub status: Option<i64>,
    pub description: Option<String>,
    pub trigger: i64,
    pub conditions: Option<EventConditions>,
    pub actions: Vec<RuleActionModel>,
    pub id: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

/// Reference to an event action. Without `order` the position in the
/// list decides, starting at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleActionModel {
    pub name: String,
    pub order: Option<i64>,
    pub relation_options: Option<RuleActionOptions>,
}

pub struct EventRuleResource;

fn effective_orders(actions: &[RuleActionModel]) -> Vec<i64> {
    actions
        .iter()
        .zip(1..)
        .map(|(a, position)| a.order.unwrap_or(position))
        .collect()
}

fn encode(model: &EventRuleModel) -> EventRule {
    let actions = model
        .actions
        .iter()
        .zip(effective_orders(&model.actions))
        .map(|(a, order)| RuleAction {
            name: a.name.clone(),
            order,
            relation_options: a.relation_options.clone().unwrap_or_default(),
        })
        .collect();
    EventRule {
        name: model.name.clone(),
        status: model.status.unwrap_or(1),
        description: model.description.clone().unwrap_or_default(),
        trigger: model.trigger,
        conditions: model.conditions.clone().unwrap_or_default(),
        actions,
        ..EventRule::default()
    }
}

pub fn decode(rule: EventRule) -> EventRuleModel {
    EventRuleModel {
        name: rule.name,
        status: Some(rule.status),
        description: Some(rule.description),
        trigger: rule.trigger,
        conditions: Some(rule.conditions),
        actions: rule
            .actions
            .into_iter()
            .map(|a| RuleActionModel {
                name: a.name,
                order: Some(a.order),
                relation_options: Some(a.relation_options),
            })
            .collect(),
        id: Some(rule.id),
        created_at: Some(rule.created_at),
        updated_at: Some(rule.updated_at),
    }
}

fn conditions_schema() -> AttributeType {
    let pattern = || {
        AttributeType::ObjectList(
            Schema::v0()
                .with(Attribute::required("pattern", AttributeType::String))
                .with(Attribute::optional("inverse_match", AttributeType::Bool)),
        )
    };
    let schedule = Schema::v0()
        .with(Attribute::required("hour", AttributeType::String))
        .with(Attribute::required("day_of_week", AttributeType::String))
        .with(Attribute::required("day_of_month", AttributeType::String))
        .with(Attribute::required("month", AttributeType::String));
    let options = Schema::v0()
        .with(Attribute::optional("names", pattern()))
        .with(Attribute::optional("group_names", pattern()))
        .with(Attribute::optional("role_names", pattern()))
        .with(Attribute::optional("fs_paths", pattern()))
        .with(Attribute::optional("protocols", AttributeType::string_list()))
        .with(Attribute::optional("provider_objects", AttributeType::string_list()))
        .with(Attribute::optional("min_file_size", AttributeType::Int))
        .with(Attribute::optional("max_file_size", AttributeType::Int))
        .with(
            Attribute::optional("event_statuses", AttributeType::int_list())
                .describe("1 ok, 2 failed, 3 quota exceeded"),
        )
        .with(Attribute::optional("concurrent_execution", AttributeType::Bool));
    AttributeType::Object(
        Schema::v0()
            .with(Attribute::optional("fs_events", AttributeType::string_list()))
            .with(Attribute::optional("provider_events", AttributeType::string_list()))
            .with(Attribute::optional("schedules", AttributeType::ObjectList(schedule)))
            .with(
                Attribute::optional("idp_login_event", AttributeType::Int)
                    .describe("0 any, 1 user, 2 admin"),
            )
            .with(Attribute::optional("options", AttributeType::Object(options))),
    )
}

fn actions_schema() -> AttributeType {
    let relation = Schema::v0()
        .with(Attribute::optional("is_failure_action", AttributeType::Bool))
        .with(Attribute::optional("stop_on_failure", AttributeType::Bool))
        .with(Attribute::optional("execute_sync", AttributeType::Bool));
    AttributeType::ObjectList(
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String))
            .with(Attribute::optional_computed("order", AttributeType::Int))
            .with(Attribute::optional("relation_options", AttributeType::Object(relation))),
    )
}

fn check_conditions(d: &mut Diagnostics, trigger: i64, c: &EventConditions) {
    let p = "/conditions";
    let blocks = [
        (1, "fs_events", c.fs_events.len()),
        (2, "provider_events", c.provider_events.len()),
        (3, "schedules", c.schedules.len()),
    ];
    for (code, name, len) in blocks {
        let path = format!("{p}/{name}");
        if len > 0 && code != trigger {
            d.push(path, format!("only valid when trigger is {code}"));
        } else if len == 0 && code == trigger {
            d.push(path, format!("must not be empty when trigger is {code}"));
        }
    }
    d.each_one_of(&format!("{p}/fs_events"), &c.fs_events, FS_EVENTS)
        .each_one_of(&format!("{p}/provider_events"), &c.provider_events, PROVIDER_EVENTS)
        .int_between(&format!("{p}/idp_login_event"), Some(c.idp_login_event), 0, 2);
    if c.idp_login_event != 0 && trigger != 7 {
        d.push(format!("{p}/idp_login_event"), "only valid when trigger is 7");
    }

    for (i, schedule) in c.schedules.iter().enumerate() {
        let fields = [
            ("hour", &schedule.hour),
            ("day_of_week", &schedule.day_of_week),
            ("day_of_month", &schedule.day_of_month),
            ("month", &schedule.month),
        ];
        for (name, value) in fields {
            if !CRON_FIELD_RE.is_match(value) {
                d.push(
                    format!("{p}/schedules/{i}/{name}"),
                    format!("{value:?} is not a valid cron field"),
                );
            }
        }
    }

    let o = &c.options;
    let op = format!("{p}/options");
    d.each_one_of(&format!("{op}/protocols"), &o.protocols, CONDITION_PROTOCOLS)
        .each_one_of(&format!("{op}/provider_objects"), &o.provider_objects, PROVIDER_OBJECTS)
        .int_at_least(&format!("{op}/min_file_size"), Some(o.min_file_size), 0)
        .int_at_least(&format!("{op}/max_file_size"), Some(o.max_file_size), 0);
    if o.max_file_size > 0 && o.min_file_size > o.max_file_size {
        d.push(format!("{op}/max_file_size"), "must not be lower than min_file_size");
    }
    for (i, status) in o.event_statuses.iter().enumerate() {
        d.int_between(&format!("{op}/event_statuses/{i}"), Some(*status), 1, 3);
    }
    let patterns = [
        ("names", &o.names),
        ("group_names", &o.group_names),
        ("role_names", &o.role_names),
        ("fs_paths", &o.fs_paths),
    ];
    for (name, list) in patterns {
        for (i, pattern) in list.iter().enumerate() {
            d.not_empty(&format!("{op}/{name}/{i}/pattern"), Some(&pattern.pattern));
        }
    }
}

fn check_actions(d: &mut Diagnostics, actions: &[RuleActionModel]) {
    d.ensure(!actions.is_empty(), "/actions", "at least one action is required");
    let names: Vec<&str> = actions.iter().map(|a| a.name.as_str()).collect();
    d.unique("/actions", &names);

    let orders = effective_orders(actions);
    for (i, action) in actions.iter().enumerate() {
        d.not_empty(&format!("/actions/{i}/name"), Some(&action.name))
            .int_at_least(&format!("/actions/{i}/order"), action.order, 1);
        if i > 0 && orders[i] <= orders[i - 1] {
            d.push(
                format!("/actions/{i}/order"),
                "must be greater than the previous action's order",
            );
        }
    }

    let failure = |a: &RuleActionModel| {
        a.relation_options
            .as_ref()
            .is_some_and(|o| o.is_failure_action)
    };
    if !actions.is_empty() && actions.iter().all(failure) {
        d.push("/actions", "at least one action must not be a failure action");
    }
}

impl Lifecycle for EventRuleResource {
    type Client = Client;
    type Model = EventRuleModel;

    fn type_name(&self) -> &'static str {
        "sftpgo_event_rule"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with(Attribute::required("name", AttributeType::String).force_new())
            .with(Attribute::optional_computed("status", AttributeType::Int))
            .with(Attribute::optional("description", AttributeType::String))
            .with(Attribute::required("trigger", AttributeType::Int).describe(
                "1 filesystem event, 2 provider event, 3 schedule, 4 IP blocked, \
                 5 certificate renewal, 6 on demand, 7 identity provider login",
            ))
            .with(Attribute::optional("conditions", conditions_schema()))
            .with(Attribute::required("actions", actions_schema()))
            .with(Attribute::computed("id", AttributeType::Int))
            .with(Attribute::computed("created_at", AttributeType::Int))
            .with(Attribute::computed("updated_at", AttributeType::Int))
    }

    fn identity(&self, model: &EventRuleModel) -> String {
        model.name.clone()
    }

    fn validate(&self, model: &EventRuleModel) -> Vec<Diagnostic> {
        let mut d = Diagnostics::new();
        d.not_empty("/name", Some(&model.name))
            .int_between("/status", model.status, 0, 1)
            .int_between("/trigger", Some(model.trigger), 1, 7);
        let conditions = model.conditions.clone().unwrap_or_default();
        check_conditions(&mut d, model.trigger, &conditions);
        check_actions(&mut d, &model.actions);
        d.into_vec()
    }

    fn create(&self, client: &Client, plan: &EventRuleModel) -> Result<EventRuleModel> {
        log::debug!("Creating event rule {}", plan.name);
        client.create(&encode(plan)).map_err(remote)?;
        let rule: EventRule = client.get(&plan.name).map_err(remote)?;
        Ok(decode(rule))
    }

    fn read(&self, client: &Client, state: &EventRuleModel) -> Result<Option<EventRuleModel>> {
        let found: Option<EventRule> = client.find(&state.name).map_err(remote)?;
        Ok(found.map(decode))
    }

    fn update(
        &self,
        client: &Client,
        plan: &EventRuleModel,
        _prior: &EventRuleModel,
    ) -> Result<EventRuleModel> {
        log::debug!("Updating event rule {}", plan.name);
        client.update(&encode(plan)).map_err(remote)?;
        let rule: EventRule = client.get(&plan.name).map_err(remote)?;
        Ok(decode(rule))
    }

    fn delete(&self, client: &Client, state: &EventRuleModel) -> Result<()> {
        deleted(
            client.delete::<EventRule>(&state.name),
            &format!("event rule {}", state.name),
        )
    }

    fn import(&self, id: &str) -> Result<EventRuleModel> {
        Ok(EventRuleModel {
            name: require_id(id, "event rule name")?.to_string(),
            ..EventRuleModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::shared::assert_schema_covers;
    use crate::resources::testing::client;
    use sftpgo_client::models::Schedule;

    fn action(name: &str) -> RuleActionModel {
        RuleActionModel {
            name: name.into(),
            ..Default::default()
        }
    }

    fn on_upload() -> EventRuleModel {
        EventRuleModel {
            name: "uploads".into(),
            trigger: 1,
            conditions: Some(EventConditions {
                fs_events: vec!["upload".into()],
                ..Default::default()
            }),
            actions: vec![action("notify"), action("archive")],
            ..Default::default()
        }
    }

    #[test]
    fn test_create_assigns_positional_order() {
        let (mock, client) = client();
        let created = EventRuleResource.create(&client, &on_upload()).unwrap();
        assert_eq!(created.status, Some(1));
        let orders: Vec<_> = created
            .actions
            .iter()
            .map(|a| (a.name.as_str(), a.order))
            .collect();
        assert_eq!(orders, vec![("notify", Some(1)), ("archive", Some(2))]);
        assert_eq!(mock.stored("eventrules", "uploads").unwrap()["actions"][1]["order"], 2);

        let read = EventRuleResource.read(&client, &created).unwrap().unwrap();
        assert_eq!(read, created);
    }

    #[test]
    fn test_update_and_delete() {
        let (_mock, client) = client();
        let created = EventRuleResource.create(&client, &on_upload()).unwrap();
        let changed = EventRuleModel {
            status: Some(0),
            actions: vec![action("notify")],
            ..on_upload()
        };
        let updated = EventRuleResource.update(&client, &changed, &created).unwrap();
        assert_eq!(updated.status, Some(0));
        assert_eq!(updated.actions.len(), 1);
        assert_eq!(updated.created_at, created.created_at);

        EventRuleResource.delete(&client, &updated).unwrap();
        EventRuleResource.delete(&client, &updated).unwrap();
        assert!(EventRuleResource.read(&client, &updated).unwrap().is_none());
    }

    #[test]
    fn test_validate_trigger_conditions() {
        let schedule = EventRuleModel {
            name: "nightly".into(),
            trigger: 3,
            conditions: Some(EventConditions {
                fs_events: vec!["upload".into()],
                schedules: vec![Schedule {
                    hour: "0".into(),
                    day_of_week: "*".into(),
                    day_of_month: "*".into(),
                    month: "every month".into(),
                }],
                ..Default::default()
            }),
            actions: vec![action("backup")],
            ..Default::default()
        };
        let paths: Vec<String> = EventRuleResource
            .validate(&schedule)
            .into_iter()
            .map(|d| d.path)
            .collect();
        assert_eq!(
            paths,
            vec!["/conditions/fs_events", "/conditions/schedules/0/month"]
        );

        let missing = EventRuleModel {
            conditions: None,
            ..schedule
        };
        let diagnostics = EventRuleResource.validate(&missing);
        assert_eq!(diagnostics[0].path, "/conditions/schedules");
        assert_eq!(diagnostics[0].message, "must not be empty when trigger is 3");
    }

    #[test]
    fn test_validate_actions() {
        let rule = EventRuleModel {
            actions: vec![
                RuleActionModel {
                    order: Some(5),
                    ..action("notify")
                },
                RuleActionModel {
                    order: Some(2),
                    ..action("archive")
                },
                action("notify"),
            ],
            ..on_upload()
        };
        let diagnostics = EventRuleResource.validate(&rule);
        let paths: Vec<&str> = diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["/actions", "/actions/1/order"]);
        assert_eq!(diagnostics[0].message, "duplicate value notify");

        let failure_only = EventRuleModel {
            actions: vec![RuleActionModel {
                relation_options: Some(RuleActionOptions {
                    is_failure_action: true,
                    ..Default::default()
                }),
                ..action("notify")
            }],
            ..on_upload()
        };
        assert_eq!(
            EventRuleResource.validate(&failure_only)[0].message,
            "at least one action must not be a failure action"
        );
        assert!(EventRuleResource.validate(&on_upload()).is_empty());
    }

    #[test]
    fn test_nested_schemas_cover_wire_structs() {
        assert_schema_covers::<EventConditions>(&conditions_schema());
        assert_schema_covers::<RuleActionModel>(&actions_schema());
    }
}
