//! Execution planner - compares declared blocks with tracked state

use crate::diff::{self, AttributeChange};
use crate::error::{Diagnostic, Error, Result};
use crate::resource::Registry;
use crate::state::{Address, StateFile, TrackedResource};
use crate::types::Action;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// A resource block from configuration.
#[derive(Debug, Clone)]
pub struct Declared {
    pub address: Address,
    pub config: Value,
}

/// One entry of the plan.
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub address: Address,
    pub action: Action,
    /// Dependency tier of the resource type.
    pub tier: usize,
    /// Attribute differences (empty for create/delete).
    pub changes: Vec<AttributeChange>,
    /// Normalized configuration, absent for deletes.
    pub config: Option<Value>,
    /// Refreshed tracked record, absent for creates.
    pub prior: Option<Value>,
}

/// Options controlling how a plan is built
#[derive(Debug, Clone, Copy)]
pub struct PlanOptions {
    /// Read every tracked resource before diffing
    pub refresh: bool,
    /// Plan the removal of everything tracked
    pub destroy: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            refresh: true,
            destroy: false,
        }
    }
}

/// A plan: ordered changes plus the refresh results to commit.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    /// Every declared or tracked block, in dependency order.
    pub changes: Vec<PlannedChange>,
    /// Tracked blocks whose remote object vanished.
    pub vanished: Vec<Address>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries that change something.
    pub fn pending(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes.iter().filter(|c| c.action.is_change())
    }

    /// Number of entries that change something.
    pub fn change_count(&self) -> usize {
        self.pending().count()
    }

    /// Count of pending entries per action.
    pub fn counts(&self) -> HashMap<Action, usize> {
        let mut counts = HashMap::new();
        for change in self.pending() {
            *counts.entry(change.action).or_insert(0) += 1;
        }
        counts
    }

    /// Keep only entries addressed by `targets` (all when empty).
    pub fn filter_by_targets(mut self, targets: &[Address]) -> Self {
        if targets.is_empty() {
            return self;
        }
        self.changes.retain(|c| targets.contains(&c.address));
        self
    }
}

/// Build a plan.
///
/// Every declared block is validated first; all findings across all blocks
/// are reported together and no remote call is made when any exist.
pub fn plan<C: ?Sized + Sync>(
    registry: &Registry<C>,
    client: &C,
    declared: &[Declared],
    state: &StateFile,
    opts: PlanOptions,
) -> Result<ExecutionPlan> {
    let normalized = if opts.destroy {
        Vec::new()
    } else {
        validate(registry, declared)?
    };

    let mut plan = ExecutionPlan::new();
    let declared_addresses: BTreeSet<&Address> = normalized.iter().map(|(a, _)| a).collect();

    for (address, config) in &normalized {
        let resource = registry.get(&address.resource_type)?;
        let tier = registry.tier(&address.resource_type).unwrap_or_default();

        let prior = match state.get(address) {
            Some(tracked) => refresh(registry, client, tracked, opts.refresh)?,
            None => None,
        };
        if state.get(address).is_some() && prior.is_none() {
            log::info!("{address} no longer exists remotely, will be created");
            plan.vanished.push(address.clone());
        }

        let (action, changes) = match &prior {
            None => (Action::Create, Vec::new()),
            Some(current) => {
                let changes = diff::compute(&resource.schema(), config, current);
                if changes.is_empty() {
                    (Action::NoOp, changes)
                } else if diff::requires_replace(&changes) {
                    (Action::Replace, changes)
                } else {
                    (Action::Update, changes)
                }
            }
        };
        log::debug!("{address}: {action}");

        plan.changes.push(PlannedChange {
            address: address.clone(),
            action,
            tier,
            changes,
            config: Some(config.clone()),
            prior,
        });
    }

    for tracked in &state.resources {
        if declared_addresses.contains(&tracked.address) {
            continue;
        }
        let tier = registry
            .tier(&tracked.address.resource_type)
            .ok_or_else(|| Error::UnknownType(tracked.address.resource_type.clone()))?;
        match refresh(registry, client, tracked, opts.refresh)? {
            Some(prior) => plan.changes.push(PlannedChange {
                address: tracked.address.clone(),
                action: Action::Delete,
                tier,
                changes: Vec::new(),
                config: None,
                prior: Some(prior),
            }),
            None => {
                log::info!("{} already gone remotely", tracked.address);
                plan.vanished.push(tracked.address.clone());
            }
        }
    }

    plan.changes
        .sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.address.cmp(&b.address)));
    Ok(plan)
}

/// Normalize and validate every declared block without touching the remote.
///
/// Findings from all blocks are collected, prefixed with the block address.
/// Two blocks of one type resolving to the same identifier are rejected.
pub fn validate<C: ?Sized>(
    registry: &Registry<C>,
    declared: &[Declared],
) -> Result<Vec<(Address, Value)>> {
    let mut diagnostics = Vec::new();
    let mut normalized = Vec::with_capacity(declared.len());
    let mut identities: HashMap<(String, String), Address> = HashMap::new();

    for block in declared {
        let resource = registry.get(&block.address.resource_type)?;
        match resource.normalize(&block.config) {
            Ok(config) => {
                let id = resource.identity(&config)?;
                let key = (block.address.resource_type.clone(), id.clone());
                if let Some(other) = identities.insert(key, block.address.clone()) {
                    diagnostics.push(Diagnostic::new(
                        block.address.to_string(),
                        format!("identifier {id:?} is also declared by {other}"),
                    ));
                }
                normalized.push((block.address.clone(), config));
            }
            Err(Error::Validation(found)) => {
                diagnostics.extend(found.into_iter().map(|d| {
                    Diagnostic::new(format!("{}{}", block.address, d.path), d.message)
                }));
            }
            Err(other) => return Err(other),
        }
    }

    if diagnostics.is_empty() {
        Ok(normalized)
    } else {
        Err(Error::Validation(diagnostics))
    }
}

fn refresh<C: ?Sized + Sync>(
    registry: &Registry<C>,
    client: &C,
    tracked: &TrackedResource,
    enabled: bool,
) -> Result<Option<Value>> {
    if !enabled {
        return Ok(Some(tracked.attributes.clone()));
    }
    let resource = registry.get(&tracked.address.resource_type)?;
    log::debug!("Refreshing {}", tracked.address);
    resource.read(client, &tracked.attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::{Items, Store};
    use serde_json::json;

    fn registry() -> Registry<Store> {
        Registry::new()
            .register(Items { name: "base" })
            .register(Items { name: "leaf" })
    }

    fn declared(t: &str, label: &str, config: Value) -> Declared {
        Declared {
            address: Address::new(t, label),
            config,
        }
    }

    fn track(state: &mut StateFile, store: &Store, t: &str, label: &str, value: Value) {
        let registry = registry();
        let created = registry.get(t).unwrap().create(store, &value).unwrap();
        state.upsert(TrackedResource {
            address: Address::new(t, label),
            id: created["name"].as_str().unwrap().to_string(),
            attributes: created,
        });
    }

    #[test]
    fn test_plan_creates_in_tier_order() {
        let store = Store::default();
        let plan = plan(
            &registry(),
            &store,
            &[
                declared("leaf", "l", json!({"name": "l"})),
                declared("base", "b", json!({"name": "b"})),
            ],
            &StateFile::default(),
            PlanOptions::default(),
        )
        .unwrap();

        assert_eq!(plan.change_count(), 2);
        assert_eq!(plan.changes[0].address.resource_type, "base");
        assert!(plan.changes.iter().all(|c| c.action == Action::Create));
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_plan_no_op_update_replace_delete() {
        let store = Store::default();
        let mut state = StateFile::default();
        track(&mut state, &store, "base", "same", json!({"name": "same", "size": 1}));
        track(&mut state, &store, "base", "grow", json!({"name": "grow", "size": 1}));
        track(&mut state, &store, "base", "rename", json!({"name": "old"}));
        track(&mut state, &store, "leaf", "gone", json!({"name": "gone"}));

        let plan = plan(
            &registry(),
            &store,
            &[
                declared("base", "same", json!({"name": "same", "size": 1})),
                declared("base", "grow", json!({"name": "grow", "size": 2})),
                declared("base", "rename", json!({"name": "new"})),
            ],
            &state,
            PlanOptions::default(),
        )
        .unwrap();

        let action = |label: &str| {
            plan.changes
                .iter()
                .find(|c| c.address.label == label)
                .unwrap()
                .action
        };
        assert_eq!(action("same"), Action::NoOp);
        assert_eq!(action("grow"), Action::Update);
        assert_eq!(action("rename"), Action::Replace);
        assert_eq!(action("gone"), Action::Delete);
        assert_eq!(plan.change_count(), 3);
    }

    #[test]
    fn test_vanished_resource_is_recreated() {
        let store = Store::default();
        let mut state = StateFile::default();
        track(&mut state, &store, "base", "a", json!({"name": "a"}));
        store.items.lock().unwrap().clear();

        let plan = plan(
            &registry(),
            &store,
            &[declared("base", "a", json!({"name": "a"}))],
            &state,
            PlanOptions::default(),
        )
        .unwrap();
        assert_eq!(plan.changes[0].action, Action::Create);
        assert_eq!(plan.vanished, vec![Address::new("base", "a")]);
    }

    #[test]
    fn test_validation_collects_all_blocks() {
        let store = Store::default();
        let err = plan(
            &registry(),
            &store,
            &[
                declared("base", "x", json!({"size": -1})),
                declared("leaf", "y", json!({"name": "y", "size": -5})),
            ],
            &StateFile::default(),
            PlanOptions::default(),
        )
        .unwrap_err();
        match err {
            Error::Validation(d) => {
                assert_eq!(d.len(), 2);
                assert_eq!(d[0].path, "base.x/name");
                assert_eq!(d[1].path, "leaf.y/size");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_validate_is_offline() {
        let normalized = validate(
            &registry(),
            &[declared("leaf", "y", json!({"name": "y"}))],
        )
        .unwrap();
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].0, Address::new("leaf", "y"));
        assert!(matches!(
            validate(&registry(), &[declared("nope", "z", json!({}))]),
            Err(Error::UnknownType(_))
        ));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let store = Store::default();
        let err = plan(
            &registry(),
            &store,
            &[
                declared("base", "one", json!({"name": "same"})),
                declared("base", "two", json!({"name": "same"})),
            ],
            &StateFile::default(),
            PlanOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(d) if d[0].message.contains("base.one")));
    }

    #[test]
    fn test_destroy_plans_deletes_only() {
        let store = Store::default();
        let mut state = StateFile::default();
        track(&mut state, &store, "base", "a", json!({"name": "a"}));
        let plan = plan(
            &registry(),
            &store,
            &[declared("base", "a", json!({"name": "a"}))],
            &state,
            PlanOptions {
                refresh: true,
                destroy: true,
            },
        )
        .unwrap();
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].action, Action::Delete);
    }

    #[test]
    fn test_filter_by_targets() {
        let store = Store::default();
        let plan = plan(
            &registry(),
            &store,
            &[
                declared("base", "a", json!({"name": "a"})),
                declared("base", "b", json!({"name": "b"})),
            ],
            &StateFile::default(),
            PlanOptions::default(),
        )
        .unwrap()
        .filter_by_targets(&[Address::new("base", "b")]);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].address.label, "b");
    }
}
