//! Execution engine - applies a plan tier by tier

use crate::context::{Phase, ProgressCallback};
use crate::error::{Error, Result};
use crate::planner::{ExecutionPlan, PlannedChange};
use crate::resource::Registry;
use crate::state::{Address, StateFile, TrackedResource};
use crate::types::{Action, ApplyResult, ExecuteOptions, ExecuteSummary};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// Execute a plan, recording every outcome in `state`.
///
/// Deletes run first, highest dependency tier first; creates and updates
/// follow, lowest tier first. Within a tier, changes run concurrently on
/// up to `opts.jobs` threads. A failing resource is reported in the
/// summary and does not stop the others; its state entry is left as it
/// was. The caller persists `state` afterwards.
pub fn execute<C, P>(
    registry: &Registry<C>,
    client: &C,
    plan: &ExecutionPlan,
    state: &mut StateFile,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Result<ExecuteSummary>
where
    C: ?Sized + Sync,
    P: ProgressCallback,
{
    let mut summary = ExecuteSummary::default();

    for address in &plan.vanished {
        state.remove(address);
    }
    for change in plan.changes.iter().filter(|c| !c.action.is_change()) {
        if let Some(prior) = &change.prior {
            commit(registry, state, &change.address, prior.clone());
        }
        summary.add_result(&ApplyResult::NoChange);
    }

    let pending: Vec<&PlannedChange> = plan.pending().collect();
    if opts.dry_run {
        for change in &pending {
            let result = ApplyResult::Skipped {
                reason: "dry run".to_string(),
            };
            progress.on_resource_complete(&change.address, change.action, &result);
            summary.add_result(&result);
        }
        return Ok(summary);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs.max(1))
        .build()
        .map_err(|e| Error::Unsupported(format!("failed to create thread pool: {e}")))?;

    let removals: Vec<&PlannedChange> = pending
        .iter()
        .copied()
        .filter(|c| c.action.removes())
        .collect();
    let mut failed_replacements: HashSet<Address> = HashSet::new();

    for tier in tiers(&removals).into_iter().rev() {
        let batch: Vec<&PlannedChange> = removals
            .iter()
            .copied()
            .filter(|c| c.tier == tier)
            .collect();
        progress.on_batch_start(batch.len(), Phase::Destroy);

        let results: Vec<Result<()>> = pool.install(|| {
            batch
                .par_iter()
                .map(|c| remove_one(registry, client, c))
                .collect()
        });

        for (change, outcome) in batch.iter().zip(results) {
            match outcome {
                Ok(()) => {
                    state.remove(&change.address);
                    if change.action == Action::Delete {
                        report(&mut summary, progress, change, ApplyResult::Removed);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to delete {}: {e}", change.address);
                    if change.action == Action::Replace {
                        failed_replacements.insert(change.address.clone());
                    }
                    let result = ApplyResult::Failed {
                        error: e.to_string(),
                    };
                    report(&mut summary, progress, change, result);
                }
            }
        }
        progress.on_batch_complete();
    }

    let writes: Vec<&PlannedChange> = pending
        .iter()
        .copied()
        .filter(|c| c.action.writes() && !failed_replacements.contains(&c.address))
        .collect();

    for tier in tiers(&writes) {
        let batch: Vec<&PlannedChange> =
            writes.iter().copied().filter(|c| c.tier == tier).collect();
        progress.on_batch_start(batch.len(), Phase::Write);

        let results: Vec<Result<Value>> = pool.install(|| {
            batch
                .par_iter()
                .map(|c| write_one(registry, client, c))
                .collect()
        });

        for (change, outcome) in batch.iter().zip(results) {
            let result = match outcome {
                Ok(record) => {
                    commit(registry, state, &change.address, record);
                    match change.action {
                        Action::Create => ApplyResult::Created,
                        Action::Replace => ApplyResult::Replaced,
                        _ => ApplyResult::Updated,
                    }
                }
                Err(e) => {
                    log::warn!("Failed to {} {}: {e}", change.action, change.address);
                    ApplyResult::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report(&mut summary, progress, change, result);
        }
        progress.on_batch_complete();
    }

    Ok(summary)
}

fn tiers(changes: &[&PlannedChange]) -> BTreeSet<usize> {
    changes.iter().map(|c| c.tier).collect()
}

fn report<P: ProgressCallback>(
    summary: &mut ExecuteSummary,
    progress: &mut P,
    change: &PlannedChange,
    result: ApplyResult,
) {
    progress.on_resource_complete(&change.address, change.action, &result);
    summary.add_result(&result);
}

fn remove_one<C: ?Sized + Sync>(
    registry: &Registry<C>,
    client: &C,
    change: &PlannedChange,
) -> Result<()> {
    let resource = registry.get(&change.address.resource_type)?;
    let Some(prior) = &change.prior else {
        return Ok(());
    };
    log::info!("Deleting {}", change.address);
    resource.delete(client, prior)
}

fn write_one<C: ?Sized + Sync>(
    registry: &Registry<C>,
    client: &C,
    change: &PlannedChange,
) -> Result<Value> {
    let resource = registry.get(&change.address.resource_type)?;
    let config = change
        .config
        .as_ref()
        .ok_or_else(|| Error::Decode(format!("{}: no configuration", change.address)))?;

    match (change.action, &change.prior) {
        (Action::Update, Some(prior)) => {
            log::info!("Updating {}", change.address);
            resource.update(client, config, prior)
        }
        _ => {
            log::info!("Creating {}", change.address);
            resource.create(client, config)
        }
    }
}

fn commit<C: ?Sized>(
    registry: &Registry<C>,
    state: &mut StateFile,
    address: &Address,
    record: Value,
) {
    let id = registry
        .get(&address.resource_type)
        .and_then(|r| r.identity(&record))
        .unwrap_or_else(|e| {
            log::warn!("Cannot derive identifier for {address}: {e}");
            address.label.clone()
        });
    state.upsert(TrackedResource {
        address: address.clone(),
        id,
        attributes: record,
    });
}
