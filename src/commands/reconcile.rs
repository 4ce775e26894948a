//! Reconciliation commands: validate, plan, apply, destroy.

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{
    Action, AutoConfirm, ConfirmCallback, Declared, ExecuteOptions, ExecuteSummary, ExecutionPlan,
    PlanOptions, PlannedChange, ProgressCallback, Registry, StateFile,
};
use sftpgo_client::Client;

use super::{parse_targets, report_diagnostics};
use crate::Context;
use crate::cli::{ApplyArgs, PlanArgs};
use crate::config::ProviderFile;
use crate::progress::{BarProgress, PromptConfirm};
use crate::provider;
use crate::ui;

// ============================================================================
// Validate
// ============================================================================

pub fn validate(ctx: &Context) -> Result<()> {
    let file = ProviderFile::load(&ctx.config)?;
    let registry = provider::registry();
    match declarative::validate(&registry, &file.resources) {
        Ok(blocks) => {
            ui::success(&format!(
                "Configuration is valid ({})",
                ui::count(blocks.len(), "resource")
            ));
            Ok(())
        }
        Err(e) if report_diagnostics(&e) => bail!("Configuration is invalid"),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Plan
// ============================================================================

pub fn plan(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let file = ProviderFile::load(&ctx.config)?;
    let state = StateFile::load(&ctx.state)?;
    let client = provider::connect(&file.provider)?;
    let registry = provider::registry();

    let plan = build_plan(&registry, &client, &file.resources, &state, args, false)?;
    display_plan(&registry, &plan);
    Ok(())
}

fn build_plan(
    registry: &Registry<Client>,
    client: &Client,
    declared: &[Declared],
    state: &StateFile,
    args: &PlanArgs,
    destroy: bool,
) -> Result<ExecutionPlan> {
    let targets = parse_targets(&args.target)?;
    let opts = PlanOptions {
        refresh: !args.no_refresh,
        destroy,
    };
    match declarative::plan(registry, client, declared, state, opts) {
        Ok(plan) => Ok(plan.filter_by_targets(&targets)),
        Err(e) if report_diagnostics(&e) => bail!("Configuration is invalid"),
        Err(e) => Err(e.into()),
    }
}

fn action_symbol(action: Action) -> String {
    let symbol = action.symbol();
    match action {
        Action::Create => symbol.green().to_string(),
        Action::Update => symbol.yellow().to_string(),
        Action::Replace => symbol.magenta().to_string(),
        Action::Delete => symbol.red().to_string(),
        Action::NoOp => symbol.dimmed().to_string(),
    }
}

fn display_change(registry: &Registry<Client>, change: &PlannedChange) {
    let note = match change.action {
        Action::Replace => " (replace)".dimmed().to_string(),
        Action::Delete => " (will remove)".dimmed().to_string(),
        _ => String::new(),
    };
    println!(
        "│   {} {}{}",
        action_symbol(change.action),
        change.address.label,
        note
    );

    let sensitive = registry
        .get(&change.address.resource_type)
        .map(|r| r.schema().sensitive_paths())
        .unwrap_or_default();
    for attr in &change.changes {
        let hidden = attr.sensitive || sensitive.contains(&attr.path);
        let forces = if attr.force_new {
            " (forces replacement)".red().to_string()
        } else {
            String::new()
        };
        println!(
            "│       {}: {} → {}{}",
            attr.path.trim_start_matches('/'),
            ui::format_value(&attr.before, hidden).dimmed(),
            ui::format_value(&attr.after, hidden),
            forces
        );
    }
}

/// Print pending changes grouped by resource type, in apply order.
pub fn display_plan(registry: &Registry<Client>, plan: &ExecutionPlan) {
    for address in &plan.vanished {
        ui::warn(&format!("{address} no longer exists on the server"));
    }

    let pending: Vec<&PlannedChange> = plan.pending().collect();
    if pending.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Execution Plan".bold()
    );
    println!("│");

    let mut current_type: Option<&str> = None;
    for change in &pending {
        let resource_type = change.address.resource_type.as_str();
        if current_type != Some(resource_type) {
            if current_type.is_some() {
                println!("│");
            }
            println!("│ {}", resource_type.bold());
            current_type = Some(resource_type);
        }
        display_change(registry, change);
    }
    println!("│");

    let counts = plan.counts();
    let n = |action| counts.get(&action).copied().unwrap_or_default();
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} ({} to create, {} to update, {} to replace, {} to delete)",
        ui::count(pending.len(), "change").bold(),
        n(Action::Create).to_string().green(),
        n(Action::Update).to_string().yellow(),
        n(Action::Replace).to_string().magenta(),
        n(Action::Delete).to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

// ============================================================================
// Apply / Destroy
// ============================================================================

pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    run(ctx, args, false)
}

pub fn destroy(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    run(ctx, args, true)
}

fn run(ctx: &Context, args: &ApplyArgs, destroy: bool) -> Result<()> {
    let file = ProviderFile::load(&ctx.config)?;
    let mut state = StateFile::load(&ctx.state)?;
    let client = provider::connect(&file.provider)?;

    let mut confirm: Box<dyn ConfirmCallback> = if args.auto_approve {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirm)
    };
    let mut progress = BarProgress::new(ctx.quiet);

    let Some(summary) = reconcile(
        &client,
        &file.resources,
        &mut state,
        args,
        destroy,
        confirm.as_mut(),
        &mut progress,
    )?
    else {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    };

    if args.dry_run {
        println!();
        ui::info("Dry run - no changes made");
    } else {
        state.save(&ctx.state)?;
        log::debug!("State written to {}", ctx.state.display());
    }
    print_summary(&summary);

    if !summary.is_success() {
        bail!("{} failed", ui::count(summary.failed, "resource"));
    }
    Ok(())
}

/// Plan, confirm and execute. Returns `None` when the user declined.
fn reconcile<P: ProgressCallback>(
    client: &Client,
    declared: &[Declared],
    state: &mut StateFile,
    args: &ApplyArgs,
    destroy: bool,
    confirm: &mut dyn ConfirmCallback,
    progress: &mut P,
) -> Result<Option<ExecuteSummary>> {
    let registry = provider::registry();
    let plan = build_plan(&registry, client, declared, state, &args.plan, destroy)?;
    display_plan(&registry, &plan);

    let pending = plan.change_count();
    if pending > 0 && !args.dry_run {
        let verb = if destroy { "Destroy" } else { "Apply" };
        let prompt = format!("{verb} {}?", ui::count(pending, "change"));
        if !confirm.confirm(&prompt)? {
            return Ok(None);
        }
        println!();
        println!(
            "  {} Applying {}...",
            "→".cyan(),
            ui::count(pending, "change")
        );
    }

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        jobs: args.jobs,
    };
    let summary = declarative::execute(&registry, client, &plan, state, &opts, progress)?;
    Ok(Some(summary))
}

fn print_summary(summary: &ExecuteSummary) {
    if summary.total() == summary.no_change {
        return;
    }
    println!();
    if summary.is_success() {
        println!("  {} Apply complete", "✓".green().bold());
    } else {
        println!("  {} Apply finished with errors", "⚠".yellow().bold());
    }

    let lines = [
        (summary.created, "created"),
        (summary.updated, "updated"),
        (summary.replaced, "replaced"),
        (summary.removed, "removed"),
        (summary.skipped, "skipped"),
    ];
    for (n, what) in lines {
        if n > 0 {
            println!("    • {} {what}", ui::count(n, "resource"));
        }
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::client;
    use declarative::{Address, AutoDecline, NoProgress};
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args() -> ApplyArgs {
        ApplyArgs {
            plan: PlanArgs {
                target: Vec::new(),
                no_refresh: false,
            },
            dry_run: false,
            auto_approve: true,
            jobs: 2,
        }
    }

    fn declared(resource_type: &str, label: &str, config: Value) -> Declared {
        Declared {
            address: Address::new(resource_type, label),
            config,
        }
    }

    fn blocks() -> Vec<Declared> {
        vec![
            declared(
                "sftpgo_folder",
                "shared",
                json!({"name": "shared", "mapped_path": "/srv/shared"}),
            ),
            declared(
                "sftpgo_user",
                "alice",
                json!({
                    "username": "alice",
                    "password": "s3cret-pass",
                    "home_dir": "/srv/alice",
                    "permissions": {"/": ["*"]},
                    "virtual_folders": [{"name": "shared", "virtual_path": "/shared"}]
                }),
            ),
        ]
    }

    fn apply(
        client: &Client,
        declared: &[Declared],
        state: &mut StateFile,
        args: &ApplyArgs,
    ) -> ExecuteSummary {
        reconcile(client, declared, state, args, false, &mut AutoConfirm, &mut NoProgress)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_apply_creates_then_converges() {
        let (mock, client) = client();
        let mut state = StateFile::default();

        let first = apply(&client, &blocks(), &mut state, &args());
        assert_eq!(first.created, 2);
        assert!(mock.stored("folders", "shared").is_some());
        assert!(mock.stored("users", "alice").is_some());

        let alice = state.get(&Address::new("sftpgo_user", "alice")).unwrap();
        assert_eq!(alice.id, "alice");
        assert_eq!(alice.attributes["password"], "s3cret-pass");

        let second = apply(&client, &blocks(), &mut state, &args());
        assert_eq!(second.total_changes(), 0);
        assert_eq!(second.no_change, 2);
    }

    #[test]
    fn test_dropped_attributes_are_cleared() {
        let (mock, client) = client();
        let mut state = StateFile::default();
        let bob = |extra: Value| {
            let mut config = json!({
                "username": "bob",
                "home_dir": "/srv/bob",
                "permissions": {"/": ["*"]}
            });
            if let (Some(config), Value::Object(extra)) = (config.as_object_mut(), extra) {
                config.extend(extra);
            }
            vec![declared("sftpgo_user", "bob", config)]
        };

        let with_extras = bob(json!({
            "description": "temp",
            "public_keys": ["ssh-ed25519 AAAA bob"]
        }));
        assert_eq!(apply(&client, &with_extras, &mut state, &args()).created, 1);
        assert_eq!(mock.stored("users", "bob").unwrap()["description"], "temp");

        let second = apply(&client, &bob(json!({})), &mut state, &args());
        assert_eq!(second.updated, 1);
        let stored = mock.stored("users", "bob").unwrap();
        assert_eq!(stored["description"], "");
        assert_eq!(stored["public_keys"], json!([]));

        let third = apply(&client, &bob(json!({})), &mut state, &args());
        assert_eq!(third.total_changes(), 0);
        assert_eq!(third.no_change, 1);
    }

    #[test]
    fn test_removed_block_is_deleted() {
        let (mock, client) = client();
        let mut state = StateFile::default();
        apply(&client, &blocks(), &mut state, &args());

        let summary = apply(&client, &blocks()[..1], &mut state, &args());
        assert_eq!(summary.removed, 1);
        assert!(mock.stored("users", "alice").is_none());
        assert!(state.get(&Address::new("sftpgo_user", "alice")).is_none());
    }

    #[test]
    fn test_declined_changes_nothing() {
        let (mock, client) = client();
        let mut state = StateFile::default();
        let outcome = reconcile(
            &client,
            &blocks(),
            &mut state,
            &args(),
            false,
            &mut AutoDecline,
            &mut NoProgress,
        )
        .unwrap();
        assert!(outcome.is_none());
        assert!(mock.stored("folders", "shared").is_none());
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_dry_run_skips_writes() {
        let (mock, client) = client();
        let mut state = StateFile::default();
        let dry = ApplyArgs {
            dry_run: true,
            auto_approve: false,
            ..args()
        };
        let summary = reconcile(
            &client,
            &blocks(),
            &mut state,
            &dry,
            false,
            &mut AutoDecline,
            &mut NoProgress,
        )
        .unwrap()
        .unwrap();
        assert_eq!(summary.skipped, 2);
        assert!(mock.stored("users", "alice").is_none());
    }

    #[test]
    fn test_target_limits_apply() {
        let (mock, client) = client();
        let mut state = StateFile::default();
        let targeted = ApplyArgs {
            plan: PlanArgs {
                target: vec!["sftpgo_folder.shared".into()],
                no_refresh: false,
            },
            ..args()
        };
        let summary = apply(&client, &blocks(), &mut state, &targeted);
        assert_eq!(summary.created, 1);
        assert!(mock.stored("folders", "shared").is_some());
        assert!(mock.stored("users", "alice").is_none());
    }

    #[test]
    fn test_destroy_removes_everything() {
        let (mock, client) = client();
        let mut state = StateFile::default();
        apply(&client, &blocks(), &mut state, &args());

        let summary = reconcile(
            &client,
            &blocks(),
            &mut state,
            &args(),
            true,
            &mut AutoConfirm,
            &mut NoProgress,
        )
        .unwrap()
        .unwrap();
        assert_eq!(summary.removed, 2);
        assert!(state.resources.is_empty());
        assert!(mock.stored("folders", "shared").is_none());
    }

    #[test]
    fn test_invalid_block_stops_before_remote_calls() {
        let (mock, client) = client();
        let mut state = StateFile::default();
        let bad = vec![declared(
            "sftpgo_user",
            "broken",
            json!({"username": "broken", "status": 7}),
        )];
        let err = reconcile(
            &client,
            &bad,
            &mut state,
            &args(),
            false,
            &mut AutoConfirm,
            &mut NoProgress,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Configuration is invalid");
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_validate_command() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("sftpgo.toml");
        std::fs::write(
            &config,
            "[resource.sftpgo_role.ops]\nname = \"ops\"\n\n\
             [resource.sftpgo_role.dup]\nname = \"ops\"\n",
        )
        .unwrap();
        let ctx = Context {
            verbose: 0,
            quiet: true,
            config: config.clone(),
            state: PathBuf::from("unused.json"),
        };
        assert!(validate(&ctx).is_err());

        std::fs::write(&config, "[resource.sftpgo_role.ops]\nname = \"ops\"\n").unwrap();
        validate(&ctx).unwrap();
    }
}
