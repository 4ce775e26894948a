mod cli;
mod commands;
mod config;
mod data_sources;
mod progress;
mod provider;
mod resources;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: PathBuf,
    pub state: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        state: cli.state,
    };

    match cli.command {
        Command::Validate => commands::reconcile::validate(&ctx),
        Command::Plan(args) => commands::reconcile::plan(&ctx, &args),
        Command::Apply(args) => commands::reconcile::apply(&ctx, &args),
        Command::Destroy(args) => commands::reconcile::destroy(&ctx, &args),
        Command::Import { address, id } => commands::tracking::import(&ctx, &address, &id),
        Command::Refresh => commands::tracking::refresh(&ctx),
        Command::Show { address, json } => {
            commands::tracking::show(&ctx, address.as_deref(), json)
        }
        Command::Query(args) => commands::inspect::query(&ctx, &args),
        Command::Schema { type_name } => commands::inspect::schema(&ctx, type_name.as_deref()),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sftpgo-provider", &mut io::stdout());
            Ok(())
        }
    }
}
