use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{DEFAULT_CONFIG_FILE, DEFAULT_STATE_FILE};

#[derive(Parser)]
#[command(name = "sftpgo-provider")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Declarative management of SFTPGo users, folders, groups, event rules and more",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        default_value = DEFAULT_CONFIG_FILE,
        env = "SFTPGO_PROVIDER_CONFIG"
    )]
    pub config: PathBuf,

    /// State file
    #[arg(
        short,
        long,
        global = true,
        default_value = DEFAULT_STATE_FILE,
        env = "SFTPGO_PROVIDER_STATE"
    )]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check the configuration without contacting the server
    Validate,

    /// Show what apply would change
    Plan(PlanArgs),

    /// Make the server match the configuration
    Apply(ApplyArgs),

    /// Delete every tracked resource
    Destroy(ApplyArgs),

    /// Start tracking an existing remote object
    ///
    /// Identifiers are the object's name (username for users and admins,
    /// the key for the license) or `<type>:<ipornet>` for IP list entries.
    Import {
        /// Resource address, e.g. sftpgo_user.alice
        address: String,

        /// Remote identifier
        id: String,
    },

    /// Read every tracked resource and update state
    Refresh,

    /// Show tracked state
    Show {
        /// Only this resource address
        address: Option<String>,

        /// Print JSON, secrets redacted
        #[arg(long)]
        json: bool,
    },

    /// List remote objects through a data source
    Query(QueryArgs),

    /// Describe resource and data source schemas
    Schema {
        /// Only this type
        type_name: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PlanArgs {
    /// Limit to these resource addresses (type.label)
    #[arg(short, long)]
    pub target: Vec<String>,

    /// Plan against state as recorded, without reading the server
    #[arg(long)]
    pub no_refresh: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Dry run - show what would be done
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation
    #[arg(short = 'y', long)]
    pub auto_approve: bool,

    /// Number of resources applied concurrently
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Data source, e.g. sftpgo_users
    pub source: String,

    /// IP list type for sftpgo_ip_list_entries (1 allow, 2 defender, 3 rate limiter)
    #[arg(long = "type")]
    pub list_type: Option<i64>,
}
