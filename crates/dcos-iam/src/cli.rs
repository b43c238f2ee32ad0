//! Clap derive structures for the `dcos-iam` CLI.
//!
//! With no subcommand the interactive menu starts; every menu entry also
//! exists as a subcommand for scripted use.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use dcos_iam_core::Resource;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dcos-iam -- back up and restore DC/OS IAM configuration
#[derive(Debug, Parser)]
#[command(
    name = "dcos-iam",
    version,
    about = "Back up and restore DC/OS IAM configuration",
    long_about = "Copies users, groups, ACLs, LDAP settings and service groups \
        from a DC/OS cluster into a local JSON buffer, keeps named backups of \
        that buffer, and replays it onto another cluster.\n\n\
        Run without a subcommand for the interactive menu.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(
        long,
        env = "DCOS_IAM_CONFIG",
        default_value = dcos_iam_config::DEFAULT_CONFIG_FILE,
        global = true
    )]
    pub config: PathBuf,

    /// Buffer directory (overrides DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Backup directory (overrides BACKUP_DIR)
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Relationship requests in flight at once
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub concurrency: Option<u16>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive menu (the default)
    Menu,

    /// Fetch from the cluster into the buffer
    Get {
        /// users, groups, acls, ldap, service-groups, agents or all
        #[arg(value_parser = Target::from_str)]
        target: Target,
    },

    /// Publish the buffer onto the cluster
    Put {
        /// users, groups, acls, ldap, service-groups or all
        #[arg(value_parser = Target::from_str)]
        target: Target,
    },

    /// Show what the buffer holds for one resource
    Check {
        #[arg(value_parser = Resource::from_str)]
        resource: Resource,
    },

    /// Manage named backups of the buffer
    #[command(alias = "backup")]
    Backups(BackupsArgs),

    /// Show or create the config file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// One resource, or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    One(Resource),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Resource::from_str(s).map(Self::One).map_err(|_| {
            format!("unknown resource '{s}' (users, groups, acls, ldap, service-groups, agents, all)")
        })
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::One(resource) => write!(f, "{resource}"),
        }
    }
}

// ── Backups ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BackupsArgs {
    #[command(subcommand)]
    pub command: BackupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BackupsCommand {
    /// List saved backups
    #[command(alias = "ls")]
    List,
    /// Copy the buffer into a named backup
    Save { name: String },
    /// Replace the buffer with a named backup
    Load { name: String },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets masked)
    Show,
    /// Create or rewrite the config file interactively
    Init,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
