//! Clap derive structures for the `aistrip` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// aistrip -- bridge AiStrip smart outlets into an accessory registry
#[derive(Debug, Parser)]
#[command(
    name = "aistrip",
    version,
    about = "Bridge FamilyAsyst AiStrip smart outlets from the command line",
    long_about = "Discovers AiStrip outlets on your cloud account, keeps a local accessory\n\
        registry in sync with them, and reads or switches individual outlets.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account key (overrides env, keyring, and config)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Service base URL (overrides config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long, env = "AISTRIP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Accessory cache file (overrides config)
    #[arg(long, env = "AISTRIP_REGISTRY", global = true)]
    pub registry: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AISTRIP_OUTPUT",
        default_value = "table",
        global = true
    )]
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

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List supported devices on the account
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List accessories held in the local registry
    #[command(alias = "acc", alias = "a")]
    Accessories,

    /// Reconcile the local registry against the account once
    Sync,

    /// Read or switch a single outlet
    Outlet(OutletArgs),

    /// Run the bridge: sync, then re-discover periodically until Ctrl-C
    Run(RunArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES / OUTLET / RUN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Print the unfiltered directory payload as JSON
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct OutletArgs {
    #[command(subcommand)]
    pub command: OutletCommand,
}

#[derive(Debug, Subcommand)]
pub enum OutletCommand {
    /// Read the current state of an outlet
    Get {
        /// Device ID or name (case-insensitive)
        device: String,
    },

    /// Switch an outlet on or off
    Set {
        /// Device ID or name (case-insensitive)
        device: String,

        /// Desired state
        #[arg(value_enum)]
        state: PowerState,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Re-discovery interval in seconds (overrides config, 0 = startup only)
    #[arg(long)]
    pub interval: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration (key redacted)
    Show,

    /// Print the config file path
    Path,

    /// Store the account key in the system keyring
    SetKey {
        /// Key to store (prompted for when omitted)
        #[arg(value_name = "KEY")]
        secret: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
