//! Clap derive structures for the `mawaqit` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mawaqit -- prayer times from the Mawaqit service
#[derive(Debug, Parser)]
#[command(
    name = "mawaqit",
    version,
    about = "Prayer times from Mawaqit on the command line",
    long_about = "Fetches mosque prayer calendars from the Mawaqit service.\n\n\
        One-shot commands sync once and print; `watch` keeps the calendar\n\
        fresh with a daily refresh and retries on failure.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "MAWAQIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Latitude of the search point
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// Longitude of the search point
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// Mosque uuid or slug (default: nearest)
    #[arg(long, short = 'm', global = true)]
    pub mosque: Option<String>,

    /// Output format (default from config, else table)
    #[arg(long, short = 'o', env = "MAWAQIT_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Per-request timeout, e.g. "10s"
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Issue an API token from a Mawaqit account login
    Token(TokenArgs),

    /// List mosques near the configured location
    #[command(alias = "m")]
    Mosques(MosquesArgs),

    /// Show today's prayer and iqama times
    #[command(alias = "t")]
    Times,

    /// Show the next prayer and when to prepare for it
    #[command(alias = "n")]
    Next,

    /// Keep the calendar in sync and report each refresh until Ctrl-C
    Watch,

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Subcommand args ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Account username (defaults to the configured one)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Store the issued token in the system keyring
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Args)]
pub struct MosquesArgs {
    /// Filter by name, slug or uuid
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration (secrets masked)
    Show,

    /// Write a starter config file
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Account username to store
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Prompt for the password and store it in the system keyring
    #[arg(long)]
    pub store_password: bool,

    /// IANA timezone used until the mosque reports its own
    #[arg(long)]
    pub timezone: Option<String>,

    /// Overwrite an existing file
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
