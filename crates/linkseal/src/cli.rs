//! Clap derive structures for the `linkseal` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// linkseal -- CLI client for a secure-link service
#[derive(Debug, Parser)]
#[command(
    name = "linkseal",
    version,
    about = "Create, open, and revoke secure links from the command line",
    long_about = "A client for secure-link services: shareable short links and\n\
        file uploads, optionally password-protected, with view limits and\n\
        expiration, plus aggregated operational statistics.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "LINKSEAL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Service base URL (overrides profile)
    #[arg(long, short = 's', env = "LINKSEAL_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LINKSEAL_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LINKSEAL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "LINKSEAL_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a secure link for a target URL
    #[command(alias = "new")]
    Create(CreateArgs),

    /// Upload a file and create a secure link serving it
    #[command(alias = "up")]
    Upload(UploadArgs),

    /// Open a secure link: follow the redirect or download the file
    #[command(alias = "o")]
    Open(OpenArgs),

    /// Revoke a secure link
    #[command(alias = "rm")]
    Revoke(RevokeArgs),

    /// Show aggregated service statistics
    #[command(alias = "st")]
    Stats(StatsArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Per-command args ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Target URL the link should redirect to
    pub target_url: String,

    #[command(flatten)]
    pub options: LinkOptionArgs,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,

    #[command(flatten)]
    pub options: LinkOptionArgs,
}

#[derive(Debug, Args)]
pub struct LinkOptionArgs {
    /// Expiration timestamp (RFC3339, e.g. 2025-12-31T23:59:00Z)
    #[arg(long)]
    pub expires_at: Option<String>,

    /// Maximum number of views before the link is spent
    #[arg(long)]
    pub max_views: Option<u32>,

    /// Protect the link with a password (prompted interactively)
    #[arg(long, conflicts_with = "password")]
    pub protect: bool,

    /// Protect the link with the given password (prefer --protect; this
    /// leaks into shell history)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Short code or full /l/{code} URL
    pub link: String,

    /// Password for protected links (prompted interactively when the
    /// server challenges and this flag is absent)
    #[arg(long)]
    pub password: Option<String>,

    /// Write a downloaded file to this path instead of the server-given
    /// filename in the current directory
    #[arg(long, short = 'O')]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RevokeArgs {
    /// Short code or full /l/{code} URL
    pub link: String,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Keep polling and re-render on every refresh (Ctrl-C to stop)
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Entries for top-links and security-exception listings
    #[arg(long, default_value = "5")]
    pub limit: u32,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Print the merged configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a key on the active profile (server, insecure, timeout,
    /// poll_interval, top_limit)
    Set { key: String, value: String },

    /// List profiles; the default is marked with *
    Profiles,

    /// Set the default profile
    Use { name: String },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
