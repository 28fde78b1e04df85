use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ddwrt-nvram")]
#[command(about = "Inspect and edit DD-WRT NVRAM backup files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Decode a backup and list its entries.
    Inspect(InspectArgs),
    /// Compare two backups key by key.
    Diff(DiffArgs),
    /// Show the static DHCP lease table.
    Leases(LeasesArgs),
    /// Show the port-forwarding table.
    Forwards(ForwardsArgs),
    /// Apply set/unset edits and write a new backup.
    Edit(EditArgs),
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    pub file: PathBuf,
    /// Show only these keys (repeatable).
    #[arg(long)]
    pub key: Vec<String>,
    /// Show only keys starting with this prefix.
    #[arg(long)]
    pub prefix: Option<String>,
    /// Fail on duplicate keys instead of keeping the last value.
    #[arg(long)]
    pub strict_duplicates: bool,
    /// Annotate recognized keys with category and note.
    #[arg(long)]
    pub known: bool,
    /// Optional key annotations TOML file. Defaults to the embedded table.
    #[arg(long)]
    pub keys_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct DiffArgs {
    pub file1: PathBuf,
    pub file2: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Include identical entries.
    #[arg(short, long)]
    pub verbose: bool,
    /// Print counts only.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Parser, Debug)]
pub struct LeasesArgs {
    pub file: PathBuf,
    /// Skip the static_leasenum consistency check.
    #[arg(long)]
    pub no_check_count: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ForwardsArgs {
    pub file: PathBuf,
    /// Skip the forwardspec_entries consistency check.
    #[arg(long)]
    pub no_check_count: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    pub input: PathBuf,
    /// Record a KEY=VALUE write (repeatable).
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
    /// Record a key removal (repeatable).
    #[arg(long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,
    /// Output path for the rewritten backup.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Print the pending batch instead of writing a backup.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
