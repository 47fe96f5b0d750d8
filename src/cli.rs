use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::NameStyle;

#[derive(Parser)]
#[command(name = "confport")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Export remote configuration into stable documents and reconcile it", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to ./confport.toml, then ~/.config/confport/config.toml)
    #[arg(short, long, global = true, env = "CONFPORT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Allocate unique names for display names read line by line
    Names(NamesArgs),

    /// Write remote resources as one JSON document per resource
    Export(ExportArgs),

    /// Compare declared documents against observed documents
    Diff(DiffArgs),

    /// Print the effective configuration as TOML
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

#[derive(Args)]
pub struct NamesArgs {
    /// File with one display name per line (stdin when omitted)
    pub file: Option<PathBuf>,

    /// Disambiguation style (overrides config)
    #[arg(short, long, value_enum)]
    pub style: Option<NameStyle>,

    /// Turn names into valid identifiers first
    #[arg(long)]
    pub sanitize: bool,

    /// File with names that must never be produced
    #[arg(short, long)]
    pub block: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// JSON file with one resource object or an array of them
    pub input: PathBuf,

    /// Output directory (one subdirectory per resource type)
    pub out_dir: PathBuf,

    /// Show allocated names without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Number of parallel write jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Directory with declared documents
    pub local: PathBuf,

    /// Directory with observed documents
    pub remote: PathBuf,

    /// Additional keys to ignore (repeatable)
    #[arg(short, long = "ignore")]
    pub ignore: Vec<String>,

    /// Show a unified diff for every changed field
    #[arg(long)]
    pub show_text: bool,

    /// Number of parallel comparison jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}
