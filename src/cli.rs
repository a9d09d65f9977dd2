//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # Find byte-identical files under two trees
//! dupesweep scan ~/Downloads ~/Desktop
//!
//! # Group by base name only, as JSON
//! dupesweep scan ~/Music --mode filename --output json
//!
//! # Move the extra copies to the trash
//! dupesweep delete ~/Downloads/report\ (1).pdf
//!
//! # Show the effective configuration
//! dupesweep config
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::duplicates::ScanMode;

/// Duplicate file finder.
///
/// Walks directory trees, narrows files to candidates by a cheap key and
/// confirms duplicates by BLAKE3 content hashing.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "FILE", global = true, env = "DUPESWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
    /// Delete files, to the trash by default
    Delete(DeleteArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan, in order
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<PathBuf>,

    /// How files are considered duplicates [default: from config, else exact]
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Number of hash workers [default: 2 per core, between 4 and 16]
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    pub skip_hidden: bool,

    /// Gitignore-style pattern to exclude (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Files to delete
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Remove permanently instead of moving to the trash
    #[arg(long)]
    pub permanent: bool,
}

/// Scan mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Same size and same content
    Exact,
    /// Same content, verified by text for text files
    Content,
    /// Same size only
    #[value(name = "size-only", alias = "sizeOnly")]
    SizeOnly,
    /// Same file name
    Filename,
    /// Same modification day
    Date,
}

impl From<ModeArg> for ScanMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Exact => ScanMode::Exact,
            ModeArg::Content => ScanMode::Content,
            ModeArg::SizeOnly => ScanMode::SizeOnly,
            ModeArg::Filename => ScanMode::Filename,
            ModeArg::Date => ScanMode::Date,
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON for scripting
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
