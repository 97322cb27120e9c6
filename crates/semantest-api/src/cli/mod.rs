//! CLI command definitions and dispatch for the `smtest` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI manages the
//! pattern store and session history; training itself is driven by the
//! live browser extension, not from here.

pub mod cleanup;
pub mod patterns;
pub mod sessions;
pub mod stats;
pub mod transfer;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use std::path::PathBuf;

/// Inspect and manage learned automation patterns.
#[derive(Parser)]
#[command(name = "smtest", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export OpenTelemetry traces to stdout.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pattern store statistics.
    Stats,

    /// Inspect and manage learned patterns.
    Patterns {
        #[command(subcommand)]
        action: patterns::PatternsCommand,
    },

    /// Export all patterns to a JSON file.
    Export {
        /// Destination path.
        file: PathBuf,
    },

    /// Import patterns from a JSON file (existing ids are replaced).
    Import {
        /// Source path.
        file: PathBuf,
    },

    /// Delete old, rarely used patterns.
    Cleanup {
        /// Delete patterns learned more than this many days ago.
        #[arg(long)]
        max_age_days: u32,

        /// Report what would be deleted without deleting anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show recent training sessions.
    Sessions {
        /// Maximum number of sessions to show.
        #[arg(long, default_value = "20")]
        limit: i64,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
