use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plateflow")]
#[command(author, version, about = "Plate scan ingest and dailies publish automation")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory tree for frame sequences
    Scan {
        /// Root directory to scan
        #[arg(required = true)]
        root: PathBuf,

        /// Export the scanned rows as a versioned metadata sheet into this
        /// directory
        #[arg(long)]
        sheet_dir: Option<PathBuf>,
    },

    /// Scan and run validation checks over the discovered rows
    Validate {
        /// Root directory to scan
        #[arg(required = true)]
        root: PathBuf,

        /// Checks to run: timecode, version, src-version, editorial
        /// (all when omitted)
        #[arg(long, value_delimiter = ',')]
        checks: Vec<String>,

        /// Only validate rows for this shot
        #[arg(long)]
        shot: Option<String>,
    },

    /// Scan, validate, convert, and hand off to the tracking service
    Publish {
        /// Root directory to scan
        #[arg(required = true)]
        root: PathBuf,

        /// Only publish rows for this shot
        #[arg(long)]
        shot: Option<String>,

        /// Stop after validation and report what would be published
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Display version information
    Version,
}
