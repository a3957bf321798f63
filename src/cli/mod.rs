//! Command-line interface for fieldtrack.
//!
//! This module provides the CLI structure and command handlers for the
//! `fieldtrack` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, IngestCommand, PathCommand, PointsCommand, ProgressCommand, StatsCommand,
};

/// fieldtrack - Track field service routes as they happen
///
/// Ingests GPS location batches from devices in the field, stores them
/// append-only, and reconstructs traveled paths and route progress for
/// operations dashboards.
#[derive(Debug, Parser)]
#[command(name = "fieldtrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest a batch of location points from a JSON file
    Ingest(IngestCommand),

    /// List the stored points for a route
    Points(PointsCommand),

    /// Reconstruct the traveled path of a route
    Path(PathCommand),

    /// Summarize route execution progress
    Progress(ProgressCommand),

    /// Show tracking store statistics
    Stats(StatsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
