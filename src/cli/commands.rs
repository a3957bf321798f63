//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Ingest command arguments.
#[derive(Debug, Args)]
pub struct IngestCommand {
    /// Path to a JSON file holding an array of location points
    pub file: PathBuf,

    /// Require every point to belong to this route
    #[arg(short, long)]
    pub route: Option<String>,
}

/// Points command arguments.
#[derive(Debug, Args)]
pub struct PointsCommand {
    /// The route to list points for
    pub route_id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Path command arguments.
#[derive(Debug, Args)]
pub struct PathCommand {
    /// The route to reconstruct
    pub route_id: String,

    /// Map envelope padding in degrees (overrides configuration)
    #[arg(short, long)]
    pub padding: Option<f64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Progress command arguments.
#[derive(Debug, Args)]
pub struct ProgressCommand {
    /// Path to a JSON file holding an array of routes with their stops
    pub file: PathBuf,

    /// Only show routes currently in execution
    #[arg(short, long)]
    pub active: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
