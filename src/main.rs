//! `fieldtrack` - CLI for field route tracking
//!
//! This binary ingests device location batches into the tracking store and
//! answers read-side questions: stored points, reconstructed paths, route
//! progress, and store statistics.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;

use fieldtrack::cli::{
    Cli, Command, ConfigCommand, IngestCommand, PathCommand, PointsCommand, ProgressCommand,
    StatsCommand,
};
use fieldtrack::{
    init_logging, progress, Config, LocationIngress, LocationPoint, Reconstruction, Route,
    TrackingStore,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Ingest(cmd) => handle_ingest(&config, &cmd),
        Command::Points(cmd) => handle_points(&config, &cmd),
        Command::Path(cmd) => handle_path(&config, &cmd),
        Command::Progress(cmd) => handle_progress(&cmd),
        Command::Stats(cmd) => handle_stats(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<TrackingStore> {
    let path = config.database_path();
    TrackingStore::open(&path)
        .with_context(|| format!("failed to open tracking store at {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn handle_ingest(config: &Config, cmd: &IngestCommand) -> anyhow::Result<()> {
    let points: Vec<LocationPoint> = read_json(&cmd.file)?;

    if let Some(route) = &cmd.route {
        if let Some(stray) = points.iter().find(|p| &p.route_id != route) {
            bail!(
                "batch contains a point for route {} but --route is {route}",
                stray.route_id
            );
        }
    }

    let mut ingress = LocationIngress::new(open_store(config)?);
    let count = ingress.append(&points)?;
    println!("Stored {count} points for route {}", points[0].route_id);
    Ok(())
}

fn handle_points(config: &Config, cmd: &PointsCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let points = store.query_route(&cmd.route_id)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    if points.is_empty() {
        println!("No points recorded for route {}", cmd.route_id);
        return Ok(());
    }

    println!("Points for route {} ({} total)", cmd.route_id, points.len());
    for point in &points {
        println!(
            "  {}  {:>10.6}, {:>11.6}  accuracy={}",
            point.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            point.latitude,
            point.longitude,
            point
                .accuracy
                .map_or_else(|| "-".to_string(), |a| format!("{a:.1}m")),
        );
    }
    Ok(())
}

fn handle_path(config: &Config, cmd: &PathCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let points = store.query_route(&cmd.route_id)?;
    let padding = cmd.padding.unwrap_or(config.dashboard.bounds_padding_deg);

    match Reconstruction::build(points) {
        Reconstruction::NoData => {
            if cmd.json {
                println!("null");
            } else {
                println!("No points recorded for route {}", cmd.route_id);
            }
        }
        Reconstruction::Path(path) => {
            let summary = path.summary(padding);
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Path for route {}", summary.route_id);
                println!("  Points:    {}", summary.point_count);
                println!("  Distance:  {:.2} km", summary.distance_km);
                println!("  Started:   {}", summary.started_at.to_rfc3339());
                println!("  Last seen: {}", summary.last_seen_at.to_rfc3339());
                println!(
                    "  Bounds:    [{:.6}, {:.6}] to [{:.6}, {:.6}]",
                    summary.bounds.south,
                    summary.bounds.west,
                    summary.bounds.north,
                    summary.bounds.east
                );
            }
        }
    }
    Ok(())
}

fn handle_progress(cmd: &ProgressCommand) -> anyhow::Result<()> {
    let routes: Vec<Route> = read_json(&cmd.file)?;
    let now = Utc::now();

    let summaries = if cmd.active {
        progress::in_progress(&routes, now)
    } else {
        routes.iter().map(|r| progress::summarize_at(r, now)).collect()
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No routes to show.");
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "{} ({}) - {}/{} stops, {}%, {} min elapsed - {}",
            summary.title,
            summary.route_id,
            summary.completed_stops,
            summary.total_stops,
            summary.progress_percent,
            summary.elapsed_minutes,
            summary.responsible_name,
        );
    }
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let stats = store.stats()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Tracking store statistics");
        println!("-------------------------");
        println!("Database:       {}", config.database_path().display());
        println!("Total points:   {}", stats.total_points);
        println!("Routes tracked: {}", stats.routes_tracked);
        println!(
            "Oldest point:   {}",
            stats
                .oldest_point
                .map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
        );
        println!(
            "Newest point:   {}",
            stats
                .newest_point
                .map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
        );
        println!("Size on disk:   {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:       {}", config.database_path().display());
                println!();
                println!("[Sampler]");
                println!("  Moving interval:     {} ms", config.sampler.moving_interval_ms);
                println!(
                    "  Stationary interval: {} ms",
                    config.sampler.stationary_interval_ms
                );
                println!(
                    "  Stationary threshold: {} m",
                    config.sampler.stationary_threshold_m
                );
                println!(
                    "  Checks to slow down: {}",
                    config.sampler.stationary_checks_before_slowdown
                );
                println!("  Acquire timeout:     {} ms", config.sampler.acquire_timeout_ms);
                println!();
                println!("[Dashboard]");
                println!("  Poll interval:       {} s", config.dashboard.poll_interval_secs);
                println!(
                    "  Bounds padding:      {} deg",
                    config.dashboard.bounds_padding_deg
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
