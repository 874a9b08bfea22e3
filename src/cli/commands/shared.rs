//! Shared components for CLI commands
//!
//! This module contains the run statistics, logging setup, configuration
//! loading and reporting used by the command implementations.

use crate::app::services::record_writer::WriteStats;
use crate::app::services::station_registry::StationRegistry;
use crate::app::services::taf_decoder::FileStats;
use crate::cli::args::{OutputFormat, ProcessArgs};
use crate::config::TafConfig;
use crate::{Error, Result};
use colored::*;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Input files discovered
    pub files_found: usize,
    /// Input files read through
    pub files_processed: usize,
    /// Input files that could not be opened or read
    pub files_failed: usize,
    /// Input files whose records could not be written
    pub store_failures: usize,
    /// Stations in the location table
    pub stations_loaded: usize,
    /// Message counts over all files
    pub messages: FileStats,
    /// Chunk store activity
    pub writes: WriteStats,
    /// Total processing time
    pub processing_time: std::time::Duration,
}

impl ProcessingStats {
    /// True when there was input but none of it could be opened
    pub fn all_files_failed(&self) -> bool {
        self.files_found > 0 && self.files_failed == self.files_found
    }
}

/// Set up structured logging at `log_level`
///
/// `RUST_LOG` takes precedence when set.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taf_processor={}", log_level)));

    let result = if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Read the configuration file, or defaults when there is none
///
/// An explicit path must exist; the default location is optional.
pub fn read_config_file(config_file: Option<&Path>) -> Result<TafConfig> {
    match config_file {
        Some(path) => TafConfig::from_file(path),
        None => match TafConfig::default_config_path() {
            Some(path) => TafConfig::load_or_default(&path),
            None => Ok(TafConfig::default()),
        },
    }
}

/// Load configuration for the process command: file, then CLI overrides
pub fn load_configuration(args: &ProcessArgs) -> Result<TafConfig> {
    let mut config = read_config_file(args.config_file.as_deref())?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut TafConfig, args: &ProcessArgs) {
    if let Some(mode) = args.effective_mode() {
        config.mode = mode;
    }
    if let Some(input_dir) = &args.input_dir {
        config.input_dir = input_dir.clone();
    }
    if let Some(path) = &args.station_location_path {
        config.station_location_path = path.clone();
    }
    if let Some(root) = &args.output_root {
        *config = std::mem::take(config).with_output_root(root);
    }
    if let Some(list) = &args.accepted_stations {
        config.accepted_stations = Some(list.stations.clone());
    }
    if let Some(list) = &args.rejected_stations {
        config.rejected_stations = list.stations.clone();
    }
    if args.use_header_time_fallback {
        config.use_header_time_fallback = true;
    }
}

/// Load the station location table, logging what was read
pub fn load_station_registry(path: &Path) -> Result<Arc<StationRegistry>> {
    let (registry, load_stats) = StationRegistry::load_from_file(path)?;
    if load_stats.has_errors() {
        warn!("{}", load_stats.summary());
    } else {
        info!("{}", load_stats.summary());
    }
    Ok(Arc::new(registry))
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> Result<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map_err(|e| Error::configuration(format!("Invalid progress bar template: {}", e)))?
        .progress_chars("#>-");
    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Generate final processing report
pub fn generate_final_report(format: &OutputFormat, stats: &ProcessingStats) -> Result<()> {
    match format {
        OutputFormat::Human => {
            generate_human_report(stats);
            Ok(())
        }
        OutputFormat::Json => generate_json_report(stats),
    }
}

/// Generate human-readable report
fn generate_human_report(stats: &ProcessingStats) {
    let messages = &stats.messages;

    println!("\n{}", "TAF Processing Summary".bright_green().bold());
    println!("{}", "=".repeat(40).bright_green());
    println!(
        "  Files processed:     {} of {}",
        stats.files_processed.to_string().bright_white().bold(),
        stats.files_found
    );
    if stats.files_failed > 0 {
        println!(
            "  Files failed:        {}",
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!("  Stations loaded:     {}", stats.stations_loaded);
    println!(
        "  Messages found:      {}",
        messages.messages_found.to_string().bright_white().bold()
    );
    println!(
        "  Messages decoded:    {} ({:.1}%)",
        messages.messages_decoded.to_string().bright_white().bold(),
        messages.success_rate()
    );
    println!("  Messages rejected:   {}", messages.messages_rejected);
    if messages.messages_failed > 0 {
        println!(
            "  Messages failed:     {}",
            messages.messages_failed.to_string().bright_yellow().bold()
        );
        for (kind, count) in &messages.failures_by_kind {
            println!("    {:<22} {}", kind, count);
        }
    }
    println!("  Raw-text chunks:     {}", stats.writes.raw_chunks_written);
    println!("  Structured chunks:   {}", stats.writes.structured_chunks_written);
    if stats.writes.records_cancelled > 0 {
        println!("  Records cancelled:   {}", stats.writes.records_cancelled);
    }
    if stats.store_failures > 0 {
        println!(
            "  Store failures:      {}",
            stats.store_failures.to_string().bright_red().bold()
        );
    }
    println!(
        "  Processing time:     {}",
        HumanDuration(stats.processing_time)
    );
    println!();
}

/// Generate JSON report for machine consumption
fn generate_json_report(stats: &ProcessingStats) -> Result<()> {
    let json_stats = serde_json::json!({
        "files_found": stats.files_found,
        "files_processed": stats.files_processed,
        "files_failed": stats.files_failed,
        "store_failures": stats.store_failures,
        "stations_loaded": stats.stations_loaded,
        "messages_found": stats.messages.messages_found,
        "messages_decoded": stats.messages.messages_decoded,
        "messages_rejected": stats.messages.messages_rejected,
        "messages_failed": stats.messages.messages_failed,
        "failures_by_kind": stats.messages.failures_by_kind,
        "raw_chunks_written": stats.writes.raw_chunks_written,
        "structured_chunks_written": stats.writes.structured_chunks_written,
        "records_cancelled": stats.writes.records_cancelled,
        "processing_time_seconds": stats.processing_time.as_secs_f64(),
    });

    let text = serde_json::to_string_pretty(&json_stats)
        .map_err(|e| Error::serialization("Failed to render JSON report", e))?;
    println!("{}", text);
    Ok(())
}
