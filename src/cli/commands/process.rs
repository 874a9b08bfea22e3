//! Process command implementation for the TAF processor CLI
//!
//! Discovers input files, decodes every message they contain and writes the
//! raw-text and structured records to the chunk store, one batch per file.

use super::shared::{
    ProcessingStats, create_progress_bar, generate_final_report, load_configuration,
    load_station_registry, setup_logging,
};
use crate::app::services::bulletin_reader::read_messages;
use crate::app::services::chunk_store::{ChunkStore, FileChunkStore, MemoryChunkStore};
use crate::app::services::input_source::{
    InputFile, RealtimeWatcher, expand_file_list, scan_archive,
};
use crate::app::services::record_writer::{RecordWriter, WriterConfig};
use crate::app::services::taf_decoder::{DecodeOutcome, FileStats, MessageInput, TafDecoder};
use crate::cli::args::ProcessArgs;
use crate::config::{InputMode, TafConfig};
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Outcome of reading one input file
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub stats: FileStats,
    /// The file's batch could not be written
    pub write_failed: bool,
}

/// Process command runner
///
/// 1. Load configuration and set up logging
/// 2. Load the station location table
/// 3. Discover input files for the configured mode
/// 4. Decode and store each file, then report
pub fn run_process(args: ProcessArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    let config = load_configuration(&args)?;
    let log_level = args.get_log_level().unwrap_or(config.debug.log_level());
    setup_logging(log_level, args.quiet)?;

    info!("Starting TAF processor");
    debug!("Command line arguments: {:?}", args);
    debug!("Loaded configuration: {:?}", config);
    args.validate()?;

    let registry = load_station_registry(&config.station_location_path)?;
    let mut stats = ProcessingStats {
        stations_loaded: registry.station_count(),
        ..Default::default()
    };

    let decoder = TafDecoder::new(registry)
        .with_station_filter(config.station_filter())
        .with_header_time_fallback(config.use_header_time_fallback);

    let store: Arc<dyn ChunkStore> = if args.dry_run {
        info!("Dry run: records are decoded into memory only");
        Arc::new(MemoryChunkStore::new())
    } else {
        Arc::new(FileChunkStore::new())
    };
    let mut writer = RecordWriter::new(store, WriterConfig::from_config(&config));

    let files = match config.mode {
        InputMode::Realtime => return run_realtime(&config, &decoder, &mut writer),
        InputMode::Archive => {
            let start = args.start.as_ref().map(|t| t.0).unwrap_or(DateTime::<Utc>::MIN_UTC);
            let end = args.end.as_ref().map(|t| t.0).unwrap_or_else(Utc::now);
            scan_archive(&config.input_dir, start, end)?
        }
        InputMode::FileList => expand_file_list(&args.files)?,
    };
    stats.files_found = files.len();
    info!("Processing {} input files", files.len());

    let progress_bar = if args.show_progress() && !files.is_empty() {
        Some(create_progress_bar(files.len() as u64, "Decoding")?)
    } else {
        None
    };

    for file in &files {
        if let Some(pb) = &progress_bar {
            pb.set_message(file_label(file));
        }

        match process_file(file, file.data_time, &config, &decoder, &mut writer) {
            Ok(report) => {
                stats.files_processed += 1;
                if report.write_failed {
                    stats.store_failures += 1;
                }
                stats.messages.merge(&report.stats);
            }
            Err(e) => {
                error!("Failed to read {}: {}", file.path.display(), e);
                stats.files_failed += 1;
            }
        }

        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Processing complete");
    }

    stats.writes = writer.stats().clone();
    stats.processing_time = start_time.elapsed();

    if !args.quiet {
        generate_final_report(&args.output_format, &stats)?;
    }
    Ok(stats)
}

fn file_label(file: &InputFile) -> String {
    file.path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.path.display().to_string())
}

/// Poll the input directory until the process is terminated
fn run_realtime(
    config: &TafConfig,
    decoder: &TafDecoder,
    writer: &mut RecordWriter,
) -> Result<ProcessingStats> {
    info!(
        "Watching {} every {}s for files newer than {}s",
        config.input_dir.display(),
        config.poll_interval_secs,
        config.max_realtime_age_secs
    );
    let mut watcher = RealtimeWatcher::new(
        &config.input_dir,
        Duration::from_secs(config.max_realtime_age_secs),
    );
    let interval = Duration::from_secs(config.poll_interval_secs);

    loop {
        let arrivals = match watcher.poll() {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to scan {}: {}", config.input_dir.display(), e);
                Vec::new()
            }
        };

        for file in &arrivals {
            match process_file(file, Utc::now(), config, decoder, writer) {
                Ok(report) => info!(
                    "{}: {} found, {} decoded, {} failed",
                    file_label(file),
                    report.stats.messages_found,
                    report.stats.messages_decoded,
                    report.stats.messages_failed
                ),
                Err(e) => error!("Failed to read {}: {}", file.path.display(), e),
            }
        }

        trace!("Sleeping {:?} before next scan", interval);
        std::thread::sleep(interval);
    }
}

/// Decode every message in one file and write the file's batch
///
/// Only a failure to read the file is an error; decode problems are counted
/// and a failed write is flagged in the report.
pub fn process_file(
    file: &InputFile,
    reference_time: DateTime<Utc>,
    config: &TafConfig,
    decoder: &TafDecoder,
    writer: &mut RecordWriter,
) -> Result<FileReport> {
    debug!(
        "Processing file {} (data time {})",
        file.path.display(),
        file.data_time
    );
    let messages = read_messages(&file.path)?;
    let mut report = FileReport::default();

    for message in &messages {
        report.stats.messages_found += 1;
        trace!("Got TAF:\n{}", message.text);

        let input = MessageInput::new(&message.text, reference_time)
            .with_header(message.header.as_deref())
            .with_file_time(file.data_time);

        match decoder.decode(&input) {
            Ok(DecodeOutcome::Decoded(record)) => {
                report.stats.messages_decoded += 1;
                if let Err(e) = writer.add_record(&record, message.header.as_deref()) {
                    warn!("Cannot store record for {}: {}", record.station_id, e);
                    report.stats.errors.push(e.to_string());
                }
            }
            Ok(DecodeOutcome::Rejected { station_id }) => {
                debug!("Station {} rejected", station_id);
                report.stats.messages_rejected += 1;
            }
            Err(e) => {
                if config.print_decode_problems {
                    warn!("Cannot decode TAF ({}):\n{}", e, message.text);
                } else {
                    debug!("Cannot decode TAF ({}):\n{}", e, message.text);
                }
                report.stats.record_failure(&e);
            }
        }
    }

    if let Err(e) = writer.flush() {
        error!("Failed to write records from {}: {}", file.path.display(), e);
        report.stats.errors.push(e.to_string());
        report.write_failed = true;
    }

    if config.print_decode_problems {
        info!(
            "Done with {}: {} TAFs found, {} decoded",
            file.path.display(),
            report.stats.messages_found,
            report.stats.messages_decoded
        );
    }
    Ok(report)
}
