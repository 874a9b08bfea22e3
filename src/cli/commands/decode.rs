//! Decode command implementation
//!
//! Decodes a bulletin file or a literal message and prints the records as
//! JSON on stdout. Nothing is written to the chunk store and no station
//! filter is applied.

use super::shared::{ProcessingStats, load_station_registry, read_config_file, setup_logging};
use crate::app::models::ForecastRecord;
use crate::app::services::bulletin_reader::{BulletinMessage, read_messages};
use crate::app::services::input_source::data_time_for;
use crate::app::services::taf_decoder::{DecodeOutcome, FileStats, MessageInput, TafDecoder};
use crate::cli::args::DecodeArgs;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Decode command runner
pub fn run_decode(args: DecodeArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    setup_logging(args.get_log_level(), false)?;
    debug!("Command line arguments: {:?}", args);

    let mut config = read_config_file(args.config_file.as_deref())?;
    if let Some(path) = &args.station_location_path {
        config.station_location_path = path.clone();
    }

    let registry = load_station_registry(&config.station_location_path)?;
    let decoder = TafDecoder::new(registry.clone())
        .with_header_time_fallback(args.use_header_time_fallback || config.use_header_time_fallback);

    let mut stats = ProcessingStats {
        stations_loaded: registry.station_count(),
        ..Default::default()
    };

    let (messages, reference_time) = match (&args.text, &args.input_file) {
        (Some(text), _) => {
            let message = BulletinMessage {
                text: text.trim().trim_end_matches('=').to_string(),
                header: None,
            };
            let reference = args.reference_time.as_ref().map(|t| t.0).unwrap_or_else(Utc::now);
            (vec![message], reference)
        }
        (None, Some(path)) => {
            let messages = read_messages(path)?;
            stats.files_found = 1;
            stats.files_processed = 1;
            let reference = match &args.reference_time {
                Some(t) => t.0,
                None => data_time_for(path)?,
            };
            (messages, reference)
        }
        (None, None) => {
            return Err(Error::configuration("Either a file or --text must be given"));
        }
    };

    let (records, file_stats) = decode_messages(&decoder, &messages, reference_time);
    for record in &records {
        let line = if args.compact {
            serde_json::to_string(record)
        } else {
            serde_json::to_string_pretty(record)
        }
        .map_err(|e| Error::serialization("Failed to render record", e))?;
        println!("{}", line);
    }

    info!(
        "Decoded {} of {} messages",
        file_stats.messages_decoded, file_stats.messages_found
    );
    stats.messages = file_stats;
    stats.processing_time = start_time.elapsed();
    Ok(stats)
}

/// Decode messages against one reference time, collecting the records
pub fn decode_messages(
    decoder: &TafDecoder,
    messages: &[BulletinMessage],
    reference_time: DateTime<Utc>,
) -> (Vec<ForecastRecord>, FileStats) {
    let mut stats = FileStats::default();
    let mut records = Vec::new();

    for message in messages {
        stats.messages_found += 1;
        let input =
            MessageInput::new(&message.text, reference_time).with_header(message.header.as_deref());

        match decoder.decode(&input) {
            Ok(DecodeOutcome::Decoded(record)) => {
                stats.messages_decoded += 1;
                records.push(record);
            }
            Ok(DecodeOutcome::Rejected { station_id }) => {
                debug!("Station {} rejected", station_id);
                stats.messages_rejected += 1;
            }
            Err(e) => {
                warn!("Cannot decode TAF ({}):\n{}", e, message.text);
                stats.record_failure(&e);
            }
        }
    }

    (records, stats)
}
