//! Chunk assembly for raw-text and structured records

use crate::app::models::ForecastRecord;
use crate::app::services::chunk_store::{Chunk, PutMode, hash_station_id};
use crate::config::CancelHandling;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Raw-text chunk for a decoded message
///
/// Cancellations stored with [`CancelHandling::AddWithIssueTimeAsValidTime`]
/// are keyed at the issue time so the original message stays untouched.
pub fn raw_text_chunk(
    record: &ForecastRecord,
    header: Option<&str>,
    store_header: bool,
    cancel_handling: CancelHandling,
) -> Chunk {
    let mut text = String::new();
    if store_header {
        if let Some(header) = header {
            text.push_str(header);
            text.push('\n');
        }
    }
    text.push_str(&record.raw_text);

    let valid_time = if record.is_cancelled
        && cancel_handling == CancelHandling::AddWithIssueTimeAsValidTime
    {
        record.issue_time
    } else {
        record.valid_time
    };

    Chunk::new(
        hash_station_id(&record.station_id),
        valid_time,
        record.expire_time,
        text,
    )
}

/// Structured chunk carrying the JSON-serialized record
pub fn structured_chunk(record: &ForecastRecord) -> Result<Chunk> {
    let data = serde_json::to_string(record).map_err(|e| {
        Error::serialization(format!("Failed to serialize record for {}", record.station_id), e)
    })?;
    Ok(Chunk::new(
        hash_station_id(&record.station_id),
        record.valid_time,
        record.expire_time,
        data,
    ))
}

/// Put mode for a file's raw-text batch
///
/// Keeping the original alongside its cancellation needs every raw put for
/// the file to be additive; duplicates are suppressed.
pub fn raw_put_mode(cancel_handling: CancelHandling) -> PutMode {
    match cancel_handling {
        CancelHandling::AddWithOriginalValidTime => PutMode::AddUnique,
        CancelHandling::OverwriteOriginal | CancelHandling::AddWithIssueTimeAsValidTime => {
            PutMode::Overwrite
        }
    }
}

/// Mark every not-yet-cancelled record in `chunks` as cancelled
///
/// Chunks are visited newest first. Payloads that do not parse as records are
/// left as they are. Returns the number of records cancelled.
pub fn cancel_chunks(chunks: &mut [Chunk], cancel_time: DateTime<Utc>) -> Result<usize> {
    let mut cancelled = 0;
    for chunk in chunks.iter_mut().rev() {
        let mut candidate: ForecastRecord = match serde_json::from_str(&chunk.data) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable stored record: {}", e);
                continue;
            }
        };
        if candidate.is_cancelled {
            debug!(
                "Record for {} valid {} previously cancelled",
                candidate.station_id, candidate.valid_time
            );
            continue;
        }

        candidate.cancel(cancel_time);
        chunk.data = serde_json::to_string(&candidate)?;
        debug!(
            "Cancelled record for {} valid {} as of {}",
            candidate.station_id, candidate.valid_time, cancel_time
        );
        cancelled += 1;
    }
    Ok(cancelled)
}
