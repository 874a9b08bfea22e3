//! Record writer for decoded TAF messages
//!
//! Collects the raw-text and structured chunks produced while reading one
//! input file and writes them to the chunk store when the file is done.
//! Cancellation messages are handled here: the raw-text store follows the
//! configured [`CancelHandling`] policy, while structured records already
//! stored for the cancelled forecast are rewritten with the cancelled flag.
//!
//! # Architecture
//!
//! - [`assembler`] - chunk construction and cancellation of stored records
//! - [`RecordWriter`] - per-file batches and the store round trips
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taf_processor::app::services::chunk_store::MemoryChunkStore;
//! use taf_processor::app::services::record_writer::{RecordWriter, WriterConfig};
//! use taf_processor::{ForecastRecord, TafConfig};
//!
//! # fn example(records: Vec<ForecastRecord>) -> taf_processor::Result<()> {
//! let config = WriterConfig::from_config(&TafConfig::default());
//! let mut writer = RecordWriter::new(Arc::new(MemoryChunkStore::new()), config);
//! for record in &records {
//!     writer.add_record(record, None)?;
//! }
//! writer.flush()?;
//! # Ok(())
//! # }
//! ```

use crate::app::models::ForecastRecord;
use crate::app::services::chunk_store::{Chunk, ChunkStore, PutMode, hash_station_id};
use crate::config::{CancelHandling, TafConfig};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

pub mod assembler;

#[cfg(test)]
pub mod tests;

pub use assembler::{cancel_chunks, raw_put_mode, raw_text_chunk, structured_chunk};

/// Output settings for the record writer
#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    pub store_raw_text: bool,
    pub raw_text_output_url: String,
    pub store_header: bool,
    pub store_structured: bool,
    pub structured_output_url: String,
    pub cancel_input_url: String,
    pub cancel_handling: CancelHandling,
}

impl WriterConfig {
    pub fn from_config(config: &TafConfig) -> Self {
        Self {
            store_raw_text: config.store_raw_text,
            raw_text_output_url: config.raw_text_output_url.clone(),
            store_header: config.store_header,
            store_structured: config.store_structured,
            structured_output_url: config.structured_output_url.clone(),
            cancel_input_url: config.cancel_input_url().to_string(),
            cancel_handling: config.cancel_handling,
        }
    }
}

/// Counters for chunks written and cancellations applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteStats {
    pub raw_chunks_written: usize,
    pub structured_chunks_written: usize,
    pub records_cancelled: usize,
    pub cancel_targets_missing: usize,
    pub put_failures: usize,
}

/// Batches records for one input file and writes them to the store
pub struct RecordWriter {
    store: Arc<dyn ChunkStore>,
    config: WriterConfig,
    raw_batch: Vec<Chunk>,
    structured_batch: Vec<Chunk>,
    stats: WriteStats,
}

impl RecordWriter {
    pub fn new(store: Arc<dyn ChunkStore>, config: WriterConfig) -> Self {
        Self {
            store,
            config,
            raw_batch: Vec::new(),
            structured_batch: Vec::new(),
            stats: WriteStats::default(),
        }
    }

    /// Queue the chunks for a decoded record
    ///
    /// A cancellation is applied to structured records immediately, both
    /// those stored earlier and those still pending in this file's batch.
    pub fn add_record(&mut self, record: &ForecastRecord, header: Option<&str>) -> Result<()> {
        if self.config.store_raw_text {
            let chunk = raw_text_chunk(
                record,
                header,
                self.config.store_header,
                self.config.cancel_handling,
            );
            trace!(
                "Queued raw-text chunk for {} valid {}",
                record.station_id, chunk.valid_time
            );
            self.raw_batch.push(chunk);
        }

        if self.config.store_structured {
            if record.is_cancelled {
                self.cancel_structured(record);
            } else {
                self.structured_batch.push(structured_chunk(record)?);
            }
        }
        Ok(())
    }

    /// Rewrite structured records matching a cancellation message
    fn cancel_structured(&mut self, cancel: &ForecastRecord) {
        let key = hash_station_id(&cancel.station_id);
        let cancel_time = cancel.issue_time;

        let mut pending: Vec<Chunk> = self
            .structured_batch
            .iter()
            .filter(|c| c.data_type == key && c.valid_time == cancel.valid_time)
            .cloned()
            .collect();
        if !pending.is_empty() {
            match cancel_chunks(&mut pending, cancel_time) {
                Ok(count) => {
                    self.stats.records_cancelled += count;
                    let mut updated = pending.into_iter();
                    for chunk in self
                        .structured_batch
                        .iter_mut()
                        .filter(|c| c.data_type == key && c.valid_time == cancel.valid_time)
                    {
                        if let Some(replacement) = updated.next() {
                            *chunk = replacement;
                        }
                    }
                }
                Err(e) => warn!("Cannot cancel pending record for {}: {}", cancel.station_id, e),
            }
        }

        let mut stored =
            match self
                .store
                .get_exact(&self.config.cancel_input_url, cancel.valid_time, key)
            {
                Ok(chunks) => chunks,
                Err(e) => {
                    warn!(
                        "Cannot retrieve TAF to cancel for {} valid {}: {}",
                        cancel.station_id, cancel.valid_time, e
                    );
                    self.stats.cancel_targets_missing += 1;
                    return;
                }
            };
        if stored.is_empty() {
            debug!(
                "No stored TAF to cancel for {} valid {}",
                cancel.station_id, cancel.valid_time
            );
            self.stats.cancel_targets_missing += 1;
            return;
        }

        let count = match cancel_chunks(&mut stored, cancel_time) {
            Ok(count) => count,
            Err(e) => {
                warn!("Cannot cancel stored record for {}: {}", cancel.station_id, e);
                return;
            }
        };
        if count == 0 {
            return;
        }
        match self
            .store
            .put(&self.config.structured_output_url, &stored, PutMode::Overwrite)
        {
            Ok(()) => {
                info!(
                    "Cancelled {} stored TAF(s) for {} valid {}",
                    count, cancel.station_id, cancel.valid_time
                );
                self.stats.records_cancelled += count;
            }
            Err(e) => {
                warn!("Failed to store cancelled TAF for {}: {}", cancel.station_id, e);
                self.stats.put_failures += 1;
            }
        }
    }

    /// Chunks waiting to be written as `(raw_text, structured)`
    pub fn pending(&self) -> (usize, usize) {
        (self.raw_batch.len(), self.structured_batch.len())
    }

    /// Write both batches to the store
    ///
    /// Both batches are attempted and cleared; the first failure is returned.
    pub fn flush(&mut self) -> Result<()> {
        let mut first_error: Option<Error> = None;

        if !self.raw_batch.is_empty() {
            let raw = std::mem::take(&mut self.raw_batch);
            let mode = raw_put_mode(self.config.cancel_handling);
            match self.store.put(&self.config.raw_text_output_url, &raw, mode) {
                Ok(()) => {
                    debug!(
                        "Wrote {} raw-text chunks to {}",
                        raw.len(),
                        self.config.raw_text_output_url
                    );
                    self.stats.raw_chunks_written += raw.len();
                }
                Err(e) => {
                    self.stats.put_failures += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        if !self.structured_batch.is_empty() {
            let structured = std::mem::take(&mut self.structured_batch);
            match self.store.put(
                &self.config.structured_output_url,
                &structured,
                PutMode::Overwrite,
            ) {
                Ok(()) => {
                    debug!(
                        "Wrote {} structured chunks to {}",
                        structured.len(),
                        self.config.structured_output_url
                    );
                    self.stats.structured_chunks_written += structured.len();
                }
                Err(e) => {
                    self.stats.put_failures += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> &WriteStats {
        &self.stats
    }
}
