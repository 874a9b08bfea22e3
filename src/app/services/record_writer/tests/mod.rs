//! Shared fixtures for record writer tests

use crate::app::models::{ForecastRecord, StationLocation};
use crate::app::services::chunk_store::MemoryChunkStore;
use crate::config::CancelHandling;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use super::{RecordWriter, WriterConfig};

pub mod writer_tests;

pub const RAW_URL: &str = "spdb/taf/ascii";
pub const STRUCTURED_URL: &str = "spdb/taf/decoded";
pub const TEST_HEADER: &str = "FTUS45 KBOU 261120";

pub fn march(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
}

pub fn create_writer_config(cancel_handling: CancelHandling) -> WriterConfig {
    WriterConfig {
        store_raw_text: true,
        raw_text_output_url: RAW_URL.to_string(),
        store_header: false,
        store_structured: true,
        structured_output_url: STRUCTURED_URL.to_string(),
        cancel_input_url: STRUCTURED_URL.to_string(),
        cancel_handling,
    }
}

pub fn create_test_writer(config: WriterConfig) -> (Arc<MemoryChunkStore>, RecordWriter) {
    let store = Arc::new(MemoryChunkStore::new());
    let writer = RecordWriter::new(store.clone(), config);
    (store, writer)
}

/// Forecast for KDEN issued 26/1130Z, valid 26/12Z to 27/12Z
pub fn create_test_record() -> ForecastRecord {
    let location = StationLocation::new("KDEN", 39.8617, -104.6731, 1656.0);
    let mut record = ForecastRecord::new(
        &location,
        march(26, 11, 30),
        "TAF KDEN 261130Z 2612/2712 09008KT P6SM SKC",
    );
    record.valid_time = march(26, 12, 0);
    record.expire_time = march(27, 12, 0);
    record
}

/// Cancellation of the test record, issued 26/1400Z
pub fn create_cancel_record() -> ForecastRecord {
    let mut record = create_test_record();
    record.issue_time = march(26, 14, 0);
    record.raw_text = "TAF AMD KDEN 261400Z 2612/2712 CNL".to_string();
    record.is_amended = true;
    record.cancel(record.issue_time);
    record
}
