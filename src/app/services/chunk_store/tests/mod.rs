//! Shared fixtures for chunk store tests

use super::Chunk;
use chrono::{DateTime, TimeZone, Utc};


pub const TEST_URL: &str = "spdb/taf/ascii";

/// Valid time on the test day
pub fn at_hour(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 26, hour, 0, 0).unwrap()
}

/// Chunk for `station_key` valid at `hour`, expiring a day later
pub fn create_test_chunk(station_key: i32, hour: u32, data: &str) -> Chunk {
    let valid = at_hour(hour);
    Chunk::new(station_key, valid, valid + chrono::Duration::hours(24), data)
}
