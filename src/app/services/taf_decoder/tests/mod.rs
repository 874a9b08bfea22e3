//! Test utilities and fixtures for TAF decoder testing
//!
//! This module provides the station registry, reference time and sample
//! messages shared by the decoder test modules.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use super::{DecodeOutcome, MessageInput, TafDecoder};
use crate::app::models::{ForecastRecord, StationLocation};
use crate::app::services::station_registry::StationRegistry;

mod propagation_tests;

/// Single Main period, US style
pub const EXAMPLE_MAIN_ONLY: &str = "TAF KDEN 261130Z 2612/2712 09008KT P6SM SKC";

/// Main period followed by one From group
pub const EXAMPLE_WITH_FROM: &str =
    "TAF KDEN 261130Z 2612/2712 09008KT P6SM SKC FM261800 18015G25KT 3SM BKN015";

/// Cancellation of an earlier forecast
pub const EXAMPLE_CANCELLED: &str = "TAF KDEN 261130Z 2612/2712 CNL";

/// No issue time token
pub const EXAMPLE_NO_ISSUE_TIME: &str = "TAF KDEN 2612/2712 09008KT P6SM SKC";

/// Every change group kind, with local overlays between prevailing periods
pub const EXAMPLE_ALL_GROUPS: &str = "TAF AMD KDEN 261130Z 2612/2712 09008KT P6SM SKC \
     TEMPO 2614/2616 3SM TSRA BECMG 2618/2620 BKN030 \
     PROB30 2620/2622 1SM +TSRA FM270000 25010KT TX18/2621Z TNM02/2710Z";

/// Bulletin header matching the reference day
pub const TEST_HEADER: &str = "FTUS45 KBOU 261120";

/// Reference time all fixtures are decoded against
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 26, 12, 0, 0).unwrap()
}

/// Time on the reference month
pub fn march(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
}

/// Registry with a few US and UK stations
pub fn create_test_registry() -> Arc<StationRegistry> {
    Arc::new(StationRegistry::from_stations(vec![
        StationLocation::new("KDEN", 39.8617, -104.6731, 1656.0),
        StationLocation::new("KBOU", 40.0394, -105.2250, 1612.0),
        StationLocation::new("EGLL", 51.4775, -0.4614, 25.0),
    ]))
}

/// Decoder over the test registry with default options
pub fn create_test_decoder() -> TafDecoder {
    TafDecoder::new(create_test_registry())
}

/// Decode a message against the reference time, expecting a record
pub fn decode_record(decoder: &TafDecoder, text: &str) -> ForecastRecord {
    let input = MessageInput::new(text, reference_time());
    match decoder.decode(&input) {
        Ok(DecodeOutcome::Decoded(record)) => record,
        other => panic!("expected a decoded record for '{}', got {:?}", text, other),
    }
}

pub fn approx_eq(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 1e-3)
}
