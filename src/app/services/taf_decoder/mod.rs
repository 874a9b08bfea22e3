//! TAF decoder for Terminal Aerodrome Forecast messages
//!
//! This module turns free-form TAF text into a [`ForecastRecord`]: station,
//! issue/valid/expire times and a sequence of forecast periods carrying wind,
//! visibility, cloud, weather and temperature groups. Malformed input is
//! tolerated wherever a sensible record can still be built.
//!
//! ## Architecture
//!
//! The decoder is organized as a sequence of passes over one token ledger:
//! - [`tokenizer`] - Message normalization, tokens and the consumed-token ledger
//! - [`time_resolver`] - Day/hour/minute resolution against a reference time
//! - [`anchors`] - TAF marker, flags, station, issue and validity anchors
//! - [`periods`] - Change group segmentation into forecast periods
//! - [`fields`] - Per-period wind, visibility, cloud, weather and temperatures
//! - [`propagation`] - Carry-forward of prevailing conditions
//! - [`decoder`] - Orchestration and station lookup
//! - [`field_parsers`] - Lenient fixed-width scanning helpers
//! - [`stats`] - Per-file message statistics
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::{TimeZone, Utc};
//! use taf_processor::app::services::station_registry::StationRegistry;
//! use taf_processor::app::services::taf_decoder::{MessageInput, TafDecoder};
//! use taf_processor::StationLocation;
//!
//! let registry = StationRegistry::from_stations(vec![StationLocation::new(
//!     "KDEN", 39.8617, -104.6731, 1656.0,
//! )]);
//! let decoder = TafDecoder::new(Arc::new(registry));
//!
//! let reference = Utc.with_ymd_and_hms(2024, 3, 26, 12, 0, 0).unwrap();
//! let input = MessageInput::new("TAF KDEN 261130Z 2612/2712 09008KT P6SM SKC", reference);
//! let record = decoder.decode(&input).unwrap().into_record().unwrap();
//!
//! assert_eq!(record.station_id, "KDEN");
//! assert_eq!(record.periods.len(), 1);
//! ```
//!
//! [`ForecastRecord`]: crate::app::models::ForecastRecord

pub mod anchors;
pub mod decoder;
pub mod error;
pub mod field_parsers;
pub mod fields;
pub mod periods;
pub mod propagation;
pub mod stats;
pub mod time_resolver;
pub mod tokenizer;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use decoder::{DecodeContext, DecodeOutcome, MessageInput, TafDecoder};
pub use error::DecodeError;
pub use stats::FileStats;
pub use time_resolver::TimeResolver;
