//! TAF Processor Library
//!
//! A Rust library for decoding Terminal Aerodrome Forecast (TAF) bulletins
//! into structured forecast records and storing them in a time-indexed chunk store.
//!
//! This library provides tools for:
//! - Reading bulletin files and splitting them into individual TAF messages
//! - Decoding messages into forecast periods with wind, visibility, cloud,
//!   weather and temperature fields
//! - Resolving day-only timestamps against a reference time
//! - Loading station locations for O(1) lookups and accept/reject filtering
//! - Writing raw-text and structured records, including cancellation handling
//! - Discovering input files in realtime, archive and file-list modes

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod bulletin_reader;
        pub mod chunk_store;
        pub mod input_source;
        pub mod record_writer;
        pub mod station_registry;
        pub mod taf_decoder;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CloudLayer, ForecastPeriod, ForecastRecord, PeriodKind, StationLocation};
pub use app::services::taf_decoder::{DecodeError, DecodeOutcome, TafDecoder};
pub use config::TafConfig;

/// Result type alias for the TAF processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for startup, configuration, input and storage operations
///
/// Per-message decode failures are reported separately through [`DecodeError`]
/// so that a bad message never aborts a run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Configuration file could not be parsed
    #[error("Configuration file '{path}' could not be parsed")]
    ConfigParsing {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Station registry error
    #[error("Station registry error: {message}")]
    StationRegistry { message: String },

    /// Input file could not be opened or read
    #[error("Input file error in '{path}': {message}")]
    InputFile { path: String, message: String },

    /// Chunk store operation failed
    #[error("Chunk store error at '{url}': {message}")]
    ChunkStore { url: String, message: String },

    /// Record serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a configuration parsing error
    pub fn config_parsing(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::ConfigParsing {
            path: path.into(),
            source,
        }
    }

    /// Create a station registry error
    pub fn station_registry(message: impl Into<String>) -> Self {
        Self::StationRegistry {
            message: message.into(),
        }
    }

    /// Create an input file error
    pub fn input_file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a chunk store error
    pub fn chunk_store(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChunkStore {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a date/time parsing error
    pub fn datetime_parsing(message: impl Into<String>) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON serialization failed".to_string(),
            source: error,
        }
    }
}
