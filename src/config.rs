//! Configuration management and validation.
//!
//! Provides the ingest configuration: input discovery mode, station table
//! location, output stores, cancellation policy and station filtering.
//! Configuration is read from a YAML file; any key left out takes its
//! default, and a missing file means all defaults.

use crate::app::services::station_registry::StationFilter;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_MAX_REALTIME_AGE_SECS, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_RAW_TEXT_URL, DEFAULT_STATION_LOCATION_PATH, DEFAULT_STRUCTURED_URL,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How input files are discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Poll the input directory for newly arrived files
    Realtime,
    /// Walk the input directory for files in a time window
    Archive,
    /// Process an explicit list of files
    FileList,
}

/// What happens to the raw-text store when a cancellation arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelHandling {
    /// Replace the original message at its valid time
    OverwriteOriginal,
    /// Keep the original and add the cancel message at the same valid time
    AddWithOriginalValidTime,
    /// Store the cancel message with its issue time as valid time
    AddWithIssueTimeAsValidTime,
}

/// Diagnostic verbosity, mapped onto tracing levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugLevel {
    None,
    Norm,
    Verbose,
    Extra,
}

impl DebugLevel {
    /// Tracing level name for this debug setting
    pub fn log_level(&self) -> &'static str {
        match self {
            DebugLevel::None => "warn",
            DebugLevel::Norm => "info",
            DebugLevel::Verbose => "debug",
            DebugLevel::Extra => "trace",
        }
    }
}

/// Global configuration for TAF ingest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TafConfig {
    /// Input discovery mode
    pub mode: InputMode,

    /// Directory scanned in realtime and archive modes
    pub input_dir: PathBuf,

    /// Realtime files older than this are ignored
    pub max_realtime_age_secs: u64,

    /// Delay between realtime directory scans
    pub poll_interval_secs: u64,

    /// Station location table
    pub station_location_path: PathBuf,

    /// Store the raw message text
    pub store_raw_text: bool,

    /// Raw-text chunk store location
    pub raw_text_output_url: String,

    /// Prefix raw text with the bulletin header line
    pub store_header: bool,

    /// Store the decoded records
    pub store_structured: bool,

    /// Structured chunk store location
    pub structured_output_url: String,

    /// Store read when cancelling earlier records (defaults to the structured store)
    pub cancel_input_url: Option<String>,

    /// Raw-text cancellation policy
    pub cancel_handling: CancelHandling,

    /// Stations to store; `None` accepts every station
    pub accepted_stations: Option<Vec<String>>,

    /// Stations never stored
    pub rejected_stations: Vec<String>,

    /// Use the bulletin header (or file time) when the issue time is missing
    pub use_header_time_fallback: bool,

    /// Diagnostic verbosity
    pub debug: DebugLevel,

    /// Log every message that fails to decode at warn level
    pub print_decode_problems: bool,
}

impl Default for TafConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::Archive,
            input_dir: PathBuf::from("raw/taf"),
            max_realtime_age_secs: DEFAULT_MAX_REALTIME_AGE_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            station_location_path: PathBuf::from(DEFAULT_STATION_LOCATION_PATH),
            store_raw_text: true,
            raw_text_output_url: DEFAULT_RAW_TEXT_URL.to_string(),
            store_header: false,
            store_structured: true,
            structured_output_url: DEFAULT_STRUCTURED_URL.to_string(),
            cancel_input_url: None,
            cancel_handling: CancelHandling::OverwriteOriginal,
            accepted_stations: None,
            rejected_stations: Vec::new(),
            use_header_time_fallback: false,
            debug: DebugLevel::None,
            print_decode_problems: false,
        }
    }
}

impl TafConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config file {}", path.display()), e))?;
        let config: TafConfig = serde_yaml::from_str(&contents)
            .map_err(|e| Error::config_parsing(path.display().to_string(), e))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Default config file location under the user's config directory
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Check the configuration for settings that cannot work together
    pub fn validate(&self) -> Result<()> {
        if self.store_raw_text && self.raw_text_output_url.trim().is_empty() {
            return Err(Error::configuration(
                "raw_text_output_url must be set when store_raw_text is enabled",
            ));
        }
        if self.store_structured && self.structured_output_url.trim().is_empty() {
            return Err(Error::configuration(
                "structured_output_url must be set when store_structured is enabled",
            ));
        }
        if self.mode == InputMode::Realtime && self.poll_interval_secs == 0 {
            return Err(Error::configuration(
                "poll_interval_secs must be greater than zero in realtime mode",
            ));
        }
        if self.station_location_path.as_os_str().is_empty() {
            return Err(Error::configuration("station_location_path must be set"));
        }
        if let Some(accepted) = &self.accepted_stations {
            if let Some(id) = accepted.iter().find(|id| self.rejected_stations.contains(id)) {
                return Err(Error::configuration(format!(
                    "station {} is both accepted and rejected",
                    id
                )));
            }
        }
        Ok(())
    }

    /// Store read when cancelling earlier structured records
    pub fn cancel_input_url(&self) -> &str {
        self.cancel_input_url
            .as_deref()
            .unwrap_or(&self.structured_output_url)
    }

    /// Station filter built from the accept/reject lists
    pub fn station_filter(&self) -> StationFilter {
        StationFilter::new(self.accepted_stations.clone(), self.rejected_stations.clone())
    }

    /// Set the input discovery mode
    pub fn with_mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the input directory
    pub fn with_input_dir(mut self, input_dir: impl Into<PathBuf>) -> Self {
        self.input_dir = input_dir.into();
        self
    }

    /// Set the station location table path
    pub fn with_station_location_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.station_location_path = path.into();
        self
    }

    /// Point both output stores at a common root directory
    pub fn with_output_root(mut self, root: &Path) -> Self {
        self.raw_text_output_url = root.join(DEFAULT_RAW_TEXT_URL).display().to_string();
        self.structured_output_url = root.join(DEFAULT_STRUCTURED_URL).display().to_string();
        self
    }

    /// Set the raw-text cancellation policy
    pub fn with_cancel_handling(mut self, cancel_handling: CancelHandling) -> Self {
        self.cancel_handling = cancel_handling;
        self
    }

    /// Prefix raw text with the bulletin header
    pub fn with_header(mut self) -> Self {
        self.store_header = true;
        self
    }

    /// Enable the header/file time fallback for missing issue times
    pub fn with_header_time_fallback(mut self) -> Self {
        self.use_header_time_fallback = true;
        self
    }

    /// Set the diagnostic level
    pub fn with_debug(mut self, debug: DebugLevel) -> Self {
        self.debug = debug;
        self
    }
}
