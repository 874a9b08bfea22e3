//! Station registry metadata and statistics tracking
//!
//! This module defines the data structures and functionality for tracking
//! station table loading statistics and registry metadata.

use std::path::PathBuf;
use std::time::Instant;

/// Statistics about the station table loading process
#[derive(Debug, Clone)]
pub struct LoadStats {
    /// Number of lines read, comments and blanks included
    pub lines_read: usize,

    /// Number of stations loaded into the registry
    pub stations_loaded: usize,

    /// Number of lines that could not be parsed
    pub malformed_lines: usize,

    /// Number of duplicate station identifiers skipped
    pub duplicates: usize,

    /// Time taken to load the registry
    pub load_duration: std::time::Duration,

    /// Any errors encountered during loading
    pub errors: Vec<String>,
}

impl LoadStats {
    /// Create new empty load statistics
    pub fn new() -> Self {
        Self {
            lines_read: 0,
            stations_loaded: 0,
            malformed_lines: 0,
            duplicates: 0,
            load_duration: std::time::Duration::ZERO,
            errors: Vec::new(),
        }
    }

    /// Calculate the loading rate in stations per second
    pub fn loading_rate(&self) -> f64 {
        if self.load_duration.is_zero() {
            0.0
        } else {
            self.stations_loaded as f64 / self.load_duration.as_secs_f64()
        }
    }

    /// Check if any errors occurred during loading
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get a summary string of the loading process
    pub fn summary(&self) -> String {
        format!(
            "Read {} lines, loaded {} stations ({} malformed, {} duplicates) in {:.2}s",
            self.lines_read,
            self.stations_loaded,
            self.malformed_lines,
            self.duplicates,
            self.load_duration.as_secs_f64()
        )
    }
}

impl Default for LoadStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata about the station registry
#[derive(Debug, Clone)]
pub struct RegistryMetadata {
    /// Path to the station location table
    pub source_path: PathBuf,

    /// Total number of stations in registry
    pub station_count: usize,

    /// When the registry was loaded
    pub load_time: Instant,
}

impl RegistryMetadata {
    /// Get the age of the registry since loading
    pub fn age(&self) -> std::time::Duration {
        self.load_time.elapsed()
    }

    /// Get a summary string of the registry
    pub fn summary(&self) -> String {
        format!(
            "Registry with {} stations from {} (age: {:.1}s)",
            self.station_count,
            self.source_path.display(),
            self.age().as_secs_f64()
        )
    }
}
