//! Station registry service for O(1) station location lookups
//!
//! This module loads the station location table once at startup and provides
//! O(1) access by ICAO identifier. It also carries the accept/reject lists
//! that decide which decoded stations are stored.

use crate::app::models::StationLocation;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

pub mod filter;
pub mod loader;
pub mod metadata;
pub mod parser;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use filter::StationFilter;
pub use metadata::{LoadStats, RegistryMetadata};

/// Station registry providing O(1) station location lookups
#[derive(Debug, Clone)]
pub struct StationRegistry {
    /// Station locations indexed by station identifier
    pub(crate) stations: HashMap<String, StationLocation>,

    /// Path to the station location table
    pub(crate) source_path: PathBuf,

    /// Timestamp when the registry was loaded
    pub(crate) load_time: Instant,
}

impl StationRegistry {
    /// Create a new empty station registry
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            stations: HashMap::new(),
            source_path,
            load_time: Instant::now(),
        }
    }

    /// Build a registry directly from station locations
    pub fn from_stations(stations: impl IntoIterator<Item = StationLocation>) -> Self {
        let mut registry = Self::new(PathBuf::new());
        for station in stations {
            registry.stations.insert(station.station_id.clone(), station);
        }
        registry
    }

    /// Get a station location by identifier (O(1) lookup)
    pub fn lookup(&self, station_id: &str) -> Option<&StationLocation> {
        self.stations.get(station_id)
    }

    /// Check if a station exists in the registry
    pub fn contains_station(&self, station_id: &str) -> bool {
        self.stations.contains_key(station_id)
    }

    /// Get the total number of stations in the registry
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Get registry metadata
    pub fn metadata(&self) -> RegistryMetadata {
        RegistryMetadata {
            source_path: self.source_path.clone(),
            station_count: self.stations.len(),
            load_time: self.load_time,
        }
    }
}
