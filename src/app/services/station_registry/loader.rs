//! Station registry loading from the station location table

use super::StationRegistry;
use super::metadata::LoadStats;
use super::parser::parse_station_line;
use crate::{Error, Result};
use std::collections::hash_map::Entry;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

impl StationRegistry {
    /// Load station locations from a table file
    ///
    /// Malformed lines and duplicate identifiers are logged and skipped; the
    /// first occurrence of a station wins.
    ///
    /// # Errors
    /// * Returns `Error::Io` if the file cannot be read
    /// * Returns `Error::StationRegistry` if no station could be loaded
    pub fn load_from_file(path: &Path) -> Result<(Self, LoadStats)> {
        info!("Loading station locations from {}", path.display());

        let start_time = Instant::now();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read station location file {}", path.display()),
                e,
            )
        })?;

        let mut registry = Self::new(path.to_path_buf());
        let mut stats = LoadStats::new();

        for (index, line) in content.lines().enumerate() {
            stats.lines_read += 1;
            let station = match parse_station_line(line, index + 1) {
                Ok(Some(station)) => station,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping station table entry: {}", e);
                    stats.malformed_lines += 1;
                    stats.errors.push(e.to_string());
                    continue;
                }
            };

            match registry.stations.entry(station.station_id.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(station);
                    stats.stations_loaded += 1;
                }
                Entry::Occupied(_) => {
                    warn!(
                        "Duplicate station found: {} at line {}, keeping existing",
                        station.station_id,
                        index + 1
                    );
                    stats.duplicates += 1;
                }
            }
        }

        stats.load_duration = start_time.elapsed();
        registry.load_time = Instant::now();

        if registry.station_count() == 0 {
            return Err(Error::station_registry(format!(
                "No stations found in {}",
                path.display()
            )));
        }

        debug!("{}", stats.summary());
        info!(
            "Loaded {} stations from {}",
            registry.station_count(),
            path.display()
        );

        Ok((registry, stats))
    }
}
