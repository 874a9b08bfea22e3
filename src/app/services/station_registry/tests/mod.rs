//! Shared test utilities and fixtures for station registry tests

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod metadata_tests;
pub mod parser_tests;

/// Station table content covering comments, types and blank lines
pub const TEST_STATION_TABLE: &str = "\
# ICAO,lat,lon,elevation_m,type
KDEN,39.8617,-104.6731,1656,AIRPORT
KBOU, 40.0394, -105.2250, 1612

EGLL,51.4775,-0.4614,25,AIRPORT,INTL
";

/// Write a station table file into `dir`
pub fn create_station_table(dir: &Path, filename: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(filename);
    fs::write(&path, content)?;
    Ok(path)
}

/// Temp dir holding the standard test station table
pub fn create_test_table() -> std::io::Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let path = create_station_table(temp_dir.path(), "stations.txt", TEST_STATION_TABLE)?;
    Ok((temp_dir, path))
}
