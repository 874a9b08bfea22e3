//! Tests for load statistics and registry metadata

use crate::app::services::station_registry::{LoadStats, RegistryMetadata, StationRegistry};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[test]
fn test_load_stats_new() {
    let stats = LoadStats::new();
    assert_eq!(stats.lines_read, 0);
    assert_eq!(stats.stations_loaded, 0);
    assert!(!stats.has_errors());
    assert_eq!(stats.loading_rate(), 0.0);
}

#[test]
fn test_load_stats_calculations() {
    let mut stats = LoadStats::new();
    stats.stations_loaded = 800;
    stats.load_duration = Duration::from_secs(4);
    assert_eq!(stats.loading_rate(), 200.0);

    stats.errors.push("line 3: bad".to_string());
    assert!(stats.has_errors());
}

#[test]
fn test_load_stats_summary() {
    let mut stats = LoadStats::new();
    stats.lines_read = 120;
    stats.stations_loaded = 110;
    stats.malformed_lines = 2;
    stats.duplicates = 3;
    stats.load_duration = Duration::from_millis(1500);

    let summary = stats.summary();
    assert!(summary.contains("120 lines"));
    assert!(summary.contains("110 stations"));
    assert!(summary.contains("2 malformed"));
    assert!(summary.contains("3 duplicates"));
    assert!(summary.contains("1.50s"));
}

#[test]
fn test_registry_metadata() {
    let metadata = RegistryMetadata {
        source_path: PathBuf::from("/test/stations.txt"),
        station_count: 500,
        load_time: Instant::now(),
    };

    assert!(metadata.age().as_millis() < 1000);
    let summary = metadata.summary();
    assert!(summary.contains("500 stations"));
    assert!(summary.contains("/test/stations.txt"));
}

#[test]
fn test_registry_reports_metadata() {
    let registry = StationRegistry::from_stations(vec![
        crate::StationLocation::new("KDEN", 39.86, -104.67, 1656.0),
        crate::StationLocation::new("KBOU", 40.04, -105.22, 1612.0),
    ]);
    assert_eq!(registry.metadata().station_count, 2);
}
