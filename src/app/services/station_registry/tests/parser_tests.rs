//! Tests for station table line parsing

use crate::app::services::station_registry::parser::parse_station_line;

#[test]
fn test_parse_full_line() {
    let station = parse_station_line("KDEN,39.8617,-104.6731,1656,AIRPORT", 1)
        .unwrap()
        .unwrap();
    assert_eq!(station.station_id, "KDEN");
    assert_eq!(station.latitude, 39.8617);
    assert_eq!(station.longitude, -104.6731);
    assert_eq!(station.elevation_m, 1656.0);
    assert_eq!(station.station_type.as_deref(), Some("AIRPORT"));
}

#[test]
fn test_parse_trims_whitespace() {
    let station = parse_station_line("  KBOU , 40.04 ,-105.22 , 1612  ", 2)
        .unwrap()
        .unwrap();
    assert_eq!(station.station_id, "KBOU");
    assert_eq!(station.elevation_m, 1612.0);
    assert!(station.station_type.is_none());
}

#[test]
fn test_comments_and_blank_lines() {
    assert!(parse_station_line("# header", 1).unwrap().is_none());
    assert!(parse_station_line("   ", 2).unwrap().is_none());
    assert!(parse_station_line("", 3).unwrap().is_none());
}

#[test]
fn test_parse_errors() {
    assert!(parse_station_line("KDEN,39.8", 1).is_err());
    assert!(parse_station_line(",39.8,-104.6,1656", 1).is_err());
    assert!(parse_station_line("KDEN,north,-104.6,1656", 1).is_err());
    assert!(parse_station_line("KDEN,39.8,-200.0,1656", 1).is_err());
    assert!(parse_station_line("KDEN,39.8,-104.6,high", 1).is_err());
}

#[test]
fn test_error_mentions_line_number() {
    let err = parse_station_line("KDEN,39.8", 42).unwrap_err();
    assert!(err.to_string().contains("line 42"));
}
