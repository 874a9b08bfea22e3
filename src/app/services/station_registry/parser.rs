//! Station location table line parsing
//!
//! Each non-comment line holds `ID,lat,lon,elevation_m[,type...]`. Lines
//! starting with `#` and blank lines carry no station.

use crate::app::models::StationLocation;
use crate::{Error, Result};

/// Comment marker for the station location table
const COMMENT_PREFIX: char = '#';

/// Parse one line of the station location table
///
/// Returns `Ok(None)` for comments and blank lines.
pub fn parse_station_line(line: &str, line_number: usize) -> Result<Option<StationLocation>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(Error::station_registry(format!(
            "line {}: expected 'ID,lat,lon,elevation', found '{}'",
            line_number, line
        )));
    }

    let station_id = fields[0];
    if station_id.is_empty() {
        return Err(Error::station_registry(format!(
            "line {}: empty station identifier",
            line_number
        )));
    }

    let latitude = parse_coordinate(fields[1], "latitude", 90.0, line_number)?;
    let longitude = parse_coordinate(fields[2], "longitude", 180.0, line_number)?;
    let elevation_m: f64 = fields[3].parse().map_err(|_| {
        Error::station_registry(format!(
            "line {}: invalid elevation '{}'",
            line_number, fields[3]
        ))
    })?;

    let mut location = StationLocation::new(station_id, latitude, longitude, elevation_m);
    let station_type = fields[4..].join(",");
    if !station_type.is_empty() {
        location.station_type = Some(station_type);
    }
    Ok(Some(location))
}

fn parse_coordinate(value: &str, name: &str, limit: f64, line_number: usize) -> Result<f64> {
    let parsed: f64 = value.parse().map_err(|_| {
        Error::station_registry(format!("line {}: invalid {} '{}'", line_number, name, value))
    })?;
    if !(-limit..=limit).contains(&parsed) {
        return Err(Error::station_registry(format!(
            "line {}: {} {} out of range",
            line_number, name, parsed
        )));
    }
    Ok(parsed)
}
