//! Data models for TAF processing
//!
//! This module contains the core data structures for representing decoded
//! Terminal Aerodrome Forecasts and the station locations they are tied to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Station Location
// =============================================================================

/// Location of a forecast station, as loaded from the station location table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationLocation {
    /// Four-letter ICAO identifier (e.g., "KDEN")
    pub station_id: String,

    /// Latitude in WGS84 decimal degrees
    pub latitude: f64,

    /// Longitude in WGS84 decimal degrees
    pub longitude: f64,

    /// Station elevation above sea level in meters
    pub elevation_m: f64,

    /// Free-form station type column, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_type: Option<String>,
}

impl StationLocation {
    pub fn new(station_id: impl Into<String>, latitude: f64, longitude: f64, elevation_m: f64) -> Self {
        Self {
            station_id: station_id.into(),
            latitude,
            longitude,
            elevation_m,
            station_type: None,
        }
    }
}

// =============================================================================
// Forecast Periods
// =============================================================================

/// Kind of a forecast period, determined by the change group that opens it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Unmarked initial period of the forecast
    Main,
    /// `FMddhhmm`: conditions from an instant onward
    From,
    /// `BECMG ddhh/ddhh`: gradual change over a window
    Becmg,
    /// `TEMPO`/`INTER ddhh/ddhh`: temporary fluctuations
    Tempo,
    /// `PROBnn ddhh/ddhh`: probability-qualified conditions
    Prob,
}

impl PeriodKind {
    /// Local overlays apply only within their own window and never carry
    /// conditions into later periods
    pub fn is_local(&self) -> bool {
        matches!(self, PeriodKind::Tempo | PeriodKind::Prob)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Main => "MAIN",
            PeriodKind::From => "FROM",
            PeriodKind::Becmg => "BECMG",
            PeriodKind::Tempo => "TEMPO",
            PeriodKind::Prob => "PROB",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cloud layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudLayer {
    /// Layer base height in km
    pub height_km: f64,

    /// Fraction of sky covered (0.25 FEW, 0.5 SCT, 0.75 BKN, 1.0 OVC)
    pub coverage: f64,

    /// Layer contains cumulonimbus
    pub has_cumulonimbus: bool,
}

/// Forecast conditions for one time-bounded period of a TAF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub kind: PeriodKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_percent: Option<u32>,

    /// Wind direction in degrees true; `None` when variable or unknown
    pub wind_dir_deg: Option<f64>,
    pub wind_variable: bool,
    pub wind_speed_kmh: Option<f64>,
    pub wind_gust_kmh: Option<f64>,

    pub visibility_km: Option<f64>,
    pub is_cavok: bool,

    pub ceiling_km: Option<f64>,
    pub cloud_layers: Vec<CloudLayer>,

    /// Weather groups as they appear in the message
    pub weather: Vec<String>,

    pub max_temp_c: Option<f64>,
    pub max_temp_time: Option<DateTime<Utc>>,
    pub min_temp_c: Option<f64>,
    pub min_temp_time: Option<DateTime<Utc>>,

    /// Source text of the period, marker tokens included
    pub text: String,
}

impl ForecastPeriod {
    /// Create an empty period of the given kind and time window
    pub fn new(kind: PeriodKind, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            kind,
            start_time,
            end_time,
            probability_percent: None,
            wind_dir_deg: None,
            wind_variable: false,
            wind_speed_kmh: None,
            wind_gust_kmh: None,
            visibility_km: None,
            is_cavok: false,
            ceiling_km: None,
            cloud_layers: Vec::new(),
            weather: Vec::new(),
            max_temp_c: None,
            max_temp_time: None,
            min_temp_c: None,
            min_temp_time: None,
            text: String::new(),
        }
    }
}

// =============================================================================
// Forecast Record
// =============================================================================

/// A fully decoded TAF, ready for storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,

    pub issue_time: DateTime<Utc>,
    pub valid_time: DateTime<Utc>,
    pub expire_time: DateTime<Utc>,

    pub is_amended: bool,
    pub is_corrected: bool,
    pub is_nil: bool,
    pub is_cancelled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_time: Option<DateTime<Utc>>,

    pub periods: Vec<ForecastPeriod>,

    /// Message text as received
    pub raw_text: String,
}

impl ForecastRecord {
    /// Start a record for a located station; all times default to `base_time`
    pub fn new(
        location: &StationLocation,
        base_time: DateTime<Utc>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            station_id: location.station_id.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            elevation_m: location.elevation_m,
            issue_time: base_time,
            valid_time: base_time,
            expire_time: base_time,
            is_amended: false,
            is_corrected: false,
            is_nil: false,
            is_cancelled: false,
            cancel_time: None,
            periods: Vec::new(),
            raw_text: raw_text.into(),
        }
    }

    /// Mark the record cancelled as of `cancel_time`
    pub fn cancel(&mut self, cancel_time: DateTime<Utc>) {
        self.is_cancelled = true;
        self.cancel_time = Some(cancel_time);
    }

    /// The Main period, when the record carries forecast periods
    pub fn main_period(&self) -> Option<&ForecastPeriod> {
        self.periods.first().filter(|p| p.kind == PeriodKind::Main)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kden() -> StationLocation {
        StationLocation::new("KDEN", 39.8617, -104.6731, 1656.0)
    }

    #[test]
    fn test_local_period_kinds() {
        assert!(PeriodKind::Tempo.is_local());
        assert!(PeriodKind::Prob.is_local());
        assert!(!PeriodKind::Main.is_local());
        assert!(!PeriodKind::From.is_local());
        assert!(!PeriodKind::Becmg.is_local());
    }

    #[test]
    fn test_record_cancel() {
        let base = Utc.with_ymd_and_hms(2024, 3, 26, 11, 30, 0).unwrap();
        let mut record = ForecastRecord::new(&kden(), base, "TAF KDEN ...");
        assert!(!record.is_cancelled);

        let cancel_time = Utc.with_ymd_and_hms(2024, 3, 26, 14, 0, 0).unwrap();
        record.cancel(cancel_time);
        assert!(record.is_cancelled);
        assert_eq!(record.cancel_time, Some(cancel_time));
    }

    #[test]
    fn test_record_json_shape() {
        let base = Utc.with_ymd_and_hms(2024, 3, 26, 11, 30, 0).unwrap();
        let mut record = ForecastRecord::new(&kden(), base, "TAF KDEN");
        record
            .periods
            .push(ForecastPeriod::new(PeriodKind::Main, base, base));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["station_id"], "KDEN");
        assert_eq!(json["periods"][0]["kind"], "main");
        assert!(json.get("cancel_time").is_none());

        let back: ForecastRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
