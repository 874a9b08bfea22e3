//! Application constants for the TAF processor
//!
//! This module contains unit conversion factors, TAF marker tokens, the weather
//! phenomenon vocabulary and the default values used throughout the application.

// =============================================================================
// Unit Conversions
// =============================================================================

/// Kilometres per nautical mile (knots to km/h)
pub const KM_PER_NM: f64 = 1.852;

/// Km/h per metre per second
pub const KMH_PER_MPS: f64 = 3.6;

/// Kilometres per statute mile
pub const KM_PER_MI: f64 = 1.609344;

/// Kilometres per foot
pub const FEET_TO_KM: f64 = 0.0003048;

/// Visibility reported for CAVOK and P6SM, in km
pub const MAX_VISIBILITY_KM: f64 = 9.999;

/// Ceiling used when no BKN/OVC layer is present (10,000 ft), in km
pub const UNLIMITED_CEILING_KM: f64 = 10_000.0 * FEET_TO_KM;

/// Coverage above which a cloud layer forms a ceiling (BKN and OVC)
pub const CEILING_COVERAGE_THRESHOLD: f64 = 0.6;

// =============================================================================
// TAF Markers
// =============================================================================

/// TAF message tokens with fixed meaning
pub mod markers {
    pub const TAF: &str = "TAF";
    pub const AMENDED: &str = "AMD";
    pub const CORRECTED: &str = "COR";
    pub const NIL: &str = "NIL";
    pub const CANCELLED: &str = "CNL";

    pub const TEMPO: &str = "TEMPO";
    pub const INTER: &str = "INTER";
    pub const BECMG: &str = "BECMG";
    pub const FROM_PREFIX: &str = "FM";
    pub const PROB_PREFIX: &str = "PROB";

    pub const CAVOK: &str = "CAVOK";
    pub const VARIABLE_WIND: &str = "VRB";

    /// Synthetic weather entry added when a cumulonimbus layer is forecast
    pub const CUMULONIMBUS: &str = "CB";
}

/// Wind speed units recognised in the wind group, with their km/h factors
pub const WIND_UNITS: &[(&str, f64)] = &[("KMH", 1.0), ("KT", KM_PER_NM), ("MPS", KMH_PER_MPS)];

/// Cloud cover codes with their coverage fraction
pub const CLOUD_COVER_CODES: &[(&str, f64)] =
    &[("FEW", 0.25), ("SCT", 0.5), ("BKN", 0.75), ("OVC", 1.0)];

/// Two-letter weather phenomenon codes; a weather group is built from these
pub const WEATHER_PHENOMENA: &[&str] = &[
    // descriptors
    "MI", "BC", "PR", "DR", "BL", "SH", "TS", "FZ",
    // precipitation
    "DZ", "RA", "SN", "SG", "IC", "PL", "GR", "GS", "UP",
    // obscuration
    "BR", "FG", "FU", "VA", "DU", "SA", "HZ", "PY",
    // other
    "PO", "SQ", "FC", "SS", "DS",
];

/// No significant weather
pub const NO_SIGNIFICANT_WEATHER: &str = "NSW";

// =============================================================================
// Storage
// =============================================================================

/// Chunk store data type used when a station identifier hashes to zero
pub const NONZERO_HASH_FALLBACK: i32 = 1;

/// File extension for directory-backed chunk store entries
pub const CHUNK_FILE_EXTENSION: &str = "json";

// =============================================================================
// Processing Configuration Defaults
// =============================================================================

/// Default age limit for realtime input files, in seconds
pub const DEFAULT_MAX_REALTIME_AGE_SECS: u64 = 3600;

/// Default realtime polling interval, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default raw-text output location
pub const DEFAULT_RAW_TEXT_URL: &str = "spdb/taf/ascii";

/// Default structured output location
pub const DEFAULT_STRUCTURED_URL: &str = "spdb/taf/decoded";

/// Default station location table
pub const DEFAULT_STATION_LOCATION_PATH: &str = "stations/station_locations.txt";

/// Default config file name under the user config directory
pub const CONFIG_DIR_NAME: &str = "taf-processor";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

// =============================================================================
// Helper Functions
// =============================================================================

/// Look up the coverage fraction for a cloud cover code
pub fn cloud_coverage(code: &str) -> Option<f64> {
    CLOUD_COVER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, coverage)| *coverage)
}

/// Check if a token is a weather group
///
/// An optional `+`/`-` intensity and `VC` proximity prefix is followed by
/// one or more phenomenon codes, or the token is `NSW`.
pub fn is_weather_token(token: &str) -> bool {
    if token == NO_SIGNIFICANT_WEATHER {
        return true;
    }
    let body = token.strip_prefix(['+', '-']).unwrap_or(token);
    let body = body.strip_prefix("VC").unwrap_or(body);
    if body.is_empty() || body.len() % 2 != 0 || !body.is_ascii() {
        return false;
    }
    (0..body.len())
        .step_by(2)
        .all(|i| WEATHER_PHENOMENA.contains(&&body[i..i + 2]))
}
