//! Command-line argument definitions for the TAF processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::InputMode;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the TAF processor
///
/// Decodes Terminal Aerodrome Forecast bulletins into structured forecast
/// records and stores them alongside the raw message text.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taf-processor",
    version,
    about = "Decode TAF bulletins into structured forecast records",
    long_about = "Reads Terminal Aerodrome Forecast bulletin files, decodes each message into \
                  time-bounded forecast periods (wind, visibility, cloud, weather, temperature) \
                  and stores the raw text and decoded records in a time-indexed chunk store. \
                  Cancellation messages mark previously stored forecasts as cancelled."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest bulletin files into the chunk store
    Process(ProcessArgs),
    /// Decode messages and print the records as JSON without storing them
    Decode(DecodeArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Path to configuration file
    ///
    /// YAML configuration file. If not specified, looks for
    /// ~/.config/taf-processor/config.yaml and falls back to defaults.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (YAML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Input discovery mode; overrides the configured mode
    ///
    /// Giving --files without --mode selects file-list mode.
    #[arg(long = "mode", value_enum, help = "Input mode")]
    pub mode: Option<InputMode>,

    /// Directory scanned in realtime and archive modes
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Input directory for realtime and archive modes"
    )]
    pub input_dir: Option<PathBuf>,

    /// Explicit input files or glob patterns for file-list mode
    #[arg(
        short = 'f',
        long = "files",
        value_name = "FILE",
        num_args = 1..,
        help = "Input files or glob patterns (file-list mode)"
    )]
    pub files: Vec<String>,

    /// Start of the archive time window
    #[arg(
        long = "start",
        value_name = "TIME",
        help = "Archive start time (YYYY-MM-DDTHH:MM:SS or YYYYMMDDHHMMSS)"
    )]
    pub start: Option<UtcTime>,

    /// End of the archive time window
    #[arg(
        long = "end",
        value_name = "TIME",
        help = "Archive end time (YYYY-MM-DDTHH:MM:SS or YYYYMMDDHHMMSS)"
    )]
    pub end: Option<UtcTime>,

    /// Station location table; overrides the configured path
    #[arg(
        short = 's',
        long = "stations",
        value_name = "FILE",
        help = "Station location table"
    )]
    pub station_location_path: Option<PathBuf>,

    /// Root directory for both output stores
    ///
    /// Raw text is written under <PATH>/spdb/taf/ascii and decoded records
    /// under <PATH>/spdb/taf/decoded.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Root directory for the output stores"
    )]
    pub output_root: Option<PathBuf>,

    /// Only store these stations (comma-separated ICAO ids)
    #[arg(long = "accept", value_name = "LIST", help = "Comma-separated stations to accept")]
    pub accepted_stations: Option<StationList>,

    /// Never store these stations (comma-separated ICAO ids)
    #[arg(long = "reject", value_name = "LIST", help = "Comma-separated stations to reject")]
    pub rejected_stations: Option<StationList>,

    /// Fall back to the bulletin header time when a message has no issue time
    #[arg(
        long = "header-time-fallback",
        help = "Use the bulletin header time when the issue time is missing"
    )]
    pub use_header_time_fallback: bool,

    /// Decode without writing anything to disk
    ///
    /// Records are written to an in-memory store and only counted.
    #[arg(
        long = "dry-run",
        help = "Decode and count records without writing output"
    )]
    pub dry_run: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the final report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the decode command
#[derive(Debug, Clone, Parser)]
pub struct DecodeArgs {
    /// Bulletin file to decode
    #[arg(
        value_name = "FILE",
        required_unless_present = "text",
        conflicts_with = "text",
        help = "Bulletin file to decode"
    )]
    pub input_file: Option<PathBuf>,

    /// Literal message text to decode
    #[arg(short = 't', long = "text", value_name = "TAF", help = "Message text to decode")]
    pub text: Option<String>,

    /// Reference time used to complete day-only timestamps
    ///
    /// Defaults to the file's data time, or now for literal text.
    #[arg(
        short = 'r',
        long = "reference-time",
        value_name = "TIME",
        help = "Reference time (YYYY-MM-DDTHH:MM:SS or YYYYMMDDHHMMSS)"
    )]
    pub reference_time: Option<UtcTime>,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (YAML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Station location table; overrides the configured path
    #[arg(
        short = 's',
        long = "stations",
        value_name = "FILE",
        help = "Station location table"
    )]
    pub station_location_path: Option<PathBuf>,

    /// Fall back to the bulletin header time when a message has no issue time
    #[arg(
        long = "header-time-fallback",
        help = "Use the bulletin header time when the issue time is missing"
    )]
    pub use_header_time_fallback: bool,

    /// Compact single-line JSON instead of pretty output
    #[arg(long = "compact", help = "Print one JSON record per line")]
    pub compact: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for the final report
#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// UTC time given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcTime(pub DateTime<Utc>);

impl FromStr for UtcTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(time) = DateTime::parse_from_rfc3339(s) {
            return Ok(UtcTime(time.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y%m%d%H%M%S"] {
            if let Ok(time) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(UtcTime(time.and_utc()));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(UtcTime(date.and_time(chrono::NaiveTime::MIN).and_utc()));
        }
        Err(Error::datetime_parsing(format!(
            "Cannot parse time '{}'; expected YYYY-MM-DDTHH:MM:SS or YYYYMMDDHHMMSS",
            s
        )))
    }
}

/// Wrapper for parsing comma-separated station lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationList {
    pub stations: Vec<String>,
}

impl FromStr for StationList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let stations: Vec<String> = s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if stations.is_empty() {
            return Err(Error::configuration("Station list cannot be empty"));
        }
        if let Some(bad) = stations
            .iter()
            .find(|id| !id.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(Error::configuration(format!("Invalid station id '{}'", bad)));
        }

        Ok(StationList { stations })
    }
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end.0 < start.0 {
                return Err(Error::configuration(format!(
                    "Archive end time {} is before start time {}",
                    end.0, start.0
                )));
            }
        }

        if self.mode == Some(InputMode::FileList) && self.files.is_empty() {
            return Err(Error::configuration(
                "File-list mode needs at least one --files entry",
            ));
        }

        Ok(())
    }

    /// Input mode after applying the implicit file-list selection
    pub fn effective_mode(&self) -> Option<InputMode> {
        match self.mode {
            Some(mode) => Some(mode),
            None if !self.files.is_empty() => Some(InputMode::FileList),
            None => None,
        }
    }

    /// Determine the appropriate log level based on verbosity flags
    ///
    /// `None` when no flag was given, leaving the configured debug level in charge.
    pub fn get_log_level(&self) -> Option<&'static str> {
        if self.quiet {
            Some("error")
        } else {
            match self.verbose {
                0 => None,
                1 => Some("info"),
                2 => Some("debug"),
                _ => Some("trace"),
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl DecodeArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_time_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 26, 11, 30, 0).unwrap();
        for text in [
            "2024-03-26T11:30:00",
            "2024-03-26 11:30:00",
            "20240326113000",
            "2024-03-26T11:30:00Z",
        ] {
            assert_eq!(text.parse::<UtcTime>().unwrap().0, expected, "{}", text);
        }
        assert_eq!(
            "2024-03-26".parse::<UtcTime>().unwrap().0,
            Utc.with_ymd_and_hms(2024, 3, 26, 0, 0, 0).unwrap()
        );
        assert!("yesterday".parse::<UtcTime>().is_err());
    }

    #[test]
    fn test_station_list() {
        let list: StationList = "KDEN, KBOU,,EGLL".parse().unwrap();
        assert_eq!(list.stations, vec!["KDEN", "KBOU", "EGLL"]);
        assert!("".parse::<StationList>().is_err());
        assert!("KDEN;KBOU".parse::<StationList>().is_err());
    }

    #[test]
    fn test_process_args_parsing() {
        let args = Args::try_parse_from([
            "taf-processor",
            "process",
            "--files",
            "a.txt",
            "b.txt",
            "--accept",
            "KDEN",
            "-vv",
        ])
        .unwrap();
        let Some(Commands::Process(process)) = args.command else {
            panic!("expected process command");
        };
        assert_eq!(process.files, vec!["a.txt", "b.txt"]);
        assert_eq!(process.effective_mode(), Some(InputMode::FileList));
        assert_eq!(process.get_log_level(), Some("debug"));
        assert!(process.validate().is_ok());
    }

    #[test]
    fn test_process_args_validation() {
        let args = Args::try_parse_from([
            "taf-processor",
            "process",
            "--mode",
            "archive",
            "--start",
            "20240327000000",
            "--end",
            "20240326000000",
        ])
        .unwrap();
        let Some(Commands::Process(process)) = args.command else {
            panic!("expected process command");
        };
        assert!(process.validate().is_err());
    }

    #[test]
    fn test_decode_args_need_input() {
        assert!(Args::try_parse_from(["taf-processor", "decode"]).is_err());
        let args = Args::try_parse_from([
            "taf-processor",
            "decode",
            "--text",
            "TAF KDEN 261130Z 2612/2712 09008KT P6SM SKC",
        ])
        .unwrap();
        assert!(matches!(args.command, Some(Commands::Decode(_))));
    }
}
