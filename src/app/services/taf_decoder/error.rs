//! Per-message decode failures

/// Reasons a single TAF message could not be decoded
///
/// These never abort a run; the caller counts and logs them and moves on to
/// the next message.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("message contains no tokens")]
    Empty,

    #[error("TAF marker not found")]
    MissingTafMarker,

    #[error("station identifier not found")]
    MissingStation,

    #[error("station '{station_id}' is not in the station location table")]
    UnknownStation { station_id: String },

    #[error("issue time not found")]
    MissingIssueTime,

    #[error("message ends at the issue time")]
    TooShort,

    #[error("valid/expire time not found in '{token}'")]
    MissingValidTime { token: String },

    #[error("invalid time: day {day}, hour {hour}, minute {minute}")]
    InvalidTime { day: u32, hour: u32, minute: u32 },

    #[error("main period is missing its {field} group")]
    MissingMainField { field: &'static str },
}

impl DecodeError {
    /// Short label used when tallying failures by kind
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Empty => "empty",
            DecodeError::MissingTafMarker => "missing_taf_marker",
            DecodeError::MissingStation => "missing_station",
            DecodeError::UnknownStation { .. } => "unknown_station",
            DecodeError::MissingIssueTime => "missing_issue_time",
            DecodeError::TooShort => "too_short",
            DecodeError::MissingValidTime { .. } => "missing_valid_time",
            DecodeError::InvalidTime { .. } => "invalid_time",
            DecodeError::MissingMainField { .. } => "missing_main_field",
        }
    }
}
