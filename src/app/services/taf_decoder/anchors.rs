//! Anchor tokens of a TAF: marker, flags, station, issue and validity times
//!
//! Anchors are located in a fixed order and each one claims its token in the
//! ledger, so later passes only see forecast content.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::error::DecodeError;
use super::field_parsers::{has_alpha, parse_day_hour_minute, parse_day_hour_range, Scanner};
use super::time_resolver::TimeResolver;
use super::tokenizer::{Span, TokenLedger};
use crate::constants::markers;

/// Length of a `DDHHMMZ` issue-time token
const ISSUE_TOKEN_LEN: usize = 7;

/// Length of a station identifier
const STATION_ID_LEN: usize = 4;

/// Amendment and correction flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmendmentFlags {
    pub is_amended: bool,
    pub is_corrected: bool,
}

/// Issue time with the token index later anchors are relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueAnchor {
    pub time: DateTime<Utc>,
    pub index: usize,
}

/// Forecast validity window with the index of its token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityAnchor {
    pub valid_time: DateTime<Utc>,
    pub expire_time: DateTime<Utc>,
    pub index: usize,
}

/// Find and claim the first `TAF` token
pub fn find_taf_marker(ledger: &mut TokenLedger) -> Result<usize, DecodeError> {
    let (index, _) = ledger
        .find_available(ledger.full_span(), |t| t == markers::TAF)
        .ok_or(DecodeError::MissingTafMarker)?;
    ledger.consume(index);
    Ok(index)
}

/// Claim the first `AMD` or `COR` after the marker, if any
pub fn find_amendment(ledger: &mut TokenLedger, taf_index: usize) -> AmendmentFlags {
    let span = Span::new(taf_index + 1, ledger.len());
    let mut flags = AmendmentFlags::default();
    let found = ledger.find_available(span, |t| t == markers::AMENDED || t == markers::CORRECTED);
    if let Some((index, token)) = found {
        if token == markers::AMENDED {
            flags.is_amended = true;
        } else {
            flags.is_corrected = true;
        }
        ledger.consume(index);
    }
    flags
}

/// Find and claim the first 4-letter all-alphabetic token
pub fn find_station(ledger: &mut TokenLedger) -> Result<(usize, String), DecodeError> {
    let (index, token) = ledger
        .find_available(ledger.full_span(), |t| {
            t.len() == STATION_ID_LEN && t.bytes().all(|b| b.is_ascii_alphabetic())
        })
        .ok_or(DecodeError::MissingStation)?;
    let station_id = token.to_string();
    ledger.consume(index);
    Ok((index, station_id))
}

/// Find and claim the `DDHHMMZ` issue-time token after the station
///
/// Tokens of the right shape whose values cannot be resolved are skipped.
pub fn find_issue_time(
    ledger: &mut TokenLedger,
    station_index: usize,
    resolver: &TimeResolver,
) -> Option<IssueAnchor> {
    let span = Span::new(station_index + 1, ledger.len());
    let anchor = ledger.available(span).find_map(|(index, token)| {
        if token.len() != ISSUE_TOKEN_LEN || !token.ends_with('Z') {
            return None;
        }
        let (day, hour, minute) = parse_day_hour_minute(token)?;
        match resolver.resolve(day, hour, minute) {
            Ok(time) => Some(IssueAnchor { time, index }),
            Err(e) => {
                trace!("Skipping issue time candidate '{}': {}", token, e);
                None
            }
        }
    })?;
    ledger.consume(anchor.index);
    Some(anchor)
}

/// Issue time taken from the bulletin header's own `YYGGgg` group
///
/// Falls back to `file_time` when the header is absent or its third token
/// does not scan as day/hour/minute.
pub fn header_issue_time(
    header: Option<&str>,
    resolver: &TimeResolver,
    file_time: DateTime<Utc>,
) -> DateTime<Utc> {
    let resolved = header
        .and_then(|h| h.split_whitespace().nth(2))
        .and_then(|group| {
            let mut scanner = Scanner::new(group);
            Some((scanner.number(2)?, scanner.number(2)?, scanner.number(2)?))
        })
        .and_then(|(day, hour, minute)| resolver.resolve(day, hour, minute).ok());

    match resolved {
        Some(time) => time,
        None => {
            debug!("Cannot decode WMO header time, using file time {}", file_time);
            file_time
        }
    }
}

/// Check whether the token right after `anchor` is exactly `marker`
pub fn marker_follows(ledger: &TokenLedger, anchor: usize, marker: &str) -> bool {
    ledger.token(anchor + 1) == Some(marker)
}

/// Decode and claim the validity token right after the issue anchor
///
/// Accepts `DDHH/DDHH` and the older slash-free `DDHHhh`, where an end hour
/// not after the start hour means the forecast expires the next day.
pub fn find_validity(
    ledger: &mut TokenLedger,
    issue_index: usize,
    resolver: &TimeResolver,
) -> Result<ValidityAnchor, DecodeError> {
    let index = issue_index + 1;
    let token = ledger.token(index).ok_or(DecodeError::TooShort)?.to_string();
    let missing = || DecodeError::MissingValidTime {
        token: token.clone(),
    };

    let (valid_time, expire_time) = if token.contains('/') {
        let ((start_day, start_hour), (end_day, end_hour)) =
            parse_day_hour_range(&token).ok_or_else(missing)?;
        (
            resolver.resolve(start_day, start_hour, 0)?,
            resolver.resolve(end_day, end_hour, 0)?,
        )
    } else {
        if has_alpha(&token) {
            return Err(missing());
        }
        let (day, start_hour, end_hour) = parse_day_hour_minute(&token).ok_or_else(missing)?;
        let expire_day = if end_hour <= start_hour {
            let next = resolver.increment_day(day)?;
            debug!("Validity wraps midnight: day {} -> {}", day, next);
            next
        } else {
            day
        };
        (
            resolver.resolve(day, start_hour, 0)?,
            resolver.resolve(expire_day, end_hour, 0)?,
        )
    };

    ledger.consume(index);
    Ok(ValidityAnchor {
        valid_time,
        expire_time,
        index,
    })
}
