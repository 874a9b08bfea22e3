//! TAF message decoding orchestration
//!
//! Runs the passes in order for one message: tokenize, locate anchors,
//! look up and filter the station, resolve times, segment periods, decode
//! each period's groups and propagate prevailing conditions.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, trace};

use super::anchors::{self, IssueAnchor};
use super::error::DecodeError;
use super::fields::{decode_fields, DecodedPeriod};
use super::periods::segment_periods;
use super::propagation::propagate;
use super::time_resolver::TimeResolver;
use super::tokenizer::{normalize_message, tokenize, TokenLedger};
use crate::app::models::ForecastRecord;
use crate::app::services::station_registry::{StationFilter, StationRegistry};
use crate::constants::markers;

/// One message and the times it is decoded against
#[derive(Debug, Clone, Copy)]
pub struct MessageInput<'a> {
    /// Message text as received
    pub text: &'a str,

    /// WMO heading of the bulletin the message came from
    pub header: Option<&'a str>,

    /// Supplies the year, month and day missing from TAF timestamps
    pub reference_time: DateTime<Utc>,

    /// Data time of the input file, the last-resort issue time
    pub file_time: DateTime<Utc>,
}

impl<'a> MessageInput<'a> {
    pub fn new(text: &'a str, reference_time: DateTime<Utc>) -> Self {
        Self {
            text,
            header: None,
            reference_time,
            file_time: reference_time,
        }
    }

    pub fn with_header(mut self, header: Option<&'a str>) -> Self {
        self.header = header;
        self
    }

    pub fn with_file_time(mut self, file_time: DateTime<Utc>) -> Self {
        self.file_time = file_time;
        self
    }
}

/// Result of a successful decode call
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Decoded record, ready for storage
    Decoded(ForecastRecord),

    /// Station excluded by the accept/reject lists
    Rejected { station_id: String },
}

impl DecodeOutcome {
    pub fn record(&self) -> Option<&ForecastRecord> {
        match self {
            DecodeOutcome::Decoded(record) => Some(record),
            DecodeOutcome::Rejected { .. } => None,
        }
    }

    pub fn into_record(self) -> Option<ForecastRecord> {
        match self {
            DecodeOutcome::Decoded(record) => Some(record),
            DecodeOutcome::Rejected { .. } => None,
        }
    }
}

/// Mutable state for decoding a single message
///
/// Built fresh for every message and dropped afterwards.
#[derive(Debug)]
pub struct DecodeContext {
    pub(crate) ledger: TokenLedger,
    pub(crate) resolver: TimeResolver,
}

impl DecodeContext {
    pub fn new(input: &MessageInput<'_>) -> Self {
        let tokens = tokenize(&normalize_message(input.text));
        trace!("Message tokens: {:?}", tokens);
        Self {
            ledger: TokenLedger::new(tokens),
            resolver: TimeResolver::new(input.reference_time),
        }
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }
}

/// Decoder for TAF messages
///
/// Holds only configuration and the shared station registry; all per-message
/// state lives in a [`DecodeContext`].
#[derive(Debug, Clone)]
pub struct TafDecoder {
    station_registry: Arc<StationRegistry>,
    station_filter: StationFilter,
    header_time_fallback: bool,
}

impl TafDecoder {
    /// Create a decoder that accepts every known station
    pub fn new(station_registry: Arc<StationRegistry>) -> Self {
        Self {
            station_registry,
            station_filter: StationFilter::accept_all(),
            header_time_fallback: false,
        }
    }

    pub fn with_station_filter(mut self, station_filter: StationFilter) -> Self {
        self.station_filter = station_filter;
        self
    }

    /// Use the bulletin header time when a message has no issue time
    pub fn with_header_time_fallback(mut self, enabled: bool) -> Self {
        self.header_time_fallback = enabled;
        self
    }

    /// Decode one message
    pub fn decode(&self, input: &MessageInput<'_>) -> Result<DecodeOutcome, DecodeError> {
        let mut context = DecodeContext::new(input);
        self.decode_in(&mut context, input)
    }

    /// Decode one message within a caller-held context
    pub fn decode_in(
        &self,
        context: &mut DecodeContext,
        input: &MessageInput<'_>,
    ) -> Result<DecodeOutcome, DecodeError> {
        let DecodeContext { ledger, resolver } = context;
        if ledger.is_empty() {
            return Err(DecodeError::Empty);
        }

        let taf_index = anchors::find_taf_marker(ledger)?;
        let flags = anchors::find_amendment(ledger, taf_index);
        let (station_index, station_id) = anchors::find_station(ledger)?;
        debug!("Decoding TAF for {}", station_id);

        let Some(location) = self.station_registry.lookup(&station_id) else {
            return Err(DecodeError::UnknownStation { station_id });
        };
        if !self.station_filter.accepts(&station_id) {
            return Ok(DecodeOutcome::Rejected { station_id });
        }

        let issue = match anchors::find_issue_time(ledger, station_index, resolver) {
            Some(issue) => issue,
            None if self.header_time_fallback => {
                let time = anchors::header_issue_time(input.header, resolver, input.file_time);
                debug!("Issue time not found for {}, using {}", station_id, time);
                IssueAnchor {
                    time,
                    index: station_index,
                }
            }
            None => return Err(DecodeError::MissingIssueTime),
        };
        if issue.index + 1 >= ledger.len() {
            return Err(DecodeError::TooShort);
        }

        let mut record = ForecastRecord::new(location, issue.time, input.text);
        record.is_amended = flags.is_amended;
        record.is_corrected = flags.is_corrected;

        if anchors::marker_follows(ledger, issue.index, markers::NIL) {
            ledger.consume(issue.index + 1);
            record.is_nil = true;
            return Ok(DecodeOutcome::Decoded(record));
        }

        let validity = anchors::find_validity(ledger, issue.index, resolver)?;
        record.valid_time = validity.valid_time;
        record.expire_time = validity.expire_time;
        debug!(
            "{}: issued {}, valid {} to {}",
            station_id, record.issue_time, record.valid_time, record.expire_time
        );

        if anchors::marker_follows(ledger, validity.index, markers::CANCELLED) {
            ledger.consume(validity.index + 1);
            record.cancel(issue.time);
            return Ok(DecodeOutcome::Decoded(record));
        }

        let limits = segment_periods(ledger, resolver, &validity);
        let mut periods = Vec::with_capacity(limits.len());
        for limits in limits {
            let fields = decode_fields(ledger, limits.data, limits.kind(), resolver)?;
            periods.push(DecodedPeriod { limits, fields });
        }
        propagate(&mut periods);
        record.periods = periods.into_iter().map(DecodedPeriod::into_period).collect();

        Ok(DecodeOutcome::Decoded(record))
    }
}
