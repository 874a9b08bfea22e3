//! Segmentation of a TAF into forecast periods
//!
//! One left-to-right pass over the unclaimed tokens recognizes the change
//! group markers (`FMddhhmm`, `BECMG`, `TEMPO`/`INTER`, `PROBnn`) and records
//! where each period starts and where its data tokens lie. The Main period is
//! always first and covers everything between the validity anchor and the
//! first marker.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::anchors::ValidityAnchor;
use super::field_parsers::{parse_day_hour_minute, parse_day_hour_range, parse_probability};
use super::time_resolver::TimeResolver;
use super::tokenizer::{Span, TokenLedger};
use crate::app::models::{ForecastPeriod, PeriodKind};
use crate::constants::markers;

/// A period with its token bounds, prior to field decoding
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodLimits {
    pub period: ForecastPeriod,

    /// First token of the period, including any marker and `PROBnn` prefix
    pub start_token: usize,

    /// Tokens holding the period's forecast groups
    pub data: Span,
}

impl PeriodLimits {
    fn new(
        kind: PeriodKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        start_token: usize,
        data_start: usize,
    ) -> Self {
        Self {
            period: ForecastPeriod::new(kind, start_time, end_time),
            start_token,
            data: Span::new(data_start, data_start),
        }
    }

    pub fn kind(&self) -> PeriodKind {
        self.period.kind
    }
}

/// Split the message into periods; the first entry is always Main
pub fn segment_periods(
    ledger: &mut TokenLedger,
    resolver: &TimeResolver,
    validity: &ValidityAnchor,
) -> Vec<PeriodLimits> {
    let mut periods = scan_markers(ledger, resolver, validity.expire_time);
    let message_end = ledger.len();

    // Each change group's data runs up to the next group's first token
    let next_starts: Vec<Option<(usize, DateTime<Utc>)>> = (0..periods.len())
        .map(|i| {
            periods
                .get(i + 1)
                .map(|next| (next.start_token, next.period.start_time))
        })
        .collect();
    for (limits, next) in periods.iter_mut().zip(next_starts) {
        let (data_end, following_start) = match next {
            Some((token, time)) => (token, time),
            None => (message_end, validity.expire_time),
        };
        limits.data.end = data_end;
        if limits.kind() == PeriodKind::From {
            limits.period.end_time = following_start;
        }
    }

    let main_end_time = periods
        .iter()
        .find(|p| matches!(p.kind(), PeriodKind::From | PeriodKind::Becmg))
        .map(|p| p.period.start_time)
        .unwrap_or(validity.expire_time);
    let main_data_end = periods.first().map(|p| p.start_token).unwrap_or(message_end);

    let mut main = PeriodLimits::new(
        PeriodKind::Main,
        validity.valid_time,
        main_end_time,
        0,
        validity.index + 1,
    );
    main.data.end = main_data_end;
    periods.insert(0, main);

    for limits in periods.iter_mut() {
        limits.period.text = ledger.join(Span::new(limits.start_token, limits.data.end));
        debug!(
            "{} period {} -> {}, tokens {}..{} (data {}..{})",
            limits.kind(),
            limits.period.start_time,
            limits.period.end_time,
            limits.start_token,
            limits.data.end,
            limits.data.start,
            limits.data.end
        );
    }

    periods
}

/// Single pass recognizing change group markers
fn scan_markers(
    ledger: &mut TokenLedger,
    resolver: &TimeResolver,
    expire_time: DateTime<Utc>,
) -> Vec<PeriodLimits> {
    let mut periods = Vec::new();
    let mut index = 1;

    while index < ledger.len() {
        if ledger.is_consumed(index) {
            index += 1;
            continue;
        }
        let token = ledger.token(index).unwrap_or_default().to_string();
        let next = available_token(ledger, index + 1);

        if token == markers::TEMPO || token == markers::INTER || token == markers::BECMG {
            let kind = if token == markers::BECMG {
                PeriodKind::Becmg
            } else {
                PeriodKind::Tempo
            };
            let range = next.as_deref().and_then(|n| resolve_range(resolver, n));
            let mut limits = range.map(|(start, end)| PeriodLimits::new(kind, start, end, index, index + 2));
            absorb_probability(ledger, index, limits.as_mut());

            ledger.consume(index);
            if next.is_some() {
                ledger.consume(index + 1);
            }
            match limits {
                Some(limits) => periods.push(limits),
                None => debug!("Malformed {} range: {:?}", token, next),
            }
            index += 2;
        } else if let Some(from_time) = token
            .strip_prefix(markers::FROM_PREFIX)
            .and_then(parse_day_hour_minute)
            .and_then(|(day, hour, minute)| resolver.resolve(day, hour, minute).ok())
        {
            let mut limits =
                PeriodLimits::new(PeriodKind::From, from_time, expire_time, index, index + 1);
            absorb_probability(ledger, index, Some(&mut limits));
            ledger.consume(index);
            periods.push(limits);
            index += 1;
        } else if token.starts_with(markers::PROB_PREFIX) {
            if next.as_deref().is_some_and(is_change_marker) {
                // the following marker claims this prefix
                index += 1;
                continue;
            }
            let probability = parse_probability(&token);
            let range = next.as_deref().and_then(|n| resolve_range(resolver, n));
            if let (Some(percent), Some((start, end))) = (probability, range) {
                let mut limits = PeriodLimits::new(PeriodKind::Prob, start, end, index, index + 2);
                limits.period.probability_percent = Some(percent);
                periods.push(limits);
            } else {
                debug!("Malformed PROB group: {} {:?}", token, next);
            }
            ledger.consume(index);
            if next.is_some() {
                ledger.consume(index + 1);
            }
            index += 2;
        } else {
            index += 1;
        }
    }

    periods
}

/// Unclaimed token text at `index`
fn available_token(ledger: &TokenLedger, index: usize) -> Option<String> {
    if ledger.is_consumed(index) {
        None
    } else {
        ledger.token(index).map(str::to_string)
    }
}

/// Whether a token opens a change group that absorbs a preceding `PROBnn`
fn is_change_marker(token: &str) -> bool {
    token == markers::TEMPO
        || token == markers::BECMG
        || token == markers::INTER
        || token.starts_with(markers::FROM_PREFIX)
}

/// Resolve a `DDHH/DDHH` token into start and end instants
fn resolve_range(resolver: &TimeResolver, token: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let ((start_day, start_hour), (end_day, end_hour)) = parse_day_hour_range(token)?;
    let start = resolver.resolve(start_day, start_hour, 0).ok()?;
    let end = resolver.resolve(end_day, end_hour, 0).ok()?;
    Some((start, end))
}

/// Claim a `PROBnn` token right before a change marker
///
/// The prefix is claimed even when the marker's own range is malformed, so it
/// never leaks into the previous period's data.
fn absorb_probability(ledger: &mut TokenLedger, marker_index: usize, limits: Option<&mut PeriodLimits>) {
    let Some(prob_index) = marker_index.checked_sub(1) else {
        return;
    };
    let Some(percent) = available_token(ledger, prob_index).and_then(|t| parse_probability(&t)) else {
        return;
    };
    trace!("PROB{} attached to token {}", percent, marker_index);
    ledger.consume(prob_index);
    if let Some(limits) = limits {
        limits.period.probability_percent = Some(percent);
        limits.start_token = prob_index;
    }
}
