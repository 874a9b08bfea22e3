//! Per-file decoding statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::DecodeError;

/// Message counts for one input file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    /// Messages found in the file
    pub messages_found: usize,

    /// Messages decoded into records, cancellations and NIL reports included
    pub messages_decoded: usize,

    /// Messages for stations excluded by the accept/reject lists
    pub messages_rejected: usize,

    /// Messages that could not be decoded
    pub messages_failed: usize,

    /// Failure counts by kind
    pub failures_by_kind: BTreeMap<String, usize>,

    /// Decode and storage problems, for debugging
    pub errors: Vec<String>,
}

impl FileStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message that failed to decode
    pub fn record_failure(&mut self, error: &DecodeError) {
        self.messages_failed += 1;
        *self
            .failures_by_kind
            .entry(error.kind().to_string())
            .or_default() += 1;
        self.errors.push(error.to_string());
    }

    /// Calculate success rate as a percentage of messages found
    pub fn success_rate(&self) -> f64 {
        if self.messages_found == 0 {
            0.0
        } else {
            (self.messages_decoded as f64 / self.messages_found as f64) * 100.0
        }
    }

    /// Fold another file's counts into these
    pub fn merge(&mut self, other: &FileStats) {
        self.messages_found += other.messages_found;
        self.messages_decoded += other.messages_decoded;
        self.messages_rejected += other.messages_rejected;
        self.messages_failed += other.messages_failed;
        for (kind, count) in &other.failures_by_kind {
            *self.failures_by_kind.entry(kind.clone()).or_default() += count;
        }
        self.errors.extend(other.errors.iter().cloned());
    }
}
