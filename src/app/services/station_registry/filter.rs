//! Accept/reject station lists
//!
//! A station passes when it is in the accept list (or no accept list is
//! configured) and is not in the reject list.

use std::collections::HashSet;
use tracing::debug;

/// Station accept/reject filter applied after location lookup
#[derive(Debug, Clone, Default)]
pub struct StationFilter {
    accepted: Option<HashSet<String>>,
    rejected: HashSet<String>,
}

impl StationFilter {
    /// Filter that accepts every station
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Build a filter from configured lists; `None` accepts all stations
    pub fn new<A, R>(accepted: Option<A>, rejected: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            accepted: accepted.map(|ids| ids.into_iter().map(Into::into).collect()),
            rejected: rejected.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether records for `station_id` should be stored
    pub fn accepts(&self, station_id: &str) -> bool {
        if let Some(accepted) = &self.accepted {
            if !accepted.contains(station_id) {
                debug!("Rejecting station {}: not in accepted stations list", station_id);
                return false;
            }
        }
        if self.rejected.contains(station_id) {
            debug!("Rejecting station {}: in rejected stations list", station_id);
            return false;
        }
        true
    }

    /// Whether any list is configured
    pub fn is_active(&self) -> bool {
        self.accepted.is_some() || !self.rejected.is_empty()
    }
}
