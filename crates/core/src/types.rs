//! Small value types shared across Roster crates.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};

/// Sort direction of the visible sequence, applied to the record sort key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

impl SortOrder {
    /// Returns the order for a "sort descending" flag.
    #[inline]
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    #[inline]
    pub fn is_descending(&self) -> bool {
        matches!(self, SortOrder::Descending)
    }
}

/// Phase of the pagination state machine.
///
/// Exactly one phase holds at any time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No fetch in flight; more pages may exist.
    #[default]
    Idle,
    /// A page fetch is in flight.
    Fetching,
    /// The source reported an empty page; no further pages exist.
    Exhausted,
    /// The last fetch failed. Not terminal.
    Errored(FetchError),
}

impl Phase {
    #[inline]
    pub fn is_fetching(&self) -> bool {
        matches!(self, Phase::Fetching)
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Phase::Exhausted)
    }

    /// Returns the error of the last failed fetch, if the phase is `Errored`.
    pub fn last_error(&self) -> Option<&FetchError> {
        match self {
            Phase::Errored(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_default_is_descending() {
        assert_eq!(SortOrder::default(), SortOrder::Descending);
        assert!(SortOrder::default().is_descending());
    }

    #[test]
    fn test_sort_order_from_descending() {
        assert_eq!(SortOrder::from_descending(false), SortOrder::Ascending);
        assert_eq!(SortOrder::from_descending(true), SortOrder::Descending);
    }

    #[test]
    fn test_phase_accessors() {
        assert!(Phase::Fetching.is_fetching());
        assert!(Phase::Exhausted.is_exhausted());
        assert!(Phase::Idle.last_error().is_none());

        let phase = Phase::Errored(FetchError::transport("offline"));
        assert!(!phase.is_fetching());
        assert_eq!(phase.last_error(), Some(&FetchError::transport("offline")));
    }
}
