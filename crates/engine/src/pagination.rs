//! Pagination state machine.
//!
//! `PaginationState` decides which page to fetch next and how a completed
//! fetch changes the phase. It performs no I/O: callers start a fetch with the
//! returned `FetchTicket` and hand the outcome back to `complete`.
//!
//! Every refresh starts a new generation. A ticket from an older generation is
//! stale and its outcome is dropped without touching the state, so a page
//! fetched before a refresh can never be merged after it.

use roster_core::{FetchError, Phase, Record};

/// What a fetch was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchKind {
    LoadMore,
    Refresh,
}

/// Identifies one issued fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub page: u32,
    pub generation: u64,
    pub kind: FetchKind,
}

/// What the caller must do with a completed fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The ticket was superseded; drop the outcome.
    Stale,
    /// Merge the page into the collection.
    Merge(Vec<Record>),
    /// Replace the whole collection with the page. An empty page leaves the
    /// state `Exhausted`.
    Replace(Vec<Record>),
    /// The source has no more pages.
    Exhausted,
    /// The fetch failed; the collection must not change.
    Failed(FetchError),
}

/// Pagination progress of one collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationState {
    /// The page the next `load_more` requests. Always at least 1.
    pub next_page_index: u32,
    pub phase: Phase,
    /// Bumped by every refresh.
    pub generation: u64,
    /// `next_page_index` before the outstanding refresh, restored if it fails.
    refresh_fallback: Option<u32>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationState {
    pub fn new() -> Self {
        Self {
            next_page_index: 1,
            phase: Phase::Idle,
            generation: 0,
            refresh_fallback: None,
        }
    }

    #[inline]
    pub fn is_fetching(&self) -> bool {
        self.phase.is_fetching()
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.phase.is_exhausted()
    }

    #[inline]
    pub fn last_error(&self) -> Option<&FetchError> {
        self.phase.last_error()
    }

    /// Starts fetching the next page, unless a fetch is in flight or the
    /// source is exhausted.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if self.phase.is_fetching() || self.phase.is_exhausted() {
            return None;
        }
        self.phase = Phase::Fetching;
        Some(FetchTicket {
            page: self.next_page_index,
            generation: self.generation,
            kind: FetchKind::LoadMore,
        })
    }

    /// Starts a refresh from page 1, superseding every earlier ticket.
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.generation += 1;
        // A refresh interrupting another keeps the oldest fallback.
        self.refresh_fallback.get_or_insert(self.next_page_index);
        self.next_page_index = 1;
        self.phase = Phase::Fetching;
        FetchTicket {
            page: 1,
            generation: self.generation,
            kind: FetchKind::Refresh,
        }
    }

    /// Returns true if `ticket` belongs to the fetch currently in flight.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && self.phase.is_fetching()
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<Record>, FetchError>,
    ) -> Completion {
        if !self.is_current(&ticket) {
            return Completion::Stale;
        }

        match (ticket.kind, outcome) {
            (FetchKind::LoadMore, Ok(records)) if records.is_empty() => {
                self.phase = Phase::Exhausted;
                Completion::Exhausted
            }
            (FetchKind::LoadMore, Ok(records)) => {
                self.next_page_index = ticket.page.saturating_add(1);
                self.phase = Phase::Idle;
                Completion::Merge(records)
            }
            (FetchKind::Refresh, Ok(records)) => {
                self.refresh_fallback = None;
                if records.is_empty() {
                    self.next_page_index = 1;
                    self.phase = Phase::Exhausted;
                } else {
                    self.next_page_index = 2;
                    self.phase = Phase::Idle;
                }
                Completion::Replace(records)
            }
            (kind, Err(error)) => {
                if kind == FetchKind::Refresh {
                    if let Some(previous) = self.refresh_fallback.take() {
                        self.next_page_index = previous;
                    }
                }
                self.phase = Phase::Errored(error.clone());
                Completion::Failed(error)
            }
        }
    }
}
