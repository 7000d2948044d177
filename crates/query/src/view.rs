//! View specification and the full transform pipeline.

use crate::filter::{filter_records, Matcher};
use crate::sort::sort_records;
use roster_core::{Record, SortOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The filter text and sort order that shape the visible sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSpec {
    pub filter: String,
    pub sort: SortOrder,
}

impl ViewSpec {
    /// Creates a view spec.
    pub fn new(filter: impl Into<String>, sort: SortOrder) -> Self {
        Self {
            filter: filter.into(),
            sort,
        }
    }

    /// Returns a copy with a different filter text.
    pub fn with_filter(&self, filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            sort: self.sort,
        }
    }

    /// Returns a copy with a different sort order.
    pub fn with_sort(&self, sort: SortOrder) -> Self {
        Self {
            filter: self.filter.clone(),
            sort,
        }
    }
}

/// Computes the visible sequence for a snapshot: filter, then stable sort.
pub fn apply(snapshot: &[Arc<Record>], view: &ViewSpec) -> Vec<Arc<Record>> {
    let mut visible = filter_records(snapshot, &Matcher::new(&view.filter));
    sort_records(&mut visible, view.sort);
    visible
}
