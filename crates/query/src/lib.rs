//! Roster Query - Transform pipeline for Roster.
//!
//! This crate turns a collection snapshot into the visible sequence:
//!
//! - `filter`: Case-insensitive substring matching over searchable fields
//! - `sort`: Stable ordering by sort key
//! - `ViewSpec`: The filter text and sort order currently in effect
//! - `apply`: The whole pipeline, filter then sort
//!
//! The pipeline is pure. It takes an immutable snapshot and returns shared
//! references to the same records, never copies.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use roster_core::{Attributes, Record, SortOrder};
//! use roster_query::{apply, ViewSpec};
//!
//! let snapshot: Vec<Arc<Record>> = vec![
//!     Arc::new(Record::new(1, 10, Attributes::new("abcd", "DY_1"))),
//!     Arc::new(Record::new(2, 20, Attributes::new("xyz", "DY_2"))),
//!     Arc::new(Record::new(3, 30, Attributes::new("ABC123", "DY_3"))),
//! ];
//!
//! let view = ViewSpec::new("abc", SortOrder::Ascending);
//! let visible = apply(&snapshot, &view);
//! assert_eq!(visible.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![1, 3]);
//! ```

pub mod filter;
pub mod sort;
mod view;

pub use filter::{filter_records, Matcher};
pub use sort::sort_records;
pub use view::{apply, ViewSpec};
