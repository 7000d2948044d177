//! Roster Storage - Collection storage layer for Roster.
//!
//! This crate provides the storage layer including:
//!
//! - `CollectionStore`: The canonical ordered, duplicate-free set of records
//! - `Persistence`: The snapshot save/load collaborator interface
//! - `MemoryPersistence` / `JsonFilePersistence`: Persistence implementations
//!
//! # Example
//!
//! ```rust
//! use roster_core::{Attributes, Record};
//! use roster_storage::CollectionStore;
//!
//! let mut store = CollectionStore::new();
//! let page = vec![
//!     Record::new(1, 100, Attributes::new("Alice", "DY_10001")),
//!     Record::new(2, 200, Attributes::new("Bob", "DY_10002")),
//! ];
//!
//! let first = store.merge(page.clone());
//! assert_eq!(first.inserted, 2);
//!
//! // Merging the same page again is a no-op.
//! let second = store.merge(page);
//! assert_eq!(second.inserted, 0);
//! assert_eq!(store.len(), 2);
//! ```

pub mod collection;
pub mod persistence;

pub use collection::{CollectionStore, MergeResult, UpdateOutcome};
pub use persistence::{JsonFilePersistence, MemoryPersistence, Persistence};
