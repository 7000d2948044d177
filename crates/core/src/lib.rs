//! Roster Core - Core types for the Roster collection sync engine.
//!
//! This crate provides the foundational types shared by every other Roster crate:
//!
//! - `Record`: A uniquely identified list entry with mutable attributes
//! - `Attributes`: The mutable attributes of a follow-list entry
//! - `FieldMask`: A bitset naming which attributes differ between two records
//! - `SortOrder` / `Phase`: Small value types shared by the query and engine layers
//! - `Error` / `FetchError`: Error types for engine operations
//!
//! # Example
//!
//! ```rust
//! use roster_core::{Attributes, FieldMask, Record};
//!
//! let old = Record::new(5, 1_000, Attributes::new("Alice", "DY_10005"));
//! let mut new = old.clone();
//! new.attributes_mut().remark = "college friend".into();
//!
//! assert_eq!(old.changed_fields(&new), FieldMask::REMARK);
//! assert_eq!(new.display_key(), "college friend");
//! ```

mod error;
mod field_mask;
mod record;
mod types;

pub use error::{Error, FetchError, Result};
pub use field_mask::FieldMask;
pub use record::{Attributes, Record, RecordId};
pub use types::{Phase, SortOrder};
