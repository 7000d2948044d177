//! Roster Incremental - Keyed diffing for Roster visible sequences.
//!
//! This crate computes the edit script that turns one visible sequence into
//! the next, so a presentation layer can update only what changed instead of
//! redrawing everything.
//!
//! # Core Concepts
//!
//! - `Keyed`: Items with a stable identity key and field-level change detection
//! - `EditOp<T>`: One positional operation (insert, remove, move, update)
//! - `EditScript<T>`: An ordered list of operations; applying it to the old
//!   sequence yields exactly the new sequence
//! - `diff`: LCS-based script computation over item keys
//!
//! # Example
//!
//! ```rust
//! use roster_core::{Attributes, FieldMask, Record};
//! use roster_incremental::{diff, EditOp};
//!
//! let old = vec![
//!     Record::new(1, 10, Attributes::new("Alice", "DY_1")),
//!     Record::new(5, 20, Attributes::new("Eve", "DY_5")),
//! ];
//! let mut new = old.clone();
//! new[1].attributes_mut().remark = "neighbour".into();
//!
//! let script = diff(&old, &new);
//! assert_eq!(script.len(), 1);
//! assert!(matches!(
//!     script.ops()[0],
//!     EditOp::Update { index: 1, fields, .. } if fields == FieldMask::REMARK
//! ));
//! assert_eq!(script.apply(&old).unwrap(), new);
//! ```

pub mod diff;
pub mod edit_script;
pub mod keyed;
pub mod lcs;

pub use diff::diff;
pub use edit_script::{ApplyError, EditOp, EditScript};
pub use keyed::Keyed;
pub use lcs::lcs_anchors;
