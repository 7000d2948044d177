//! Identity and change detection for diffable items.

use core::fmt::Debug;
use core::hash::Hash;
use roster_core::{FieldMask, Record, RecordId};
use std::sync::Arc;

/// An item with a stable identity key.
///
/// Two items with the same key are the same entity; `changed_fields` tells
/// which of its attributes differ between two versions of it.
pub trait Keyed {
    type Key: Copy + Eq + Hash + Debug;

    /// Returns the identity key.
    fn key(&self) -> Self::Key;

    /// Returns the fields that differ between `self` and `other`, which share a key.
    fn changed_fields(&self, other: &Self) -> FieldMask;
}

impl Keyed for Record {
    type Key = RecordId;

    #[inline]
    fn key(&self) -> RecordId {
        self.id()
    }

    #[inline]
    fn changed_fields(&self, other: &Self) -> FieldMask {
        Record::changed_fields(self, other)
    }
}

impl<T: Keyed> Keyed for Arc<T> {
    type Key = T::Key;

    #[inline]
    fn key(&self) -> T::Key {
        (**self).key()
    }

    fn changed_fields(&self, other: &Self) -> FieldMask {
        if Arc::ptr_eq(self, other) {
            return FieldMask::empty();
        }
        (**self).changed_fields(other)
    }
}
