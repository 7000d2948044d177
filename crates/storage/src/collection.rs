//! Collection storage for Roster.
//!
//! This module provides the `CollectionStore` struct which owns the canonical
//! ordered set of records. Records are kept in insertion order and indexed by
//! id, so no two entries ever share an id.
//!
//! Records are stored behind `Arc` and mutated copy-on-write: a snapshot taken
//! before a mutation keeps seeing the old record.

use hashbrown::HashMap;
use roster_core::{FieldMask, Record, RecordId};
use std::sync::Arc;

/// Counts reported by a merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeResult {
    /// Records appended because their id was absent.
    pub inserted: usize,
    /// Existing records whose mutable fields changed.
    pub updated: usize,
    /// Existing records that were already identical.
    pub unchanged: usize,
}

impl MergeResult {
    /// Returns true if the merge modified the store.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0
    }

    /// Total number of records in the merged batch.
    #[inline]
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

/// Outcome of a single-record edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record changed; the mask names the changed fields.
    Updated(FieldMask),
    /// The record exists but the edit changed nothing.
    Unchanged,
    /// No record has this id.
    NotFound,
}

impl UpdateOutcome {
    /// Returns true if the record was modified.
    #[inline]
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated(_))
    }
}

/// The canonical ordered, duplicate-free collection of records.
#[derive(Clone, Debug, Default)]
pub struct CollectionStore {
    /// Records in insertion order.
    records: Vec<Arc<Record>>,
    /// Record id → position in `records`.
    positions: HashMap<RecordId, usize>,
}

impl CollectionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a store from a snapshot, e.g. one loaded from persistence.
    ///
    /// Duplicate ids inside the snapshot collapse with merge semantics.
    pub fn from_snapshot(records: impl IntoIterator<Item = Record>) -> Self {
        let mut store = Self::new();
        store.merge(records);
        store
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if a record with this id is stored.
    #[inline]
    pub fn contains(&self, id: RecordId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Returns the insertion position of a record.
    #[inline]
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Gets a record by id.
    pub fn get(&self, id: RecordId) -> Option<Arc<Record>> {
        self.position(id).map(|pos| self.records[pos].clone())
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Record>> + '_ {
        self.records.iter()
    }

    /// Merges a batch of records into the store.
    ///
    /// Records with an absent id are appended in batch order. Records with a
    /// present id overwrite the stored record's mutable fields in place, keeping
    /// its original position. An id repeated inside the batch is applied once,
    /// with its last copy, at the position of its first appearance. Merging the
    /// same batch twice leaves the store unchanged and reports no insertions.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = Record>) -> MergeResult {
        let mut result = MergeResult::default();
        for record in collapse_duplicates(batch) {
            match self.positions.get(&record.id()) {
                Some(&pos) => {
                    if self.records[pos].changed_fields(&record).is_empty() {
                        result.unchanged += 1;
                    } else {
                        Arc::make_mut(&mut self.records[pos]).assign_from(&record);
                        result.updated += 1;
                    }
                }
                None => {
                    self.positions.insert(record.id(), self.records.len());
                    self.records.push(Arc::new(record));
                    result.inserted += 1;
                }
            }
        }
        result
    }

    /// Replaces the whole contents with `batch`.
    ///
    /// The new contents are built off to the side and swapped in at once, so
    /// observers never see a half-populated store.
    pub fn replace_all(&mut self, batch: impl IntoIterator<Item = Record>) -> MergeResult {
        let mut fresh = Self::new();
        let result = fresh.merge(batch);
        *self = fresh;
        result
    }

    /// Applies a field-level change to one record.
    ///
    /// The mutator works on a copy; the stored record is only replaced (and its
    /// version bumped) if the copy actually differs.
    pub fn update<F>(&mut self, id: RecordId, mutator: F) -> UpdateOutcome
    where
        F: FnOnce(&mut Record),
    {
        let Some(&pos) = self.positions.get(&id) else {
            return UpdateOutcome::NotFound;
        };

        let mut edited = Record::clone(&self.records[pos]);
        mutator(&mut edited);
        let mask = Arc::make_mut(&mut self.records[pos]).assign_from(&edited);
        if mask.is_empty() {
            UpdateOutcome::Unchanged
        } else {
            UpdateOutcome::Updated(mask)
        }
    }

    /// Returns the current records in insertion order.
    ///
    /// The returned vector shares records with the store; later mutations of
    /// the store do not show through it.
    pub fn snapshot(&self) -> Vec<Arc<Record>> {
        self.records.clone()
    }

    /// Returns owned copies of the first `limit` records, for persistence.
    pub fn to_records(&self, limit: usize) -> Vec<Record> {
        self.records
            .iter()
            .take(limit)
            .map(|record| Record::clone(record))
            .collect()
    }
}

/// Keeps one record per id: the last copy, at the slot of the first.
fn collapse_duplicates(batch: impl IntoIterator<Item = Record>) -> Vec<Record> {
    let mut slots: HashMap<RecordId, usize> = HashMap::new();
    let mut unique: Vec<Record> = Vec::new();
    for record in batch {
        match slots.get(&record.id()) {
            Some(&slot) => unique[slot] = record,
            None => {
                slots.insert(record.id(), unique.len());
                unique.push(record);
            }
        }
    }
    unique
}
