//! Property-based tests for roster-storage using proptest.

use proptest::prelude::*;
use roster_core::{Attributes, Record};
use roster_storage::CollectionStore;
use std::collections::HashSet;

fn record_strategy() -> impl Strategy<Value = Record> {
    (0u64..64, 0i64..1000, "[a-z]{1,6}", any::<bool>()).prop_map(|(id, sort_key, name, vip)| {
        Record::new(id, sort_key, Attributes::new(name, format!("DY_{}", id)).with_vip(vip))
    })
}

proptest! {
    /// Merging a batch twice leaves the store as it was after the first merge.
    #[test]
    fn merge_twice_is_idempotent(
        initial in prop::collection::vec(record_strategy(), 0..40),
        batch in prop::collection::vec(record_strategy(), 0..40),
    ) {
        let mut store = CollectionStore::from_snapshot(initial);
        store.merge(batch.clone());
        let after_first = store.snapshot();
        let versions: Vec<u64> = after_first.iter().map(|r| r.version()).collect();

        let second = store.merge(batch);
        prop_assert_eq!(second.inserted, 0);
        prop_assert_eq!(second.updated, 0);
        prop_assert_eq!(store.snapshot(), after_first);
        prop_assert_eq!(store.iter().map(|r| r.version()).collect::<Vec<_>>(), versions);
    }

    /// Ids stay unique and every merged id is present.
    #[test]
    fn merge_keeps_ids_unique(batches in prop::collection::vec(prop::collection::vec(record_strategy(), 0..20), 1..5)) {
        let mut store = CollectionStore::new();
        let mut expected = HashSet::new();
        for batch in batches {
            expected.extend(batch.iter().map(|r| r.id()));
            store.merge(batch);
        }

        let ids: Vec<u64> = store.iter().map(|r| r.id()).collect();
        let unique: HashSet<u64> = ids.iter().copied().collect();
        prop_assert_eq!(ids.len(), unique.len());
        prop_assert_eq!(unique, expected);
    }

    /// Existing records keep their insertion position across merges.
    #[test]
    fn merge_preserves_positions(
        initial in prop::collection::vec(record_strategy(), 1..30),
        batch in prop::collection::vec(record_strategy(), 0..30),
    ) {
        let mut store = CollectionStore::from_snapshot(initial);
        let before: Vec<u64> = store.iter().map(|r| r.id()).collect();

        store.merge(batch);
        let after: Vec<u64> = store.iter().map(|r| r.id()).collect();
        prop_assert_eq!(&after[..before.len()], &before[..]);
    }
}
