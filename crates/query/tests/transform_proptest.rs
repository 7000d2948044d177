//! Property-based tests for the transform pipeline.

use proptest::prelude::*;
use roster_core::{Attributes, Record, SortOrder};
use roster_query::{apply, Matcher, ViewSpec};
use std::sync::Arc;

fn snapshot_strategy() -> impl Strategy<Value = Vec<Arc<Record>>> {
    prop::collection::vec(("[a-zA-Z]{1,8}", 0i64..20), 0..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, key))| {
                Arc::new(Record::new(i as u64, key, Attributes::new(name, format!("h{}", i))))
            })
            .collect()
    })
}

proptest! {
    /// Output is sorted by key and ties keep insertion order.
    #[test]
    fn output_is_stably_sorted(snapshot in snapshot_strategy(), descending in any::<bool>()) {
        let order = SortOrder::from_descending(descending);
        let visible = apply(&snapshot, &ViewSpec::new("", order));
        prop_assert_eq!(visible.len(), snapshot.len());

        for pair in visible.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.sort_key() == b.sort_key() {
                // ids are assigned in insertion order
                prop_assert!(a.id() < b.id());
            } else if descending {
                prop_assert!(a.sort_key() > b.sort_key());
            } else {
                prop_assert!(a.sort_key() < b.sort_key());
            }
        }
    }

    /// Every kept record matches the filter and every match is kept.
    #[test]
    fn filter_is_exact(snapshot in snapshot_strategy(), text in "[a-zA-Z]{0,2}") {
        let visible = apply(&snapshot, &ViewSpec::new(text.clone(), SortOrder::Ascending));
        let matcher = Matcher::new(&text);
        let expected = snapshot.iter().filter(|r| matcher.matches(r)).count();
        prop_assert_eq!(visible.len(), expected);

        let lowered = text.to_lowercase();
        for record in &visible {
            prop_assert!(record
                .searchable_fields()
                .iter()
                .any(|f| f.to_lowercase().contains(&lowered)));
        }
    }
}
