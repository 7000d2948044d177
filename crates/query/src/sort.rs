//! Sort stage.

use roster_core::{Record, SortOrder};
use std::cmp::Ordering;
use std::sync::Arc;

fn compare(a: &Record, b: &Record, order: SortOrder) -> Ordering {
    let cmp = a.sort_key().cmp(&b.sort_key());
    match order {
        SortOrder::Ascending => cmp,
        SortOrder::Descending => cmp.reverse(),
    }
}

/// Sorts records by sort key in place.
///
/// The sort is stable: records with equal keys keep their input order, so the
/// output is deterministic for unchanged input.
pub fn sort_records(records: &mut [Arc<Record>], order: SortOrder) {
    records.sort_by(|a, b| compare(a, b, order));
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::Attributes;

    fn make_record(id: u64, sort_key: i64) -> Arc<Record> {
        Arc::new(Record::new(id, sort_key, Attributes::new("u", "h")))
    }

    fn ids(records: &[Arc<Record>]) -> Vec<u64> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_sort_ascending() {
        let mut records = vec![make_record(1, 30), make_record(2, 10), make_record(3, 20)];
        sort_records(&mut records, SortOrder::Ascending);
        assert_eq!(ids(&records), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_descending() {
        let mut records = vec![make_record(1, 30), make_record(2, 10), make_record(3, 20)];
        sort_records(&mut records, SortOrder::Descending);
        assert_eq!(ids(&records), vec![1, 3, 2]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut records = vec![
            make_record(4, 5),
            make_record(1, 5),
            make_record(3, 9),
            make_record(2, 5),
        ];
        sort_records(&mut records, SortOrder::Descending);
        assert_eq!(ids(&records), vec![3, 4, 1, 2]);

        sort_records(&mut records, SortOrder::Ascending);
        assert_eq!(ids(&records), vec![4, 1, 2, 3]);
    }
}
