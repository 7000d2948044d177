//! Filter stage.

use roster_core::Record;
use std::sync::Arc;

/// Case-insensitive substring matcher over a record's searchable fields.
///
/// A record matches if any of its searchable fields contains the needle.
/// An empty needle matches every record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matcher {
    /// Lowercased filter text.
    needle: String,
}

impl Matcher {
    /// Creates a matcher for the given filter text.
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_lowercase(),
        }
    }

    /// Returns true if this matcher accepts every record.
    #[inline]
    pub fn is_match_all(&self) -> bool {
        self.needle.is_empty()
    }

    /// Returns true if the record matches.
    pub fn matches(&self, record: &Record) -> bool {
        if self.is_match_all() {
            return true;
        }
        record
            .searchable_fields()
            .iter()
            .any(|field| contains_ignore_case(field, &self.needle))
    }
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    if haystack.is_ascii() && lowered_needle.is_ascii() {
        // Avoid allocating for the common ASCII case.
        let needle = lowered_needle.as_bytes();
        return haystack
            .as_bytes()
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle));
    }
    haystack.to_lowercase().contains(lowered_needle)
}

/// Filters records, keeping their relative order.
pub fn filter_records(records: &[Arc<Record>], matcher: &Matcher) -> Vec<Arc<Record>> {
    if matcher.is_match_all() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| matcher.matches(record))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::Attributes;

    fn make_record(id: u64, name: &str) -> Arc<Record> {
        Arc::new(Record::new(id, 0, Attributes::new(name, format!("DY_{}", 10000 + id))))
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let records = vec![make_record(1, "a"), make_record(2, "b")];
        let matcher = Matcher::new("");
        assert!(matcher.is_match_all());
        assert_eq!(filter_records(&records, &matcher).len(), 2);
    }

    #[test]
    fn test_case_insensitive_match() {
        let records = vec![
            make_record(1, "abcd"),
            make_record(2, "xyz"),
            make_record(3, "ABC123"),
        ];
        let result = filter_records(&records, &Matcher::new("abc"));
        assert_eq!(result.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![1, 3]);

        let result = filter_records(&records, &Matcher::new("AbC"));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_matches_any_searchable_field() {
        let with_remark = Arc::new(Record::new(
            1,
            0,
            Attributes::new("Alice", "DY_10001").with_remark("Roommate"),
        ));
        assert!(Matcher::new("room").matches(&with_remark));
        assert!(Matcher::new("dy_1000").matches(&with_remark));
        assert!(Matcher::new("ali").matches(&with_remark));
        assert!(!Matcher::new("bob").matches(&with_remark));
    }

    #[test]
    fn test_non_ascii_match() {
        let record = make_record(1, "周杰伦 #1");
        assert!(Matcher::new("杰伦").matches(&record));
        assert!(!Matcher::new("五月天").matches(&record));

        let record = make_record(2, "ÉCOLE");
        assert!(Matcher::new("école").matches(&record));
    }

    #[test]
    fn test_filter_keeps_order_and_shares_records() {
        let records = vec![make_record(3, "ab"), make_record(1, "b"), make_record(2, "ab")];
        let result = filter_records(&records, &Matcher::new("a"));
        assert_eq!(result.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![3, 2]);
        assert!(Arc::ptr_eq(&result[0], &records[0]));
    }
}
