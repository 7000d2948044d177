//! Page sources.
//!
//! A page source answers "give me page N" with a bounded batch of records.
//! An empty batch means the source has no more pages; it is not an error.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use roster_core::{Attributes, FetchError, Record};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Backing source of paged records.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    /// Fetches page `page`, counting from 1.
    async fn fetch(&self, page: u32) -> Result<Vec<Record>, FetchError>;
}

fn page_bounds(page: u32, page_size: usize, len: usize) -> Result<(usize, usize), FetchError> {
    if page == 0 {
        return Err(FetchError::transport("page numbers start at 1"));
    }
    let start = (page as usize - 1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    Ok((start, end))
}

/// Serves a fixed list of records in pages.
///
/// Failures can be queued with `fail_next`; each queued error is returned by
/// exactly one subsequent fetch.
#[derive(Debug)]
pub struct StaticPageSource {
    records: RwLock<Vec<Record>>,
    page_size: usize,
    latency: Option<Duration>,
    failures: Mutex<VecDeque<FetchError>>,
    fetches: AtomicUsize,
}

impl StaticPageSource {
    /// Creates a source over `records`. A zero page size is treated as 1.
    pub fn new(records: Vec<Record>, page_size: usize) -> Self {
        Self {
            records: RwLock::new(records),
            page_size: page_size.max(1),
            latency: None,
            failures: Mutex::new(VecDeque::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Delays every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next fetch fail with `error`.
    pub fn fail_next(&self, error: FetchError) {
        self.failures.lock().push_back(error);
    }

    /// Replaces the served records, as if the remote list changed.
    pub fn set_records(&self, records: Vec<Record>) {
        *self.records.write() = records;
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn fetch(&self, page: u32) -> Result<Vec<Record>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        let records = self.records.read();
        let (start, end) = page_bounds(page, self.page_size, records.len())?;
        Ok(records[start..end].to_vec())
    }
}

const MOCK_TOTAL: u64 = 1000;
const MOCK_PAGE_SIZE: usize = 10;
const MOCK_NAMES: [&str; 9] = [
    "Jay", "Cyndi", "Angela", "JJ", "Mayday", "Joker", "Gem", "Andy", "Mini",
];
const HOUR_MS: i64 = 3_600_000;

/// Generates the demo follow list: 1000 entries served 10 per page.
///
/// Entry `n` has id `n`, handle `DY_{10000 + n}`, is VIP when `n` is a
/// multiple of 3 and was followed `n` hours before the anchor time.
#[derive(Clone, Debug)]
pub struct MockFollowSource {
    anchor_ms: i64,
    latency: Option<Duration>,
}

impl MockFollowSource {
    /// Creates a source whose newest follow happened at `anchor_ms`.
    pub fn new(anchor_ms: i64) -> Self {
        Self {
            anchor_ms,
            latency: None,
        }
    }

    /// Delays every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Builds entry `n` of the list.
    pub fn entry(&self, n: u64) -> Record {
        let name_index = (n % MOCK_NAMES.len() as u64) as usize;
        let attributes = Attributes::new(
            format!("{} #{}", MOCK_NAMES[name_index], n + 1),
            format!("DY_{}", 10_000 + n),
        )
        .with_avatar(name_index as u32 + 1)
        .with_vip(n % 3 == 0);
        Record::new(n, self.anchor_ms - n as i64 * HOUR_MS, attributes)
    }
}

#[async_trait]
impl PageSource for MockFollowSource {
    async fn fetch(&self, page: u32) -> Result<Vec<Record>, FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let (start, end) = page_bounds(page, MOCK_PAGE_SIZE, MOCK_TOTAL as usize)?;
        Ok((start as u64..end as u64).map(|n| self.entry(n)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_records(count: u64) -> Vec<Record> {
        (0..count)
            .map(|id| Record::new(id, id as i64, Attributes::new(format!("user {}", id), "DY")))
            .collect()
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(1, 10, 25).unwrap(), (0, 10));
        assert_eq!(page_bounds(3, 10, 25).unwrap(), (20, 25));
        assert_eq!(page_bounds(4, 10, 25).unwrap(), (25, 25));
        assert!(page_bounds(0, 10, 25).is_err());
    }

    #[tokio::test]
    async fn test_static_source_pages() {
        let source = StaticPageSource::new(make_records(25), 10);
        assert_eq!(source.fetch(1).await.unwrap().len(), 10);
        assert_eq!(source.fetch(3).await.unwrap().len(), 5);
        assert!(source.fetch(4).await.unwrap().is_empty());
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_static_source_queued_failure() {
        let source = StaticPageSource::new(make_records(5), 10);
        source.fail_next(FetchError::transport("offline"));

        assert_eq!(source.fetch(1).await, Err(FetchError::transport("offline")));
        assert_eq!(source.fetch(1).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_mock_follow_source() {
        let source = MockFollowSource::new(1_000 * HOUR_MS);
        let page = source.fetch(1).await.unwrap();
        assert_eq!(page.len(), 10);

        let first = &page[0];
        assert_eq!(first.id(), 0);
        assert_eq!(first.attributes().handle, "DY_10000");
        assert!(first.attributes().is_vip);
        assert!(!page[1].attributes().is_vip);
        assert_eq!(page[1].sort_key(), first.sort_key() - HOUR_MS);

        assert_eq!(source.fetch(100).await.unwrap().last().unwrap().id(), 999);
        assert!(source.fetch(101).await.unwrap().is_empty());
    }
}
