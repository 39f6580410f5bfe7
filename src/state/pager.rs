// Page cursor over a RecordCache.
// Serves resident windows and pulls the next batch from the server when the
// cursor runs past what is cached.

#![allow(dead_code)]

use crate::error::{Result, SnipError};

use super::cache::{Record, RecordCache};

/// Window size for every displayed page.
pub const PAGE_SIZE: usize = 10;

/// The first fetch pulls two pages worth so the next-page control is useful
/// immediately.
pub const INITIAL_FETCH_SIZE: usize = 20;

/// Seek-paginated read access to one remote collection. `after` is the key
/// of the last record already seen; the batch continues immediately after it
/// in the server's own newest-first order, so concurrent writes by other
/// sessions cannot shift or duplicate a page boundary.
pub trait PageSource<T: Record> {
    async fn fetch_page(&self, page_size: usize, after: Option<&T::Key>) -> Result<Vec<T>>;
}

/// Zero-based page cursor with a coarse busy flag over navigation.
///
/// `in_flight` only guards overlapping page navigations from rapid repeated
/// input; it is not a general lock. A navigation fetch is never cancelled
/// and its result is applied on arrival without a staleness check, even if
/// an unrelated mutation landed in the meantime.
#[derive(Debug, Default)]
pub struct Pager {
    page: usize,
    in_flight: bool,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn is_first_page(&self) -> bool {
        self.page == 0
    }

    /// Recomputed from the cache length on every call; never cached, so it
    /// cannot go stale after a mutation.
    pub fn is_last_page(&self, cache_len: usize) -> bool {
        cache_len <= (self.page + 1) * PAGE_SIZE
    }

    /// Replace the cache with a fresh initial load and rewind to page zero.
    pub async fn load_initial<T, S>(&mut self, cache: &mut RecordCache<T>, source: &S) -> Result<()>
    where
        T: Record,
        S: PageSource<T>,
    {
        if self.in_flight {
            return Ok(());
        }
        self.in_flight = true;
        match source.fetch_page(INITIAL_FETCH_SIZE, None).await {
            Ok(batch) => {
                cache.clear();
                cache.append_batch(batch);
                self.page = 0;
                self.in_flight = false;
                Ok(())
            }
            Err(err) => {
                self.in_flight = false;
                Err(SnipError::Sync(err.to_string()))
            }
        }
    }

    /// Move one page forward. No-op while a navigation is in flight or when
    /// already on the last page. If the page after the next one is not yet
    /// resident, the next batch is fetched (seek cursor = the cache's last
    /// key) and appended before the cursor moves. A fetch failure is fatal:
    /// the flag is cleared, nothing is applied, and the caller is expected
    /// to recommend a full reload.
    pub async fn advance<T, S>(&mut self, cache: &mut RecordCache<T>, source: &S) -> Result<()>
    where
        T: Record,
        S: PageSource<T>,
    {
        if self.in_flight || self.is_last_page(cache.len()) {
            return Ok(());
        }
        self.in_flight = true;
        let next = self.page + 1;
        if cache.len() > (next + 1) * PAGE_SIZE {
            self.page = next;
            self.in_flight = false;
            return Ok(());
        }
        match source.fetch_page(PAGE_SIZE, cache.last_key()).await {
            Ok(batch) => {
                cache.append_batch(batch);
                self.page = next;
                self.in_flight = false;
                Ok(())
            }
            Err(err) => {
                self.in_flight = false;
                Err(SnipError::Sync(err.to_string()))
            }
        }
    }

    /// Move one page back. Backward pages are always resident (the cache is
    /// append-only), so this never fetches. No-op while busy or on page
    /// zero, no matter how often it is called.
    pub fn retreat(&mut self) {
        if self.in_flight || self.page == 0 {
            return;
        }
        self.page -= 1;
    }

    /// Rewind to page zero, after a creation or a full refresh.
    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Step back once if a removal just emptied the current non-first page.
    pub fn clamp_after_removal(&mut self, cache_len: usize) {
        if self.page > 0 && cache_len <= self.page * PAGE_SIZE {
            self.page -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: i64,
    }

    impl Record for Entry {
        type Key = i64;

        fn key(&self) -> &i64 {
            &self.id
        }

        fn expiry_time(&self) -> i64 {
            0
        }

        const LOCK_ON_EXPIRY: bool = true;
    }

    /// In-memory stand-in for the remote collection, newest-first.
    struct FakeServer {
        records: Vec<Entry>,
        fetches: Cell<usize>,
        fail: bool,
    }

    impl FakeServer {
        fn with_records(n: i64) -> Self {
            Self {
                records: (0..n).map(|id| Entry { id }).collect(),
                fetches: Cell::new(0),
                fail: false,
            }
        }
    }

    impl PageSource<Entry> for FakeServer {
        async fn fetch_page(&self, page_size: usize, after: Option<&i64>) -> Result<Vec<Entry>> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail {
                return Err(SnipError::Other("connection reset".into()));
            }
            let start = match after {
                Some(key) => self
                    .records
                    .iter()
                    .position(|r| r.id == *key)
                    .map(|i| i + 1)
                    .unwrap_or(self.records.len()),
                None => 0,
            };
            let end = (start + page_size).min(self.records.len());
            Ok(self.records[start..end].to_vec())
        }
    }

    #[tokio::test]
    async fn test_scenario_walks_to_end_of_collection() {
        let server = FakeServer::with_records(25);
        let mut cache = RecordCache::new();
        let mut pager = Pager::new();

        pager.load_initial(&mut cache, &server).await.unwrap();
        assert_eq!(cache.len(), 20);
        assert_eq!(pager.page(), 0);

        // Next page is within the initial load, but the fetch-ahead pulls
        // the remaining five, seeking after record #20.
        pager.advance(&mut cache, &server).await.unwrap();
        assert_eq!(cache.len(), 25);
        assert_eq!(pager.page(), 1);
        assert!(!pager.is_last_page(cache.len()));

        pager.advance(&mut cache, &server).await.unwrap();
        assert_eq!(pager.page(), 2);
        assert!(pager.is_last_page(cache.len()));
        let ids: Vec<i64> = cache.window(2, PAGE_SIZE).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![20, 21, 22, 23, 24]);

        // Past the end, advancing is a no-op.
        let fetches = server.fetches.get();
        pager.advance(&mut cache, &server).await.unwrap();
        assert_eq!(pager.page(), 2);
        assert_eq!(cache.len(), 25);
        assert_eq!(server.fetches.get(), fetches);
    }

    #[tokio::test]
    async fn test_retreat_never_fetches_and_stops_at_zero() {
        let server = FakeServer::with_records(40);
        let mut cache = RecordCache::new();
        let mut pager = Pager::new();

        pager.load_initial(&mut cache, &server).await.unwrap();
        pager.advance(&mut cache, &server).await.unwrap();
        pager.advance(&mut cache, &server).await.unwrap();
        assert_eq!(pager.page(), 2);

        let fetches = server.fetches.get();
        pager.retreat();
        pager.retreat();
        assert_eq!(pager.page(), 0);
        assert!(pager.is_first_page());

        // Retreating on the first page is idempotent.
        pager.retreat();
        pager.retreat();
        assert_eq!(pager.page(), 0);
        assert_eq!(server.fetches.get(), fetches);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal_and_releases_flag() {
        let mut server = FakeServer::with_records(40);
        let mut cache = RecordCache::new();
        let mut pager = Pager::new();
        pager.load_initial(&mut cache, &server).await.unwrap();
        pager.advance(&mut cache, &server).await.unwrap();
        assert_eq!(cache.len(), 30);

        server.fail = true;
        let err = pager.advance(&mut cache, &server).await.unwrap_err();
        assert!(matches!(err, SnipError::Sync(_)));
        // Nothing was applied and navigation is not wedged.
        assert_eq!(cache.len(), 30);
        assert_eq!(pager.page(), 1);
        assert!(!pager.is_busy());
    }

    #[tokio::test]
    async fn test_order_matches_direct_fetch() {
        let server = FakeServer::with_records(25);
        let mut cache = RecordCache::new();
        let mut pager = Pager::new();

        pager.load_initial(&mut cache, &server).await.unwrap();
        pager.advance(&mut cache, &server).await.unwrap();

        for n in [1, 5, 20, 25] {
            let direct = server.fetch_page(n, None).await.unwrap();
            assert_eq!(&cache.records()[..n], &direct[..]);
        }
    }

    #[tokio::test]
    async fn test_create_round_trip_shows_record_first() {
        let server = FakeServer::with_records(20);
        let mut cache = RecordCache::new();
        let mut pager = Pager::new();
        pager.load_initial(&mut cache, &server).await.unwrap();
        pager.advance(&mut cache, &server).await.unwrap();
        assert_eq!(pager.page(), 1);
        assert_eq!(cache.len(), 20);

        // A successful create prepends, trims, and rewinds to page zero.
        cache.prepend(Entry { id: 100 }, pager.page(), PAGE_SIZE);
        pager.reset();

        assert_eq!(cache.len(), 20);
        assert_eq!(pager.page(), 0);
        assert_eq!(cache.window(0, PAGE_SIZE)[0].id, 100);
    }

    #[tokio::test]
    async fn test_delete_clamps_page_without_fetch() {
        let server = FakeServer::with_records(11);
        let mut cache = RecordCache::new();
        let mut pager = Pager::new();
        pager.load_initial(&mut cache, &server).await.unwrap();
        pager.advance(&mut cache, &server).await.unwrap();
        assert_eq!(pager.page(), 1);
        assert_eq!(cache.window(1, PAGE_SIZE).len(), 1);

        // Delete the sole record on the last page.
        let fetches = server.fetches.get();
        cache.remove_by_key(&10);
        pager.clamp_after_removal(cache.len());

        assert_eq!(pager.page(), 0);
        assert_eq!(cache.window(0, PAGE_SIZE).len(), 10);
        assert_eq!(server.fetches.get(), fetches);
    }
}
