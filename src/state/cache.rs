// Ordered local mirror of a server-side record collection.
// Newest-first, key-unique, trimmed back to the paging window after inserts.

#![allow(dead_code)]

use std::hash::Hash;

/// A record held in a [`RecordCache`]: one link or one ad.
pub trait Record {
    type Key: Clone + Eq + Hash;

    /// Unique identifier, immutable once created.
    fn key(&self) -> &Self::Key;

    /// Expiry instant in epoch seconds; zero or negative means never expires.
    fn expiry_time(&self) -> i64;

    /// Whether a record's action controls are locked once it expires.
    const LOCK_ON_EXPIRY: bool;
}

/// Ordered, key-unique mirror of the server's reverse-chronological
/// collection. Batches append at the tail (forward paging), new records go
/// in at the head; the sequence is never re-sorted, so positions shown to
/// the user stay put across edits.
#[derive(Debug)]
pub struct RecordCache<T: Record> {
    records: Vec<T>,
}

impl<T: Record> Default for RecordCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordCache<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Key of the oldest resident record, the seek cursor for the next page
    /// fetch.
    pub fn last_key(&self) -> Option<&T::Key> {
        self.records.last().map(|record| record.key())
    }

    /// Extend the tail with a freshly fetched batch. The caller guarantees
    /// the batch continues the existing tail in server order (it was fetched
    /// with a resume-after-last-key cursor); no reordering or duplicate
    /// check happens here.
    pub fn append_batch(&mut self, batch: Vec<T>) {
        self.records.extend(batch);
    }

    /// Insert a newly created record at the head. If that pushes the cache
    /// one past the window for `page`, the oldest resident record is dropped
    /// so the mirror stays bounded while the new record is still visible on
    /// the first page. The caller resets its pager to page zero afterwards.
    pub fn prepend(&mut self, record: T, page: usize, page_size: usize) {
        self.records.insert(0, record);
        if self.records.len() == (page + 1) * page_size + 1 {
            self.records.pop();
        }
    }

    /// Drop the record with the given key. A miss is a no-op: the remote
    /// call, not the cache, decides whether the record existed.
    pub fn remove_by_key(&mut self, key: &T::Key) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.key() != key);
        self.records.len() != before
    }

    /// Patch the record with the given key in place. The record keeps its
    /// position even when the edit would logically reorder it.
    pub fn update_by_key(&mut self, key: &T::Key, patch: impl FnOnce(&mut T)) -> bool {
        match self.records.iter_mut().find(|record| record.key() == key) {
            Some(record) => {
                patch(record);
                true
            }
            None => false,
        }
    }

    /// The slice backing one displayed page; shorter than `page_size` at the
    /// end of the collection.
    pub fn window(&self, page: usize, page_size: usize) -> &[T] {
        let start = (page * page_size).min(self.records.len());
        let end = (start + page_size).min(self.records.len());
        &self.records[start..end]
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Forget everything, on logout or when the user leaves this collection's
    /// tab.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: i64,
        body: String,
        expiry: i64,
    }

    impl Entry {
        fn new(id: i64) -> Self {
            Self {
                id,
                body: format!("entry-{id}"),
                expiry: 0,
            }
        }
    }

    impl Record for Entry {
        type Key = i64;

        fn key(&self) -> &i64 {
            &self.id
        }

        fn expiry_time(&self) -> i64 {
            self.expiry
        }

        const LOCK_ON_EXPIRY: bool = true;
    }

    fn filled(n: i64) -> RecordCache<Entry> {
        let mut cache = RecordCache::new();
        cache.append_batch((0..n).map(Entry::new).collect());
        cache
    }

    #[test]
    fn test_append_preserves_order_and_cursor() {
        let mut cache = filled(10);
        cache.append_batch((10..15).map(Entry::new).collect());

        assert_eq!(cache.len(), 15);
        assert_eq!(cache.last_key(), Some(&14));
        let ids: Vec<i64> = cache.records().iter().map(|e| e.id).collect();
        assert_eq!(ids, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_keys_stay_unique_across_mutations() {
        let mut cache = filled(20);
        cache.prepend(Entry::new(100), 1, 10);
        cache.remove_by_key(&5);
        cache.update_by_key(&7, |e| e.body = "edited".into());

        let mut ids: Vec<i64> = cache.records().iter().map(|e| e.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_prepend_trims_at_window_bound() {
        // 20 resident records while viewing page 1 (window bound 21).
        let mut cache = filled(20);
        cache.prepend(Entry::new(100), 1, 10);

        assert_eq!(cache.len(), 20);
        assert_eq!(cache.records()[0].id, 100);
        // The previous oldest record was dropped from the tail.
        assert_eq!(cache.last_key(), Some(&18));
    }

    #[test]
    fn test_prepend_below_bound_keeps_tail() {
        let mut cache = filled(15);
        cache.prepend(Entry::new(100), 1, 10);

        assert_eq!(cache.len(), 16);
        assert_eq!(cache.last_key(), Some(&14));
    }

    #[test]
    fn test_window_bound_holds_after_prepend() {
        for (len, page) in [(0, 0), (7, 0), (10, 0), (15, 1), (20, 1), (30, 2)] {
            let mut cache = filled(len);
            cache.prepend(Entry::new(100), page, 10);
            assert!(
                cache.len() <= (page + 1) * 10 + 1,
                "len {} exceeds bound for page {page}",
                cache.len(),
            );
        }
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cache = filled(5);
        assert!(!cache.remove_by_key(&42));
        assert_eq!(cache.len(), 5);
        assert!(cache.remove_by_key(&3));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut cache = filled(10);
        assert!(cache.update_by_key(&4, |e| e.body = "edited".into()));

        assert_eq!(cache.records()[4].id, 4);
        assert_eq!(cache.records()[4].body, "edited");
        assert!(!cache.update_by_key(&99, |e| e.body = "nope".into()));
    }

    #[test]
    fn test_window_short_at_end_of_collection() {
        let cache = filled(13);
        assert_eq!(cache.window(0, 10).len(), 10);
        assert_eq!(cache.window(1, 10).len(), 3);
        assert_eq!(cache.window(1, 10)[0].id, 10);
        assert!(cache.window(2, 10).is_empty());
    }
}
