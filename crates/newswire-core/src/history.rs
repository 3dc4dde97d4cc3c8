//! Bounded news history with monotonic ids.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::news::NewsItem;

/// Default history capacity.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Bounded FIFO log of published news.
///
/// Ids come from a separate counter so they keep increasing after old items
/// are evicted; an id is never reused. Interior mutability lets one shared
/// handle serve all tasks; the lock is never held across an await.
pub struct HistoryBuffer {
    capacity: usize,
    inner: Mutex<Inner>,
}

struct Inner {
    items: VecDeque<NewsItem>,
    next_id: u64,
}

impl HistoryBuffer {
    /// Create a buffer holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                next_id: 1,
            }),
        }
    }

    /// Append a news item, evicting the oldest past capacity.
    ///
    /// Assigns the next id, stamps the current UTC time, and returns a clone
    /// of the stored item.
    pub fn append(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> NewsItem {
        let mut inner = self.inner.lock();
        let item = NewsItem {
            id: inner.next_id,
            title: title.into(),
            content: content.into(),
            category: category.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        inner.next_id += 1;
        inner.items.push_back(item.clone());
        if inner.items.len() > self.capacity {
            let _ = inner.items.pop_front();
        }
        item
    }

    /// The most recent `n` items in insertion order.
    ///
    /// Returns everything stored when `n` exceeds the current length.
    pub fn recent(&self, n: usize) -> Vec<NewsItem> {
        let inner = self.inner.lock();
        let skip = inner.items.len().saturating_sub(n);
        inner.items.iter().skip(skip).cloned().collect()
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Maximum number of items retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(buf: &HistoryBuffer, n: usize) {
        for i in 0..n {
            let _ = buf.append(format!("title {i}"), format!("content {i}"), "general");
        }
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let buf = HistoryBuffer::new(10);
        let a = buf.append("a", "1", "general");
        let b = buf.append("b", "2", "general");
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn append_stamps_timestamp() {
        let buf = HistoryBuffer::new(10);
        let item = buf.append("a", "1", "general");
        assert!(!item.timestamp.is_empty());
        assert!(item.timestamp.contains('T'));
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let buf = HistoryBuffer::new(3);
        fill(&buf, 5);
        assert_eq!(buf.len(), 3);
        let items = buf.recent(10);
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn ids_keep_increasing_after_eviction() {
        let buf = HistoryBuffer::new(2);
        fill(&buf, 10);
        let item = buf.append("late", "x", "general");
        assert_eq!(item.id, 11);
        let ids: Vec<u64> = buf.recent(10).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn recent_returns_last_n_in_order() {
        let buf = HistoryBuffer::new(10);
        fill(&buf, 5);
        let items = buf.recent(3);
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn recent_clamps_to_stored_length() {
        let buf = HistoryBuffer::new(10);
        fill(&buf, 2);
        assert_eq!(buf.recent(50).len(), 2);
    }

    #[test]
    fn recent_zero_is_empty() {
        let buf = HistoryBuffer::new(10);
        fill(&buf, 3);
        assert!(buf.recent(0).is_empty());
    }

    #[test]
    fn recent_on_empty_buffer() {
        let buf = HistoryBuffer::new(10);
        assert!(buf.recent(5).is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn len_tracks_appends() {
        let buf = HistoryBuffer::new(10);
        assert_eq!(buf.len(), 0);
        fill(&buf, 4);
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn capacity_floor_is_one() {
        let buf = HistoryBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
        fill(&buf, 3);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn default_capacity() {
        let buf = HistoryBuffer::default();
        assert_eq!(buf.capacity(), DEFAULT_MAX_HISTORY);
    }

    #[test]
    fn append_returns_stored_clone() {
        let buf = HistoryBuffer::new(10);
        let item = buf.append("hello", "world", "updates");
        let stored = buf.recent(1);
        assert_eq!(stored[0], item);
        assert_eq!(stored[0].category, "updates");
    }
}
