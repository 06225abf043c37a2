use std::collections::VecDeque;

use tokio::sync::RwLock;

use crate::models::sale::RecentSale;

pub const FEED_CAPACITY: usize = 10;

/// Newest-first buffer of the most recent completed sales.
///
/// Writers take the lock exclusively for the insert-and-discard step, so no
/// entry is lost or duplicated and the final order is a total serialization
/// of record completions; `list` reads a consistent copy and never observes
/// a mid-shift buffer.
pub struct RecentActivityFeed {
    entries: RwLock<VecDeque<RecentSale>>,
    capacity: usize,
}

impl RecentActivityFeed {
    pub fn new() -> Self {
        Self::with_capacity(FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Insert at the front; beyond capacity the oldest entry is discarded.
    pub async fn record(&self, sale: RecentSale) {
        let mut entries = self.entries.write().await;
        entries.push_front(sale);
        entries.truncate(self.capacity);
    }

    /// Point-in-time copy, newest first. Length never exceeds capacity.
    pub async fn list(&self) -> Vec<RecentSale> {
        let entries = self.entries.read().await;
        entries.iter().cloned().collect()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for RecentActivityFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seat::SeatId;

    fn sale(n: u16) -> RecentSale {
        RecentSale {
            seat_id: SeatId::new(n / 64, n % 64).unwrap(),
            variation_name: "Arena".to_string(),
            ticket_name: format!("Show {n}"),
            artist_name: "The Headliners".to_string(),
        }
    }

    #[tokio::test]
    async fn lists_newest_first_under_capacity() {
        let feed = RecentActivityFeed::new();
        for n in 0..3 {
            feed.record(sale(n)).await;
        }

        let listed = feed.list().await;
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0], sale(2));
        assert_eq!(listed[2], sale(0));
    }

    #[tokio::test]
    async fn discards_the_oldest_beyond_capacity() {
        let feed = RecentActivityFeed::new();
        for n in 0..15 {
            feed.record(sale(n)).await;
        }

        let listed = feed.list().await;
        assert_eq!(listed.len(), FEED_CAPACITY);
        // The write at the capacity boundary must land like any other.
        let expected: Vec<RecentSale> = (5..15).rev().map(sale).collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn clear_empties_the_feed() {
        let feed = RecentActivityFeed::new();
        feed.record(sale(1)).await;
        feed.clear().await;
        assert!(feed.is_empty().await);
        assert!(feed.list().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_writers_lose_nothing() {
        let feed = std::sync::Arc::new(RecentActivityFeed::new());

        let mut tasks = tokio::task::JoinSet::new();
        for n in 0..64 {
            let feed = std::sync::Arc::clone(&feed);
            tasks.spawn(async move { feed.record(sale(n)).await });
        }
        while tasks.join_next().await.is_some() {}

        let listed = feed.list().await;
        assert_eq!(listed.len(), FEED_CAPACITY);

        // No duplicates, and every survivor is one of the recorded sales.
        let mut names: Vec<&str> = listed.iter().map(|s| s.ticket_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEED_CAPACITY);
        for entry in &listed {
            assert_eq!(entry.artist_name, "The Headliners");
        }
    }
}
