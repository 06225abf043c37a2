//! Per-variation availability cache.
//!
//! Bounds the cost of read-heavy seat-map traffic: reads hit a cached
//! snapshot, recomputed lazily on miss. Two tagged cache kinds exist per
//! variation: the full grid snapshot and the scalar remaining count.
//!
//! Staleness policy: the allocator invalidates a variation's entries
//! synchronously on every sale, so a read issued after a completed purchase
//! observes it. The TTL is a backstop bounding staleness after writes that
//! bypass the allocator (an admin reseed hitting the store directly).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::models::seat::SeatId;
use crate::stock::{StockPool, UnitState};
use crate::utils::error::InventoryError;

pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// Cached derived view of one variation's occupied/free grid.
#[derive(Debug, Clone)]
pub struct SeatMap {
    pub variation_id: i64,
    pub rows: u16,
    pub cols: u16,
    /// Row-major; cells with no backing unit count as occupied (not
    /// sellable).
    occupied: Vec<bool>,
    pub available: u64,
    pub total: u64,
}

impl SeatMap {
    fn from_units(variation_id: i64, units: &[UnitState]) -> Self {
        let rows = units.iter().map(|u| u.seat_id.row + 1).max().unwrap_or(0);
        let cols = units.iter().map(|u| u.seat_id.col + 1).max().unwrap_or(0);

        let mut occupied = vec![true; usize::from(rows) * usize::from(cols)];
        let mut available = 0_u64;
        for unit in units {
            let idx = usize::from(unit.seat_id.row) * usize::from(cols) + usize::from(unit.seat_id.col);
            occupied[idx] = unit.sold;
            if !unit.sold {
                available += 1;
            }
        }

        Self {
            variation_id,
            rows,
            cols,
            occupied,
            available,
            total: units.len() as u64,
        }
    }

    pub fn is_occupied(&self, seat: SeatId) -> bool {
        if seat.row >= self.rows || seat.col >= self.cols {
            return true;
        }
        self.occupied[usize::from(seat.row) * usize::from(self.cols) + usize::from(seat.col)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    SeatMap(i64),
    Remaining(i64),
}

#[derive(Clone)]
enum CachedValue {
    SeatMap(Arc<SeatMap>),
    Remaining(u64),
}

struct Entry {
    value: CachedValue,
    expires_at: Instant,
}

/// TTL'd, invalidate-on-sale cache over a [`StockPool`].
///
/// The map lock is held only for lookups and inserts, never across a store
/// scan, so one variation's recompute does not block another's reads.
/// Concurrent misses on the same key may recompute twice; last write wins.
pub struct AvailabilityCache {
    pool: Arc<dyn StockPool>,
    entries: RwLock<HashMap<CacheKey, Entry>>,
    ttl: Duration,
}

impl AvailabilityCache {
    pub fn new(pool: Arc<dyn StockPool>) -> Self {
        Self::with_ttl(pool, DEFAULT_TTL)
    }

    pub fn with_ttl(pool: Arc<dyn StockPool>, ttl: Duration) -> Self {
        Self {
            pool,
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// The variation's seat grid, cached. Recomputes from the stock pool on
    /// miss or expiry.
    pub async fn seat_map(&self, variation_id: i64) -> Result<Arc<SeatMap>, InventoryError> {
        let key = CacheKey::SeatMap(variation_id);
        if let Some(CachedValue::SeatMap(map)) = self.fresh(key).await? {
            return Ok(map);
        }

        let units = self.pool.units(variation_id).await?;
        let map = Arc::new(SeatMap::from_units(variation_id, &units));
        debug!(variation_id, available = map.available, "Seat map recomputed");

        self.store(key, CachedValue::SeatMap(Arc::clone(&map))).await;
        Ok(map)
    }

    /// The variation's free-unit count, cached.
    pub async fn remaining(&self, variation_id: i64) -> Result<u64, InventoryError> {
        let key = CacheKey::Remaining(variation_id);
        if let Some(CachedValue::Remaining(count)) = self.fresh(key).await? {
            return Ok(count);
        }

        let count = self.pool.count_available(variation_id).await?;
        self.store(key, CachedValue::Remaining(count)).await;
        Ok(count)
    }

    /// Drop both cache kinds for the variation; the next read recomputes.
    pub async fn invalidate(&self, variation_id: i64) {
        let mut entries = self.entries.write().await;
        entries.remove(&CacheKey::SeatMap(variation_id));
        entries.remove(&CacheKey::Remaining(variation_id));
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn fresh(&self, key: CacheKey) -> Result<Option<CachedValue>, InventoryError> {
        let entries = self.entries.read().await;
        let Some(entry) = entries.get(&key) else {
            return Ok(None);
        };
        if entry.expires_at <= Instant::now() {
            return Ok(None);
        }

        // The key embeds the kind, so a mismatched variant means the map
        // itself is corrupt.
        match (&key, &entry.value) {
            (CacheKey::SeatMap(_), CachedValue::SeatMap(_))
            | (CacheKey::Remaining(_), CachedValue::Remaining(_)) => Ok(Some(entry.value.clone())),
            _ => Err(InventoryError::InconsistentState(
                "cache entry kind does not match its key".to_string(),
            )),
        }
    }

    async fn store(&self, key: CacheKey, value: CachedValue) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::{MemoryStockPool, TakeOutcome};

    async fn seeded_pool() -> Arc<MemoryStockPool> {
        let pool = Arc::new(MemoryStockPool::new());
        pool.add_variation(1, 2, 3).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn seat_map_reflects_pool_state() {
        let pool = seeded_pool().await;
        let cache = AvailabilityCache::new(pool.clone());

        let map = cache.seat_map(1).await.unwrap();
        assert_eq!((map.rows, map.cols), (2, 3));
        assert_eq!(map.total, 6);
        assert_eq!(map.available, 6);
        assert!(!map.is_occupied(SeatId::new(1, 2).unwrap()));
    }

    #[tokio::test]
    async fn invalidate_makes_the_next_read_recompute() {
        let pool = seeded_pool().await;
        let cache = AvailabilityCache::new(pool.clone());

        assert_eq!(cache.remaining(1).await.unwrap(), 6);

        let TakeOutcome::Claimed(claim) = pool.take_one(1, "alice").await.unwrap() else {
            panic!("expected a claim");
        };

        // Still the cached value until someone invalidates.
        assert_eq!(cache.remaining(1).await.unwrap(), 6);

        cache.invalidate(1).await;
        assert_eq!(cache.remaining(1).await.unwrap(), 5);
        assert!(cache.seat_map(1).await.unwrap().is_occupied(claim.seat_id));
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_bounds_staleness_without_invalidation() {
        let pool = seeded_pool().await;
        let cache = AvailabilityCache::with_ttl(pool.clone(), Duration::from_secs(10));

        assert_eq!(cache.remaining(1).await.unwrap(), 6);
        pool.take_one(1, "alice").await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.remaining(1).await.unwrap(), 6);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.remaining(1).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn variations_are_cached_independently() {
        let pool = seeded_pool().await;
        pool.add_variation(2, 1, 1).await.unwrap();
        let cache = AvailabilityCache::new(pool.clone());

        assert_eq!(cache.remaining(1).await.unwrap(), 6);
        assert_eq!(cache.remaining(2).await.unwrap(), 1);

        pool.take_one(2, "alice").await.unwrap();
        cache.invalidate(2).await;

        // Variation 1 keeps its entry; only 2 was dropped.
        assert_eq!(cache.remaining(1).await.unwrap(), 6);
        assert_eq!(cache.remaining(2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_variation_yields_an_empty_map() {
        let pool = Arc::new(MemoryStockPool::new());
        let cache = AvailabilityCache::new(pool);

        let map = cache.seat_map(9).await.unwrap();
        assert_eq!((map.rows, map.cols), (0, 0));
        assert_eq!(map.available, 0);
        assert!(map.is_occupied(SeatId::new(0, 0).unwrap()));
    }
}
