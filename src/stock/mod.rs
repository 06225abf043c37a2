//! Seat stock: the single source of truth for availability.
//!
//! Only a [`StockPool`] may move a unit from available to sold, and it does
//! so exactly once per unit per seeding.

use async_trait::async_trait;

use crate::models::order::OrderRecord;
use crate::models::seat::SeatId;
use crate::utils::error::InventoryError;

mod memory;
mod pg;

pub use memory::MemoryStockPool;
pub use pg::PgStockPool;

/// Upper bound on units per variation, so a full availability recompute
/// stays cheap.
pub const MAX_UNITS_PER_VARIATION: usize = 4096;

/// Result of a successful claim: the order created for it and the seat it
/// took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub order_id: i64,
    pub seat_id: SeatId,
    pub variation_id: i64,
}

/// Outcome of [`StockPool::take_one`]. Sold-out is a normal result, never an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TakeOutcome {
    Claimed(Claim),
    SoldOut,
}

/// One unit's availability state, as seen by a full scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitState {
    pub seat_id: SeatId,
    pub sold: bool,
}

/// Storage seam for the seat pool.
///
/// # Concurrency contract
///
/// `take_one` is linearizable with respect to every other `take_one` and
/// `reset_all` for the same variation: under N concurrent calls, each free
/// unit is handed to at most one caller and the number of successful claims
/// never exceeds the free count at the start of the race. Different
/// variations never block each other.
///
/// A caller may observe `SoldOut` while another claimant's transaction is
/// still in flight on the last free unit; at the take's linearization point
/// that unit was claimed, so the outcome stands even if the claimant later
/// aborts and the unit returns to the pool.
#[async_trait]
pub trait StockPool: Send + Sync {
    /// Atomically create an order for `member_id` and claim one free unit of
    /// the variation for it, or do neither.
    ///
    /// Selection among free units is arbitrary. On a backing-store fault the
    /// state is left as if the call never happened.
    async fn take_one(
        &self,
        variation_id: i64,
        member_id: &str,
    ) -> Result<TakeOutcome, InventoryError>;

    /// Number of units with no order reference. Slow path; used for
    /// consistency checks and cache refills.
    async fn count_available(&self, variation_id: i64) -> Result<u64, InventoryError>;

    /// Full per-unit scan of a variation, for availability snapshot
    /// recomputation.
    async fn units(&self, variation_id: i64) -> Result<Vec<UnitState>, InventoryError>;

    /// Clear every order association and delete all orders, atomically:
    /// no unit is ever left referencing a deleted order.
    async fn reset_all(&self) -> Result<(), InventoryError>;

    /// All orders joined with their claimed seats, oldest first.
    async fn order_log(&self) -> Result<Vec<OrderRecord>, InventoryError>;
}
