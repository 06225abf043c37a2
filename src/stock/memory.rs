use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::order::OrderRecord;
use crate::models::seat::SeatId;
use crate::stock::{Claim, StockPool, TakeOutcome, UnitState, MAX_UNITS_PER_VARIATION};
use crate::utils::error::InventoryError;

/// In-process stock pool: one mutex over the whole unit table.
///
/// Mirrors the atomic-set backend the system can also run against (pop one
/// member from the variation's free set); doubles as the store for tests.
/// Critical sections are short and never held across an await.
#[derive(Default)]
pub struct MemoryStockPool {
    state: Mutex<PoolState>,
}

#[derive(Default)]
struct PoolState {
    variations: HashMap<i64, Vec<MemUnit>>,
    orders: Vec<OrderRecord>,
    next_order_id: i64,
}

struct MemUnit {
    seat_id: SeatId,
    order_id: Option<i64>,
}

impl MemoryStockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a variation with a `rows` x `cols` grid of free units. Replaces
    /// any prior seeding for the variation.
    pub async fn add_variation(
        &self,
        variation_id: i64,
        rows: u16,
        cols: u16,
    ) -> Result<(), InventoryError> {
        let total = usize::from(rows) * usize::from(cols);
        if total > MAX_UNITS_PER_VARIATION {
            return Err(InventoryError::InconsistentState(format!(
                "variation {variation_id} would have {total} units, cap is {MAX_UNITS_PER_VARIATION}"
            )));
        }

        let mut units = Vec::with_capacity(total);
        for row in 0..rows {
            for col in 0..cols {
                units.push(MemUnit {
                    seat_id: SeatId::new(row, col)?,
                    order_id: None,
                });
            }
        }

        let mut state = self.state.lock().await;
        state.variations.insert(variation_id, units);
        Ok(())
    }
}

#[async_trait]
impl StockPool for MemoryStockPool {
    async fn take_one(
        &self,
        variation_id: i64,
        member_id: &str,
    ) -> Result<TakeOutcome, InventoryError> {
        let mut state = self.state.lock().await;

        let order_id = state.next_order_id + 1;
        let Some(units) = state.variations.get_mut(&variation_id) else {
            debug!(variation_id, "No free unit to claim");
            return Ok(TakeOutcome::SoldOut);
        };

        let Some(unit) = units.iter_mut().find(|u| u.order_id.is_none()) else {
            debug!(variation_id, "No free unit to claim");
            return Ok(TakeOutcome::SoldOut);
        };

        unit.order_id = Some(order_id);
        let seat_id = unit.seat_id;

        state.next_order_id = order_id;
        state.orders.push(OrderRecord {
            order_id,
            member_id: member_id.to_string(),
            seat_id,
            variation_id,
            updated_at: Utc::now(),
        });

        Ok(TakeOutcome::Claimed(Claim {
            order_id,
            seat_id,
            variation_id,
        }))
    }

    async fn count_available(&self, variation_id: i64) -> Result<u64, InventoryError> {
        let state = self.state.lock().await;
        let free = state
            .variations
            .get(&variation_id)
            .map(|units| units.iter().filter(|u| u.order_id.is_none()).count())
            .unwrap_or(0);
        Ok(free as u64)
    }

    async fn units(&self, variation_id: i64) -> Result<Vec<UnitState>, InventoryError> {
        let state = self.state.lock().await;
        Ok(state
            .variations
            .get(&variation_id)
            .map(|units| {
                units
                    .iter()
                    .map(|u| UnitState {
                        seat_id: u.seat_id,
                        sold: u.order_id.is_some(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn reset_all(&self) -> Result<(), InventoryError> {
        let mut state = self.state.lock().await;

        let mut cleared = 0_u64;
        for units in state.variations.values_mut() {
            for unit in units.iter_mut() {
                if unit.order_id.take().is_some() {
                    cleared += 1;
                }
            }
        }
        state.orders.clear();
        // next_order_id is not rewound: an order id never names two sales
        // within one process lifetime.

        info!(cleared, "Stock reset, all units available again");
        Ok(())
    }

    async fn order_log(&self) -> Result<Vec<OrderRecord>, InventoryError> {
        let state = self.state.lock().await;
        Ok(state.orders.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn takes_each_unit_at_most_once() {
        let pool = MemoryStockPool::new();
        pool.add_variation(1, 1, 2).await.unwrap();

        let first = pool.take_one(1, "alice").await.unwrap();
        let second = pool.take_one(1, "bob").await.unwrap();
        let third = pool.take_one(1, "carol").await.unwrap();

        let seats: Vec<SeatId> = [first, second]
            .into_iter()
            .map(|outcome| match outcome {
                TakeOutcome::Claimed(claim) => claim.seat_id,
                TakeOutcome::SoldOut => panic!("pool sold out early"),
            })
            .collect();
        assert_ne!(seats[0], seats[1]);
        assert_eq!(third, TakeOutcome::SoldOut);
        assert_eq!(pool.count_available(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_variation_is_sold_out_not_an_error() {
        let pool = MemoryStockPool::new();
        assert_eq!(pool.take_one(7, "alice").await.unwrap(), TakeOutcome::SoldOut);
        assert_eq!(pool.count_available(7).await.unwrap(), 0);
        assert!(pool.units(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn order_ids_stay_monotonic_across_resets() {
        let pool = MemoryStockPool::new();
        pool.add_variation(1, 1, 1).await.unwrap();

        let TakeOutcome::Claimed(first) = pool.take_one(1, "alice").await.unwrap() else {
            panic!("expected a claim");
        };
        pool.reset_all().await.unwrap();
        let TakeOutcome::Claimed(second) = pool.take_one(1, "bob").await.unwrap() else {
            panic!("expected a claim");
        };

        assert!(second.order_id > first.order_id);
        assert_eq!(pool.order_log().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_variations_over_the_unit_cap() {
        let pool = MemoryStockPool::new();
        let err = pool.add_variation(1, 64, 65).await.unwrap_err();
        assert_eq!(err.code(), "INCONSISTENT_STATE");
    }
}
