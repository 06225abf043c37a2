use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::models::order::OrderRecord;
use crate::models::seat::SeatId;
use crate::stock::{Claim, StockPool, TakeOutcome, UnitState, MAX_UNITS_PER_VARIATION};
use crate::utils::error::InventoryError;

/// Postgres-backed stock pool.
///
/// The claim is one transaction: insert the order row, then flip exactly one
/// free stock row to it. `FOR UPDATE SKIP LOCKED` keeps concurrent claimants
/// on different rows instead of queueing on the same one, so variations
/// drain in parallel without lock convoys.
pub struct PgStockPool {
    pool: PgPool,
}

impl PgStockPool {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockPool for PgStockPool {
    async fn take_one(
        &self,
        variation_id: i64,
        member_id: &str,
    ) -> Result<TakeOutcome, InventoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id: i64 =
            sqlx::query_scalar("INSERT INTO order_request (member_id) VALUES ($1) RETURNING id")
                .bind(member_id)
                .fetch_one(&mut *tx)
                .await?;

        let claimed: Option<(String,)> = sqlx::query_as(
            r#"
            UPDATE stock
            SET order_id = $1, updated_at = now()
            WHERE id = (
                SELECT id FROM stock
                WHERE variation_id = $2 AND order_id IS NULL
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING seat_id
            "#,
        )
        .bind(order_id)
        .bind(variation_id)
        .fetch_optional(&mut *tx)
        .await?;

        match claimed {
            Some((seat,)) => {
                // Parse before commit: a malformed stored seat id aborts the
                // whole claim instead of selling an unnameable unit.
                let seat_id: SeatId = seat.parse()?;
                tx.commit().await?;
                Ok(TakeOutcome::Claimed(Claim {
                    order_id,
                    seat_id,
                    variation_id,
                }))
            }
            None => {
                // Rolls the order row back with the claim, so neither exists.
                tx.rollback().await?;
                debug!(variation_id, "No free unit to claim");
                Ok(TakeOutcome::SoldOut)
            }
        }
    }

    async fn count_available(&self, variation_id: i64) -> Result<u64, InventoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock WHERE variation_id = $1 AND order_id IS NULL",
        )
        .bind(variation_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn units(&self, variation_id: i64) -> Result<Vec<UnitState>, InventoryError> {
        let rows: Vec<(String, bool)> = sqlx::query_as(
            r#"
            SELECT seat_id, order_id IS NOT NULL
            FROM stock
            WHERE variation_id = $1
            ORDER BY seat_id
            "#,
        )
        .bind(variation_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.len() > MAX_UNITS_PER_VARIATION {
            return Err(InventoryError::InconsistentState(format!(
                "variation {variation_id} has {} units, cap is {MAX_UNITS_PER_VARIATION}",
                rows.len()
            )));
        }

        rows.into_iter()
            .map(|(seat, sold)| {
                Ok(UnitState {
                    seat_id: seat.parse()?,
                    sold,
                })
            })
            .collect()
    }

    async fn reset_all(&self) -> Result<(), InventoryError> {
        let mut tx = self.pool.begin().await?;

        let cleared = sqlx::query(
            "UPDATE stock SET order_id = NULL, updated_at = now() WHERE order_id IS NOT NULL",
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM order_request")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(cleared, "Stock reset, all units available again");
        Ok(())
    }

    async fn order_log(&self) -> Result<Vec<OrderRecord>, InventoryError> {
        let rows: Vec<(i64, String, String, i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT o.id, o.member_id, s.seat_id, s.variation_id, s.updated_at
            FROM order_request o
            INNER JOIN stock s ON s.order_id = o.id
            ORDER BY o.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(order_id, member_id, seat, variation_id, updated_at)| {
                Ok(OrderRecord {
                    order_id,
                    member_id,
                    seat_id: seat.parse()?,
                    variation_id,
                    updated_at,
                })
            })
            .collect()
    }
}
