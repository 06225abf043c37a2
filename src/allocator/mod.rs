//! The purchase operation: one take from the stock pool, then the cache and
//! feed side effects, all before the call returns.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::AvailabilityCache;
use crate::feed::RecentActivityFeed;
use crate::models::catalog::Catalog;
use crate::models::sale::RecentSale;
use crate::models::seat::SeatId;
use crate::stock::{StockPool, TakeOutcome};
use crate::utils::error::InventoryError;

/// Proof of purchase returned to the buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub order_id: i64,
    pub seat_id: SeatId,
    pub variation_id: i64,
}

/// Outcome of [`Allocator::buy`]. Whether a unit was consumed is readable
/// from the value alone: `Purchased` consumed exactly one, `SoldOut` none.
/// An `Err` from `buy` is ambiguous: callers must check the order log
/// before retrying, since a blind retry can double-allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuyOutcome {
    Purchased(Receipt),
    SoldOut,
}

pub struct Allocator {
    stock: Arc<dyn StockPool>,
    cache: Arc<AvailabilityCache>,
    feed: Arc<RecentActivityFeed>,
    catalog: Catalog,
}

impl Allocator {
    pub fn new(
        stock: Arc<dyn StockPool>,
        cache: Arc<AvailabilityCache>,
        feed: Arc<RecentActivityFeed>,
        catalog: Catalog,
    ) -> Self {
        Self {
            stock,
            cache,
            feed,
            catalog,
        }
    }

    /// Claim one seat of the variation for `member_id`.
    ///
    /// On success the cache entry for the variation is invalidated and the
    /// sale is appended to the recent feed before this returns, so a read
    /// issued after the call observes the sale. A sold-out variation
    /// produces no side effects at all.
    pub async fn buy(
        &self,
        member_id: &str,
        variation_id: i64,
    ) -> Result<BuyOutcome, InventoryError> {
        let info = self
            .catalog
            .variation(variation_id)
            .ok_or(InventoryError::UnknownVariation(variation_id))?;

        match self.stock.take_one(variation_id, member_id).await? {
            TakeOutcome::SoldOut => {
                debug!(variation_id, "Variation sold out");
                Ok(BuyOutcome::SoldOut)
            }
            TakeOutcome::Claimed(claim) => {
                self.cache.invalidate(variation_id).await;
                self.feed
                    .record(RecentSale {
                        seat_id: claim.seat_id,
                        variation_name: info.variation_name.clone(),
                        ticket_name: info.ticket_name.clone(),
                        artist_name: info.artist_name.clone(),
                    })
                    .await;

                info!(
                    order_id = claim.order_id,
                    variation_id,
                    seat = %claim.seat_id,
                    "Seat allocated"
                );
                Ok(BuyOutcome::Purchased(Receipt {
                    order_id: claim.order_id,
                    seat_id: claim.seat_id,
                    variation_id,
                }))
            }
        }
    }

    /// Admin reseed entry: clear all orders, then the derived views.
    ///
    /// Must not run concurrently with purchase traffic; callers drain
    /// traffic first or accept a brief inconsistency window while the
    /// derived views catch up.
    pub async fn reset(&self) -> Result<(), InventoryError> {
        self.stock.reset_all().await?;
        self.cache.clear().await;
        self.feed.clear().await;
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
