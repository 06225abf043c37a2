//! Inventory allocation core for a seat-ticketing system.
//!
//! Sells a finite pool of seats per ticket variation to concurrent buyers,
//! never the same seat twice, and serves a cached seat-map view plus a
//! rolling feed of recent sales. Consumed in-process; the HTTP surface,
//! templates and seed tooling live elsewhere.
//!
//! ```no_run
//! use std::sync::Arc;
//! use boxoffice_core::{Allocator, AvailabilityCache, BuyOutcome, RecentActivityFeed};
//! use boxoffice_core::config::Config;
//! use boxoffice_core::models::Catalog;
//! use boxoffice_core::stock::PgStockPool;
//!
//! # async fn run() -> Result<(), boxoffice_core::InventoryError> {
//! let config = Config::from_env();
//! let pg = config.connect().await?;
//!
//! let catalog = Catalog::load(&pg).await?;
//! let stock = Arc::new(PgStockPool::new(pg));
//! let cache = Arc::new(AvailabilityCache::with_ttl(stock.clone(), config.cache_ttl));
//! let feed = Arc::new(RecentActivityFeed::with_capacity(config.feed_capacity));
//! let allocator = Allocator::new(stock, cache.clone(), feed.clone(), catalog);
//!
//! match allocator.buy("member-77", 1).await? {
//!     BuyOutcome::Purchased(receipt) => println!("got seat {}", receipt.seat_id),
//!     BuyOutcome::SoldOut => println!("sold out"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod cache;
pub mod config;
pub mod feed;
pub mod models;
pub mod stock;
pub mod utils;

pub use allocator::{Allocator, BuyOutcome, Receipt};
pub use cache::{AvailabilityCache, SeatMap};
pub use feed::RecentActivityFeed;
pub use models::{Catalog, RecentSale, SeatId};
pub use stock::{MemoryStockPool, PgStockPool, StockPool, TakeOutcome};
pub use utils::error::InventoryError;
