pub mod catalog;
pub mod order;
pub mod sale;
pub mod seat;

pub use catalog::{Catalog, VariationInfo};
pub use order::OrderRecord;
pub use sale::RecentSale;
pub use seat::SeatId;
