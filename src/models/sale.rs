use serde::{Deserialize, Serialize};

use crate::models::seat::SeatId;

/// Display snapshot of one completed sale. Denormalized for rendering; the
/// order/stock rows remain authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSale {
    pub seat_id: SeatId,
    pub variation_name: String,
    pub ticket_name: String,
    pub artist_name: String,
}
