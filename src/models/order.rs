use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::seat::SeatId;

/// One row of the admin order-log export: the order joined with the seat it
/// claimed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: i64,
    pub member_id: String,
    pub seat_id: SeatId,
    pub variation_id: i64,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// CSV line in the export column order: order id, member, seat,
    /// variation, last update.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{}\n",
            self.order_id,
            self.member_id,
            self.seat_id,
            self.variation_id,
            self.updated_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn csv_line_matches_export_column_order() {
        let record = OrderRecord {
            order_id: 42,
            member_id: "alice".to_string(),
            seat_id: SeatId::new(5, 9).unwrap(),
            variation_id: 3,
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        };
        assert_eq!(record.to_csv_line(), "42,alice,05-09,3,2024-03-01 12:30:00\n");
    }
}
