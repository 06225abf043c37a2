use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::utils::error::InventoryError;

/// Denormalized variation row, one per variation, carrying the ticket and
/// artist names a sale entry needs without a join per sale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VariationInfo {
    pub variation_id: i64,
    pub variation_name: String,
    pub ticket_id: i64,
    pub ticket_name: String,
    pub artist_name: String,
}

/// Process-lifetime snapshot of the artist/ticket/variation tables.
///
/// Catalog rows are seed data and only change on an admin reseed, which
/// restarts from the same rows, so loading once at startup is sound.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_variation: HashMap<i64, VariationInfo>,
}

impl Catalog {
    pub fn from_entries(entries: impl IntoIterator<Item = VariationInfo>) -> Self {
        Self {
            by_variation: entries
                .into_iter()
                .map(|info| (info.variation_id, info))
                .collect(),
        }
    }

    pub async fn load(pool: &PgPool) -> Result<Self, InventoryError> {
        let entries: Vec<VariationInfo> = sqlx::query_as(
            r#"
            SELECT v.id AS variation_id,
                   v.name AS variation_name,
                   t.id AS ticket_id,
                   t.name AS ticket_name,
                   a.name AS artist_name
            FROM variation v
            INNER JOIN ticket t ON v.ticket_id = t.id
            INNER JOIN artist a ON t.artist_id = a.id
            ORDER BY v.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        tracing::info!(variations = entries.len(), "Catalog loaded");
        Ok(Self::from_entries(entries))
    }

    pub fn variation(&self, variation_id: i64) -> Option<&VariationInfo> {
        self.by_variation.get(&variation_id)
    }

    /// Variation ids belonging to a ticket, ascending. Used by callers that
    /// roll a per-ticket remaining count up from per-variation counts.
    pub fn variations_of(&self, ticket_id: i64) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .by_variation
            .values()
            .filter(|info| info.ticket_id == ticket_id)
            .map(|info| info.variation_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_variation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_variation.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(variation_id: i64, ticket_id: i64) -> VariationInfo {
        VariationInfo {
            variation_id,
            variation_name: format!("Arena {variation_id}"),
            ticket_id,
            ticket_name: format!("Show {ticket_id}"),
            artist_name: "The Headliners".to_string(),
        }
    }

    #[test]
    fn looks_up_by_variation() {
        let catalog = Catalog::from_entries([info(1, 1), info(2, 1)]);
        assert_eq!(catalog.variation(2).unwrap().ticket_id, 1);
        assert!(catalog.variation(99).is_none());
    }

    #[test]
    fn groups_variations_by_ticket() {
        let catalog = Catalog::from_entries([info(3, 2), info(1, 1), info(2, 1)]);
        assert_eq!(catalog.variations_of(1), vec![1, 2]);
        assert_eq!(catalog.variations_of(2), vec![3]);
        assert!(catalog.variations_of(9).is_empty());
    }
}
