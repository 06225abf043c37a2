use thiserror::Error;
use tracing::error;

/// Fault taxonomy for the inventory core.
///
/// Sold-out is intentionally absent: it is an expected outcome, carried in
/// [`TakeOutcome`](crate::stock::TakeOutcome) and
/// [`BuyOutcome`](crate::allocator::BuyOutcome) as a value.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("backing store error")]
    BackingStore(#[from] sqlx::Error),

    #[error("unknown variation: {0}")]
    UnknownVariation(i64),

    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}

impl InventoryError {
    pub fn code(&self) -> &'static str {
        match self {
            InventoryError::BackingStore(_) => "BACKING_STORE_ERROR",
            InventoryError::UnknownVariation(_) => "UNKNOWN_VARIATION",
            InventoryError::InconsistentState(_) => "INCONSISTENT_STATE",
        }
    }

    pub fn log(&self) {
        match self {
            InventoryError::BackingStore(e) => {
                error!(error = ?e, "Backing store error");
            }
            InventoryError::UnknownVariation(id) => {
                error!(variation_id = %id, "Unknown variation");
            }
            InventoryError::InconsistentState(msg) => {
                error!(message = %msg, "Inconsistent derived state");
            }
        }
    }
}

/// Failure to parse a stored seat identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSeatIdError {
    #[error("seat id is not of the form RR-CC: {0:?}")]
    Malformed(String),

    #[error("seat coordinate out of range: {0}")]
    OutOfRange(u16),
}

impl From<ParseSeatIdError> for InventoryError {
    fn from(e: ParseSeatIdError) -> Self {
        InventoryError::InconsistentState(e.to_string())
    }
}
