use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::error::ParseSeatIdError;

/// Seats are laid out on a per-variation grid; coordinates are bounded so a
/// variation never exceeds [`MAX_UNITS_PER_VARIATION`](crate::stock::MAX_UNITS_PER_VARIATION) units.
pub const GRID_DIM: u16 = 64;

/// Row-column seat coordinates, rendered and stored as zero-padded `"RR-CC"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    pub row: u16,
    pub col: u16,
}

impl SeatId {
    pub fn new(row: u16, col: u16) -> Result<Self, ParseSeatIdError> {
        if row >= GRID_DIM {
            return Err(ParseSeatIdError::OutOfRange(row));
        }
        if col >= GRID_DIM {
            return Err(ParseSeatIdError::OutOfRange(col));
        }
        Ok(Self { row, col })
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.row, self.col)
    }
}

impl FromStr for SeatId {
    type Err = ParseSeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseSeatIdError::Malformed(s.to_string());

        let (row, col) = s.split_once('-').ok_or_else(malformed)?;
        let row: u16 = row.parse().map_err(|_| malformed())?;
        let col: u16 = col.parse().map_err(|_| malformed())?;
        SeatId::new(row, col)
    }
}

impl TryFrom<String> for SeatId {
    type Error = ParseSeatIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}
