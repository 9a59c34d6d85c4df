//! Yearly positioning extract port trait.

use crate::domain::error::CotError;
use crate::domain::history::WeeklyRow;

/// One extract row tagged with its contract market code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CotRecord {
    pub contract_code: String,
    pub market_name: String,
    pub row: WeeklyRow,
}

pub trait CotDataPort {
    /// All rows of one calendar year's extract, in file order. A missing or
    /// malformed extract is an error.
    fn load_year(&self, year: i32) -> Result<Vec<CotRecord>, CotError>;
}
