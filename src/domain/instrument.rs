//! Tradable instrument identity and its owned history.

use crate::domain::history::InstrumentHistory;

/// Configured instrument record, contract code already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSpec {
    pub asset_class: String,
    pub name: String,
    pub symbol: String,
    pub contract_code: String,
    pub custom_lookback_weeks: i64,
}

#[derive(Debug, Clone)]
pub struct Instrument {
    pub name: String,
    pub symbol: String,
    pub code: String,
    pub custom_lookback_weeks: i64,
    pub history: InstrumentHistory,
}

impl Instrument {
    pub fn from_spec(spec: InstrumentSpec) -> Self {
        let history = InstrumentHistory::new(spec.contract_code.clone());
        Self {
            name: spec.name,
            symbol: spec.symbol,
            code: spec.contract_code,
            custom_lookback_weeks: spec.custom_lookback_weeks,
            history,
        }
    }
}
