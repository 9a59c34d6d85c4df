//! Per-instrument weekly positioning history.
//!
//! Rows arrive in unordered yearly batches, are sorted once by report date and
//! then enriched in two stages: net positions, then one index column per
//! lookback configuration. The stage is tracked so that range operations never
//! run against unsorted rows and index columns never precede net positions.

use crate::domain::category::{LongShort, PerCategory, TraderCategory};
use crate::domain::error::CotError;
use chrono::NaiveDate;

/// Index cell value for rows without enough trailing history.
pub const NOT_COMPUTABLE: i32 = -1;

/// One weekly report row as read from a yearly extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyRow {
    pub report_date: NaiveDate,
    pub open_interest: i64,
    pub positions: PerCategory<LongShort>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// Chronological rank after finalize (0 = earliest).
    pub position: usize,
    pub row: WeeklyRow,
    pub net: Option<PerCategory<i64>>,
    /// Parallel to [`InstrumentHistory::lookback_names`].
    pub indices: Vec<PerCategory<i32>>,
}

impl HistoryRow {
    pub fn report_date(&self) -> NaiveDate {
        self.row.report_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Accumulating,
    Finalized,
    NetDerived,
}

#[derive(Debug, Clone)]
pub struct InstrumentHistory {
    code: String,
    rows: Vec<HistoryRow>,
    stage: Stage,
    lookback_names: Vec<String>,
}

impl InstrumentHistory {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            rows: Vec::new(),
            stage: Stage::Accumulating,
            lookback_names: Vec::new(),
        }
    }

    /// Takes ownership of an unordered batch. Duplicate report dates are kept.
    pub fn append(&mut self, batch: Vec<WeeklyRow>) -> Result<(), CotError> {
        if self.stage != Stage::Accumulating {
            return Err(self.state_error("cannot append rows after finalize"));
        }
        self.rows.extend(batch.into_iter().map(|row| HistoryRow {
            position: 0,
            row,
            net: None,
            indices: Vec::new(),
        }));
        Ok(())
    }

    /// Sorts rows by report date and assigns dense positions. Calling it again
    /// leaves the history untouched.
    pub fn finalize(&mut self) {
        if self.stage != Stage::Accumulating {
            return;
        }
        // stable: duplicate dates keep their append order
        self.rows.sort_by_key(|r| r.row.report_date);
        for (position, row) in self.rows.iter_mut().enumerate() {
            row.position = position;
        }
        self.stage = Stage::Finalized;
    }

    pub fn has_net_positions(&self) -> bool {
        self.stage == Stage::NetDerived
    }

    pub fn derive_net_positions(&mut self) -> Result<(), CotError> {
        match self.stage {
            Stage::Accumulating => {
                Err(self.state_error("net positions require a finalized history"))
            }
            Stage::NetDerived => Ok(()),
            Stage::Finalized => {
                for row in &mut self.rows {
                    row.net = Some(row.row.positions.map(LongShort::net));
                }
                self.stage = Stage::NetDerived;
                Ok(())
            }
        }
    }

    /// Net positions of one category in positional order.
    pub fn net_series(&self, category: TraderCategory) -> Result<Vec<i64>, CotError> {
        if !self.has_net_positions() {
            return Err(self.state_error("net positions have not been derived"));
        }
        Ok(self
            .rows
            .iter()
            .map(|r| r.net.map(|n| n[category]).unwrap_or_default())
            .collect())
    }

    /// Verifies dates are non-decreasing and positions equal row order.
    pub fn check_chronological(&self) -> Result<(), CotError> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.position != i {
                return Err(self.state_error(format!(
                    "row {} carries position {}",
                    i, row.position
                )));
            }
        }
        if let Some(pair) = self
            .rows
            .windows(2)
            .find(|w| w[1].row.report_date < w[0].row.report_date)
        {
            return Err(self.state_error(format!(
                "report date {} follows {}",
                pair[1].row.report_date, pair[0].row.report_date
            )));
        }
        Ok(())
    }

    /// Attaches a computed index column, one value per row.
    pub fn push_index_column(
        &mut self,
        name: &str,
        values: Vec<PerCategory<i32>>,
    ) -> Result<(), CotError> {
        if !self.has_net_positions() {
            return Err(self.state_error("index columns require net positions"));
        }
        if values.len() != self.rows.len() {
            return Err(self.state_error(format!(
                "index column {} has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        if self.column_slot(name).is_some() {
            return Err(self.state_error(format!("index column {} already computed", name)));
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.indices.push(value);
        }
        self.lookback_names.push(name.to_string());
        Ok(())
    }

    pub fn lookback_names(&self) -> &[String] {
        &self.lookback_names
    }

    pub fn column_slot(&self, name: &str) -> Option<usize> {
        self.lookback_names.iter().position(|n| n == name)
    }

    /// Index values for `name` at a row, if that column exists.
    pub fn index_at(&self, row: &HistoryRow, name: &str) -> Option<PerCategory<i32>> {
        self.column_slot(name)
            .and_then(|slot| row.indices.get(slot).copied())
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn latest(&self) -> Option<&HistoryRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn state_error(&self, reason: impl Into<String>) -> CotError {
        CotError::HistoryState {
            code: self.code.clone(),
            reason: reason.into(),
        }
    }
}
