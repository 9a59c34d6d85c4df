//! Derived tables built from enriched instrument histories.
//!
//! These are the shapes handed to an [`ExportPort`](crate::ports::export_port::ExportPort)
//! and to the command line. Rows whose custom index is not computable are
//! left out of the series and event lists.

use crate::domain::category::{PerCategory, TraderCategory};
use crate::domain::history::{HistoryRow, NOT_COMPUTABLE};
use crate::domain::instrument::Instrument;
use crate::domain::lookback::CUSTOM_LOOKBACK;
use chrono::NaiveDate;

/// Latest custom-lookback positioning for one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositioningRow {
    pub date: NaiveDate,
    pub symbol: String,
    pub name: String,
    pub index: PerCategory<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomIndexPoint {
    pub date: NaiveDate,
    pub index: PerCategory<i32>,
    pub net: PerCategory<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub date: NaiveDate,
    pub code: String,
    pub open_interest: i64,
    pub net: PerCategory<i64>,
    /// Parallel to the history's lookback names.
    pub indices: Vec<PerCategory<i32>>,
}

/// Which value an event list carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventValue {
    CustomIndex,
    NetPosition,
}

impl EventValue {
    pub const ALL: [EventValue; 2] = [EventValue::CustomIndex, EventValue::NetPosition];

    pub fn file_prefix(self) -> &'static str {
        match self {
            EventValue::CustomIndex => "RT_custom_index_event_list_",
            EventValue::NetPosition => "RT_net_position_event_list_",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub date: NaiveDate,
    pub symbol: String,
    pub category: TraderCategory,
    pub value: i64,
}

pub fn is_computable(index: &PerCategory<i32>) -> bool {
    index.iter().all(|(_, &v)| v != NOT_COMPUTABLE)
}

fn custom_index(instrument: &Instrument, row: &HistoryRow) -> Option<PerCategory<i32>> {
    instrument.history.index_at(row, CUSTOM_LOOKBACK)
}

/// `None` for an empty history or one without a custom column.
pub fn latest_positioning(instrument: &Instrument) -> Option<PositioningRow> {
    let row = instrument.history.latest()?;
    let index = custom_index(instrument, row)?;
    Some(PositioningRow {
        date: row.report_date(),
        symbol: instrument.symbol.clone(),
        name: instrument.name.clone(),
        index,
    })
}

/// Computable custom-index rows in date order.
pub fn custom_index_series(instrument: &Instrument) -> Vec<CustomIndexPoint> {
    instrument
        .history
        .rows()
        .iter()
        .filter_map(|row| {
            let index = custom_index(instrument, row).filter(is_computable)?;
            Some(CustomIndexPoint {
                date: row.report_date(),
                index,
                net: row.net?,
            })
        })
        .collect()
}

pub fn summary_series(instrument: &Instrument) -> Vec<SummaryRow> {
    instrument
        .history
        .rows()
        .iter()
        .map(|row| SummaryRow {
            date: row.report_date(),
            code: instrument.code.clone(),
            open_interest: row.row.open_interest,
            net: row.net.unwrap_or_default(),
            indices: row.indices.clone(),
        })
        .collect()
}

/// Flattened (date, symbol, type, value) rows grouped by category.
///
/// Only weeks with a computable custom index are listed, and no row ever
/// carries the sentinel value itself (a net position of exactly -1 is
/// dropped from the net-position list as well).
pub fn event_list(instrument: &Instrument, kind: EventValue) -> Vec<EventRow> {
    let points = custom_index_series(instrument);
    TraderCategory::ALL
        .iter()
        .flat_map(|&category| {
            points.iter().map(move |point| EventRow {
                date: point.date,
                symbol: instrument.symbol.clone(),
                category,
                value: match kind {
                    EventValue::CustomIndex => i64::from(point.index[category]),
                    EventValue::NetPosition => point.net[category],
                },
            })
        })
        .filter(|event| event.value != i64::from(NOT_COMPUTABLE))
        .collect()
}
