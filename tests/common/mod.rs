#![allow(dead_code)]

use chrono::NaiveDate;
use cotindex::domain::category::{LongShort, PerCategory};
use cotindex::domain::config::EngineConfig;
use cotindex::domain::error::CotError;
use cotindex::domain::history::WeeklyRow;
use cotindex::domain::instrument::{Instrument, InstrumentSpec};
use cotindex::domain::lookback::LookbackConfig;
use cotindex::domain::report::{EventRow, EventValue, PositioningRow, SummaryRow};
use cotindex::ports::cot_data_port::{CotDataPort, CotRecord};
use cotindex::ports::export_port::ExportPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Weekly rows starting 2024-01-02 where only the commercial net varies.
pub fn make_rows(commercial_net: &[i64]) -> Vec<WeeklyRow> {
    commercial_net
        .iter()
        .enumerate()
        .map(|(i, &net)| make_row(date("2024-01-02") + chrono::Duration::weeks(i as i64), net))
        .collect()
}

pub fn make_row(report_date: NaiveDate, commercial_net: i64) -> WeeklyRow {
    WeeklyRow {
        report_date,
        open_interest: 1_000,
        positions: PerCategory::new(
            LongShort::new(commercial_net, 0),
            LongShort::new(400, 100),
            LongShort::new(50, 80),
        ),
    }
}

pub fn record(code: &str, row: WeeklyRow) -> CotRecord {
    CotRecord {
        contract_code: code.to_string(),
        market_name: String::new(),
        row,
    }
}

pub fn spec(asset_class: &str, name: &str, symbol: &str, code: &str, weeks: i64) -> InstrumentSpec {
    InstrumentSpec {
        asset_class: asset_class.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        contract_code: code.to_string(),
        custom_lookback_weeks: weeks,
    }
}

pub fn engine_config(
    years: Vec<i32>,
    lookbacks: Vec<LookbackConfig>,
    instruments: Vec<InstrumentSpec>,
) -> EngineConfig {
    let mut asset_classes: Vec<String> = Vec::new();
    for spec in &instruments {
        if !asset_classes.contains(&spec.asset_class) {
            asset_classes.push(spec.asset_class.clone());
        }
    }
    EngineConfig {
        years,
        lookbacks,
        asset_classes,
        instruments,
    }
}

pub struct MockCotDataPort {
    pub years: HashMap<i32, Vec<CotRecord>>,
}

impl MockCotDataPort {
    pub fn new() -> Self {
        Self {
            years: HashMap::new(),
        }
    }

    pub fn with_records(mut self, year: i32, records: Vec<CotRecord>) -> Self {
        self.years.entry(year).or_default().extend(records);
        self
    }
}

impl CotDataPort for MockCotDataPort {
    fn load_year(&self, year: i32) -> Result<Vec<CotRecord>, CotError> {
        self.years
            .get(&year)
            .cloned()
            .ok_or_else(|| CotError::SourceData {
                year,
                reason: "no extract".into(),
            })
    }
}

/// Captures what the engine hands to an exporter.
#[derive(Default)]
pub struct RecordingExportPort {
    pub detailed: RefCell<Vec<String>>,
    pub summaries: RefCell<HashMap<String, Vec<SummaryRow>>>,
    pub positioning: RefCell<Vec<PositioningRow>>,
    pub events: RefCell<HashMap<(String, String), Vec<EventRow>>>,
}

impl RecordingExportPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for(&self, name: &str, kind: EventValue) -> Vec<EventRow> {
        self.events
            .borrow()
            .get(&(name.to_string(), format!("{kind:?}")))
            .cloned()
            .unwrap_or_default()
    }
}

impl ExportPort for RecordingExportPort {
    fn write_detailed(&self, instrument: &Instrument) -> Result<(), CotError> {
        self.detailed.borrow_mut().push(instrument.name.clone());
        Ok(())
    }

    fn write_summary(&self, instrument: &Instrument, rows: &[SummaryRow]) -> Result<(), CotError> {
        self.summaries
            .borrow_mut()
            .insert(instrument.name.clone(), rows.to_vec());
        Ok(())
    }

    fn write_positioning(&self, rows: &[PositioningRow]) -> Result<(), CotError> {
        *self.positioning.borrow_mut() = rows.to_vec();
        Ok(())
    }

    fn write_event_list(
        &self,
        instrument: &Instrument,
        kind: EventValue,
        rows: &[EventRow],
    ) -> Result<(), CotError> {
        self.events
            .borrow_mut()
            .insert((instrument.name.clone(), format!("{kind:?}")), rows.to_vec());
        Ok(())
    }
}
