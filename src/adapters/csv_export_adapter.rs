//! CSV export adapter implementing ExportPort.
//!
//! Layout under `output_dir`:
//! - `detailed/<name>.csv`
//! - `summary/summary_<name>.csv`
//! - `positioning_summary.csv`
//!
//! Event lists go to `event_list_dir/RT_*_event_list_<name>.csv`.

use crate::domain::category::TraderCategory;
use crate::domain::error::CotError;
use crate::domain::instrument::Instrument;
use crate::domain::lookback::index_column_name;
use crate::domain::report::{EventRow, EventValue, PositioningRow, SummaryRow};
use crate::ports::export_port::ExportPort;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize)]
struct PositioningRecord<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Commercials")]
    commercials: i32,
    #[serde(rename = "Large Specs")]
    large_specs: i32,
    #[serde(rename = "Small Specs")]
    small_specs: i32,
}

#[derive(Serialize)]
struct EventRecord<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    #[serde(rename = "Type")]
    kind: u8,
    #[serde(rename = "Value")]
    value: i64,
}

pub struct CsvExportAdapter {
    output_dir: PathBuf,
    event_list_dir: PathBuf,
}

impl CsvExportAdapter {
    pub fn new(output_dir: PathBuf, event_list_dir: PathBuf) -> Self {
        Self {
            output_dir,
            event_list_dir,
        }
    }

    pub fn detailed_path(&self, instrument: &Instrument) -> PathBuf {
        self.output_dir
            .join("detailed")
            .join(format!("{}.csv", instrument.name))
    }

    pub fn summary_path(&self, instrument: &Instrument) -> PathBuf {
        self.output_dir
            .join("summary")
            .join(format!("summary_{}.csv", instrument.name))
    }

    pub fn positioning_path(&self) -> PathBuf {
        self.output_dir.join("positioning_summary.csv")
    }

    pub fn event_list_path(&self, instrument: &Instrument, kind: EventValue) -> PathBuf {
        self.event_list_dir
            .join(format!("{}{}.csv", kind.file_prefix(), instrument.name))
    }
}

fn export_err(path: &Path, e: impl std::fmt::Display) -> CotError {
    CotError::Export {
        reason: format!("{}: {}", path.display(), e),
    }
}

fn writer(path: &Path) -> Result<csv::Writer<fs::File>, CotError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    csv::Writer::from_path(path).map_err(|e| export_err(path, e))
}

fn index_headers(lookback_names: &[String]) -> Vec<String> {
    lookback_names
        .iter()
        .flat_map(|name| {
            TraderCategory::ALL
                .iter()
                .map(move |&cat| index_column_name(cat, name))
        })
        .collect()
}

impl ExportPort for CsvExportAdapter {
    fn write_detailed(&self, instrument: &Instrument) -> Result<(), CotError> {
        let path = self.detailed_path(instrument);
        let mut wtr = writer(&path)?;
        let history = &instrument.history;

        let mut header: Vec<String> = ["Position", "Date", "Code", "OpenInterest"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for cat in TraderCategory::ALL {
            for suffix in ["Long", "Short", "Net"] {
                header.push(format!("{}_{}", cat.label(), suffix));
            }
        }
        header.extend(index_headers(history.lookback_names()));
        wtr.write_record(&header).map_err(|e| export_err(&path, e))?;

        for row in history.rows() {
            let mut record = vec![
                row.position.to_string(),
                row.report_date().format(DATE_FORMAT).to_string(),
                instrument.code.clone(),
                row.row.open_interest.to_string(),
            ];
            let net = row.net.unwrap_or_default();
            for cat in TraderCategory::ALL {
                let positions = row.row.positions[cat];
                record.push(positions.long.to_string());
                record.push(positions.short.to_string());
                record.push(net[cat].to_string());
            }
            for index in &row.indices {
                record.extend(index.iter().map(|(_, v)| v.to_string()));
            }
            wtr.write_record(&record).map_err(|e| export_err(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(&self, instrument: &Instrument, rows: &[SummaryRow]) -> Result<(), CotError> {
        let path = self.summary_path(instrument);
        let mut wtr = writer(&path)?;

        let mut header: Vec<String> = [
            "Date",
            "Code",
            "OpenInterest",
            "CommercialNet",
            "LargeSpecNet",
            "SmallSpecNet",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        header.extend(index_headers(instrument.history.lookback_names()));
        wtr.write_record(&header).map_err(|e| export_err(&path, e))?;

        for row in rows {
            let mut record = vec![
                row.date.format(DATE_FORMAT).to_string(),
                row.code.clone(),
                row.open_interest.to_string(),
            ];
            record.extend(row.net.iter().map(|(_, v)| v.to_string()));
            for index in &row.indices {
                record.extend(index.iter().map(|(_, v)| v.to_string()));
            }
            wtr.write_record(&record).map_err(|e| export_err(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_positioning(&self, rows: &[PositioningRow]) -> Result<(), CotError> {
        let path = self.positioning_path();
        let mut wtr = writer(&path)?;
        if rows.is_empty() {
            wtr.write_record(["Date", "Symbol", "Name", "Commercials", "Large Specs", "Small Specs"])
                .map_err(|e| export_err(&path, e))?;
        }
        for row in rows {
            wtr.serialize(PositioningRecord {
                date: row.date.format(DATE_FORMAT).to_string(),
                symbol: &row.symbol,
                name: &row.name,
                commercials: row.index[TraderCategory::Commercial],
                large_specs: row.index[TraderCategory::LargeSpeculator],
                small_specs: row.index[TraderCategory::SmallSpeculator],
            })
            .map_err(|e| export_err(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_event_list(
        &self,
        instrument: &Instrument,
        kind: EventValue,
        rows: &[EventRow],
    ) -> Result<(), CotError> {
        let path = self.event_list_path(instrument, kind);
        let mut wtr = writer(&path)?;
        if rows.is_empty() {
            wtr.write_record(["Date", "Symbol", "Type", "Value"])
                .map_err(|e| export_err(&path, e))?;
        }
        for row in rows {
            wtr.serialize(EventRecord {
                date: row.date.format(DATE_FORMAT).to_string(),
                symbol: &row.symbol,
                kind: row.category.event_code(),
                value: row.value,
            })
            .map_err(|e| export_err(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
