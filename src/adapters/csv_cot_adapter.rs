//! CSV yearly extract adapter.
//!
//! Reads `<base_path>/<year>.csv` exported from the legacy futures-only
//! report. Columns are addressed by header name; anything else in the file is
//! ignored.

use crate::domain::category::{LongShort, PerCategory};
use crate::domain::error::CotError;
use crate::domain::history::WeeklyRow;
use crate::ports::cot_data_port::{CotDataPort, CotRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const CONTRACT_CODE_WIDTH: usize = 6;

#[derive(Debug, Deserialize)]
struct ExtractRow {
    #[serde(rename = "Market_and_Exchange_Names", default)]
    market_name: String,
    #[serde(rename = "Report_Date_as_MM_DD_YYYY")]
    report_date: String,
    #[serde(rename = "CFTC_Contract_Market_Code")]
    contract_code: String,
    #[serde(rename = "Open_Interest_All")]
    open_interest: String,
    #[serde(rename = "Comm_Positions_Long_All")]
    comm_long: String,
    #[serde(rename = "Comm_Positions_Short_All")]
    comm_short: String,
    #[serde(rename = "NonComm_Positions_Long_All")]
    large_long: String,
    #[serde(rename = "NonComm_Positions_Short_All")]
    large_short: String,
    #[serde(rename = "NonRept_Positions_Long_All")]
    small_long: String,
    #[serde(rename = "NonRept_Positions_Short_All")]
    small_short: String,
}

pub struct CsvCotAdapter {
    base_path: PathBuf,
}

impl CsvCotAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, year: i32) -> PathBuf {
        self.base_path.join(format!("{}.csv", year))
    }
}

impl CotDataPort for CsvCotAdapter {
    fn load_year(&self, year: i32) -> Result<Vec<CotRecord>, CotError> {
        let path = self.csv_path(year);
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| CotError::SourceData {
                year,
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut records = Vec::new();
        for (line, result) in rdr.deserialize::<ExtractRow>().enumerate() {
            let raw = result.map_err(|e| CotError::SourceData {
                year,
                reason: format!("CSV parse error: {}", e),
            })?;
            let record = to_record(raw).map_err(|reason| CotError::SourceData {
                year,
                reason: format!("data row {}: {}", line + 1, reason),
            })?;
            records.push(record);
        }

        debug!(year, rows = records.len(), path = %path.display(), "extract read");
        Ok(records)
    }
}

fn to_record(raw: ExtractRow) -> Result<CotRecord, String> {
    let report_date = parse_date(&raw.report_date)?;
    let count = |field: &str, value: &str| {
        parse_count(value).ok_or_else(|| format!("invalid {}: {:?}", field, value))
    };

    let positions = PerCategory::new(
        LongShort::new(
            count("Comm_Positions_Long_All", &raw.comm_long)?,
            count("Comm_Positions_Short_All", &raw.comm_short)?,
        ),
        LongShort::new(
            count("NonComm_Positions_Long_All", &raw.large_long)?,
            count("NonComm_Positions_Short_All", &raw.large_short)?,
        ),
        LongShort::new(
            count("NonRept_Positions_Long_All", &raw.small_long)?,
            count("NonRept_Positions_Short_All", &raw.small_short)?,
        ),
    );

    Ok(CotRecord {
        contract_code: normalize_code(&raw.contract_code),
        market_name: raw.market_name,
        row: WeeklyRow {
            report_date,
            open_interest: count("Open_Interest_All", &raw.open_interest)?,
            positions,
        },
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
        .ok_or_else(|| format!("invalid report date: {:?}", value))
}

/// Whole, non-negative contract counts; spreadsheet exports sometimes write
/// `1234.0`.
fn parse_count(value: &str) -> Option<i64> {
    let value = value.trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        })
        .filter(|&count| count >= 0)
}

/// Restores leading zeros lost when a numeric code was stored as a number.
fn normalize_code(value: &str) -> String {
    let code = value.trim();
    if !code.is_empty() && code.len() < CONTRACT_CODE_WIDTH && code.chars().all(|c| c.is_ascii_digit())
    {
        format!("{:0>width$}", code, width = CONTRACT_CODE_WIDTH)
    } else {
        code.to_string()
    }
}
