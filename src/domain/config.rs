//! Engine configuration loading and validation.
//!
//! Reads years, shared lookbacks and the instrument catalog from a
//! [`ConfigPort`]. Every problem is fatal; no partial configuration is
//! returned. Instruments whose contract code cannot be resolved are kept with
//! an empty code and left out later by the catalog.

use crate::domain::contract_codes::ContractCodeMap;
use crate::domain::error::CotError;
use crate::domain::instrument::InstrumentSpec;
use crate::domain::lookback::{parse_lookbacks, LookbackConfig};
use crate::ports::config_port::ConfigPort;
use std::collections::HashSet;

pub const COT_SECTION: &str = "cot";
pub const CATALOG_SECTION: &str = "catalog";
pub const CONTRACT_CODES_SECTION: &str = "contract_codes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub years: Vec<i32>,
    pub lookbacks: Vec<LookbackConfig>,
    /// In declaration order; the first is the default asset class.
    pub asset_classes: Vec<String>,
    pub instruments: Vec<InstrumentSpec>,
}

impl EngineConfig {
    /// Symbols that will be left out for lack of a contract code.
    pub fn unmapped_symbols(&self) -> Vec<&str> {
        self.instruments
            .iter()
            .filter(|spec| spec.contract_code.is_empty())
            .map(|spec| spec.symbol.as_str())
            .collect()
    }
}

pub fn load_engine_config(
    config: &dyn ConfigPort,
    codes: &ContractCodeMap,
) -> Result<EngineConfig, CotError> {
    let years = load_years(config)?;
    let lookbacks = load_lookbacks(config)?;
    let (asset_classes, instruments) = load_catalog(config, &mut codes.clone())?;
    Ok(EngineConfig {
        years,
        lookbacks,
        asset_classes,
        instruments,
    })
}

fn load_years(config: &dyn ConfigPort) -> Result<Vec<i32>, CotError> {
    if config.get_string(COT_SECTION, "years").is_none() {
        return Err(CotError::config_missing(COT_SECTION, "years"));
    }
    let mut years = Vec::new();
    let mut seen = HashSet::new();
    for item in config.get_list(COT_SECTION, "years") {
        let year: i32 = item.parse().map_err(|_| {
            CotError::config_invalid(COT_SECTION, "years", format!("not a year: {item}"))
        })?;
        if !seen.insert(year) {
            return Err(CotError::config_invalid(
                COT_SECTION,
                "years",
                format!("year {year} listed twice"),
            ));
        }
        years.push(year);
    }
    if years.is_empty() {
        return Err(CotError::config_invalid(
            COT_SECTION,
            "years",
            "at least one year is required",
        ));
    }
    Ok(years)
}

fn load_lookbacks(config: &dyn ConfigPort) -> Result<Vec<LookbackConfig>, CotError> {
    let raw = config
        .get_string(COT_SECTION, "lookbacks")
        .unwrap_or_default();
    parse_lookbacks(&raw)
        .map_err(|e| CotError::config_invalid(COT_SECTION, "lookbacks", e.to_string()))
}

fn load_catalog(
    config: &dyn ConfigPort,
    codes: &mut ContractCodeMap,
) -> Result<(Vec<String>, Vec<InstrumentSpec>), CotError> {
    if config.get_string(CATALOG_SECTION, "asset_classes").is_none() {
        return Err(CotError::config_missing(CATALOG_SECTION, "asset_classes"));
    }

    let mut asset_classes = Vec::new();
    let mut instruments = Vec::new();
    let mut seen_symbols = HashSet::new();

    for asset_class in config.get_list(CATALOG_SECTION, "asset_classes") {
        if asset_classes.contains(&asset_class) {
            return Err(CotError::config_invalid(
                CATALOG_SECTION,
                "asset_classes",
                format!("asset class {asset_class} listed twice"),
            ));
        }
        if config.get_string(&asset_class, "symbols").is_none() {
            return Err(CotError::config_missing(&asset_class, "symbols"));
        }
        for symbol in config.get_list(&asset_class, "symbols") {
            if !seen_symbols.insert(symbol.to_uppercase()) {
                return Err(CotError::config_invalid(
                    &asset_class,
                    "symbols",
                    format!("symbol {symbol} listed twice"),
                ));
            }
            instruments.push(load_instrument(config, codes, &asset_class, &symbol)?);
        }
        asset_classes.push(asset_class);
    }

    Ok((asset_classes, instruments))
}

fn load_instrument(
    config: &dyn ConfigPort,
    codes: &mut ContractCodeMap,
    asset_class: &str,
    symbol: &str,
) -> Result<InstrumentSpec, CotError> {
    let name = match config.get_string(symbol, "name") {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => return Err(CotError::config_missing(symbol, "name")),
    };
    // names become export file names
    if name.contains(['/', '\\']) {
        return Err(CotError::config_invalid(
            symbol,
            "name",
            format!("path separator in instrument name {name:?}"),
        ));
    }
    let custom_lookback_weeks = required_int(config, symbol, "custom_lookback_weeks")?;

    // the instrument's own section wins over [contract_codes]
    let overrides = [
        config.get_string(CONTRACT_CODES_SECTION, symbol),
        config.get_string(symbol, "contract_code"),
    ];
    for code in overrides.into_iter().flatten() {
        codes.insert(symbol, &code);
    }
    let contract_code = codes.lookup(symbol).unwrap_or_default().to_string();

    Ok(InstrumentSpec {
        asset_class: asset_class.to_string(),
        name,
        symbol: symbol.to_string(),
        contract_code,
        custom_lookback_weeks,
    })
}

fn required_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<i64, CotError> {
    let raw = config
        .get_string(section, key)
        .ok_or_else(|| CotError::config_missing(section, key))?;
    raw.trim()
        .parse()
        .map_err(|_| CotError::config_invalid(section, key, format!("not an integer: {raw}")))
}
