//! Indexing engine: catalog ownership and the batch pipeline.
//!
//! Stages run strictly in order for every instrument:
//! append → finalize → derive net positions → lookback columns → export.
//! The engine holds no global state; callers construct it from an
//! [`EngineConfig`] and hand it the data and export collaborators.

use crate::domain::catalog::{AssetClass, Catalog};
use crate::domain::config::EngineConfig;
use crate::domain::error::CotError;
use crate::domain::history::WeeklyRow;
use crate::domain::instrument::Instrument;
use crate::domain::lookback::{process_lookback, LookbackConfig};
use crate::domain::report::{self, CustomIndexPoint, EventValue, PositioningRow};
use crate::ports::cot_data_port::CotDataPort;
use crate::ports::export_port::ExportPort;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct IndexingEngine {
    catalog: Catalog,
    lookbacks: Vec<LookbackConfig>,
    years: Vec<i32>,
}

impl IndexingEngine {
    pub fn new(config: EngineConfig) -> Result<Self, CotError> {
        let mut catalog = Catalog::new();
        for label in &config.asset_classes {
            catalog.add_asset_class(label);
        }
        for spec in config.instruments {
            let symbol = spec.symbol.clone();
            if !catalog.add_instrument(spec)? {
                warn!(%symbol, "no contract code mapped, instrument skipped");
            }
        }
        info!(
            instruments = catalog.len(),
            lookbacks = config.lookbacks.len(),
            years = config.years.len(),
            "catalog loaded"
        );
        Ok(Self {
            catalog,
            lookbacks: config.lookbacks,
            years: config.years,
        })
    }

    /// Runs every computation stage. Nothing is exported.
    pub fn run(&mut self, source: &dyn CotDataPort) -> Result<(), CotError> {
        self.populate(source)?;
        self.finalize_histories();
        self.derive_net_positions()?;
        self.compute_lookbacks()?;

        for instrument in self.catalog.instruments() {
            if instrument.history.is_empty() {
                warn!(symbol = %instrument.symbol, code = %instrument.code, "no rows matched in any year");
            }
        }
        Ok(())
    }

    /// Appends each year's matching rows, one batch per instrument per year.
    pub fn populate(&mut self, source: &dyn CotDataPort) -> Result<(), CotError> {
        for &year in &self.years {
            let records = source.load_year(year)?;
            let total = records.len();

            let mut batches: HashMap<String, Vec<WeeklyRow>> = HashMap::new();
            for record in records {
                if self.catalog.contains_code(&record.contract_code) {
                    batches
                        .entry(record.contract_code)
                        .or_default()
                        .push(record.row);
                }
            }

            let matched: usize = batches.values().map(Vec::len).sum();
            for (code, batch) in batches {
                if let Some(instrument) = self.catalog.by_code_mut(&code) {
                    instrument.history.append(batch)?;
                }
            }
            info!(year, rows = total, matched, "extract loaded");
        }
        Ok(())
    }

    pub fn finalize_histories(&mut self) {
        for instrument in self.catalog.instruments_mut() {
            instrument.history.finalize();
        }
    }

    pub fn derive_net_positions(&mut self) -> Result<(), CotError> {
        for instrument in self.catalog.instruments_mut() {
            instrument.history.derive_net_positions()?;
        }
        Ok(())
    }

    /// Custom lookback first, then the shared ones in configured order.
    pub fn compute_lookbacks(&mut self) -> Result<(), CotError> {
        let configs: Vec<LookbackConfig> = std::iter::once(LookbackConfig::custom())
            .chain(self.lookbacks.iter().cloned())
            .collect();

        for instrument in self.catalog.instruments_mut() {
            for config in &configs {
                let window = config.resolve(instrument.custom_lookback_weeks);
                process_lookback(&mut instrument.history, &config.name, window)?;
            }
            debug!(
                symbol = %instrument.symbol,
                rows = instrument.history.len(),
                columns = configs.len(),
                "lookbacks computed"
            );
        }
        Ok(())
    }

    /// Writes every per-instrument series, the positioning table and both
    /// event lists.
    pub fn export(&self, port: &dyn ExportPort) -> Result<(), CotError> {
        for instrument in self.catalog.instruments() {
            port.write_detailed(instrument)?;
            port.write_summary(instrument, &report::summary_series(instrument))?;
            for kind in EventValue::ALL {
                port.write_event_list(instrument, kind, &report::event_list(instrument, kind))?;
            }
        }
        port.write_positioning(&self.positioning_summary())?;
        info!(instruments = self.catalog.len(), "export complete");
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Column names in computation order: `custom`, then shared lookbacks.
    pub fn lookback_names(&self) -> Vec<String> {
        std::iter::once(LookbackConfig::custom().name)
            .chain(self.lookbacks.iter().map(|l| l.name.clone()))
            .collect()
    }

    pub fn asset_classes(&self) -> Vec<&str> {
        self.catalog
            .asset_classes()
            .iter()
            .map(|a| a.label.as_str())
            .collect()
    }

    /// First configured asset class, or "" for an empty catalog.
    pub fn default_asset_class(&self) -> &str {
        self.catalog
            .asset_classes()
            .first()
            .map(|a| a.label.as_str())
            .unwrap_or("")
    }

    pub fn instruments_in_asset_class(&self, asset_class: &str) -> Vec<&str> {
        self.catalog
            .asset_class(asset_class)
            .map(|a| a.instrument_names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn instrument_symbols(&self) -> Vec<&str> {
        self.catalog
            .instruments()
            .iter()
            .map(|i| i.symbol.as_str())
            .collect()
    }

    pub fn instrument_by_name(&self, name: &str) -> Option<&Instrument> {
        self.catalog.by_name(name)
    }

    pub fn instrument_by_symbol(&self, symbol: &str) -> Option<&Instrument> {
        self.catalog.by_symbol(symbol)
    }

    pub fn instrument_by_code(&self, code: &str) -> Option<&Instrument> {
        self.catalog.by_code(code)
    }

    /// Latest custom-lookback snapshot; `None` when the history is empty.
    pub fn latest_snapshot(&self, name: &str) -> Option<PositioningRow> {
        self.instrument_by_name(name)
            .and_then(report::latest_positioning)
    }

    /// Computable custom-index series. Empty for an empty history.
    pub fn custom_index_series(&self, name: &str) -> Result<Vec<CustomIndexPoint>, CotError> {
        self.instrument_by_name(name)
            .map(report::custom_index_series)
            .ok_or_else(|| CotError::UnknownInstrument {
                name: name.to_string(),
            })
    }

    /// Latest positioning for every instrument, by asset class order.
    pub fn positioning_summary(&self) -> Vec<PositioningRow> {
        self.positioning_for(|_| true)
    }

    pub fn positioning_by_asset_class(&self, asset_classes: &[&str]) -> Vec<PositioningRow> {
        self.positioning_for(|class| asset_classes.contains(&class.label.as_str()))
    }

    /// Rows follow catalog order, not the order of `symbols`.
    pub fn positioning_by_symbol(&self, symbols: &[&str]) -> Vec<PositioningRow> {
        self.catalog
            .instruments()
            .iter()
            .filter(|i| symbols.contains(&i.symbol.as_str()))
            .filter_map(report::latest_positioning)
            .collect()
    }

    fn positioning_for(&self, include: impl Fn(&AssetClass) -> bool) -> Vec<PositioningRow> {
        self.catalog
            .asset_classes()
            .iter()
            .filter(|&class| include(class))
            .flat_map(|class| class.instrument_names.iter())
            .filter_map(|name| self.latest_snapshot(name))
            .collect()
    }
}
