//! Instrument catalog: asset classes, instruments and contract code lookup.

use crate::domain::error::CotError;
use crate::domain::instrument::{Instrument, InstrumentSpec};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetClass {
    pub label: String,
    pub instrument_names: Vec<String>,
}

/// Asset classes keep insertion order; the first one is the default.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    asset_classes: Vec<AssetClass>,
    instruments: Vec<Instrument>,
    by_code: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset class even if none of its instruments get mapped.
    pub fn add_asset_class(&mut self, label: &str) {
        if !self.asset_classes.iter().any(|a| a.label == label) {
            self.asset_classes.push(AssetClass {
                label: label.to_string(),
                instrument_names: Vec::new(),
            });
        }
    }

    /// Adds an instrument. Returns `Ok(false)` when the spec has no contract
    /// code and was left out.
    pub fn add_instrument(&mut self, spec: InstrumentSpec) -> Result<bool, CotError> {
        if spec.contract_code.trim().is_empty() {
            debug!(symbol = %spec.symbol, "no contract code, instrument excluded");
            return Ok(false);
        }
        if self.by_code.contains_key(&spec.contract_code) {
            return Err(CotError::config_invalid(
                &spec.symbol,
                "contract_code",
                format!("contract code {} is used twice", spec.contract_code),
            ));
        }
        if self.instruments.iter().any(|i| i.name == spec.name) {
            return Err(CotError::config_invalid(
                &spec.symbol,
                "name",
                format!("instrument name {:?} is used twice", spec.name),
            ));
        }

        self.add_asset_class(&spec.asset_class);
        if let Some(class) = self
            .asset_classes
            .iter_mut()
            .find(|a| a.label == spec.asset_class)
        {
            class.instrument_names.push(spec.name.clone());
        }
        self.by_code
            .insert(spec.contract_code.clone(), self.instruments.len());
        self.instruments.push(Instrument::from_spec(spec));
        Ok(true)
    }

    pub fn asset_classes(&self) -> &[AssetClass] {
        &self.asset_classes
    }

    pub fn asset_class(&self, label: &str) -> Option<&AssetClass> {
        self.asset_classes.iter().find(|a| a.label == label)
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn instruments_mut(&mut self) -> &mut [Instrument] {
        &mut self.instruments
    }

    pub fn by_code(&self, code: &str) -> Option<&Instrument> {
        self.by_code.get(code).map(|&i| &self.instruments[i])
    }

    pub fn by_code_mut(&mut self, code: &str) -> Option<&mut Instrument> {
        match self.by_code.get(code) {
            Some(&i) => self.instruments.get_mut(i),
            None => None,
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.name == name)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
