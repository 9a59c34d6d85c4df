//! Trading symbol to CFTC contract market code mapping.
//!
//! A built-in table covers the commonly followed futures roots. Configuration
//! may add or replace entries; mapping a symbol to an empty code removes it.

use std::collections::HashMap;

const BUILTIN_CODES: &[(&str, &str)] = &[
    // currencies
    ("6A", "232741"),
    ("6B", "096742"),
    ("6C", "090741"),
    ("6E", "099741"),
    ("6J", "097741"),
    ("6M", "095741"),
    ("6N", "112741"),
    ("6S", "092741"),
    ("DX", "098662"),
    // metals
    ("GC", "088691"),
    ("SI", "084691"),
    ("HG", "085692"),
    ("PL", "076651"),
    ("PA", "075651"),
    // energy
    ("CL", "067651"),
    ("NG", "023651"),
    ("HO", "022651"),
    ("RB", "111659"),
    // grains
    ("ZC", "002602"),
    ("ZS", "005602"),
    ("ZW", "001602"),
    ("ZM", "026603"),
    ("ZL", "007601"),
    // softs
    ("KC", "083731"),
    ("SB", "080732"),
    ("CC", "073732"),
    ("CT", "033661"),
    // meats
    ("LE", "057642"),
    ("HE", "054642"),
    // equity indices
    ("ES", "13874A"),
    ("NQ", "209742"),
    ("YM", "124603"),
    // rates
    ("ZT", "042601"),
    ("ZF", "044601"),
    ("ZN", "043602"),
    ("ZB", "020601"),
];

#[derive(Debug, Clone, Default)]
pub struct ContractCodeMap {
    codes: HashMap<String, String>,
}

impl ContractCodeMap {
    pub fn builtin() -> Self {
        let codes = BUILTIN_CODES
            .iter()
            .map(|(symbol, code)| (symbol.to_string(), code.to_string()))
            .collect();
        Self { codes }
    }

    pub fn insert(&mut self, symbol: &str, code: &str) {
        self.codes
            .insert(symbol.trim().to_uppercase(), code.trim().to_string());
    }

    /// Contract code for `symbol`; `None` when unmapped or mapped to "".
    pub fn lookup(&self, symbol: &str) -> Option<&str> {
        self.codes
            .get(&symbol.trim().to_uppercase())
            .map(String::as_str)
            .filter(|code| !code.is_empty())
    }
}
