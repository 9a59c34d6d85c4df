//! Core domain types and logic.

pub mod category;
pub mod history;
pub mod cot_index;
pub mod lookback;
pub mod instrument;
pub mod catalog;
pub mod contract_codes;
pub mod engine;
pub mod report;
pub mod config;
pub mod error;
