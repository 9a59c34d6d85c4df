//! Port traits for the external collaborators of the indexing engine.

pub mod config_port;
pub mod cot_data_port;
pub mod export_port;
