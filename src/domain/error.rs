//! Domain error types.

/// Top-level error type for cotindex.
#[derive(Debug, thiserror::Error)]
pub enum CotError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("source data error for {year}: {reason}")]
    SourceData { year: i32, reason: String },

    #[error("history error for contract {code}: {reason}")]
    HistoryState { code: String, reason: String },

    #[error("unknown instrument: {name}")]
    UnknownInstrument { name: String },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CotError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        CotError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config_missing(section: &str, key: &str) -> Self {
        CotError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// Process exit status for this error kind.
    pub fn exit_status(&self) -> u8 {
        match self {
            CotError::Io(_) => 1,
            CotError::ConfigParse { .. }
            | CotError::ConfigMissing { .. }
            | CotError::ConfigInvalid { .. } => 2,
            CotError::SourceData { .. } => 3,
            CotError::HistoryState { .. } => 4,
            CotError::UnknownInstrument { .. } => 5,
            CotError::Export { .. } => 6,
        }
    }
}

impl From<&CotError> for std::process::ExitCode {
    fn from(err: &CotError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
