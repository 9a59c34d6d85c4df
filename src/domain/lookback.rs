//! Lookback configurations and the per-history lookback processor.
//!
//! A window of `w` weeks covers positions `idx - w ..= idx`, i.e. `w + 1`
//! rows including the current week. Rows with `idx < w`, and every row of a
//! disabled window, get [`NOT_COMPUTABLE`] for all three categories.

use crate::domain::category::{PerCategory, TraderCategory};
use crate::domain::cot_index::cot_index;
use crate::domain::error::CotError;
use crate::domain::history::{InstrumentHistory, NOT_COMPUTABLE};
use std::collections::HashSet;
use tracing::debug;

/// Name of the per-instrument lookback column.
pub const CUSTOM_LOOKBACK: &str = "custom";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Disabled,
    Trailing(usize),
}

impl Window {
    /// Negative week counts disable the window.
    pub fn from_weeks(weeks: i64) -> Self {
        if weeks < 0 {
            Window::Disabled
        } else {
            Window::Trailing(weeks as usize)
        }
    }

    /// Inclusive positional bounds for row `idx`, or `None` when not computable.
    pub fn bounds(self, idx: usize) -> Option<(usize, usize)> {
        match self {
            Window::Disabled => None,
            Window::Trailing(weeks) if idx < weeks => None,
            Window::Trailing(weeks) => Some((idx - weeks, idx)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackSpan {
    Fixed(Window),
    /// Resolved against each instrument's own lookback length.
    InstrumentCustom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookbackConfig {
    pub name: String,
    pub span: LookbackSpan,
}

impl LookbackConfig {
    pub fn fixed(name: impl Into<String>, weeks: i64) -> Self {
        Self {
            name: name.into(),
            span: LookbackSpan::Fixed(Window::from_weeks(weeks)),
        }
    }

    pub fn custom() -> Self {
        Self {
            name: CUSTOM_LOOKBACK.to_string(),
            span: LookbackSpan::InstrumentCustom,
        }
    }

    pub fn resolve(&self, custom_weeks: i64) -> Window {
        match self.span {
            LookbackSpan::Fixed(window) => window,
            LookbackSpan::InstrumentCustom => Window::from_weeks(custom_weeks),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookbackParseError {
    #[error("empty entry in lookback list")]
    EmptyEntry,

    #[error("lookback entry {0:?} is not name:weeks")]
    Malformed(String),

    #[error("lookback {name}: weeks is not an integer: {value}")]
    InvalidWeeks { name: String, value: String },

    #[error("duplicate lookback name: {0}")]
    DuplicateName(String),

    #[error("lookback name {0} is reserved")]
    ReservedName(String),
}

/// Parses an ordered `name:weeks, name:weeks` list.
pub fn parse_lookbacks(input: &str) -> Result<Vec<LookbackConfig>, LookbackParseError> {
    let mut lookbacks = Vec::new();
    let mut seen = HashSet::new();

    if input.trim().is_empty() {
        return Ok(lookbacks);
    }

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(LookbackParseError::EmptyEntry);
        }
        let (name, weeks) = trimmed
            .split_once(':')
            .map(|(n, w)| (n.trim(), w.trim()))
            .filter(|(n, _)| !n.is_empty())
            .ok_or_else(|| LookbackParseError::Malformed(trimmed.to_string()))?;
        let weeks: i64 = weeks.parse().map_err(|_| LookbackParseError::InvalidWeeks {
            name: name.to_string(),
            value: weeks.to_string(),
        })?;
        if name.eq_ignore_ascii_case(CUSTOM_LOOKBACK) {
            return Err(LookbackParseError::ReservedName(name.to_string()));
        }
        if !seen.insert(name.to_string()) {
            return Err(LookbackParseError::DuplicateName(name.to_string()));
        }
        lookbacks.push(LookbackConfig::fixed(name, weeks));
    }

    Ok(lookbacks)
}

/// Exported header for one category's index column, e.g. `Comm-1Y-idx`.
pub fn index_column_name(category: TraderCategory, lookback_name: &str) -> String {
    format!("{}-{}-idx", category.label(), lookback_name)
}

/// Computes one lookback column without touching the history.
pub fn compute_index_column(
    history: &InstrumentHistory,
    window: Window,
) -> Result<Vec<PerCategory<i32>>, CotError> {
    history.check_chronological()?;
    let series = PerCategory::try_from_fn(|cat| history.net_series(cat))?;

    Ok((0..history.len())
        .map(|idx| match window.bounds(idx) {
            None => PerCategory::new(NOT_COMPUTABLE, NOT_COMPUTABLE, NOT_COMPUTABLE),
            Some((lower, upper)) => series.map(|s| cot_index(s, lower, upper)),
        })
        .collect())
}

/// Computes the `name` column and attaches it to the history.
pub fn process_lookback(
    history: &mut InstrumentHistory,
    name: &str,
    window: Window,
) -> Result<(), CotError> {
    let column = compute_index_column(history, window)?;
    debug!(lookback = name, ?window, rows = column.len(), "index column computed");
    history.push_index_column(name, column)
}
