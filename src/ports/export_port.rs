//! Export port trait for derived series and tables.

use crate::domain::error::CotError;
use crate::domain::instrument::Instrument;
use crate::domain::report::{EventRow, EventValue, PositioningRow, SummaryRow};

pub trait ExportPort {
    /// Every input column, net positions and all index columns.
    fn write_detailed(&self, instrument: &Instrument) -> Result<(), CotError>;

    fn write_summary(&self, instrument: &Instrument, rows: &[SummaryRow])
        -> Result<(), CotError>;

    fn write_positioning(&self, rows: &[PositioningRow]) -> Result<(), CotError>;

    fn write_event_list(
        &self,
        instrument: &Instrument,
        kind: EventValue,
        rows: &[EventRow],
    ) -> Result<(), CotError>;
}
