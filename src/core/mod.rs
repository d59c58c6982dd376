//! Core data structures: month index, keyed tables and draw tables.

mod draws;
mod month;
mod table;

pub use draws::{DrawKey, DrawRow, DrawTable, YearDraws, YearRecord};
pub use month::{Level, MonthId, EPOCH_YEAR};
pub use table::{
    ActualsRow, ActualsTable, PredictionRow, PredictionTable, StepPredictionTable, StepRow,
    UnitMonth,
};
