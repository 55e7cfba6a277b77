//! Domain types: series points, series identifiers, risk states.

pub mod point;
pub mod series;
pub mod state;

pub use point::{sort_points, SeriesPoint};
pub use series::{Frequency, SeriesSpec};
pub use state::{Dimension, DimensionStates, ParseStateError, RiskState};
