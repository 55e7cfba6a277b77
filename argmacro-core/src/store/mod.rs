//! Persistence contracts and stores.
//!
//! Features only need [`SeriesReader`]; the refresh pipeline writes through
//! [`SeriesWriter`]; the watcher keeps its last overall state in a
//! [`StateStore`]. Two implementations: an in-memory store for tests and
//! one-shot runs, and SQLite for the long-lived database.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::domain::{RiskState, SeriesPoint};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Key under which the watcher stores the last overall state.
pub const LAST_OVERALL_STATE_KEY: &str = "last_overall_state";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    #[error("store error: {0}")]
    Other(String),
}

/// Read side of the series table.
pub trait SeriesReader {
    /// Most recent observation of `series_id`.
    fn latest_point(&self, series_id: &str) -> Result<Option<SeriesPoint>, StoreError>;

    /// Most recent observation with timestamp `<= ts`.
    fn latest_point_at_or_before(
        &self,
        series_id: &str,
        ts: NaiveDateTime,
    ) -> Result<Option<SeriesPoint>, StoreError>;

    /// The last `limit` observations, oldest first.
    fn recent_points(&self, series_id: &str, limit: usize) -> Result<Vec<SeriesPoint>, StoreError>;
}

/// Write side of the series table. Upserts by `(series_id, ts)`; the last
/// write for a timestamp wins.
pub trait SeriesWriter {
    /// Returns the number of points written.
    fn upsert_points(&self, series_id: &str, points: &[SeriesPoint]) -> Result<usize, StoreError>;
}

/// Small key/value table for watcher bookkeeping.
pub trait StateStore {
    fn get_state(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_state(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn last_overall_state(&self) -> Result<Option<RiskState>, StoreError> {
        self.get_state(LAST_OVERALL_STATE_KEY)?
            .map(|raw| {
                raw.parse::<RiskState>()
                    .map_err(|e| StoreError::Corrupt(e.to_string()))
            })
            .transpose()
    }

    fn save_overall_state(&self, state: RiskState) -> Result<(), StoreError> {
        self.set_state(LAST_OVERALL_STATE_KEY, state.as_str())
    }
}

/// Per-series inventory row.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub series_id: String,
    pub points: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}
