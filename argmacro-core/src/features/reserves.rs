//! Reserves momentum over four weeks.

use crate::domain::series::RESERVES_USD;
use crate::store::{SeriesReader, StoreError};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

pub const RESERVES_WINDOW_DAYS: i64 = 28;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservesMomentum {
    /// `(now - then) / then`
    pub value: f64,
    pub timestamp: NaiveDateTime,
    pub reserves_current: f64,
    pub reserves_4w_ago: f64,
    pub reference_ts: NaiveDateTime,
}

/// Change of `RESERVES_USD` between its latest observation and the latest
/// observation at or before 28 days earlier.
pub fn compute_reserves_momentum(
    reader: &dyn SeriesReader,
) -> Result<Option<ReservesMomentum>, StoreError> {
    let Some(now) = reader.latest_point(RESERVES_USD)? else {
        return Ok(None);
    };
    let cutoff = now.ts - Duration::days(RESERVES_WINDOW_DAYS);
    let Some(then) = reader.latest_point_at_or_before(RESERVES_USD, cutoff)? else {
        return Ok(None);
    };
    if then.value == 0.0 {
        return Ok(None);
    }

    Ok(Some(ReservesMomentum {
        value: (now.value - then.value) / then.value,
        timestamp: now.ts,
        reserves_current: now.value,
        reserves_4w_ago: then.value,
        reference_ts: then.ts,
    }))
}
