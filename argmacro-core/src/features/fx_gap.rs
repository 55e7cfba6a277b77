//! FX gap: premium of the parallel rate over the official rate.

use crate::domain::series::{USDARS_OFFICIAL, USDARS_OFFICIAL_BLUELYTICS, USDARS_PARALLEL};
use crate::store::{SeriesReader, StoreError};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Official series, in lookup order.
const OFFICIAL_SOURCES: [&str; 2] = [USDARS_OFFICIAL, USDARS_OFFICIAL_BLUELYTICS];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FxGap {
    /// `(parallel - official) / official`
    pub gap: f64,
    pub official: f64,
    pub parallel: f64,
    pub official_ts: NaiveDateTime,
    pub parallel_ts: NaiveDateTime,
    /// Which official series supplied the rate.
    pub official_series: &'static str,
}

/// Gap between the latest parallel rate and the latest official rate at or
/// before the parallel timestamp.
///
/// The official rate comes from `USDARS_OFFICIAL`, falling back to
/// `USDARS_OFFICIAL_BLUELYTICS` when the primary has no usable observation.
/// Unavailable when either side is missing or the official rate is not
/// positive.
pub fn compute_fx_gap(reader: &dyn SeriesReader) -> Result<Option<FxGap>, StoreError> {
    let Some(parallel) = reader.latest_point(USDARS_PARALLEL)? else {
        return Ok(None);
    };

    for series in OFFICIAL_SOURCES {
        let Some(official) = reader.latest_point_at_or_before(series, parallel.ts)? else {
            continue;
        };
        if official.value <= 0.0 {
            continue;
        }
        return Ok(Some(FxGap {
            gap: (parallel.value - official.value) / official.value,
            official: official.value,
            parallel: parallel.value,
            official_ts: official.ts,
            parallel_ts: parallel.ts,
            official_series: series,
        }));
    }

    Ok(None)
}
