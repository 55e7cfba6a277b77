//! EMBI spread level, 30-day trend and policy fair-value bands.

use crate::domain::series::EMBI_AR;
use crate::store::{SeriesReader, StoreError};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

pub const EMBI_TREND_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbiLevelTrend {
    /// Latest spread in basis points.
    pub level: f64,
    /// `level` minus the value at or before 30 days earlier.
    pub trend_30d: Option<f64>,
    pub timestamp: NaiveDateTime,
}

/// Latest EMBI level and its 30-day change. The trend is unavailable on its
/// own when history is shorter than the window.
pub fn compute_embi_level_trend(
    reader: &dyn SeriesReader,
) -> Result<Option<EmbiLevelTrend>, StoreError> {
    let Some(latest) = reader.latest_point(EMBI_AR)? else {
        return Ok(None);
    };
    let cutoff = latest.ts - Duration::days(EMBI_TREND_WINDOW_DAYS);
    let trend_30d = reader
        .latest_point_at_or_before(EMBI_AR, cutoff)?
        .map(|past| latest.value - past.value);

    Ok(Some(EmbiLevelTrend {
        level: latest.value,
        trend_30d,
        timestamp: latest.ts,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairValueBands {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// Map a policy score in `[0, 2]` (clamped) to fair-value spread bands.
///
/// 0 maps to 1800bp, 1 to 1400bp, 2 to 800bp, linearly in between; the band
/// is ±20% around the mid.
pub fn policy_score_to_bands(score: f64) -> FairValueBands {
    let s = if score.is_nan() { 0.0 } else { score.clamp(0.0, 2.0) };
    let mid = if s <= 1.0 {
        1800.0 - 400.0 * s
    } else {
        1400.0 - 600.0 * (s - 1.0)
    };
    FairValueBands {
        low: mid * 0.8,
        mid,
        high: mid * 1.2,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbiBands {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    pub policy_score: f64,
    pub current_embi: f64,
    pub trend_30d: Option<f64>,
    pub timestamp: NaiveDateTime,
}

impl EmbiBands {
    /// Current spread relative to the mid band (positive: wider than fair value).
    pub fn deviation_from_mid(&self) -> f64 {
        self.current_embi - self.mid
    }
}

/// Fair-value bands for `policy_score` next to the latest EMBI reading.
/// Unavailable when no EMBI observation has been stored.
pub fn compute_embi_bands(
    policy_score: f64,
    reader: &dyn SeriesReader,
) -> Result<Option<EmbiBands>, StoreError> {
    let Some(embi) = compute_embi_level_trend(reader)? else {
        return Ok(None);
    };
    let bands = policy_score_to_bands(policy_score);
    Ok(Some(EmbiBands {
        low: bands.low,
        mid: bands.mid,
        high: bands.high,
        policy_score,
        current_embi: embi.level,
        trend_30d: embi.trend_30d,
        timestamp: embi.timestamp,
    }))
}
