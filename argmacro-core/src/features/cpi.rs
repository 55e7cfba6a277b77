//! Core CPI momentum and the CPI corridor.

use crate::domain::series::CPI_CORE;
use crate::store::{SeriesReader, StoreError};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Regulated-price growth assumed when the caller gives none.
pub const DEFAULT_REGULATED_GROWTH: f64 = 0.6;

/// Wage growth assumed as a share of FX pass-through when not given.
const WAGES_TO_FX_PASS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreCpi {
    /// Annualised over a three-month horizon.
    pub annualized_3m: f64,
    pub monthly_rate: f64,
    /// Gap between the two readings in 30-day months.
    pub months: f64,
    pub timestamp: NaiveDateTime,
    pub previous_ts: NaiveDateTime,
}

/// Three-month annualised core CPI from the two most recent readings.
///
/// `months = whole_days_between / 30`, `monthly = latest / prev - 1`,
/// `annualized = (1 + monthly)^(3 / months) - 1`. Unavailable with fewer
/// than two readings, when both fall on the same day, or when the earlier
/// reading is zero.
pub fn compute_core_cpi_3m_annualized(
    reader: &dyn SeriesReader,
) -> Result<Option<CoreCpi>, StoreError> {
    let points = reader.recent_points(CPI_CORE, 2)?;
    let [prev, latest] = points.as_slice() else {
        return Ok(None);
    };

    let days = (latest.ts - prev.ts).num_days();
    let months = days as f64 / 30.0;
    if months == 0.0 || prev.value == 0.0 {
        return Ok(None);
    }

    let monthly_rate = latest.value / prev.value - 1.0;
    Ok(Some(CoreCpi {
        annualized_3m: (1.0 + monthly_rate).powf(3.0 / months) - 1.0,
        monthly_rate,
        months,
        timestamp: latest.ts,
        previous_ts: prev.ts,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorridorBounds {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// Inflation corridor from FX pass-through, regulated prices and wages.
///
/// `wages` defaults to half of `fx_pass`, `regulated` to
/// [`DEFAULT_REGULATED_GROWTH`].
pub fn corridor(fx_pass: f64, regulated: Option<f64>, wages: Option<f64>) -> CorridorBounds {
    let wages = wages.unwrap_or(fx_pass * WAGES_TO_FX_PASS);
    let regulated = regulated.unwrap_or(DEFAULT_REGULATED_GROWTH);

    CorridorBounds {
        low: fx_pass.min(wages).min(regulated) * 0.9,
        mid: 0.4 * fx_pass + 0.3 * wages + 0.3 * regulated,
        high: fx_pass.max(wages).max(regulated) * 1.1,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpiCorridor {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    /// `(1 + mid)^3 - 1`
    pub nowcast_3m_annualized: f64,
    /// Timestamp of the latest core CPI reading.
    pub timestamp: NaiveDateTime,
    /// Observed core CPI momentum, when two readings exist.
    pub observed_3m_annualized: Option<f64>,
}

/// Corridor anchored on the latest core CPI reading. Unavailable when no
/// core CPI has been stored.
pub fn compute_cpi_corridor(
    fx_pass: f64,
    reader: &dyn SeriesReader,
) -> Result<Option<CpiCorridor>, StoreError> {
    compute_cpi_corridor_with(fx_pass, None, None, reader)
}

/// [`compute_cpi_corridor`] with explicit regulated-price and wage inputs.
pub fn compute_cpi_corridor_with(
    fx_pass: f64,
    regulated: Option<f64>,
    wages: Option<f64>,
    reader: &dyn SeriesReader,
) -> Result<Option<CpiCorridor>, StoreError> {
    let Some(latest) = reader.latest_point(CPI_CORE)? else {
        return Ok(None);
    };
    let bounds = corridor(fx_pass, regulated, wages);
    let observed = compute_core_cpi_3m_annualized(reader)?.map(|c| c.annualized_3m);

    Ok(Some(CpiCorridor {
        low: bounds.low,
        mid: bounds.mid,
        high: bounds.high,
        nowcast_3m_annualized: (1.0 + bounds.mid).powi(3) - 1.0,
        timestamp: latest.ts,
        observed_3m_annualized: observed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesPoint;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn p(m: u32, d: u32, v: f64) -> SeriesPoint {
        SeriesPoint::on_date(NaiveDate::from_ymd_opt(2024, m, d).unwrap(), v)
    }

    #[test]
    fn flat_index_is_zero() {
        let store = MemoryStore::new().with_points(CPI_CORE, &[p(1, 1, 250.0), p(2, 1, 250.0)]);
        let c = compute_core_cpi_3m_annualized(&store).unwrap().unwrap();
        assert_eq!(c.annualized_3m, 0.0);
    }

    #[test]
    fn one_month_step() {
        // 30 days apart: exponent is exactly 3.
        let store = MemoryStore::new().with_points(CPI_CORE, &[p(4, 1, 100.0), p(5, 1, 102.0)]);
        let c = compute_core_cpi_3m_annualized(&store).unwrap().unwrap();
        assert!((c.months - 1.0).abs() < 1e-12);
        assert!((c.annualized_3m - (1.02f64.powi(3) - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn uses_two_most_recent() {
        let store = MemoryStore::new().with_points(
            CPI_CORE,
            &[p(1, 1, 50.0), p(4, 1, 100.0), p(5, 1, 100.0)],
        );
        let c = compute_core_cpi_3m_annualized(&store).unwrap().unwrap();
        assert_eq!(c.annualized_3m, 0.0);
    }

    #[test]
    fn same_day_readings_unavailable() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let a = SeriesPoint::new(d.and_hms_opt(0, 0, 0).unwrap(), 100.0);
        let b = SeriesPoint::new(d.and_hms_opt(12, 0, 0).unwrap(), 101.0);
        let store = MemoryStore::new().with_points(CPI_CORE, &[a, b]);
        assert!(compute_core_cpi_3m_annualized(&store).unwrap().is_none());
    }

    #[test]
    fn single_reading_unavailable() {
        let store = MemoryStore::new().with_points(CPI_CORE, &[p(1, 1, 100.0)]);
        assert!(compute_core_cpi_3m_annualized(&store).unwrap().is_none());
    }

    #[test]
    fn corridor_defaults() {
        let b = corridor(0.5, None, None);
        // wages 0.25, regulated 0.6
        assert!((b.low - 0.225).abs() < 1e-12);
        assert!((b.mid - (0.2 + 0.075 + 0.18)).abs() < 1e-12);
        assert!((b.high - 0.66).abs() < 1e-12);
        assert!(b.low <= b.mid && b.mid <= b.high);
    }

    #[test]
    fn corridor_needs_core_cpi() {
        assert!(compute_cpi_corridor(0.5, &MemoryStore::new()).unwrap().is_none());

        let store = MemoryStore::new().with_points(CPI_CORE, &[p(6, 1, 300.0)]);
        let c = compute_cpi_corridor(0.5, &store).unwrap().unwrap();
        assert_eq!(c.timestamp, p(6, 1, 0.0).ts);
        assert!((c.nowcast_3m_annualized - ((1.0 + c.mid).powi(3) - 1.0)).abs() < 1e-12);
        assert!(c.observed_3m_annualized.is_none());
    }
}
