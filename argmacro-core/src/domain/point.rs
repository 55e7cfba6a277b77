//! SeriesPoint: a single observation of a macro series.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One `(timestamp, value)` observation.
///
/// Points never carry a missing value: an absent observation is simply not
/// present in the series. Providers drop non-finite values before building
/// points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub ts: NaiveDateTime,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(ts: NaiveDateTime, value: f64) -> Self {
        Self { ts, value }
    }

    /// Point stamped at midnight of `date`.
    pub fn on_date(date: NaiveDate, value: f64) -> Self {
        Self {
            ts: date.and_time(chrono::NaiveTime::MIN),
            value,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.ts.date()
    }
}

/// Sort ascending by timestamp. Stable, so duplicates keep their arrival order.
pub fn sort_points(points: &mut [SeriesPoint]) {
    points.sort_by_key(|p| p.ts);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_date_is_midnight() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let p = SeriesPoint::on_date(d, 1.5);
        assert_eq!(p.date(), d);
        assert_eq!(p.ts.and_utc().timestamp() % 86_400, 0);
    }

    #[test]
    fn sort_keeps_duplicate_order() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let e = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut pts = vec![
            SeriesPoint::on_date(d, 1.0),
            SeriesPoint::on_date(e, 2.0),
            SeriesPoint::on_date(d, 3.0),
        ];
        sort_points(&mut pts);
        let values: Vec<f64> = pts.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 1.0, 3.0]);
    }
}
