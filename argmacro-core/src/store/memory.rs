//! In-memory store.

use super::{SeriesReader, SeriesSummary, SeriesWriter, StateStore, StoreError};
use crate::domain::SeriesPoint;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type SeriesMap = HashMap<String, BTreeMap<NaiveDateTime, f64>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    series: RwLock<SeriesMap>,
    state: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for fixtures.
    pub fn with_points(self, series_id: &str, points: &[SeriesPoint]) -> Self {
        self.write_series()
            .entry(series_id.to_string())
            .or_default()
            .extend(points.iter().map(|p| (p.ts, p.value)));
        self
    }

    fn read_series(&self) -> RwLockReadGuard<'_, SeriesMap> {
        self.series.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_series(&self) -> RwLockWriteGuard<'_, SeriesMap> {
        self.series.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn summary(&self) -> Vec<SeriesSummary> {
        let series = self.read_series();
        let mut out: Vec<SeriesSummary> = series
            .iter()
            .map(|(id, pts)| SeriesSummary {
                series_id: id.clone(),
                points: pts.len(),
                first: pts.keys().next().copied(),
                last: pts.keys().next_back().copied(),
            })
            .collect();
        out.sort_by(|a, b| a.series_id.cmp(&b.series_id));
        out
    }
}

impl SeriesReader for MemoryStore {
    fn latest_point(&self, series_id: &str) -> Result<Option<SeriesPoint>, StoreError> {
        Ok(self
            .read_series()
            .get(series_id)
            .and_then(|pts| pts.iter().next_back())
            .map(|(ts, v)| SeriesPoint::new(*ts, *v)))
    }

    fn latest_point_at_or_before(
        &self,
        series_id: &str,
        ts: NaiveDateTime,
    ) -> Result<Option<SeriesPoint>, StoreError> {
        Ok(self
            .read_series()
            .get(series_id)
            .and_then(|pts| pts.range(..=ts).next_back())
            .map(|(ts, v)| SeriesPoint::new(*ts, *v)))
    }

    fn recent_points(&self, series_id: &str, limit: usize) -> Result<Vec<SeriesPoint>, StoreError> {
        let series = self.read_series();
        let Some(pts) = series.get(series_id) else {
            return Ok(Vec::new());
        };
        let mut out: Vec<SeriesPoint> = pts
            .iter()
            .rev()
            .take(limit)
            .map(|(ts, v)| SeriesPoint::new(*ts, *v))
            .collect();
        out.reverse();
        Ok(out)
    }
}

impl SeriesWriter for MemoryStore {
    fn upsert_points(&self, series_id: &str, points: &[SeriesPoint]) -> Result<usize, StoreError> {
        let mut series = self.write_series();
        let entry = series.entry(series_id.to_string()).or_default();
        for p in points {
            entry.insert(p.ts, p.value);
        }
        Ok(points.len())
    }
}

impl StateStore for MemoryStore {
    fn get_state(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn set_state(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
