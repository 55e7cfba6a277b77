//! SQLite store.
//!
//! Schema:
//! - `dim_series (series_id PK, name, freq, source, units)`
//! - `fact_series (series_id, ts_ms, value, PK(series_id, ts_ms))`
//! - `state_tracking (key PK, value, updated_at)`
//!
//! Timestamps are stored as Unix milliseconds of the naive timestamp read as
//! UTC.

use super::{SeriesReader, SeriesSummary, SeriesWriter, StateStore, StoreError};
use crate::domain::{series, SeriesPoint};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS dim_series (
    series_id TEXT PRIMARY KEY,
    name      TEXT,
    freq      TEXT,
    source    TEXT,
    units     TEXT
);
CREATE TABLE IF NOT EXISTS fact_series (
    series_id TEXT    NOT NULL,
    ts_ms     INTEGER NOT NULL,
    value     REAL    NOT NULL,
    PRIMARY KEY (series_id, ts_ms)
);
CREATE TABLE IF NOT EXISTS state_tracking (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

fn to_millis(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

fn from_millis(ms: i64) -> Result<NaiveDateTime, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {ms}")))
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stored series with point counts and date coverage.
    pub fn summary(&self) -> Result<Vec<SeriesSummary>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT series_id, COUNT(*), MIN(ts_ms), MAX(ts_ms)
             FROM fact_series GROUP BY series_id ORDER BY series_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, Option<i64>>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (series_id, count, first, last) = row?;
            out.push(SeriesSummary {
                series_id,
                points: usize::try_from(count).unwrap_or(0),
                first: first.map(from_millis).transpose()?,
                last: last.map(from_millis).transpose()?,
            });
        }
        Ok(out)
    }

    fn query_one(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<SeriesPoint>, StoreError> {
        let conn = self.conn();
        let row = conn
            .query_row(sql, params, |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)))
            .optional()?;
        row.map(|(ms, value)| Ok(SeriesPoint::new(from_millis(ms)?, value)))
            .transpose()
    }
}

impl SeriesReader for SqliteStore {
    fn latest_point(&self, series_id: &str) -> Result<Option<SeriesPoint>, StoreError> {
        self.query_one(
            "SELECT ts_ms, value FROM fact_series
             WHERE series_id = ?1 ORDER BY ts_ms DESC LIMIT 1",
            params![series_id],
        )
    }

    fn latest_point_at_or_before(
        &self,
        series_id: &str,
        ts: NaiveDateTime,
    ) -> Result<Option<SeriesPoint>, StoreError> {
        self.query_one(
            "SELECT ts_ms, value FROM fact_series
             WHERE series_id = ?1 AND ts_ms <= ?2 ORDER BY ts_ms DESC LIMIT 1",
            params![series_id, to_millis(ts)],
        )
    }

    fn recent_points(&self, series_id: &str, limit: usize) -> Result<Vec<SeriesPoint>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT ts_ms, value FROM fact_series
             WHERE series_id = ?1 ORDER BY ts_ms DESC LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![series_id, limit], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (ms, value) = row?;
            out.push(SeriesPoint::new(from_millis(ms)?, value));
        }
        out.reverse();
        Ok(out)
    }
}

impl SeriesWriter for SqliteStore {
    fn upsert_points(&self, series_id: &str, points: &[SeriesPoint]) -> Result<usize, StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let spec = series::lookup(series_id);
            tx.execute(
                "INSERT INTO dim_series (series_id, name, freq, source, units)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(series_id) DO UPDATE SET
                     name = COALESCE(excluded.name, dim_series.name),
                     freq = COALESCE(excluded.freq, dim_series.freq),
                     source = COALESCE(excluded.source, dim_series.source),
                     units = COALESCE(excluded.units, dim_series.units)",
                params![
                    series_id,
                    spec.map(|s| s.name),
                    spec.map(|s| s.freq.code()),
                    spec.map(|s| s.source),
                    spec.map(|s| s.units),
                ],
            )?;

            let mut stmt = tx.prepare(
                "INSERT INTO fact_series (series_id, ts_ms, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(series_id, ts_ms) DO UPDATE SET value = excluded.value",
            )?;
            for p in points {
                stmt.execute(params![series_id, to_millis(p.ts), p.value])?;
            }
        }
        tx.commit()?;
        Ok(points.len())
    }
}

impl StateStore for SqliteStore {
    fn get_state(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .conn()
            .query_row(
                "SELECT value FROM state_tracking WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?)
    }

    fn set_state(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn().execute(
            "INSERT INTO state_tracking (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
