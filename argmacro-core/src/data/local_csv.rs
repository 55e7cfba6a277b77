//! Local CSV provider.
//!
//! Serves any series for which `{dir}/{SERIES_CODE}.csv` exists. Files have a
//! `date,value` header; dates are ISO dates or date-times. Used for series
//! with no public API (EMBI, CDS) and for offline runs.

use super::provider::{
    finalize_points, parse_upstream_timestamp, ProviderError, ProviderErrorKind, SeriesProvider,
};
use crate::domain::SeriesPoint;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const NAME: &str = "LOCALCSV";

#[derive(Debug, Deserialize)]
struct Row {
    date: String,
    value: Option<f64>,
}

pub struct LocalCsvProvider {
    dir: PathBuf,
}

impl LocalCsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, series_code: &str) -> PathBuf {
        self.dir.join(format!("{series_code}.csv"))
    }

    fn is_valid_code(series_code: &str) -> bool {
        !series_code.is_empty()
            && series_code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

/// Read a `date,value` CSV. Rows with an empty value are skipped.
pub fn read_series_csv(path: &Path) -> Result<Vec<SeriesPoint>, ProviderError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ProviderError::new(NAME, ProviderErrorKind::Io(format!("{}: {e}", path.display()))))?;

    let mut points = Vec::new();
    for (line, row) in reader.deserialize::<Row>().enumerate() {
        let row = row.map_err(|e| {
            ProviderError::parse(NAME, format!("{} row {}: {e}", path.display(), line + 2))
        })?;
        let Some(value) = row.value else {
            continue;
        };
        let ts = parse_upstream_timestamp(&row.date).ok_or_else(|| {
            ProviderError::parse(
                NAME,
                format!("{} row {}: invalid date '{}'", path.display(), line + 2, row.date),
            )
        })?;
        points.push(SeriesPoint::new(ts, value));
    }
    Ok(points)
}

impl SeriesProvider for LocalCsvProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch_timeseries(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        if !self.supports(series_code) {
            return Err(ProviderError::unknown_series(NAME, series_code));
        }
        let points = read_series_csv(&self.path_for(series_code))?;
        Ok(finalize_points(points, start, end))
    }

    fn supports(&self, series_code: &str) -> bool {
        Self::is_valid_code(series_code) && self.path_for(series_code).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_and_filters_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("EMBI_AR.csv"),
            "date,value\n2024-03-01,1510\n2024-01-01,1700\n2024-02-01,\n2024-02-15,1600\n",
        )
        .unwrap();

        let p = LocalCsvProvider::new(dir.path());
        assert!(p.supports("EMBI_AR"));
        let all = p.fetch_timeseries("EMBI_AR", None, None).unwrap();
        let values: Vec<f64> = all.iter().map(|x| x.value).collect();
        assert_eq!(values, vec![1700.0, 1600.0, 1510.0]);

        let start = NaiveDate::from_ymd_opt(2024, 2, 15);
        let end = NaiveDate::from_ymd_opt(2024, 3, 1);
        let some = p.fetch_timeseries("EMBI_AR", start, end).unwrap();
        assert_eq!(some.len(), 2);
    }

    #[test]
    fn missing_file_is_unknown_series() {
        let dir = tempfile::tempdir().unwrap();
        let p = LocalCsvProvider::new(dir.path());
        let err = p.fetch_timeseries("CDS_ARG_5Y_USD", None, None).unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::UnknownSeries(_)));
        assert!(!p.supports("../etc/passwd"));
    }

    #[test]
    fn bad_date_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("X.csv"), "date,value\nyesterday,1\n").unwrap();
        let err = LocalCsvProvider::new(dir.path())
            .fetch_timeseries("X", None, None)
            .unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::Parse(_)));
    }
}
