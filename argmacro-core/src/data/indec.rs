//! INDEC CPI provider, backed by the datos.gob.ar time-series API.

use super::http::{HttpFetcher, HttpOptions, RetryPolicy};
use super::provider::{
    finalize_points, parse_upstream_timestamp, ProviderError, SeriesProvider,
};
use crate::domain::series;
use crate::domain::SeriesPoint;
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;

pub const NAME: &str = "INDEC";
pub const DEFAULT_BASE_URL: &str = "https://apis.datos.gob.ar/series/api/series";

pub fn series_id(series_code: &str) -> Option<&'static str> {
    match series_code {
        series::CPI_HEADLINE => Some("ipc_nivel_general_nacional"),
        series::CPI_CORE => Some("ipc_nucleo_nivel_general_nacional"),
        _ => None,
    }
}

/// Parse either `{"data": [[date, value], ...]}` or
/// `{"series": [{"data": [...]}]}`. Rows may also be `{"date", "value"}`
/// objects. Rows with a null value are skipped.
pub fn parse_response(body: &str) -> Result<Vec<SeriesPoint>, ProviderError> {
    let js: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(NAME, format!("invalid JSON: {e}")))?;

    let data = js
        .get("data")
        .or_else(|| js.get("series").and_then(|s| s.get(0)).and_then(|s| s.get("data")))
        .and_then(Value::as_array)
        .filter(|rows| !rows.is_empty())
        .ok_or_else(|| ProviderError::parse(NAME, "unexpected schema"))?;

    let mut points = Vec::with_capacity(data.len());
    for row in data {
        let (date, value) = match row {
            Value::Array(cells) if cells.len() >= 2 => (&cells[0], &cells[1]),
            Value::Object(map) => match (map.get("date"), map.get("value")) {
                (Some(d), Some(v)) => (d, v),
                _ => continue,
            },
            _ => continue,
        };
        let (Some(date), Some(value)) = (date.as_str(), value.as_f64()) else {
            continue;
        };
        let ts = parse_upstream_timestamp(date)
            .ok_or_else(|| ProviderError::parse(NAME, format!("invalid date '{date}'")))?;
        points.push(SeriesPoint::new(ts, value));
    }
    Ok(points)
}

pub struct IndecProvider {
    base_url: String,
    http: HttpFetcher,
}

impl IndecProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let options = HttpOptions::new(
            Duration::from_secs(120),
            RetryPolicy::backoff(3, Duration::from_secs(2)),
        );
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: HttpFetcher::new(NAME, options)?,
        })
    }
}

impl SeriesProvider for IndecProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch_timeseries(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let id = series_id(series_code)
            .ok_or_else(|| ProviderError::unknown_series(NAME, series_code))?;

        let mut query = vec![("ids", id.to_string()), ("format", "json".to_string())];
        if let Some(s) = start {
            query.push(("start_date", s.format("%Y-%m-%d").to_string()));
        }
        if let Some(e) = end {
            query.push(("end_date", e.format("%Y-%m-%d").to_string()));
        }

        let body = self.http.get_text(&format!("{}/", self.base_url), &query)?;
        Ok(finalize_points(parse_response(&body)?, start, end))
    }

    fn supports(&self, series_code: &str) -> bool {
        series_id(series_code).is_some()
    }

    fn unavailable_reason(&self) -> Option<ProviderError> {
        self.http.unavailable_reason()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::ProviderErrorKind;

    #[test]
    fn parses_flat_data_rows() {
        let body = r#"{"data": [["2024-01-01", 100.0], ["2024-02-01", 113.2], ["2024-03-01", null]]}"#;
        let pts = parse_response(body).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1].value, 113.2);
    }

    #[test]
    fn parses_nested_series_and_object_rows() {
        let body = r#"{"series": [{"data": [{"date": "2024-01-01", "value": 5.0}]}]}"#;
        let pts = parse_response(body).unwrap();
        assert_eq!(pts.len(), 1);
        assert_eq!(pts[0].date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn missing_data_is_schema_error() {
        let err = parse_response(r#"{"meta": {}}"#).unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::Parse(_)));
        let err = parse_response(r#"{"data": []}"#).unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::Parse(_)));
    }

    #[test]
    fn only_cpi_series() {
        assert!(series_id(series::CPI_CORE).is_some());
        assert!(series_id(series::RESERVES_USD).is_none());
    }
}
