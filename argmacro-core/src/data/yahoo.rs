//! Yahoo Finance FX provider.
//!
//! Reads daily closes from the v8 chart API. Only the official USD/ARS spot
//! (`ARS=X`) is mapped. Yahoo has no official API and its format can change
//! without notice, so it sits late in the default priority order.

use super::http::{HttpFetcher, HttpOptions, RetryPolicy};
use super::provider::{finalize_points, ProviderError, ProviderErrorKind, SeriesProvider};
use crate::domain::series;
use crate::domain::SeriesPoint;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

pub const NAME: &str = "YAHOOFX";
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

pub fn ticker(series_code: &str) -> Option<&'static str> {
    match series_code {
        series::USDARS_OFFICIAL => Some("ARS=X"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Parse a chart response into daily close points. Days without a close are
/// skipped. A chart with no timestamps yields an empty series.
pub fn parse_chart(ticker: &str, body: &str) -> Result<Vec<SeriesPoint>, ProviderError> {
    let resp: ChartResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(NAME, format!("failed to parse chart for {ticker}: {e}")))?;

    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => {
            ProviderError::no_data(NAME, format!("ticker {ticker} not found"))
        }
        Some(err) => ProviderError::parse(NAME, format!("{}: {}", err.code, err.description)),
        None => ProviderError::parse(NAME, "empty result with no error"),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::parse(NAME, "result array is empty"))?;

    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::parse(NAME, "no quote data"))?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| ProviderError::parse(NAME, format!("invalid timestamp: {ts}")))?;
        points.push(SeriesPoint::on_date(date, close));
    }
    Ok(points)
}

pub struct YahooFxProvider {
    base_url: String,
    http: HttpFetcher,
}

impl YahooFxProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: HttpFetcher::new(
                NAME,
                HttpOptions::new(
                    Duration::from_secs(30),
                    RetryPolicy::backoff(3, Duration::from_millis(500)),
                ),
            )?,
        })
    }

    fn chart_query(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<(&'static str, String)> {
        let mut query = vec![("interval", "1d".to_string())];
        match start {
            None => query.push(("range", "max".to_string())),
            Some(start) => {
                let end = end.unwrap_or_else(|| chrono::Utc::now().date_naive());
                let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
                let end_ts = end
                    .and_hms_opt(23, 59, 59)
                    .map(|dt| dt.and_utc().timestamp())
                    .unwrap_or(start_ts);
                query.push(("period1", start_ts.to_string()));
                query.push(("period2", end_ts.to_string()));
            }
        }
        query
    }
}

impl SeriesProvider for YahooFxProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch_timeseries(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let ticker = ticker(series_code)
            .ok_or_else(|| ProviderError::unknown_series(NAME, series_code))?;
        let url = format!("{}/{ticker}", self.base_url);
        let body = self.http.get_text(&url, &Self::chart_query(start, end))?;
        match parse_chart(ticker, &body) {
            Err(e) if matches!(e.kind, ProviderErrorKind::NoData(_)) => Ok(Vec::new()),
            other => Ok(finalize_points(other?, start, end)),
        }
    }

    fn supports(&self, series_code: &str) -> bool {
        ticker(series_code).is_some()
    }

    fn unavailable_reason(&self) -> Option<ProviderError> {
        self.http.unavailable_reason()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_closes_and_skips_gaps() {
        let body = r#"{"chart": {"result": [{
            "timestamp": [1714608000, 1714694400, 1714780800],
            "indicators": {"quote": [{"close": [878.1, null, 880.4]}]}
        }], "error": null}}"#;
        let pts = parse_chart("ARS=X", body).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].date(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(pts[1].value, 880.4);
    }

    #[test]
    fn not_found_maps_to_no_data() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#;
        let err = parse_chart("XXX=X", body).unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::NoData(_)));
    }

    #[test]
    fn missing_timestamps_is_empty() {
        let body = r#"{"chart": {"result": [{"indicators": {"quote": [{"close": []}]}}], "error": null}}"#;
        assert!(parse_chart("ARS=X", body).unwrap().is_empty());
    }

    #[test]
    fn open_ended_query_uses_max_range() {
        let q = YahooFxProvider::chart_query(None, None);
        assert!(q.contains(&("range", "max".to_string())));
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let q = YahooFxProvider::chart_query(Some(start), Some(start));
        assert!(q.contains(&("period1", "1704067200".to_string())));
        assert!(q.contains(&("period2", "1704153599".to_string())));
    }
}
