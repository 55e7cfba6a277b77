//! Bluelytics provider for the parallel ("blue") and official USD/ARS rates.
//!
//! Without a date range the `/latest` snapshot is returned as a single point
//! stamped with its `last_update`. With a range, `/historical?day=` is queried
//! once per calendar day; missing days (404) are skipped.

use super::http::{HttpFetcher, HttpOptions, RetryPolicy};
use super::provider::{
    finalize_points, parse_upstream_timestamp, ProviderError, ProviderErrorKind, SeriesProvider,
};
use crate::domain::series;
use crate::domain::SeriesPoint;
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const NAME: &str = "BLUELYTICS";
pub const DEFAULT_BASE_URL: &str = "https://api.bluelytics.com.ar/v2";

/// Days queried when a range has an end but no start.
const DEFAULT_LOOKBACK_DAYS: u64 = 30;

/// Response key for an internal series code. `USDARS_BLUE` is a legacy alias
/// of `USDARS_PARALLEL`.
pub fn rate_kind(series_code: &str) -> Option<&'static str> {
    match series_code {
        series::USDARS_PARALLEL | series::USDARS_BLUE => Some("blue"),
        series::USDARS_OFFICIAL_BLUELYTICS => Some("oficial"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct Rate {
    value_avg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    last_update: Option<String>,
    #[serde(flatten)]
    rates: HashMap<String, serde_json::Value>,
}

/// Parse a `/latest` or `/historical` body into `(last_update, value_avg)`
/// for the requested rate kind.
pub fn parse_snapshot(
    body: &str,
    kind: &str,
) -> Result<(Option<NaiveDateTime>, f64), ProviderError> {
    let snap: Snapshot = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(NAME, format!("invalid JSON: {e}")))?;

    let raw = snap
        .rates
        .get(kind)
        .ok_or_else(|| ProviderError::parse(NAME, format!("'{kind}' not found in response")))?;
    let rate: Rate = serde_json::from_value(raw.clone())
        .map_err(|e| ProviderError::parse(NAME, format!("invalid '{kind}' entry: {e}")))?;
    let value = rate
        .value_avg
        .ok_or_else(|| ProviderError::parse(NAME, format!("value_avg not found for {kind}")))?;

    let ts = snap.last_update.as_deref().and_then(parse_upstream_timestamp);
    Ok((ts, value))
}

pub struct BluelyticsProvider {
    base_url: String,
    http: HttpFetcher,
}

impl BluelyticsProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: HttpFetcher::new(
                NAME,
                HttpOptions::new(Duration::from_secs(30), RetryPolicy::none()),
            )?,
        })
    }

    fn fetch_latest(&self, kind: &str) -> Result<Vec<SeriesPoint>, ProviderError> {
        let body = self.http.get_text(&format!("{}/latest", self.base_url), &[])?;
        let (ts, value) = parse_snapshot(&body, kind)?;
        let ts = ts.unwrap_or_else(|| chrono::Local::now().naive_local());
        Ok(vec![SeriesPoint::new(ts, value)])
    }

    fn fetch_historical(
        &self,
        kind: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let url = format!("{}/historical", self.base_url);
        let mut out = Vec::new();
        let mut day = start;

        while day <= end {
            let query = [("day", day.format("%Y-%m-%d").to_string())];
            match self
                .http
                .get_text(&url, &query)
                .and_then(|body| parse_snapshot(&body, kind))
            {
                Ok((_, value)) => out.push(SeriesPoint::on_date(day, value)),
                Err(e) if e.status() == Some(404) => {}
                Err(e) if matches!(e.kind, ProviderErrorKind::CircuitOpen { .. }) => return Err(e),
                Err(e) => tracing::warn!(provider = NAME, %day, error = %e, "skipping day"),
            }
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(out)
    }
}

impl SeriesProvider for BluelyticsProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch_timeseries(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let kind = rate_kind(series_code)
            .ok_or_else(|| ProviderError::unknown_series(NAME, series_code))?;

        let points = if start.is_none() && end.is_none() {
            self.fetch_latest(kind)?
        } else {
            let today = chrono::Local::now().date_naive();
            let end_day = end.unwrap_or(today);
            let start_day = start.unwrap_or_else(|| {
                end_day
                    .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
                    .unwrap_or(end_day)
            });
            self.fetch_historical(kind, start_day, end_day)?
        };

        Ok(finalize_points(points, start, end))
    }

    fn supports(&self, series_code: &str) -> bool {
        rate_kind(series_code).is_some()
    }

    fn unavailable_reason(&self) -> Option<ProviderError> {
        self.http.unavailable_reason()
    }
}
