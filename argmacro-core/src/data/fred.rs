//! FRED provider for national CPI series (index, year over year, month over
//! month). Requires an API key.

use super::http::{HttpFetcher, HttpOptions, RetryPolicy};
use super::provider::{
    finalize_points, parse_upstream_timestamp, ProviderError, ProviderErrorKind, SeriesProvider,
};
use crate::domain::series;
use crate::domain::SeriesPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const NAME: &str = "FRED";
pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Lower bound used when the caller gives no start date.
pub const DEFAULT_OBSERVATION_START: &str = "2016-01-01";

/// FRED series ids behind the national CPI codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FredSeriesIds {
    pub index: String,
    pub yoy: String,
    /// When `None`, month-over-month is derived from the index series.
    pub mom: Option<String>,
}

impl Default for FredSeriesIds {
    fn default() -> Self {
        Self {
            index: "ARGCPALTT01IXNBM".into(),
            yoy: "ARGCPALTT01GYM".into(),
            mom: Some("ARGCPALTT01GPM".into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: Option<String>,
    value: Option<String>,
}

/// Parse an observations body. FRED marks missing values with `"."`.
pub fn parse_observations(body: &str) -> Result<Vec<SeriesPoint>, ProviderError> {
    let resp: ObservationsResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(NAME, format!("invalid JSON: {e}")))?;

    let mut points = Vec::with_capacity(resp.observations.len());
    for obs in resp.observations {
        let (Some(date), Some(value)) = (obs.date, obs.value) else {
            continue;
        };
        if value == "." {
            continue;
        }
        let ts = parse_upstream_timestamp(&date)
            .ok_or_else(|| ProviderError::parse(NAME, format!("invalid date '{date}'")))?;
        let value: f64 = value
            .parse()
            .map_err(|_| ProviderError::parse(NAME, format!("invalid value '{value}'")))?;
        points.push(SeriesPoint::new(ts, value));
    }
    Ok(points)
}

/// Percent change over `lag` observations, in percent. Points whose base is
/// zero are skipped. Input must be sorted ascending.
pub fn pct_change(points: &[SeriesPoint], lag: usize) -> Vec<SeriesPoint> {
    points
        .iter()
        .enumerate()
        .skip(lag)
        .filter_map(|(i, p)| {
            let base = points[i - lag].value;
            (base != 0.0).then(|| SeriesPoint::new(p.ts, (p.value / base - 1.0) * 100.0))
        })
        .collect()
}

pub struct FredProvider {
    base_url: String,
    api_key: Option<String>,
    ids: FredSeriesIds,
    http: HttpFetcher,
}

impl FredProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        ids: FredSeriesIds,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            ids,
            http: HttpFetcher::new(
                NAME,
                HttpOptions::new(Duration::from_secs(45), RetryPolicy::none()),
            )?,
        })
    }

    fn fetch_observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::new(
                NAME,
                ProviderErrorKind::MissingCredentials("set FRED_API_KEY".into()),
            )
        })?;

        let mut query = vec![
            ("series_id", series_id.to_string()),
            ("api_key", api_key.to_string()),
            ("file_type", "json".to_string()),
            (
                "observation_start",
                start.map_or_else(
                    || DEFAULT_OBSERVATION_START.to_string(),
                    |s| s.format("%Y-%m-%d").to_string(),
                ),
            ),
        ];
        if let Some(e) = end {
            query.push(("observation_end", e.format("%Y-%m-%d").to_string()));
        }

        let body = self.http.get_text(&self.base_url, &query)?;
        parse_observations(&body)
    }
}

impl SeriesProvider for FredProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch_timeseries(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let points = match series_code {
            series::CPI_NATIONAL_INDEX => self.fetch_observations(&self.ids.index, start, end)?,
            series::CPI_NATIONAL_YOY => self.fetch_observations(&self.ids.yoy, start, end)?,
            series::CPI_NATIONAL_MOM => match &self.ids.mom {
                Some(id) => self.fetch_observations(id, start, end)?,
                None => {
                    let index = finalize_points(
                        self.fetch_observations(&self.ids.index, start, end)?,
                        None,
                        None,
                    );
                    pct_change(&index, 1)
                }
            },
            _ => return Err(ProviderError::unknown_series(NAME, series_code)),
        };
        Ok(finalize_points(points, start, end))
    }

    fn supports(&self, series_code: &str) -> bool {
        matches!(
            series_code,
            series::CPI_NATIONAL_INDEX | series::CPI_NATIONAL_YOY | series::CPI_NATIONAL_MOM
        )
    }

    fn unavailable_reason(&self) -> Option<ProviderError> {
        self.http.unavailable_reason()
    }
}
