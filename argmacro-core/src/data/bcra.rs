//! BCRA (central bank) statistics provider.
//!
//! The v4 "Monetarias" endpoint ignores date filters and returns the whole
//! series as `{"results": [{"detalle": [{"fecha": ..., "valor": ...}]}]}`, so
//! the range is applied client-side.

use super::http::{HttpFetcher, HttpOptions, RetryPolicy};
use super::provider::{
    finalize_points, parse_upstream_timestamp, ProviderError, SeriesProvider,
};
use crate::domain::series;
use crate::domain::SeriesPoint;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

pub const NAME: &str = "BCRA";
pub const DEFAULT_BASE_URL: &str = "https://api.bcra.gob.ar/estadisticas/v4.0/Monetarias";

/// BCRA variable id for an internal series code.
pub fn variable_id(series_code: &str) -> Option<&'static str> {
    match series_code {
        series::USDARS_OFFICIAL => Some("5"),
        series::RESERVES_USD => Some("1"),
        series::USDARS_RETAIL => Some("4"),
        series::BADLAR_RATE => Some("7"),
        series::TM20_RATE => Some("8"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct BcraResponse {
    #[serde(default)]
    results: Vec<BcraResult>,
}

#[derive(Debug, Deserialize)]
struct BcraResult {
    #[serde(default)]
    detalle: Vec<BcraRow>,
}

#[derive(Debug, Deserialize)]
struct BcraRow {
    fecha: Option<String>,
    valor: Option<f64>,
}

/// Parse a BCRA response body. Rows without a date or value are skipped;
/// an empty `results` or `detalle` array is an error.
pub fn parse_response(series_code: &str, body: &str) -> Result<Vec<SeriesPoint>, ProviderError> {
    let resp: BcraResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::parse(NAME, format!("invalid JSON for {series_code}: {e}")))?;

    let result = resp
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::no_data(NAME, format!("no results for {series_code}")))?;

    if result.detalle.is_empty() {
        return Err(ProviderError::no_data(
            NAME,
            format!("empty detalle for {series_code}"),
        ));
    }

    let mut points = Vec::with_capacity(result.detalle.len());
    for row in result.detalle {
        let (Some(fecha), Some(valor)) = (row.fecha, row.valor) else {
            continue;
        };
        let ts = parse_upstream_timestamp(&fecha)
            .ok_or_else(|| ProviderError::parse(NAME, format!("invalid fecha '{fecha}'")))?;
        points.push(SeriesPoint::new(ts, valor));
    }
    Ok(points)
}

pub struct BcraProvider {
    base_url: String,
    http: HttpFetcher,
}

impl BcraProvider {
    pub fn new(base_url: impl Into<String>, accept_invalid_certs: bool) -> Result<Self, ProviderError> {
        let mut options = HttpOptions::new(
            Duration::from_secs(60),
            RetryPolicy::backoff(3, Duration::from_secs(1)),
        );
        options.accept_invalid_certs = accept_invalid_certs;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: HttpFetcher::new(NAME, options)?,
        })
    }

    fn url(&self, variable_id: &str) -> String {
        format!("{}/{variable_id}", self.base_url)
    }
}

impl SeriesProvider for BcraProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch_timeseries(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, ProviderError> {
        let id = variable_id(series_code)
            .ok_or_else(|| ProviderError::unknown_series(NAME, series_code))?;
        let body = self.http.get_text(&self.url(id), &[])?;
        let points = parse_response(series_code, &body)?;
        Ok(finalize_points(points, start, end))
    }

    fn supports(&self, series_code: &str) -> bool {
        variable_id(series_code).is_some()
    }

    fn unavailable_reason(&self) -> Option<ProviderError> {
        self.http.unavailable_reason()
    }
}
