//! Series provider trait and structured error types.
//!
//! The SeriesProvider trait abstracts over upstream sources (BCRA, INDEC,
//! Bluelytics, Yahoo, FRED, local CSV) so the router can try them in order and
//! tests can swap in scripted providers.

use crate::domain::{sort_points, SeriesPoint};
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// What went wrong inside a provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderErrorKind {
    #[error("unknown series '{0}'")]
    UnknownSeries(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    Parse(String),

    #[error("no data returned: {0}")]
    NoData(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("circuit breaker open, requests blocked for {remaining_secs}s")]
    CircuitOpen { remaining_secs: u64 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("provider panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single provider call. Always absorbed by the router.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{provider}: {kind}")]
pub struct ProviderError {
    pub provider: String,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind) -> Self {
        Self {
            provider: provider.into(),
            kind,
        }
    }

    pub fn unknown_series(provider: impl Into<String>, series_code: &str) -> Self {
        Self::new(provider, ProviderErrorKind::UnknownSeries(series_code.to_string()))
    }

    pub fn parse(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Parse(message.into()))
    }

    pub fn no_data(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::NoData(message.into()))
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ProviderErrorKind::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Trait for series providers.
///
/// `fetch_timeseries` returns points sorted ascending by timestamp, filtered to
/// the inclusive `[start, end]` date range when bounds are given. An empty
/// vector is a valid result ("nothing for that range"), distinct from an error.
/// Unknown series codes yield `ProviderErrorKind::UnknownSeries`.
pub trait SeriesProvider: Send + Sync {
    /// Registration name (upper case, e.g. "BCRA").
    fn name(&self) -> &str;

    fn fetch_timeseries(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, ProviderError>;

    /// Whether this provider knows how to serve `series_code`.
    fn supports(&self, series_code: &str) -> bool;

    /// Why the provider is currently blocked, if it is. HTTP providers
    /// report `CircuitOpen` with the remaining cooldown.
    fn unavailable_reason(&self) -> Option<ProviderError> {
        None
    }

    /// False while the provider is blocked (circuit breaker open).
    fn is_available(&self) -> bool {
        self.unavailable_reason().is_none()
    }
}

/// True when `date` lies in the inclusive `[start, end]` range.
pub fn in_range(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
}

/// Drop non-finite values, apply the inclusive date filter and sort ascending.
///
/// Every provider passes its parsed points through here before returning.
pub fn finalize_points(
    points: Vec<SeriesPoint>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<SeriesPoint> {
    let mut out: Vec<SeriesPoint> = points
        .into_iter()
        .filter(|p| p.value.is_finite() && in_range(p.date(), start, end))
        .collect();
    sort_points(&mut out);
    out
}

/// Parse a `YYYY-MM-DD` (optionally followed by a time part) or `YYYY-MM` date.
pub fn parse_upstream_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    if let Ok(d) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(d);
    }
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()
}

/// Parse an upstream timestamp: ISO date-time (with or without fractional
/// seconds or offset) or a bare date, which maps to midnight.
pub fn parse_upstream_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    parse_upstream_date(raw).map(|d| d.and_time(chrono::NaiveTime::MIN))
}
