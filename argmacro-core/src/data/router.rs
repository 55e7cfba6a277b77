//! Provider router: ordered fallback across registered providers.
//!
//! For each name in the priority list:
//! 1. Unregistered names are skipped.
//! 2. A provider reporting itself unavailable (breaker open) counts as a failure.
//! 3. A non-empty result is returned immediately; later providers are not called.
//! 4. An empty result moves on to the next provider.
//! 5. An error, or a panic inside the provider, is recorded and the next
//!    provider is tried.
//!
//! Only when every candidate is exhausted does the caller see a [`FetchError`].

use super::bcra::BcraProvider;
use super::bluelytics::BluelyticsProvider;
use super::config::ProviderConfig;
use super::fred::FredProvider;
use super::indec::IndecProvider;
use super::local_csv::LocalCsvProvider;
use super::provider::{ProviderError, ProviderErrorKind, SeriesProvider};
use super::yahoo::YahooFxProvider;
use crate::domain::SeriesPoint;
use chrono::NaiveDate;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Aggregate failure after all candidates were tried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error(
        "All providers failed for series_code={series_code}. Tried: {}. Last error: {last_error}",
        .candidates.join(", ")
    )]
    AllFailed {
        series_code: String,
        candidates: Vec<String>,
        attempted: Vec<String>,
        last_error: ProviderError,
    },

    #[error(
        "No providers available for series_code={series_code}. Tried: {}",
        .candidates.join(", ")
    )]
    NoProviders {
        series_code: String,
        candidates: Vec<String>,
        attempted: Vec<String>,
    },
}

impl FetchError {
    pub fn series_code(&self) -> &str {
        match self {
            FetchError::AllFailed { series_code, .. } | FetchError::NoProviders { series_code, .. } => {
                series_code
            }
        }
    }

    /// The full candidate list, in priority order.
    pub fn candidates(&self) -> &[String] {
        match self {
            FetchError::AllFailed { candidates, .. } | FetchError::NoProviders { candidates, .. } => {
                candidates
            }
        }
    }

    /// Registered providers that were actually invoked.
    pub fn attempted(&self) -> &[String] {
        match self {
            FetchError::AllFailed { attempted, .. } | FetchError::NoProviders { attempted, .. } => {
                attempted
            }
        }
    }

    pub fn last_error(&self) -> Option<&ProviderError> {
        match self {
            FetchError::AllFailed { last_error, .. } => Some(last_error),
            FetchError::NoProviders { .. } => None,
        }
    }
}

/// Successful fetch plus which provider served it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedSeries {
    pub provider: String,
    pub points: Vec<SeriesPoint>,
}

pub struct ProviderRouter {
    providers: HashMap<String, Box<dyn SeriesProvider>>,
    priority: Vec<String>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl ProviderRouter {
    /// Empty router with the given priority order.
    pub fn new<I, S>(priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            providers: HashMap::new(),
            priority: priority.into_iter().map(Into::into).collect(),
        }
    }

    /// Register `provider` under its own name, replacing any previous one.
    pub fn register(&mut self, provider: Box<dyn SeriesProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn with_provider(mut self, provider: impl SeriesProvider + 'static) -> Self {
        self.register(Box::new(provider));
        self
    }

    /// Build every concrete provider from `config`.
    ///
    /// BCRA, INDEC, BLUELYTICS, YAHOOFX and FRED are always registered.
    /// LOCALCSV is registered when a series directory is configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut router = Self::new(config.priority.clone());
        router.register(Box::new(BcraProvider::new(
            config.bcra_base_url.clone(),
            config.bcra_accept_invalid_certs,
        )?));
        router.register(Box::new(IndecProvider::new(config.indec_base_url.clone())?));
        router.register(Box::new(BluelyticsProvider::new(
            config.bluelytics_base_url.clone(),
        )?));
        router.register(Box::new(YahooFxProvider::new(config.yahoo_base_url.clone())?));
        router.register(Box::new(FredProvider::new(
            config.fred_base_url.clone(),
            config.fred_api_key.clone(),
            config.fred_series.clone(),
        )?));
        if let Some(dir) = &config.local_series_dir {
            router.register(Box::new(LocalCsvProvider::new(dir.clone())));
        }
        Ok(router)
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn provider(&self, name: &str) -> Option<&dyn SeriesProvider> {
        self.providers.get(name).map(|p| p.as_ref())
    }

    /// Registered provider names, sorted.
    pub fn registered(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether a registered provider in the priority list supports
    /// `series_code`.
    pub fn serves(&self, series_code: &str) -> bool {
        self.priority
            .iter()
            .filter_map(|name| self.providers.get(name))
            .any(|p| p.supports(series_code))
    }

    /// Fetch `series_code` from the first provider that returns data.
    pub fn fetch_series(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SeriesPoint>, FetchError> {
        self.fetch_routed(series_code, start, end).map(|r| r.points)
    }

    /// Like [`fetch_series`](Self::fetch_series) but also reports which
    /// provider answered.
    pub fn fetch_routed(
        &self,
        series_code: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<RoutedSeries, FetchError> {
        let mut attempted = Vec::new();
        let mut last_error: Option<ProviderError> = None;

        for name in &self.priority {
            let Some(provider) = self.providers.get(name) else {
                tracing::debug!(series = series_code, provider = %name, "provider not registered, skipping");
                continue;
            };
            attempted.push(name.clone());

            if let Some(reason) = provider.unavailable_reason() {
                tracing::warn!(series = series_code, provider = %name, reason = %reason, "provider unavailable");
                last_error = Some(reason);
                continue;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                provider.fetch_timeseries(series_code, start, end)
            }))
            .unwrap_or_else(|payload| {
                Err(ProviderError::new(
                    name.as_str(),
                    ProviderErrorKind::Panicked(panic_message(payload.as_ref())),
                ))
            });

            match outcome {
                Ok(points) if !points.is_empty() => {
                    tracing::info!(series = series_code, provider = %name, points = points.len(), "fetched series");
                    return Ok(RoutedSeries {
                        provider: name.clone(),
                        points,
                    });
                }
                Ok(_) => {
                    tracing::debug!(series = series_code, provider = %name, "provider returned no data");
                }
                Err(e) => {
                    tracing::warn!(series = series_code, provider = %name, error = %e, "provider failed");
                    last_error = Some(e);
                }
            }
        }

        let candidates = self.priority.clone();
        Err(match last_error {
            Some(last_error) => FetchError::AllFailed {
                series_code: series_code.to_string(),
                candidates,
                attempted,
                last_error,
            },
            None => FetchError::NoProviders {
                series_code: series_code.to_string(),
                candidates,
                attempted,
            },
        })
    }
}
