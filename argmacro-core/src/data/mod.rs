//! Series acquisition: provider trait, concrete providers, fallback router.

pub mod bcra;
pub mod bluelytics;
pub mod circuit_breaker;
pub mod config;
pub mod fred;
pub mod http;
pub mod indec;
pub mod local_csv;
pub mod provider;
pub mod router;
pub mod yahoo;

pub use bcra::BcraProvider;
pub use bluelytics::BluelyticsProvider;
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use config::{parse_priority, ProviderConfig, DEFAULT_PRIORITY};
pub use fred::{FredProvider, FredSeriesIds};
pub use http::{HttpFetcher, HttpOptions, RetryPolicy};
pub use indec::IndecProvider;
pub use local_csv::LocalCsvProvider;
pub use provider::{
    finalize_points, in_range, ProviderError, ProviderErrorKind, SeriesProvider,
};
pub use router::{FetchError, ProviderRouter, RoutedSeries};
pub use yahoo::YahooFxProvider;
