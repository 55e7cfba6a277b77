//! argmacro runner: orchestration on top of `argmacro-core`.
//!
//! This crate provides:
//! - Runner configuration file (database, providers, gates, allocation, watch, refresh jobs)
//! - Refresh pipeline (router → store) with progress reporting
//! - Assessment (store → features → gate evaluation)
//! - State watcher with alert sinks
//! - Logging initialisation

pub mod alerts;
pub mod assessment;
pub mod config;
pub mod logging;
pub mod refresh;
pub mod watcher;

pub use alerts::{AlertSink, ConsoleAlerts, MemoryAlerts};
pub use assessment::{assess, Assessment};
pub use config::{ConfigError, RefreshJob, RunnerConfig, WatchConfig};
pub use logging::init_logging;
pub use refresh::{
    partition_servable, refresh_series, unservable_hint, NoProgress, RefreshError, RefreshOutcome, RefreshProgress, RefreshSummary,
    StdoutProgress,
};
pub use watcher::{
    check_and_alert, check_once, watch, WatchError, WatchOptions, WatchOutcome, WatchSummary,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunnerConfig>();
        assert_sync::<RunnerConfig>();
        assert_send::<RefreshJob>();
        assert_sync::<RefreshJob>();
    }

    #[test]
    fn assessment_is_send_sync() {
        assert_send::<Assessment>();
        assert_sync::<Assessment>();
    }

    #[test]
    fn watch_types_are_send_sync() {
        assert_send::<WatchOutcome>();
        assert_sync::<WatchOutcome>();
        assert_send::<WatchOptions>();
        assert_sync::<WatchOptions>();
        assert_send::<WatchSummary>();
        assert_sync::<WatchSummary>();
    }

    #[test]
    fn sinks_are_send_sync() {
        assert_send::<ConsoleAlerts>();
        assert_sync::<ConsoleAlerts>();
        assert_send::<MemoryAlerts>();
        assert_sync::<MemoryAlerts>();
    }

    #[test]
    fn refresh_summary_is_send_sync() {
        assert_send::<RefreshSummary>();
        assert_sync::<RefreshSummary>();
    }
}
