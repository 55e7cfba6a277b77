//! Runner configuration file.
//!
//! One TOML file drives `refresh`, `assess` and `watch`:
//!
//! ```toml
//! database_path = "data/argmacro.db"
//!
//! [providers]
//! priority = ["BCRA", "INDEC", "BLUELYTICS", "YAHOOFX", "LOCALCSV"]
//! local_series_dir = "data/series"
//!
//! [gates.dimensions]
//! fx_gap_green_below = 0.15
//!
//! [allocation]
//! exp_return = 0.12
//!
//! [watch]
//! interval_secs = 600
//!
//! [[refresh]]
//! series = "USDARS_OFFICIAL"
//! start = "2024-01-01"
//! ```
//!
//! Every section is optional. Environment overrides for providers are applied
//! by the caller after loading (see `ProviderConfig::with_env_overrides`).

use argmacro_core::allocation::AllocationParams;
use argmacro_core::data::ProviderConfig;
use argmacro_core::domain::series;
use argmacro_core::gates::{GateConfig, GateEngine};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "argmacro.db";
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One series to pull during `refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshJob {
    pub series: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl RefreshJob {
    pub fn new(series: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            start: None,
            end: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_WATCH_INTERVAL_SECS,
        }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub database_path: PathBuf,
    pub providers: ProviderConfig,
    pub gates: GateConfig,
    pub allocation: AllocationParams,
    pub watch: WatchConfig,
    pub refresh: Vec<RefreshJob>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            providers: ProviderConfig::default(),
            gates: GateConfig::default(),
            allocation: AllocationParams::default(),
            watch: WatchConfig::default(),
            refresh: default_refresh_jobs(),
        }
    }
}

/// The series the gates need, with no date bounds.
pub fn default_refresh_jobs() -> Vec<RefreshJob> {
    [
        series::USDARS_OFFICIAL,
        series::USDARS_PARALLEL,
        series::RESERVES_USD,
        series::CPI_CORE,
        series::EMBI_AR,
    ]
    .into_iter()
    .map(RefreshJob::new)
    .collect()
}

impl RunnerConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path is empty".into()));
        }
        if self.providers.priority.is_empty() {
            return Err(ConfigError::Invalid("providers.priority is empty".into()));
        }
        self.gates
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let a = &self.allocation;
        if ![a.exp_return, a.vol, a.rf, a.k].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid("allocation values must be finite".into()));
        }
        if a.vol < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "allocation.vol must be >= 0, got {}",
                a.vol
            )));
        }
        if self.watch.interval_secs == 0 {
            return Err(ConfigError::Invalid("watch.interval_secs must be > 0".into()));
        }
        for job in &self.refresh {
            if job.series.trim().is_empty() {
                return Err(ConfigError::Invalid("refresh job with empty series".into()));
            }
            if let (Some(s), Some(e)) = (job.start, job.end) {
                if s > e {
                    return Err(ConfigError::Invalid(format!(
                        "refresh {}: start {s} is after end {e}",
                        job.series
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn engine(&self) -> GateEngine {
        GateEngine::new(self.gates, self.allocation)
    }

    /// Jobs restricted to `only` (all jobs when empty). Codes not in the
    /// file get an unbounded job.
    pub fn jobs_for(&self, only: &[String]) -> Vec<RefreshJob> {
        if only.is_empty() {
            return self.refresh.clone();
        }
        only.iter()
            .map(|code| {
                self.refresh
                    .iter()
                    .find(|j| j.series == *code)
                    .cloned()
                    .unwrap_or_else(|| RefreshJob::new(code.as_str()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let c = RunnerConfig::from_toml("").unwrap();
        assert_eq!(c, RunnerConfig::default());
        assert_eq!(c.watch.interval(), Duration::from_secs(600));
        assert_eq!(c.refresh.len(), 5);
    }

    #[test]
    fn full_file_parses() {
        let c = RunnerConfig::from_toml(
            r#"
database_path = "/tmp/macro.db"

[providers]
priority = ["LOCALCSV", "BCRA"]
local_series_dir = "/data/series"

[gates.dimensions]
fx_gap_green_below = 0.10

[allocation]
exp_return = 0.20
vol = 0.25

[watch]
interval_secs = 60

[[refresh]]
series = "USDARS_OFFICIAL"
start = "2024-01-01"
end = "2024-06-30"

[[refresh]]
series = "EMBI_AR"
"#,
        )
        .unwrap();
        assert_eq!(c.database_path, PathBuf::from("/tmp/macro.db"));
        assert_eq!(c.providers.priority, vec!["LOCALCSV", "BCRA"]);
        assert_eq!(c.gates.dimensions.fx_gap_green_below, 0.10);
        assert_eq!(c.gates.dimensions.fx_gap_yellow_below, 0.25);
        assert_eq!(c.allocation.exp_return, 0.20);
        assert_eq!(c.allocation.rf, 0.045);
        assert_eq!(c.watch.interval_secs, 60);
        assert_eq!(c.refresh.len(), 2);
        assert_eq!(c.refresh[0].start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(c.refresh[1].end, None);
        assert_eq!(c.engine().params.vol, 0.25);
    }

    #[test]
    fn rejects_inverted_range() {
        let err = RunnerConfig::from_toml(
            r#"
[[refresh]]
series = "CPI_CORE"
start = "2024-06-01"
end = "2024-01-01"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("after end"), "{err}");
    }

    #[test]
    fn rejects_zero_interval_and_bad_thresholds() {
        assert!(RunnerConfig::from_toml("[watch]\ninterval_secs = 0\n").is_err());
        assert!(RunnerConfig::from_toml(
            "[gates.dimensions]\nfx_gap_green_below = 0.30\n"
        )
        .is_err());
    }

    #[test]
    fn rejects_unknown_shape() {
        let err = RunnerConfig::from_toml("watch = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn jobs_for_filters_and_fills_in() {
        let c = RunnerConfig::default();
        assert_eq!(c.jobs_for(&[]).len(), 5);
        let jobs = c.jobs_for(&["EMBI_AR".into(), "BADLAR_RATE".into()]);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1], RefreshJob::new("BADLAR_RATE"));
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = RunnerConfig::from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));

        let path = dir.path().join("argmacro.toml");
        std::fs::write(&path, RunnerConfig::default().to_toml().unwrap()).unwrap();
        assert_eq!(RunnerConfig::from_file(&path).unwrap(), RunnerConfig::default());
    }
}
