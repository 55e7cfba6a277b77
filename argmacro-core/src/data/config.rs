//! Provider configuration: priority order, upstream endpoints, credentials.
//!
//! Loaded from TOML (a `[providers]` table in the runner config) and/or the
//! process environment. Environment values override file values.

use super::fred::FredSeriesIds;
use super::{bcra, bluelytics, fred, indec, yahoo};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default provider priority. Names without a registered provider (IMF, TE)
/// are skipped by the router.
pub const DEFAULT_PRIORITY: &str = "BCRA,INDEC,BLUELYTICS,YAHOOFX,IMF,TE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider names in the order the router tries them.
    pub priority: Vec<String>,
    pub bcra_base_url: String,
    /// The BCRA endpoint has served broken certificate chains; off unless
    /// explicitly enabled.
    pub bcra_accept_invalid_certs: bool,
    pub indec_base_url: String,
    pub bluelytics_base_url: String,
    pub yahoo_base_url: String,
    pub fred_base_url: String,
    pub fred_api_key: Option<String>,
    pub fred_series: FredSeriesIds,
    /// Directory holding `{SERIES}.csv` files for the LOCALCSV provider.
    pub local_series_dir: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            priority: parse_priority(DEFAULT_PRIORITY),
            bcra_base_url: bcra::DEFAULT_BASE_URL.into(),
            bcra_accept_invalid_certs: false,
            indec_base_url: indec::DEFAULT_BASE_URL.into(),
            bluelytics_base_url: bluelytics::DEFAULT_BASE_URL.into(),
            yahoo_base_url: yahoo::DEFAULT_BASE_URL.into(),
            fred_base_url: fred::DEFAULT_BASE_URL.into(),
            fred_api_key: None,
            fred_series: FredSeriesIds::default(),
            local_series_dir: None,
        }
    }
}

/// Split a comma-separated provider list; names are trimmed and upper-cased,
/// empty entries dropped.
pub fn parse_priority(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"))
        .unwrap_or(default)
}

impl ProviderConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`.
    ///
    /// Recognised: `PREFERRED_PROVIDERS`, `BCRA_API_BASE`,
    /// `BCRA_ACCEPT_INVALID_CERTS`, `INDEC_API_BASE`, `BLUELYTICS_API_BASE`,
    /// `FRED_API_KEY`, `CPI_NATIONAL_INDEX`, `CPI_NATIONAL_YOY`,
    /// `CPI_NATIONAL_MOM` (empty string: derive from the index),
    /// `LOCAL_SERIES_DIR`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_opt("PREFERRED_PROVIDERS") {
            self.priority = parse_priority(&v);
        }
        if let Some(v) = env_opt("BCRA_API_BASE") {
            self.bcra_base_url = v;
        }
        self.bcra_accept_invalid_certs =
            env_bool("BCRA_ACCEPT_INVALID_CERTS", self.bcra_accept_invalid_certs);
        if let Some(v) = env_opt("INDEC_API_BASE") {
            self.indec_base_url = v;
        }
        if let Some(v) = env_opt("BLUELYTICS_API_BASE") {
            self.bluelytics_base_url = v;
        }
        if let Some(v) = env_opt("FRED_API_KEY") {
            self.fred_api_key = Some(v);
        }
        if let Some(v) = env_opt("CPI_NATIONAL_INDEX") {
            self.fred_series.index = v;
        }
        if let Some(v) = env_opt("CPI_NATIONAL_YOY") {
            self.fred_series.yoy = v;
        }
        if let Ok(v) = env::var("CPI_NATIONAL_MOM") {
            let v = v.trim();
            self.fred_series.mom = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = env_opt("LOCAL_SERIES_DIR") {
            self.local_series_dir = Some(PathBuf::from(v));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priority_order() {
        assert_eq!(
            ProviderConfig::default().priority,
            vec!["BCRA", "INDEC", "BLUELYTICS", "YAHOOFX", "IMF", "TE"]
        );
    }

    #[test]
    fn priority_parsing_is_lenient() {
        assert_eq!(parse_priority(" fred, ,LocalCsv ,"), vec!["FRED", "LOCALCSV"]);
        assert!(parse_priority("").is_empty());
    }

    #[test]
    fn toml_partial_table_keeps_defaults() {
        let cfg: ProviderConfig = toml::from_str(
            r#"
            priority = ["LOCALCSV", "BCRA"]
            local_series_dir = "data/series"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.priority, vec!["LOCALCSV", "BCRA"]);
        assert_eq!(cfg.bcra_base_url, bcra::DEFAULT_BASE_URL);
        assert_eq!(cfg.local_series_dir, Some(PathBuf::from("data/series")));
        assert!(!cfg.bcra_accept_invalid_certs);
    }
}
