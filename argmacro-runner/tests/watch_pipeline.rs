//! Integration: config file → refresh from local CSVs into SQLite → assess →
//! watch across a process restart.

use argmacro_core::data::ProviderRouter;
use argmacro_core::domain::RiskState;
use argmacro_core::store::{SqliteStore, StateStore};
use argmacro_runner::{
    assess, check_once, refresh_series, MemoryAlerts, NoProgress, RunnerConfig, WatchOutcome,
};
use std::fs;
use std::path::Path;

fn write_csv(dir: &Path, code: &str, rows: &[(&str, f64)]) {
    let mut body = String::from("date,value\n");
    for (date, value) in rows {
        body.push_str(&format!("{date},{value}\n"));
    }
    fs::write(dir.join(format!("{code}.csv")), body).unwrap();
}

fn write_fixtures(dir: &Path, parallel: f64) {
    write_csv(dir, "USDARS_OFFICIAL", &[("2024-06-01", 1000.0)]);
    write_csv(dir, "USDARS_PARALLEL", &[("2024-06-01", parallel)]);
    write_csv(
        dir,
        "RESERVES_USD",
        &[("2024-05-01", 20_000.0), ("2024-06-01", 21_000.0)],
    );
    write_csv(dir, "CPI_CORE", &[("2024-04-01", 100.0), ("2024-05-01", 101.0)]);
    write_csv(dir, "EMBI_AR", &[("2024-05-01", 1300.0), ("2024-06-01", 1200.0)]);
}

fn load_config(root: &Path) -> RunnerConfig {
    let series_dir = root.join("series");
    let config_path = root.join("argmacro.toml");
    fs::write(
        &config_path,
        format!(
            r#"
database_path = "{}"

[providers]
priority = ["LOCALCSV"]
local_series_dir = "{}"

[watch]
interval_secs = 1
"#,
            root.join("macro.db").display(),
            series_dir.display()
        ),
    )
    .unwrap();
    RunnerConfig::from_file(&config_path).unwrap()
}

fn refresh(config: &RunnerConfig, store: &SqliteStore) {
    let router = ProviderRouter::from_config(&config.providers).unwrap();
    let summary = refresh_series(&router, store, &config.jobs_for(&[]), &NoProgress);
    assert!(summary.is_complete_success(), "{:?}", summary.errors);
    assert_eq!(summary.total, 5);
}

#[test]
fn refresh_assess_and_watch_across_restart() {
    let root = tempfile::tempdir().unwrap();
    let series_dir = root.path().join("series");
    fs::create_dir_all(&series_dir).unwrap();
    write_fixtures(&series_dir, 1100.0);

    let config = load_config(root.path());
    let engine = config.engine();
    let alerts = MemoryAlerts::new();

    {
        let store = SqliteStore::open(&config.database_path).unwrap();
        refresh(&config, &store);

        let a = assess(&store, &engine).unwrap();
        assert_eq!(a.evaluation.as_ref().unwrap().overall_state, RiskState::Green);

        let out = check_once(&store, &engine, &alerts).unwrap();
        assert_eq!(out, WatchOutcome::InitialSaved(RiskState::Green));
    }

    // New process: the parallel rate jumps, the stored state survives.
    write_fixtures(&series_dir, 1500.0);
    let store = SqliteStore::open(&config.database_path).unwrap();
    assert_eq!(store.last_overall_state().unwrap(), Some(RiskState::Green));
    refresh(&config, &store);

    let out = check_once(&store, &engine, &alerts).unwrap();
    assert_eq!(
        out,
        WatchOutcome::Changed {
            from: RiskState::Green,
            to: RiskState::Yellow
        }
    );
    assert_eq!(alerts.messages().len(), 1);
    assert!(alerts.messages()[0].contains("GREEN → YELLOW"));
}

#[test]
fn unconfigured_csv_dir_fails_every_job() {
    let root = tempfile::tempdir().unwrap();
    let config = RunnerConfig::from_toml("[providers]\npriority = [\"LOCALCSV\"]\n").unwrap();
    let store = SqliteStore::open(root.path().join("macro.db")).unwrap();
    let router = ProviderRouter::from_config(&config.providers).unwrap();

    let summary = refresh_series(&router, &store, &config.refresh, &NoProgress);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed(), 5);
    assert!(summary.errors[0].1.contains("No providers available"));
}
