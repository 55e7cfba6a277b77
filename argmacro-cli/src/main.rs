//! argmacro CLI: fetch, refresh, assess, gate and watch commands.
//!
//! Commands:
//! - `fetch`: route one series through the provider priority list and print it
//! - `refresh`: pull configured series into the database
//! - `assess`: compute features from the database and evaluate the gates
//! - `gate`: evaluate the gates on explicit inputs
//! - `watch`: re-assess on an interval and alert on state changes
//! - `series`: list known series
//! - `providers`: show provider priority and registration

use anyhow::{bail, Context, Result};
use argmacro_core::data::ProviderRouter;
use argmacro_core::domain::series;
use argmacro_core::gates::{evaluate_states, note::percent, Evaluation};
use argmacro_core::store::SqliteStore;
use argmacro_runner::{
    assess, init_logging, partition_servable, refresh_series, unservable_hint, watch, Assessment,
    ConsoleAlerts, RunnerConfig, StdoutProgress, WatchOptions,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "argmacro",
    about = "argmacro: Argentina macro data, features and risk gates"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one series through the provider fallback chain.
    Fetch {
        /// Series code (e.g., USDARS_OFFICIAL, RESERVES_USD).
        series: String,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<String>,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Runner config file (for provider settings).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Fetch configured series and upsert them into the database.
    Refresh {
        /// Runner config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Restrict to these series codes.
        #[arg(long, num_args = 1..)]
        series: Vec<String>,
    },
    /// Compute features from the database and evaluate the gates.
    Assess {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Evaluate the gates on explicit inputs.
    Gate {
        #[arg(long, allow_negative_numbers = true)]
        fx_gap: f64,

        /// Reserves 4-week momentum.
        #[arg(long, allow_negative_numbers = true)]
        reserves: f64,

        /// Core CPI 3-month annualized rate.
        #[arg(long, allow_negative_numbers = true)]
        core_cpi: f64,

        /// EMBI spread level (bps).
        #[arg(long, allow_negative_numbers = true)]
        embi_level: f64,

        /// EMBI 30-day change (bps).
        #[arg(long, allow_negative_numbers = true)]
        embi_trend: f64,

        #[arg(long, allow_negative_numbers = true)]
        exp_return: Option<f64>,

        #[arg(long)]
        vol: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        rf: Option<f64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Re-assess periodically and alert when the overall state changes.
    Watch {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seconds between checks. Overrides the config file.
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Run a single check and exit.
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// List known series.
    Series,
    /// Show provider priority and which providers are registered.
    Providers {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            series,
            start,
            end,
            json,
            config,
        } => run_fetch(&series, start.as_deref(), end.as_deref(), json, config.as_deref()),
        Commands::Refresh { config, series } => run_refresh(config.as_deref(), &series),
        Commands::Assess { config, json } => run_assess(config.as_deref(), json),
        Commands::Gate {
            fx_gap,
            reserves,
            core_cpi,
            embi_level,
            embi_trend,
            exp_return,
            vol,
            rf,
            json,
        } => {
            let ev = evaluate_states(
                fx_gap, reserves, core_cpi, embi_level, embi_trend, exp_return, vol, rf,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&ev)?);
            } else {
                print_evaluation(&ev);
            }
            Ok(())
        }
        Commands::Watch {
            config,
            interval_secs,
            once,
        } => run_watch(config.as_deref(), interval_secs, once),
        Commands::Series => {
            run_series();
            Ok(())
        }
        Commands::Providers { config } => run_providers(config.as_deref()),
    }
}

/// File config (or defaults) with provider environment overrides applied.
fn load_config(path: Option<&Path>) -> Result<RunnerConfig> {
    let mut config = match path {
        Some(p) => RunnerConfig::from_file(p)?,
        None => RunnerConfig::default(),
    };
    config.providers = config.providers.with_env_overrides();
    Ok(config)
}

fn open_store(config: &RunnerConfig) -> Result<SqliteStore> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    SqliteStore::open(&config.database_path)
        .with_context(|| format!("open database {}", config.database_path.display()))
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
    })
    .transpose()
}

fn run_fetch(
    code: &str,
    start: Option<&str>,
    end: Option<&str>,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            bail!("--start {s} is after --end {e}");
        }
    }

    let config = load_config(config_path)?;
    let router = ProviderRouter::from_config(&config.providers)?;
    let routed = router.fetch_routed(code, start, end)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&routed.points)?);
        return Ok(());
    }

    println!("{code} via {} ({} points)", routed.provider, routed.points.len());
    for p in &routed.points {
        println!("  {}  {:>14.4}", p.ts.format("%Y-%m-%d %H:%M"), p.value);
    }
    Ok(())
}

fn run_refresh(config_path: Option<&Path>, only: &[String]) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let router = ProviderRouter::from_config(&config.providers)?;
    let mut jobs = config.jobs_for(only);

    // Configured jobs nothing can serve are skipped; explicit --series still fails.
    if only.is_empty() {
        let (servable, skipped) = partition_servable(&router, &jobs);
        for job in &skipped {
            tracing::warn!(series = %job.series, "skipping series with no provider");
            eprintln!("Skipping {}: {}", job.series, unservable_hint(&job.series));
        }
        jobs = servable;
    }

    let summary = refresh_series(&router, &store, &jobs, &StdoutProgress);
    if !summary.is_complete_success() {
        for (code, err) in &summary.errors {
            eprintln!("Error for {code}: {err}");
            if !router.serves(code) {
                eprintln!("  hint: {}", unservable_hint(code));
            }
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run_assess(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let assessment = assess(&store, &config.engine())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }
    print_assessment(&assessment);
    Ok(())
}

fn run_watch(config_path: Option<&Path>, interval_secs: Option<u64>, once: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let interval = interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.watch.interval());
    if interval.is_zero() {
        bail!("--interval-secs must be > 0");
    }

    let options = WatchOptions {
        interval,
        max_iterations: once.then_some(1),
    };
    watch(&store, &config.engine(), &ConsoleAlerts, options);
    Ok(())
}

fn run_series() {
    println!("{:<28} {:<4} {:<12} {:<10} NAME", "CODE", "FREQ", "SOURCE", "UNITS");
    for s in series::all() {
        println!(
            "{:<28} {:<4} {:<12} {:<10} {}",
            s.code,
            s.freq.code(),
            s.source,
            s.units,
            s.name
        );
    }
}

fn run_providers(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let router = ProviderRouter::from_config(&config.providers)?;

    println!("Priority:");
    for (i, name) in router.priority().iter().enumerate() {
        let status = match router.provider(name) {
            Some(p) if p.is_available() => "registered",
            Some(_) => "registered (circuit open)",
            None => "not registered, skipped",
        };
        println!("  {}. {name:<12} {status}", i + 1);
    }
    println!("Registered: {}", router.registered().join(", "));
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_evaluation(ev: &Evaluation) {
    println!("Overall state: {}", ev.overall_state);
    println!("Dimensions:");
    for (dim, state) in ev.dimension_states.iter() {
        println!("  {:<18} {state}", dim.name());
    }
    println!("Sharpe:       {:.4}", ev.sharpe);
    println!("Macro weight: {}", percent(ev.macro_weight, 1));
    println!("Hedge:        {}", percent(ev.hedge_pct, 0));
    println!("Action: {}", ev.action_note);
}

fn print_assessment(a: &Assessment) {
    let f = &a.features;
    println!("Features:");
    match &f.fx_gap {
        Some(g) => println!(
            "  fx_gap            {:.4}  (parallel {:.2} / {} {:.2})",
            g.gap, g.parallel, g.official_series, g.official
        ),
        None => println!("  fx_gap            n/a"),
    }
    match &f.reserves_momentum {
        Some(r) => println!(
            "  reserves_mom_4w   {:.4}  ({:.0} → {:.0})",
            r.value, r.reserves_4w_ago, r.reserves_current
        ),
        None => println!("  reserves_mom_4w   n/a"),
    }
    match &f.core_cpi {
        Some(c) => println!("  core_cpi_3m_ann   {:.4}", c.annualized_3m),
        None => println!("  core_cpi_3m_ann   n/a"),
    }
    match &f.embi {
        Some(e) => match e.trend_30d {
            Some(t) => println!("  embi              {:.0} bps (30d {t:+.0})", e.level),
            None => println!("  embi              {:.0} bps (30d n/a)", e.level),
        },
        None => println!("  embi              n/a"),
    }
    println!();

    match &a.evaluation {
        Some(ev) => print_evaluation(ev),
        None => println!("Insufficient data: missing {}", a.missing().join(", ")),
    }
}
