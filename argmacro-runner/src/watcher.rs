//! State watcher: re-assess on an interval and alert on overall-state changes.
//!
//! The last overall state is kept in the store's state table, so a restart
//! resumes from the previous run instead of re-announcing the current state.

use crate::alerts::AlertSink;
use crate::assessment::assess;
use argmacro_core::domain::RiskState;
use argmacro_core::gates::{note::percent, Evaluation, GateEngine};
use argmacro_core::store::{SeriesReader, StateStore, StoreError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// Result of one check.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    /// No previous state existed; the current one was stored.
    InitialSaved(RiskState),
    /// The overall state changed; an alert was sent.
    Changed { from: RiskState, to: RiskState },
    Unchanged(RiskState),
    /// Names of the gate inputs that could not be computed.
    InsufficientData { missing: Vec<&'static str> },
}

/// Alert text for a transition.
pub fn change_message(from: RiskState, to: RiskState, ev: &Evaluation) -> String {
    format!(
        "State change detected: {from} → {to}. Macro weight: {}, Hedge: {}. Action: {}",
        percent(ev.macro_weight, 1),
        percent(ev.hedge_pct, 0),
        ev.action_note
    )
}

/// Assess once and compare the overall state with the stored one.
pub fn check_once<S>(
    store: &S,
    engine: &GateEngine,
    alerts: &dyn AlertSink,
) -> Result<WatchOutcome, WatchError>
where
    S: SeriesReader + StateStore,
{
    let assessment = assess(store, engine)?;
    let Some(ev) = assessment.evaluation.as_ref() else {
        return Ok(WatchOutcome::InsufficientData {
            missing: assessment.missing(),
        });
    };
    let current = ev.overall_state;

    let outcome = match store.last_overall_state()? {
        None => {
            store.save_overall_state(current)?;
            WatchOutcome::InitialSaved(current)
        }
        Some(last) if last != current => {
            alerts.send(&change_message(last, current, ev));
            store.save_overall_state(current)?;
            WatchOutcome::Changed {
                from: last,
                to: current,
            }
        }
        Some(_) => WatchOutcome::Unchanged(current),
    };
    Ok(outcome)
}

/// [`check_once`], with errors turned into an alert instead of returned.
pub fn check_and_alert<S>(store: &S, engine: &GateEngine, alerts: &dyn AlertSink) -> Option<WatchOutcome>
where
    S: SeriesReader + StateStore,
{
    match check_once(store, engine, alerts) {
        Ok(outcome) => {
            match &outcome {
                WatchOutcome::InitialSaved(s) => tracing::info!(state = %s, "initial state saved"),
                WatchOutcome::Changed { from, to } => {
                    tracing::info!(from = %from, to = %to, "state changed")
                }
                WatchOutcome::Unchanged(s) => tracing::info!(state = %s, "state check: unchanged"),
                WatchOutcome::InsufficientData { missing } => {
                    tracing::info!(missing = ?missing, "insufficient data for state evaluation")
                }
            }
            Some(outcome)
        }
        Err(e) => {
            tracing::error!(error = %e, "state check failed");
            alerts.send(&format!("Error during state check: {e}"));
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Stop after this many checks; `None` runs until the process exits.
    pub max_iterations: Option<usize>,
}

/// Running totals of a watch loop. Kept constant-size so an uncapped watcher
/// does not grow with uptime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchSummary {
    pub checks: usize,
    pub failed: usize,
    pub changes: usize,
    /// Outcome of the most recent check that completed.
    pub last: Option<WatchOutcome>,
}

impl WatchSummary {
    fn record(&mut self, outcome: Option<WatchOutcome>) {
        self.checks += 1;
        match outcome {
            Some(outcome) => {
                if matches!(outcome, WatchOutcome::Changed { .. }) {
                    self.changes += 1;
                }
                self.last = Some(outcome);
            }
            None => self.failed += 1,
        }
    }
}

/// Check immediately, then every `interval`. Only returns when
/// `max_iterations` is set.
pub fn watch<S>(
    store: &S,
    engine: &GateEngine,
    alerts: &dyn AlertSink,
    options: WatchOptions,
) -> WatchSummary
where
    S: SeriesReader + StateStore,
{
    tracing::info!(interval_secs = options.interval.as_secs(), "starting state watcher");
    let mut summary = WatchSummary::default();
    loop {
        summary.record(check_and_alert(store, engine, alerts));
        if options.max_iterations.is_some_and(|max| summary.checks >= max) {
            break;
        }
        std::thread::sleep(options.interval);
    }
    summary
}
