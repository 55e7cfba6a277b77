//! Gate evaluation: per-dimension classification, overall state, sizing.
//!
//! The four dimension classifiers and the overall classifier are independent
//! rule sets (see [`thresholds`]). The overall state is GREEN only when the
//! GREEN rule holds, RED only when all four dimensions are RED, and YELLOW
//! otherwise. Sizing comes from the allocation model; only the hedge depends
//! on the overall state.

pub mod note;
pub mod thresholds;

pub use note::action_note;
pub use thresholds::{DimensionThresholds, GateConfig, GreenRule, ThresholdError};

use crate::allocation::{self, AllocationParams};
use crate::domain::{DimensionStates, RiskState};
use crate::features::FeatureSet;
use serde::{Deserialize, Serialize};

/// The five gate inputs. All must be present to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateInputs {
    pub fx_gap: f64,
    pub reserves_mom_4w: f64,
    pub core_cpi_3m_ann: f64,
    pub embi_level: f64,
    pub embi_trend_30d: f64,
}

impl GateInputs {
    /// `None` (insufficient data) unless every input is available.
    pub fn from_features(features: &FeatureSet) -> Option<Self> {
        let embi = features.embi.as_ref()?;
        Some(Self {
            fx_gap: features.fx_gap.as_ref()?.gap,
            reserves_mom_4w: features.reserves_momentum.as_ref()?.value,
            core_cpi_3m_ann: features.core_cpi.as_ref()?.annualized_3m,
            embi_level: embi.level,
            embi_trend_30d: embi.trend_30d?,
        })
    }
}

/// Result of one evaluation. Created fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub dimension_states: DimensionStates,
    pub overall_state: RiskState,
    /// Position size in `[0, 1]`.
    pub macro_weight: f64,
    /// 0.0 or 0.5.
    pub hedge_pct: f64,
    pub action_note: String,
    pub sharpe: f64,
}

// ─── Classifiers (default thresholds) ───────────────────────────────

pub fn classify_fx_gap(fx_gap: f64) -> RiskState {
    fx_gap_state(fx_gap, &DimensionThresholds::default())
}

pub fn classify_reserves_momentum(reserves_mom_4w: f64) -> RiskState {
    reserves_state(reserves_mom_4w, &DimensionThresholds::default())
}

pub fn classify_core_cpi(core_cpi_3m_ann: f64) -> RiskState {
    core_cpi_state(core_cpi_3m_ann, &DimensionThresholds::default())
}

pub fn classify_embi(level: f64, trend_30d: f64) -> RiskState {
    embi_state(level, trend_30d, &DimensionThresholds::default())
}

/// Overall state under default thresholds.
pub fn overall_state(inputs: &GateInputs) -> RiskState {
    GateEngine::default().overall_state(inputs)
}

// ─── Configurable classifiers ───────────────────────────────────────

fn fx_gap_state(x: f64, t: &DimensionThresholds) -> RiskState {
    if x < t.fx_gap_green_below {
        RiskState::Green
    } else if x < t.fx_gap_yellow_below {
        RiskState::Yellow
    } else {
        RiskState::Red
    }
}

fn reserves_state(x: f64, t: &DimensionThresholds) -> RiskState {
    if x > t.reserves_green_above {
        RiskState::Green
    } else if x > t.reserves_yellow_above {
        RiskState::Yellow
    } else {
        RiskState::Red
    }
}

fn core_cpi_state(x: f64, t: &DimensionThresholds) -> RiskState {
    if x < t.core_cpi_green_below {
        RiskState::Green
    } else if x < t.core_cpi_yellow_below {
        RiskState::Yellow
    } else {
        RiskState::Red
    }
}

fn embi_state(level: f64, trend: f64, t: &DimensionThresholds) -> RiskState {
    if level < t.embi_green_level_below || trend < t.embi_green_trend_below {
        RiskState::Green
    } else if level < t.embi_yellow_level_below || trend < t.embi_yellow_trend_below {
        RiskState::Yellow
    } else {
        RiskState::Red
    }
}

// ─── Engine ─────────────────────────────────────────────────────────

/// Gate evaluator holding thresholds and default allocation inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GateEngine {
    pub config: GateConfig,
    pub params: AllocationParams,
}

impl GateEngine {
    pub fn new(config: GateConfig, params: AllocationParams) -> Self {
        Self { config, params }
    }

    pub fn dimension_states(&self, i: &GateInputs) -> DimensionStates {
        let t = &self.config.dimensions;
        DimensionStates {
            fx_gap: fx_gap_state(i.fx_gap, t),
            reserves_momentum: reserves_state(i.reserves_mom_4w, t),
            core_cpi: core_cpi_state(i.core_cpi_3m_ann, t),
            embi: embi_state(i.embi_level, i.embi_trend_30d, t),
        }
    }

    /// Whether the overall GREEN rule holds. Evaluated from the raw inputs,
    /// not from the dimension states.
    pub fn green_rule_holds(&self, i: &GateInputs) -> bool {
        let g = &self.config.green_rule;
        let fx_and_reserves = i.fx_gap < g.fx_gap_below && i.reserves_mom_4w > g.reserves_above;
        let cpi = i.core_cpi_3m_ann < g.core_cpi_below;
        let embi = i.embi_level < g.embi_level_below || i.embi_trend_30d < g.embi_trend_below;
        fx_and_reserves && cpi && embi
    }

    pub fn overall_state(&self, i: &GateInputs) -> RiskState {
        self.overall_from(i, &self.dimension_states(i))
    }

    fn overall_from(&self, i: &GateInputs, states: &DimensionStates) -> RiskState {
        if self.green_rule_holds(i) {
            RiskState::Green
        } else if states.all(RiskState::Red) {
            RiskState::Red
        } else {
            RiskState::Yellow
        }
    }

    /// Evaluate with this engine's allocation parameters.
    pub fn evaluate(&self, inputs: &GateInputs) -> Evaluation {
        self.evaluate_with(inputs, &self.params)
    }

    /// Evaluate with caller-supplied allocation parameters.
    pub fn evaluate_with(&self, inputs: &GateInputs, params: &AllocationParams) -> Evaluation {
        let dimension_states = self.dimension_states(inputs);
        let overall_state = self.overall_from(inputs, &dimension_states);
        let alloc = allocation::allocation(params, overall_state);

        Evaluation {
            dimension_states,
            overall_state,
            macro_weight: alloc.position_size,
            hedge_pct: alloc.hedge_pct,
            action_note: action_note(overall_state, &dimension_states, alloc.position_size),
            sharpe: alloc.sharpe,
        }
    }
}

/// Evaluate all gates with default thresholds.
///
/// `exp_return`, `vol` and `rf` fall back to 0.12, 0.18 and 0.045; the
/// sigmoid steepness is 2.0. All five inputs must be real observations;
/// callers check availability first (see [`GateInputs::from_features`]).
#[allow(clippy::too_many_arguments)]
pub fn evaluate_states(
    fx_gap: f64,
    reserves_mom_4w: f64,
    core_cpi_3m_ann: f64,
    embi_level: f64,
    embi_trend_30d: f64,
    exp_return: Option<f64>,
    vol: Option<f64>,
    rf: Option<f64>,
) -> Evaluation {
    let defaults = AllocationParams::default();
    let params = AllocationParams {
        exp_return: exp_return.unwrap_or(defaults.exp_return),
        vol: vol.unwrap_or(defaults.vol),
        rf: rf.unwrap_or(defaults.rf),
        k: defaults.k,
    };
    let inputs = GateInputs {
        fx_gap,
        reserves_mom_4w,
        core_cpi_3m_ann,
        embi_level,
        embi_trend_30d,
    };
    GateEngine::default().evaluate_with(&inputs, &params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CoreCpi, EmbiLevelTrend, FxGap, ReservesMomentum};
    use chrono::NaiveDate;
    use RiskState::*;

    fn inputs(fx: f64, res: f64, cpi: f64, level: f64, trend: f64) -> GateInputs {
        GateInputs {
            fx_gap: fx,
            reserves_mom_4w: res,
            core_cpi_3m_ann: cpi,
            embi_level: level,
            embi_trend_30d: trend,
        }
    }

    #[test]
    fn fx_gap_bands() {
        assert_eq!(classify_fx_gap(0.149_999), Green);
        assert_eq!(classify_fx_gap(0.15), Yellow);
        assert_eq!(classify_fx_gap(0.249_999), Yellow);
        assert_eq!(classify_fx_gap(0.25), Red);
    }

    #[test]
    fn reserves_bands() {
        assert_eq!(classify_reserves_momentum(0.030_001), Green);
        assert_eq!(classify_reserves_momentum(0.03), Yellow);
        assert_eq!(classify_reserves_momentum(0.000_001), Yellow);
        assert_eq!(classify_reserves_momentum(0.0), Red);
        assert_eq!(classify_reserves_momentum(-0.1), Red);
    }

    #[test]
    fn cpi_bands() {
        assert_eq!(classify_core_cpi(0.249), Green);
        assert_eq!(classify_core_cpi(0.25), Yellow);
        assert_eq!(classify_core_cpi(0.35), Red);
    }

    #[test]
    fn embi_bands() {
        assert_eq!(classify_embi(1399.999, 0.0), Green);
        assert_eq!(classify_embi(1400.0, 0.0), Yellow);
        assert_eq!(classify_embi(2000.0, -300.0), Yellow);
        assert_eq!(classify_embi(2000.0, -300.001), Green);
        assert_eq!(classify_embi(1599.0, 50.0), Yellow);
        assert_eq!(classify_embi(1600.0, -100.0), Red);
        assert_eq!(classify_embi(1600.0, -100.5), Yellow);
    }

    #[test]
    fn wide_gap_with_three_greens_is_yellow() {
        let i = inputs(0.30, 0.05, 0.20, 1200.0, -50.0);
        let ev = GateEngine::default().evaluate(&i);
        assert_eq!(ev.dimension_states.fx_gap, Red);
        assert_eq!(ev.dimension_states.reserves_momentum, Green);
        assert_eq!(ev.dimension_states.core_cpi, Green);
        assert_eq!(ev.dimension_states.embi, Green);
        assert_eq!(ev.overall_state, Yellow);
        assert_eq!(ev.hedge_pct, 0.5);
        assert!(ev.action_note.contains("Risk areas: fx_gap."));
    }

    #[test]
    fn all_green_scenario() {
        let ev = evaluate_states(0.10, 0.05, 0.20, 1200.0, -400.0, None, None, None);
        assert_eq!(ev.overall_state, Green);
        assert!(ev.dimension_states.all(Green));
        assert_eq!(ev.hedge_pct, 0.0);
        assert!((ev.sharpe - 0.416_666_7).abs() < 1e-6);
        assert!((ev.macro_weight - 0.697_1).abs() < 1e-3);
        assert_eq!(
            ev.action_note,
            "GREEN: Favorable conditions across key dimensions. Moderate position size recommended."
        );
    }

    #[test]
    fn all_red_scenario() {
        let ev = evaluate_states(0.40, -0.05, 0.50, 2000.0, 100.0, None, None, None);
        assert_eq!(ev.overall_state, Red);
        assert!(ev.dimension_states.all(Red));
        assert_eq!(ev.hedge_pct, 0.5);
        assert!((ev.macro_weight - 0.697_1).abs() < 1e-3);
        assert!(ev.action_note.starts_with("RED: Elevated risks across 4 dimension(s)."));
    }

    #[test]
    fn green_through_embi_level_alone() {
        let ev = evaluate_states(0.10, 0.05, 0.20, 1300.0, 0.0, None, None, None);
        assert_eq!(ev.overall_state, Green);
        assert_eq!(ev.dimension_states.embi, Green);
        assert_eq!(ev.hedge_pct, 0.0);
        assert!((ev.macro_weight - 0.697_06).abs() < 1e-4);
    }

    #[test]
    fn red_at_embi_level_1800() {
        let ev = evaluate_states(0.40, -0.05, 0.50, 1800.0, 200.0, None, None, None);
        assert_eq!(ev.overall_state, Red);
        assert!(ev.dimension_states.all(Red));
        assert_eq!(ev.hedge_pct, 0.5);
        assert!((ev.sharpe - 0.416_67).abs() < 1e-4);
        assert!((ev.macro_weight - 0.697_06).abs() < 1e-4);
    }

    #[test]
    fn overall_green_needs_trend_strictly_below_minus_300() {
        let engine = GateEngine::default();
        let at_edge = inputs(0.10, 0.05, 0.20, 1500.0, -300.0);
        assert!(!engine.green_rule_holds(&at_edge));
        assert_eq!(engine.overall_state(&at_edge), Yellow);
        assert_eq!(overall_state(&at_edge), Yellow);

        let past_edge = inputs(0.10, 0.05, 0.20, 1500.0, -300.5);
        assert_eq!(overall_state(&past_edge), Green);

        let level_edge = inputs(0.10, 0.05, 0.20, 1400.0, 0.0);
        assert_eq!(overall_state(&level_edge), Yellow);
    }

    #[test]
    fn caller_params_override_defaults() {
        let ev = evaluate_states(0.40, -0.05, 0.50, 2000.0, 100.0, Some(0.045), None, None);
        assert_eq!(ev.sharpe, 0.0);
        assert_eq!(ev.macro_weight, 0.5);
        let ev = evaluate_states(0.10, 0.05, 0.20, 1200.0, -400.0, None, Some(0.0), None);
        assert_eq!(ev.sharpe, 0.0);
    }

    #[test]
    fn green_rule_is_independent_of_dimension_table() {
        let i = inputs(0.10, 0.05, 0.20, 1350.0, 0.0);
        let mut engine = GateEngine::default();
        assert_eq!(engine.evaluate(&i).overall_state, Green);

        // Tighten only the overall rule: the EMBI dimension stays GREEN but
        // the overall state drops to YELLOW.
        engine.config.green_rule.embi_level_below = 1300.0;
        let ev = engine.evaluate(&i);
        assert_eq!(ev.dimension_states.embi, Green);
        assert_eq!(ev.overall_state, Yellow);

        // Loosen only the dimension table: the overall rule is unaffected.
        let mut engine = GateEngine::default();
        engine.config.dimensions.embi_green_level_below = 1500.0;
        let i = inputs(0.10, 0.05, 0.20, 1450.0, 0.0);
        let ev = engine.evaluate(&i);
        assert_eq!(ev.dimension_states.embi, Green);
        assert_eq!(ev.overall_state, Yellow);
    }

    #[test]
    fn mixed_reds_stay_yellow() {
        let ev = evaluate_states(0.40, -0.05, 0.50, 1500.0, 0.0, None, None, None);
        assert_eq!(ev.dimension_states.embi, Yellow);
        assert_eq!(ev.overall_state, Yellow);
    }

    #[test]
    fn inputs_need_every_feature() {
        let ts = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut features = FeatureSet {
            fx_gap: Some(FxGap {
                gap: 0.1,
                official: 1000.0,
                parallel: 1100.0,
                official_ts: ts,
                parallel_ts: ts,
                official_series: "USDARS_OFFICIAL",
            }),
            reserves_momentum: Some(ReservesMomentum {
                value: 0.05,
                timestamp: ts,
                reserves_current: 21_000.0,
                reserves_4w_ago: 20_000.0,
                reference_ts: ts,
            }),
            core_cpi: Some(CoreCpi {
                annualized_3m: 0.2,
                monthly_rate: 0.015,
                months: 1.0,
                timestamp: ts,
                previous_ts: ts,
            }),
            embi: Some(EmbiLevelTrend {
                level: 1200.0,
                trend_30d: None,
                timestamp: ts,
            }),
        };
        assert!(GateInputs::from_features(&features).is_none());
        assert_eq!(features.missing(), vec!["embi_trend_30d"]);

        features.embi.as_mut().unwrap().trend_30d = Some(-10.0);
        let i = GateInputs::from_features(&features).unwrap();
        assert_eq!(i.embi_trend_30d, -10.0);
        assert_eq!(overall_state(&i), Green);
        assert!(features.missing().is_empty());
    }
}
