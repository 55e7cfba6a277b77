//! Allocation model: Sharpe ratio, sigmoid position sizing, state-gated hedge.
//!
//! Pure functions only. Position size depends on the Sharpe inputs alone; the
//! risk state only decides the hedge.

use crate::domain::RiskState;
use serde::{Deserialize, Serialize};

/// Inputs to the Sharpe/sigmoid model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationParams {
    /// Expected annual return of the macro position.
    pub exp_return: f64,
    /// Annualised volatility.
    pub vol: f64,
    /// Risk-free rate.
    pub rf: f64,
    /// Sigmoid steepness.
    pub k: f64,
}

impl Default for AllocationParams {
    fn default() -> Self {
        Self {
            exp_return: 0.12,
            vol: 0.18,
            rf: 0.045,
            k: DEFAULT_SIGMOID_K,
        }
    }
}

pub const DEFAULT_SIGMOID_K: f64 = 2.0;

/// Hedge applied in any state other than GREEN.
pub const NON_GREEN_HEDGE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub sharpe: f64,
    pub position_size: f64,
    pub hedge_pct: f64,
}

// ─── Model functions ────────────────────────────────────────────────

/// `(exp_return - rf) / vol`; 0.0 when `vol` is zero.
pub fn sharpe(exp_return: f64, vol: f64, rf: f64) -> f64 {
    if vol == 0.0 {
        return 0.0;
    }
    (exp_return - rf) / vol
}

/// Logistic squashing of a Sharpe ratio into `[0, 1]`.
pub fn position_size(sharpe: f64, k: f64) -> f64 {
    (1.0 / (1.0 + (-k * sharpe).exp())).clamp(0.0, 1.0)
}

pub fn hedge_pct(state: RiskState) -> f64 {
    match state {
        RiskState::Green => 0.0,
        RiskState::Yellow | RiskState::Red => NON_GREEN_HEDGE,
    }
}

pub fn allocation(params: &AllocationParams, state: RiskState) -> Allocation {
    let s = sharpe(params.exp_return, params.vol, params.rf);
    Allocation {
        sharpe: s,
        position_size: position_size(s, params.k),
        hedge_pct: hedge_pct(state),
    }
}
