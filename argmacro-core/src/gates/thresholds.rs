//! Gate thresholds.
//!
//! Two independent rule sets: the per-dimension bands and the overall GREEN
//! rule. Their defaults express the same EMBI condition, but each can be
//! tuned on its own, so a change to one is not silently applied to the other.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid gate thresholds: {0}")]
pub struct ThresholdError(pub String);

/// Per-dimension GREEN/YELLOW cutoffs. Everything past the YELLOW cutoff is
/// RED.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionThresholds {
    /// GREEN when `fx_gap < fx_gap_green_below`.
    pub fx_gap_green_below: f64,
    pub fx_gap_yellow_below: f64,
    /// GREEN when `reserves_mom_4w > reserves_green_above`.
    pub reserves_green_above: f64,
    pub reserves_yellow_above: f64,
    pub core_cpi_green_below: f64,
    pub core_cpi_yellow_below: f64,
    /// GREEN when level or trend is below its cutoff.
    pub embi_green_level_below: f64,
    pub embi_green_trend_below: f64,
    pub embi_yellow_level_below: f64,
    pub embi_yellow_trend_below: f64,
}

impl Default for DimensionThresholds {
    fn default() -> Self {
        Self {
            fx_gap_green_below: 0.15,
            fx_gap_yellow_below: 0.25,
            reserves_green_above: 0.03,
            reserves_yellow_above: 0.0,
            core_cpi_green_below: 0.25,
            core_cpi_yellow_below: 0.35,
            embi_green_level_below: 1400.0,
            embi_green_trend_below: -300.0,
            embi_yellow_level_below: 1600.0,
            embi_yellow_trend_below: -100.0,
        }
    }
}

/// Overall GREEN requires every clause:
/// `fx_gap < fx_gap_below`, `reserves > reserves_above`,
/// `core_cpi < core_cpi_below`, and
/// `embi_level < embi_level_below || embi_trend < embi_trend_below`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenRule {
    pub fx_gap_below: f64,
    pub reserves_above: f64,
    pub core_cpi_below: f64,
    pub embi_level_below: f64,
    pub embi_trend_below: f64,
}

impl Default for GreenRule {
    fn default() -> Self {
        Self {
            fx_gap_below: 0.15,
            reserves_above: 0.03,
            core_cpi_below: 0.25,
            embi_level_below: 1400.0,
            embi_trend_below: -300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub dimensions: DimensionThresholds,
    pub green_rule: GreenRule,
}

impl GateConfig {
    /// Reject band orderings that would make a YELLOW band empty or inverted,
    /// and non-finite cutoffs.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let d = &self.dimensions;
        let g = &self.green_rule;
        let all = [
            d.fx_gap_green_below,
            d.fx_gap_yellow_below,
            d.reserves_green_above,
            d.reserves_yellow_above,
            d.core_cpi_green_below,
            d.core_cpi_yellow_below,
            d.embi_green_level_below,
            d.embi_green_trend_below,
            d.embi_yellow_level_below,
            d.embi_yellow_trend_below,
            g.fx_gap_below,
            g.reserves_above,
            g.core_cpi_below,
            g.embi_level_below,
            g.embi_trend_below,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(ThresholdError("thresholds must be finite".into()));
        }
        if d.fx_gap_green_below > d.fx_gap_yellow_below {
            return Err(ThresholdError("fx_gap green cutoff above yellow cutoff".into()));
        }
        if d.reserves_green_above < d.reserves_yellow_above {
            return Err(ThresholdError("reserves green cutoff below yellow cutoff".into()));
        }
        if d.core_cpi_green_below > d.core_cpi_yellow_below {
            return Err(ThresholdError("core_cpi green cutoff above yellow cutoff".into()));
        }
        if d.embi_green_level_below > d.embi_yellow_level_below
            || d.embi_green_trend_below > d.embi_yellow_trend_below
        {
            return Err(ThresholdError("embi green cutoffs above yellow cutoffs".into()));
        }
        Ok(())
    }

    /// Whether the GREEN rule's EMBI clause matches the EMBI dimension's
    /// GREEN band.
    pub fn embi_rules_agree(&self) -> bool {
        self.green_rule.embi_level_below == self.dimensions.embi_green_level_below
            && self.green_rule.embi_trend_below == self.dimensions.embi_green_trend_below
    }
}
