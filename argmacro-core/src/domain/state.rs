//! Risk states and the dimensions they are assigned to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Three-valued risk classification, used both per dimension and overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskState {
    Green,
    Yellow,
    Red,
}

impl RiskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskState::Green => "GREEN",
            RiskState::Yellow => "YELLOW",
            RiskState::Red => "RED",
        }
    }
}

impl fmt::Display for RiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown risk state '{0}'")]
pub struct ParseStateError(pub String);

impl FromStr for RiskState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GREEN" => Ok(RiskState::Green),
            "YELLOW" => Ok(RiskState::Yellow),
            "RED" => Ok(RiskState::Red),
            _ => Err(ParseStateError(s.to_string())),
        }
    }
}

/// The four gated dimensions, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    FxGap,
    ReservesMomentum,
    CoreCpi,
    Embi,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::FxGap,
        Dimension::ReservesMomentum,
        Dimension::CoreCpi,
        Dimension::Embi,
    ];

    /// Record name used in action notes and serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::FxGap => "fx_gap",
            Dimension::ReservesMomentum => "reserves_momentum",
            Dimension::CoreCpi => "core_cpi",
            Dimension::Embi => "embi",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-dimension states of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionStates {
    pub fx_gap: RiskState,
    pub reserves_momentum: RiskState,
    pub core_cpi: RiskState,
    pub embi: RiskState,
}

impl DimensionStates {
    pub fn get(&self, dim: Dimension) -> RiskState {
        match dim {
            Dimension::FxGap => self.fx_gap,
            Dimension::ReservesMomentum => self.reserves_momentum,
            Dimension::CoreCpi => self.core_cpi,
            Dimension::Embi => self.embi,
        }
    }

    /// `(dimension, state)` pairs in fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, RiskState)> + '_ {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }

    pub fn red_dimensions(&self) -> Vec<Dimension> {
        self.iter()
            .filter(|(_, s)| *s == RiskState::Red)
            .map(|(d, _)| d)
            .collect()
    }

    pub fn all(&self, state: RiskState) -> bool {
        self.iter().all(|(_, s)| s == state)
    }
}
