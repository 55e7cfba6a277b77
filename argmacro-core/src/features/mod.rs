//! Derived features over persisted series.
//!
//! Every feature reads through a [`SeriesReader`] and returns
//! `Ok(None)` when its inputs are missing. `Err` is reserved for reader
//! failures; missing data is never an error.

pub mod cpi;
pub mod embi;
pub mod fx_gap;
pub mod reserves;

pub use cpi::{
    compute_core_cpi_3m_annualized, compute_cpi_corridor, compute_cpi_corridor_with, corridor, CoreCpi, CpiCorridor,
    CorridorBounds, DEFAULT_REGULATED_GROWTH,
};
pub use embi::{
    compute_embi_bands, compute_embi_level_trend, policy_score_to_bands, EmbiBands,
    EmbiLevelTrend, FairValueBands, EMBI_TREND_WINDOW_DAYS,
};
pub use fx_gap::{compute_fx_gap, FxGap};
pub use reserves::{compute_reserves_momentum, ReservesMomentum, RESERVES_WINDOW_DAYS};

use crate::store::{SeriesReader, StoreError};
use serde::Serialize;

/// The four gate features read in one pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureSet {
    pub fx_gap: Option<FxGap>,
    pub reserves_momentum: Option<ReservesMomentum>,
    pub core_cpi: Option<CoreCpi>,
    pub embi: Option<EmbiLevelTrend>,
}

impl FeatureSet {
    /// Names of the gate inputs that could not be computed.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.fx_gap.is_none() {
            out.push("fx_gap");
        }
        if self.reserves_momentum.is_none() {
            out.push("reserves_mom_4w");
        }
        if self.core_cpi.is_none() {
            out.push("core_cpi_3m_ann");
        }
        match &self.embi {
            None => {
                out.push("embi_level");
                out.push("embi_trend_30d");
            }
            Some(e) if e.trend_30d.is_none() => out.push("embi_trend_30d"),
            Some(_) => {}
        }
        out
    }
}

/// Compute every gate feature from `reader`.
pub fn compute_all(reader: &dyn SeriesReader) -> Result<FeatureSet, StoreError> {
    Ok(FeatureSet {
        fx_gap: compute_fx_gap(reader)?,
        reserves_momentum: compute_reserves_momentum(reader)?,
        core_cpi: compute_core_cpi_3m_annualized(reader)?,
        embi: compute_embi_level_trend(reader)?,
    })
}
