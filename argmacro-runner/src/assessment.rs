//! Assessment: store → features → gate evaluation.

use argmacro_core::features::{self, FeatureSet};
use argmacro_core::gates::{Evaluation, GateEngine, GateInputs};
use argmacro_core::store::{SeriesReader, StoreError};
use serde::Serialize;

/// Features plus the evaluation when every gate input was available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub features: FeatureSet,
    pub inputs: Option<GateInputs>,
    pub evaluation: Option<Evaluation>,
}

impl Assessment {
    /// Gate inputs that could not be computed; empty when evaluated.
    pub fn missing(&self) -> Vec<&'static str> {
        self.features.missing()
    }

    pub fn is_sufficient(&self) -> bool {
        self.evaluation.is_some()
    }
}

pub fn assess(reader: &dyn SeriesReader, engine: &GateEngine) -> Result<Assessment, StoreError> {
    let features = features::compute_all(reader)?;
    let inputs = GateInputs::from_features(&features);
    let evaluation = inputs.as_ref().map(|i| engine.evaluate(i));

    match &evaluation {
        Some(ev) => tracing::info!(
            overall = %ev.overall_state,
            macro_weight = ev.macro_weight,
            hedge_pct = ev.hedge_pct,
            "assessment complete"
        ),
        None => tracing::info!(missing = ?features.missing(), "insufficient data for assessment"),
    }

    Ok(Assessment {
        features,
        inputs,
        evaluation,
    })
}
