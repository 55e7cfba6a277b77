//! argmacro core: series acquisition, fallback routing, features, state gates.
//!
//! This crate contains:
//! - Domain types (series points, series registry, risk states)
//! - Provider trait, concrete HTTP/file providers and the fallback router
//! - Persistence contracts with in-memory and SQLite stores
//! - Feature computations over persisted series
//! - Per-dimension and overall gate classification
//! - Sharpe/sigmoid allocation model

pub mod allocation;
pub mod data;
pub mod domain;
pub mod features;
pub mod gates;
pub mod store;

pub use allocation::{Allocation, AllocationParams};
pub use domain::{Dimension, DimensionStates, RiskState, SeriesPoint};
pub use gates::{evaluate_states, Evaluation, GateConfig, GateEngine, GateInputs};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types can be shared with a watcher thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::SeriesPoint>();
        require_sync::<domain::SeriesPoint>();
        require_send::<domain::RiskState>();
        require_sync::<domain::RiskState>();
        require_send::<domain::DimensionStates>();
        require_sync::<domain::DimensionStates>();
        require_send::<domain::SeriesSpec>();
        require_sync::<domain::SeriesSpec>();

        // Providers and routing
        require_send::<data::ProviderRouter>();
        require_sync::<data::ProviderRouter>();
        require_send::<data::ProviderError>();
        require_sync::<data::ProviderError>();
        require_send::<data::FetchError>();
        require_sync::<data::FetchError>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::HttpFetcher>();
        require_sync::<data::HttpFetcher>();
        require_send::<data::BcraProvider>();
        require_sync::<data::BcraProvider>();
        require_send::<data::IndecProvider>();
        require_sync::<data::IndecProvider>();
        require_send::<data::BluelyticsProvider>();
        require_sync::<data::BluelyticsProvider>();
        require_send::<data::YahooFxProvider>();
        require_sync::<data::YahooFxProvider>();
        require_send::<data::FredProvider>();
        require_sync::<data::FredProvider>();
        require_send::<data::LocalCsvProvider>();
        require_sync::<data::LocalCsvProvider>();
        require_send::<data::ProviderConfig>();
        require_sync::<data::ProviderConfig>();

        // Stores
        require_send::<store::MemoryStore>();
        require_sync::<store::MemoryStore>();
        require_send::<store::SqliteStore>();
        require_sync::<store::SqliteStore>();

        // Features and gates
        require_send::<features::FeatureSet>();
        require_sync::<features::FeatureSet>();
        require_send::<features::CpiCorridor>();
        require_sync::<features::CpiCorridor>();
        require_send::<features::EmbiBands>();
        require_sync::<features::EmbiBands>();
        require_send::<gates::GateEngine>();
        require_sync::<gates::GateEngine>();
        require_send::<gates::Evaluation>();
        require_sync::<gates::Evaluation>();
        require_send::<allocation::AllocationParams>();
        require_sync::<allocation::AllocationParams>();
    }

    /// Architecture contract: features see the store only through the
    /// read-only trait.
    #[test]
    fn features_take_a_reader_trait_object() {
        fn _check(reader: &dyn store::SeriesReader) -> Result<features::FeatureSet, store::StoreError> {
            features::compute_all(reader)
        }
    }

    #[test]
    fn reexported_entry_point_matches_engine() {
        let a = evaluate_states(0.10, 0.05, 0.20, 1200.0, -400.0, None, None, None);
        let inputs = GateInputs {
            fx_gap: 0.10,
            reserves_mom_4w: 0.05,
            core_cpi_3m_ann: 0.20,
            embi_level: 1200.0,
            embi_trend_30d: -400.0,
        };
        let b = GateEngine::default().evaluate(&inputs);
        assert_eq!(a, b);
    }
}
