//! tokgraph core: extraction and validation of tokenomics preview results.
//!
//! The engine behind `preview_tokenomics_graphs` answers with Candid text. This crate turns
//! that text into epoch-aligned records and summary metrics:
//!
//! ```text
//! raw text ──extract──▶ ExtractedFields ──assemble──▶ [EpochRecord] ──derive──▶ TestMetrics
//!                                                                        │
//!                                                                        └──assess──▶ [Finding]
//! ```
//!
//! Every stage is a pure function. Batch orchestration, memoization and counters live in
//! [`batch`], [`cache`] and [`metrics`].

use thiserror::Error;

pub mod assemble;
pub mod assess;
pub mod batch;
pub mod cache;
pub mod config;
pub mod derive;
pub mod extract;
pub mod hash;
pub mod metrics;
pub mod scenarios;
pub mod types;

pub use assemble::assemble;
pub use assess::{assess, Finding, FindingKind, Recommendations, Severity};
pub use batch::{BatchReport, BatchRunner, BatchSummary, TestCase, TestOutcome};
pub use cache::ExtractionCache;
pub use config::TokgraphConfig;
pub use derive::derive;
pub use extract::{extract, ConversionFailure, ExtractedFields, ExtractionQuality};
pub use types::{EpochRecord, FieldName, FieldVector, ParameterSet, RawResponse, TestMetrics};

/// Subunits per whole token (fixed-point scale of every integer quantity).
pub const E8S: u64 = 100_000_000;

/// Fixed USD price of one whole secondary token.
pub const USD_PER_SECONDARY_TOKEN: f64 = 0.005;

/// Minimum initial valuation (USD) for a parameter set to count as valid.
pub const MIN_INITIAL_VALUATION_USD: f64 = 5000.0;

/// Label of the synthetic genesis record.
pub const TGE_LABEL: &str = "TGE";

/// Convert a subunit quantity to whole units.
pub fn to_whole_units(subunits: f64) -> f64 {
    subunits / E8S as f64
}

/// Unified error type for tokgraph core operations.
///
/// Per-test-case extraction problems never surface here; they degrade to zero-valued fields
/// and are reported through [`ExtractionQuality`].
#[derive(Debug, Error)]
pub enum TokgraphError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Raw input unavailable at {path}: {reason}")]
    InputUnavailable { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, TokgraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_unit_conversion_uses_e8s() {
        assert_eq!(to_whole_units(250_000_000.0), 2.5);
        assert_eq!(to_whole_units(0.0), 0.0);
    }

    #[test]
    fn error_messages_carry_context() {
        let err = TokgraphError::InputUnavailable {
            path: "raw.txt".into(),
            reason: "not found".into(),
        };
        assert_eq!(err.to_string(), "Raw input unavailable at raw.txt: not found");
    }
}
