use serde::{Deserialize, Serialize};

use crate::{to_whole_units, Result, TokgraphError, E8S, MIN_INITIAL_VALUATION_USD, USD_PER_SECONDARY_TOKEN};

/// Input to one test case. Every quantity is in subunits (whole × 10^8).
///
/// Preconditions (checked by [`ParameterSet::validate`]):
/// - `test_id` is non-empty.
/// - `primary_max_supply > 0`.
/// - `halving_step <= 100`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub test_id: String,
    pub primary_max_supply: u64,
    pub tge_allocation: u64,
    pub initial_secondary_burn: u64,
    pub halving_step: u64,
    pub initial_reward_per_burn_unit: u64,
}

impl ParameterSet {
    pub fn new(
        test_id: impl Into<String>,
        primary_max_supply: u64,
        tge_allocation: u64,
        initial_secondary_burn: u64,
        halving_step: u64,
        initial_reward_per_burn_unit: u64,
    ) -> Result<Self> {
        let params = Self {
            test_id: test_id.into(),
            primary_max_supply,
            tge_allocation,
            initial_secondary_burn,
            halving_step,
            initial_reward_per_burn_unit,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.test_id.trim().is_empty() {
            return Err(TokgraphError::InvalidParameters("test_id must be non-empty".into()));
        }
        if self.primary_max_supply == 0 {
            return Err(TokgraphError::InvalidParameters(format!(
                "{}: primary_max_supply must be > 0",
                self.test_id
            )));
        }
        if self.halving_step > 100 {
            return Err(TokgraphError::InvalidParameters(format!(
                "{}: halving_step out of range: {} > 100",
                self.test_id, self.halving_step
            )));
        }
        Ok(())
    }

    pub fn max_supply_whole(&self) -> f64 {
        to_whole_units(self.primary_max_supply as f64)
    }

    pub fn tge_allocation_whole(&self) -> f64 {
        to_whole_units(self.tge_allocation as f64)
    }

    pub fn burn_unit_whole(&self) -> f64 {
        to_whole_units(self.initial_secondary_burn as f64)
    }

    pub fn initial_reward_whole(&self) -> f64 {
        to_whole_units(self.initial_reward_per_burn_unit as f64)
    }

    /// USD value of one burn unit at the fixed secondary-token price.
    pub fn initial_valuation(&self) -> f64 {
        self.burn_unit_whole() * USD_PER_SECONDARY_TOKEN
    }

    pub fn valuation_valid(&self) -> bool {
        self.initial_valuation() >= MIN_INITIAL_VALUATION_USD
    }

    /// Percentage of the supply cap represented by `minted_whole` tokens (0 if the cap is 0).
    pub fn supply_pct(&self, minted_whole: f64) -> f64 {
        if self.primary_max_supply == 0 {
            return 0.0;
        }
        minted_whole / self.max_supply_whole() * 100.0
    }
}

/// Engine output for one test case. `text == None` means the engine call failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    pub test_id: String,
    pub text: Option<String>,
}

impl RawResponse {
    pub fn new(test_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            text: Some(text.into()),
        }
    }

    pub fn missing(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            text: None,
        }
    }
}

/// Vector fields recognized in a `preview_tokenomics_graphs` response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// Epoch labels (`"Epoch 1"`, ...). Extracted as strings.
    MintedPerEpochDataX,
    CumulativeSupplyDataX,
    CumulativeSupplyDataY,
    MintedPerEpochDataY,
    CostToMintDataY,
    CumulativeUsdCostDataY,
}

impl FieldName {
    pub const ALL: [FieldName; 6] = [
        FieldName::MintedPerEpochDataX,
        FieldName::CumulativeSupplyDataX,
        FieldName::CumulativeSupplyDataY,
        FieldName::MintedPerEpochDataY,
        FieldName::CostToMintDataY,
        FieldName::CumulativeUsdCostDataY,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::MintedPerEpochDataX => "minted_per_epoch_data_x",
            FieldName::CumulativeSupplyDataX => "cumulative_supply_data_x",
            FieldName::CumulativeSupplyDataY => "cumulative_supply_data_y",
            FieldName::MintedPerEpochDataY => "minted_per_epoch_data_y",
            FieldName::CostToMintDataY => "cost_to_mint_data_y",
            FieldName::CumulativeUsdCostDataY => "cumulative_usd_cost_data_y",
        }
    }

    pub fn is_label(self) -> bool {
        self == FieldName::MintedPerEpochDataX
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric series for one field, at its observed length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldVector(Vec<f64>);

impl FieldVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at `index`, or `0.0` past the end.
    pub fn value_at(&self, index: usize) -> f64 {
        self.0.get(index).copied().unwrap_or(0.0)
    }
}

/// One row of the assembled epoch table. Quantities are whole units; costs are USD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub test_id: String,
    pub epoch_label: String,
    pub cumulative_secondary_burned: f64,
    pub cumulative_primary_minted: f64,
    pub primary_minted_in_epoch: f64,
    pub usd_cost_per_token: f64,
    pub cumulative_usd_cost: f64,
    pub supply_minted_pct: f64,
}

impl EpochRecord {
    pub fn is_tge(&self) -> bool {
        self.epoch_label == crate::TGE_LABEL
    }
}

/// Summary metrics for one test case, produced once by [`crate::derive`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestMetrics {
    pub test_id: String,
    pub epochs_generated: usize,
    pub initial_mint_cost: f64,
    pub final_mint_cost: f64,
    pub total_valuation: f64,
    pub initial_valuation: f64,
    pub valuation_valid: bool,
    /// `final / initial`, or `f64::INFINITY` when the initial cost is not positive.
    #[serde(with = "sentinel_f64")]
    pub cost_multiplier: f64,
}

impl TestMetrics {
    pub fn cost_multiplier_is_sentinel(&self) -> bool {
        self.cost_multiplier.is_infinite()
    }
}

/// Serde adapter writing non-finite floats as the string `"inf"` (JSON has no infinity).
mod sentinel_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    const SENTINEL: &str = "inf";

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(SENTINEL)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(s) if s == SENTINEL => Ok(f64::INFINITY),
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "expected number or \"{SENTINEL}\", got {s:?}"
            ))),
        }
    }
}

/// Convert a whole-unit count into subunits, saturating at `u64::MAX`.
pub fn whole_to_subunits(whole: u64) -> u64 {
    whole.saturating_mul(E8S)
}
