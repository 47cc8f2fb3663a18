//! Static parameter sets used by collection runs.
//!
//! - **A**: halving step sweep (25..=90, step 5)
//! - **B**: burn unit sweep (100 .. 10,000,000 whole tokens)
//! - **C**: supply/reward ratios
//! - **D**: edge cases, some deliberately invalid
//!
//! Catalog quantities are whole tokens; [`Scenario::params`] holds them in subunits.

use serde::{Deserialize, Serialize};

use crate::types::{whole_to_subunits, ParameterSet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub params: ParameterSet,
    pub description: String,
}

impl Scenario {
    fn whole(
        id: String,
        max_supply: u64,
        tge: u64,
        burn: u64,
        halving: u64,
        reward: u64,
        description: String,
    ) -> Self {
        // Catalog entries bypass `ParameterSet::new` so invalid edge cases stay representable.
        Self {
            params: ParameterSet {
                test_id: id,
                primary_max_supply: whole_to_subunits(max_supply),
                tge_allocation: whole_to_subunits(tge),
                initial_secondary_burn: whole_to_subunits(burn),
                halving_step: halving,
                initial_reward_per_burn_unit: whole_to_subunits(reward),
            },
            description,
        }
    }

    pub fn id(&self) -> &str {
        &self.params.test_id
    }

    /// Candid argument for `preview_tokenomics_graphs`.
    pub fn to_preview_args(&self) -> String {
        let p = &self.params;
        format!(
            "record {{ primary_max_supply = {} : nat64; tge_allocation = {} : nat64; \
             initial_secondary_burn = {} : nat64; halving_step = {} : nat64; \
             initial_reward_per_burn_unit = {} : nat64 }}",
            p.primary_max_supply,
            p.tge_allocation,
            p.initial_secondary_burn,
            p.halving_step,
            p.initial_reward_per_burn_unit
        )
    }
}

const BASE_SUPPLY: u64 = 1_000_000;
const BASE_BURN: u64 = 1_000_000;
const BASE_REWARD: u64 = 20_000;

const BURN_UNITS: [u64; 11] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000, 10_000_000,
];

/// (max_supply, burn, reward, halving, description)
const RATIO_CASES: [(u64, u64, u64, u64, &str); 6] = [
    (100_000, 1_000_000, 50_000, 50, "Small supply, high reward"),
    (100_000, 1_000_000, 1_000, 50, "Small supply, low reward"),
    (10_000_000, 1_000_000, 1_000, 50, "Large supply, low reward"),
    (10_000_000, 1_000_000, 100_000, 50, "Large supply, high reward"),
    (1_000_000, 1_000_000, 1, 50, "Minimal reward test"),
    (1_000_000, 100, 1_000_000, 50, "Extreme reward test"),
];

/// (max_supply, tge, burn, halving, reward, description)
const EDGE_CASES: [(u64, u64, u64, u64, u64, &str); 5] = [
    (1_000, 1, 100, 25, 1_000, "Minimum viable"),
    (10_000_000, 1, 10_000_000, 90, 1_000_000, "Maximum stress"),
    (1_000_000, 999_999, 1_000_000, 50, 20_000, "TGE warning"),
    (1_000_000, 1, 100, 99, 20_000, "Invalid halving"),
    (1_000_000, 1, 20_000_000, 25, 100_000, "Unreachable epochs"),
];

/// Every scenario, in set order (A, B, C, D).
pub fn catalog() -> Vec<Scenario> {
    let halving_sweep = (25..=90).step_by(5).enumerate().map(|(i, halving)| {
        Scenario::whole(
            format!("A{}", i + 1),
            BASE_SUPPLY,
            1,
            BASE_BURN,
            halving,
            BASE_REWARD,
            format!("Halving step {halving}%"),
        )
    });

    let burn_sweep = BURN_UNITS.iter().enumerate().map(|(i, &burn)| {
        Scenario::whole(
            format!("B{}", i + 1),
            BASE_SUPPLY,
            1,
            burn,
            50,
            BASE_REWARD,
            format!("Burn unit {burn} tokens"),
        )
    });

    let ratios = RATIO_CASES
        .iter()
        .enumerate()
        .map(|(i, &(supply, burn, reward, halving, desc))| {
            Scenario::whole(
                format!("C{}", i + 1),
                supply,
                1,
                burn,
                halving,
                reward,
                desc.to_string(),
            )
        });

    let edges = EDGE_CASES
        .iter()
        .enumerate()
        .map(|(i, &(supply, tge, burn, halving, reward, desc))| {
            Scenario::whole(
                format!("D{}", i + 1),
                supply,
                tge,
                burn,
                halving,
                reward,
                desc.to_string(),
            )
        });

    halving_sweep
        .chain(burn_sweep)
        .chain(ratios)
        .chain(edges)
        .collect()
}

/// Look up a scenario by id (case-insensitive).
pub fn find(id: &str) -> Option<Scenario> {
    catalog()
        .into_iter()
        .find(|s| s.id().eq_ignore_ascii_case(id.trim()))
}
