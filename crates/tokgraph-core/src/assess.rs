//! Parameter-set findings and recommended ranges.
//!
//! Findings are advisory; they never change the metrics they are derived from.

use serde::{Deserialize, Serialize};

use crate::config::AssessmentConfig;
use crate::types::{ParameterSet, TestMetrics};
use crate::MIN_INITIAL_VALUATION_USD;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Initial valuation below the minimum.
    LowValuation,
    /// Too few epochs for a fair launch.
    UnfairLaunch,
    ExtendedDistribution,
    FrontLoadedHalving,
    InflationaryHalving,
    /// First-epoch reward larger than the configured share of the mintable supply.
    ExcessiveReward,
}

impl FindingKind {
    pub fn severity(self) -> Severity {
        match self {
            FindingKind::LowValuation | FindingKind::UnfairLaunch => Severity::Error,
            FindingKind::ExtendedDistribution
            | FindingKind::FrontLoadedHalving
            | FindingKind::InflationaryHalving
            | FindingKind::ExcessiveReward => Severity::Warning,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn new(kind: FindingKind, message: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message,
        }
    }
}

/// Evaluate one test case against the assessment thresholds.
///
/// Findings come out in a fixed order: valuation, epoch count, halving, reward.
pub fn assess(params: &ParameterSet, metrics: &TestMetrics, cfg: &AssessmentConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !metrics.valuation_valid {
        findings.push(Finding::new(
            FindingKind::LowValuation,
            format!(
                "initial valuation ${:.2} is below the ${:.0} minimum",
                metrics.initial_valuation, MIN_INITIAL_VALUATION_USD
            ),
        ));
    }

    let epochs = metrics.epochs_generated;
    if epochs < cfg.min_fair_epochs {
        findings.push(Finding::new(
            FindingKind::UnfairLaunch,
            format!(
                "only {epochs} epochs generated (minimum {} for a fair launch)",
                cfg.min_fair_epochs
            ),
        ));
    } else if epochs > cfg.max_epochs {
        findings.push(Finding::new(
            FindingKind::ExtendedDistribution,
            format!("{epochs} epochs exceeds the {} epoch target", cfg.max_epochs),
        ));
    }

    if params.halving_step < cfg.halving_warn_below {
        findings.push(Finding::new(
            FindingKind::FrontLoadedHalving,
            format!(
                "halving step {}% front-loads the distribution (below {}%)",
                params.halving_step, cfg.halving_warn_below
            ),
        ));
    } else if params.halving_step > cfg.halving_warn_above {
        findings.push(Finding::new(
            FindingKind::InflationaryHalving,
            format!(
                "halving step {}% keeps later epochs inflationary (above {}%)",
                params.halving_step, cfg.halving_warn_above
            ),
        ));
    }

    let mintable = (params.max_supply_whole() - params.tge_allocation_whole()).max(0.0);
    let reward = params.initial_reward_whole();
    if reward > cfg.max_reward_share * mintable {
        findings.push(Finding::new(
            FindingKind::ExcessiveReward,
            format!(
                "initial reward {reward} exceeds {:.0}% of the mintable supply ({mintable})",
                cfg.max_reward_share * 100.0
            ),
        ));
    }

    findings
}

/// Recommended parameter ranges reported alongside batch summaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub halving_step_min: u64,
    pub halving_step_max: u64,
    /// Whole secondary tokens.
    pub burn_unit_min: u64,
    pub burn_unit_recommended: u64,
    pub epochs_min: usize,
    pub epochs_max: usize,
}

impl Default for Recommendations {
    fn default() -> Self {
        Self {
            halving_step_min: 50,
            halving_step_max: 75,
            burn_unit_min: 1_000_000,
            burn_unit_recommended: 2_000_000,
            epochs_min: 15,
            epochs_max: 30,
        }
    }
}
