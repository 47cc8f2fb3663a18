//! Metrics derivator: epoch table + parameters → [`TestMetrics`].
//!
//! Pure over already-typed records; no text parsing happens here.

use crate::types::{EpochRecord, ParameterSet, TestMetrics};

/// `final / initial`, or `f64::INFINITY` when `initial` is not positive.
pub fn cost_multiplier(initial: f64, final_cost: f64) -> f64 {
    if initial > 0.0 {
        final_cost / initial
    } else {
        f64::INFINITY
    }
}

pub fn derive(params: &ParameterSet, epochs: &[EpochRecord]) -> TestMetrics {
    let epochs_generated = epochs.len().saturating_sub(1);

    let initial_mint_cost = epochs
        .get(1)
        .or_else(|| epochs.first())
        .map(|r| r.usd_cost_per_token)
        .unwrap_or(0.0);
    let last = epochs.last();
    let final_mint_cost = last.map(|r| r.usd_cost_per_token).unwrap_or(0.0);
    let total_valuation = last.map(|r| r.cumulative_usd_cost).unwrap_or(0.0);

    TestMetrics {
        test_id: params.test_id.clone(),
        epochs_generated,
        initial_mint_cost,
        final_mint_cost,
        total_valuation,
        initial_valuation: params.initial_valuation(),
        valuation_valid: params.valuation_valid(),
        cost_multiplier: cost_multiplier(initial_mint_cost, final_mint_cost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::extract::{extract, ExtractedFields};
    use crate::types::{whole_to_subunits, FieldName};
    use proptest::prelude::*;

    fn params_with_burn(burn_subunits: u64) -> ParameterSet {
        ParameterSet::new(
            "B1",
            whole_to_subunits(1_000_000),
            whole_to_subunits(1),
            burn_subunits,
            50,
            whole_to_subunits(20_000),
        )
        .expect("valid params")
    }

    fn record(label: &str, cost: f64, cumulative_usd: f64) -> EpochRecord {
        EpochRecord {
            test_id: "B1".into(),
            epoch_label: label.into(),
            cumulative_secondary_burned: 0.0,
            cumulative_primary_minted: 0.0,
            primary_minted_in_epoch: 0.0,
            usd_cost_per_token: cost,
            cumulative_usd_cost: cumulative_usd,
            supply_minted_pct: 0.0,
        }
    }

    #[test]
    fn low_burn_unit_is_invalid() {
        let p = params_with_burn(whole_to_subunits(100));
        let m = derive(&p, &assemble(&p, &ExtractedFields::default()));
        assert_eq!(m.initial_valuation, 0.5);
        assert!(!m.valuation_valid);
    }

    #[test]
    fn boundary_burn_unit_is_valid() {
        let p = params_with_burn(whole_to_subunits(1_000_000));
        let m = derive(&p, &assemble(&p, &ExtractedFields::default()));
        assert_eq!(m.initial_valuation, 5000.0);
        assert!(m.valuation_valid);
    }

    #[test]
    fn tge_only_sequence_has_zero_epochs_and_sentinel_multiplier() {
        let p = params_with_burn(whole_to_subunits(1_000_000));
        let fields = extract("minted_per_epoch_data_x = vec {}; minted_per_epoch_data_y = vec {}");
        let epochs = assemble(&p, &fields);
        assert_eq!(epochs.len(), 1);
        let m = derive(&p, &epochs);
        assert_eq!(m.epochs_generated, 0);
        assert_eq!(m.initial_mint_cost, 0.0);
        assert!(m.cost_multiplier_is_sentinel());
    }

    #[test]
    fn initial_cost_skips_tge_record() {
        let p = params_with_burn(whole_to_subunits(1_000_000));
        let raw = r#"minted_per_epoch_data_x = vec { "Epoch 1" };
                     cost_to_mint_data_y = vec { 0 : float64; 2.5 : float64 }"#;
        let m = derive(&p, &assemble(&p, &extract(raw)));
        assert_eq!(m.epochs_generated, 1);
        assert_eq!(m.initial_mint_cost, 2.5);
        assert_eq!(m.final_mint_cost, 2.5);
        assert_eq!(m.cost_multiplier, 1.0);
    }

    #[test]
    fn final_cost_and_valuation_come_from_last_record() {
        let p = params_with_burn(whole_to_subunits(1_000_000));
        let epochs = vec![
            record("TGE", 0.0, 0.0),
            record("Epoch 1", 0.01, 5000.0),
            record("Epoch 2", 0.04, 15000.0),
        ];
        let m = derive(&p, &epochs);
        assert_eq!(m.epochs_generated, 2);
        assert_eq!(m.initial_mint_cost, 0.01);
        assert_eq!(m.final_mint_cost, 0.04);
        assert_eq!(m.total_valuation, 15000.0);
        assert!((m.cost_multiplier - 4.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sequence_does_not_panic() {
        let p = params_with_burn(1);
        let m = derive(&p, &[]);
        assert_eq!(m.epochs_generated, 0);
        assert_eq!(m.total_valuation, 0.0);
        assert!(m.cost_multiplier.is_infinite());
    }

    #[test]
    fn assembled_fields_flow_into_metrics() {
        let p = params_with_burn(whole_to_subunits(1_000_000));
        let fields = ExtractedFields::default()
            .with_labels(["Epoch 1", "Epoch 2"])
            .with_vector(FieldName::CostToMintDataY, vec![0.0, 0.5, 1.5])
            .with_vector(FieldName::CumulativeUsdCostDataY, vec![5000.0, 20000.0]);
        let m = derive(&p, &assemble(&p, &fields));
        assert_eq!(m.initial_mint_cost, 0.5);
        assert_eq!(m.final_mint_cost, 1.5);
        assert_eq!(m.cost_multiplier, 3.0);
        assert_eq!(m.total_valuation, 20000.0);
    }

    proptest! {
        #[test]
        fn valuation_valid_iff_burn_at_least_1e14(burn in any::<u64>()) {
            let p = params_with_burn(burn);
            let m = derive(&p, &assemble(&p, &ExtractedFields::default()));
            prop_assert_eq!(m.valuation_valid, burn >= 100_000_000_000_000);
        }

        #[test]
        fn cost_multiplier_is_always_defined(
            initial in prop_oneof![Just(0.0f64), 1e-6f64..1e6],
            final_cost in prop_oneof![Just(0.0f64), 0.0f64..1e6],
        ) {
            let m = cost_multiplier(initial, final_cost);
            prop_assert!(!m.is_nan());
            if initial > 0.0 {
                prop_assert!(m.is_finite());
            } else {
                prop_assert!(m.is_infinite());
            }
        }

        #[test]
        fn degenerate_epoch_vectors_yield_zero_epochs(absent in any::<bool>()) {
            let p = params_with_burn(whole_to_subunits(1_000));
            let raw = if absent { "record {}" } else { "minted_per_epoch_data_x = vec { }" };
            let m = derive(&p, &assemble(&p, &extract(raw)));
            prop_assert_eq!(m.epochs_generated, 0);
        }

        #[test]
        fn epochs_generated_excludes_tge(n in 0usize..32) {
            let p = params_with_burn(whole_to_subunits(1_000));
            let labels: Vec<String> = (1..=n).map(|i| format!("Epoch {i}")).collect();
            let m = derive(&p, &assemble(&p, &ExtractedFields::default().with_labels(labels)));
            prop_assert_eq!(m.epochs_generated, n);
        }
    }
}
