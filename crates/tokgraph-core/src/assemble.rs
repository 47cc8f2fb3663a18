//! Epoch assembler: extracted vectors → ordered epoch table.
//!
//! Alignment rules:
//! - Record 0 is the synthetic TGE row, built from the parameter set.
//! - One row per epoch label; row `i` reads index `i` of the supply, mint and cumulative-cost
//!   vectors.
//! - `cost_to_mint_data_y[0]` is the TGE cost. Epoch `i` reads `cost_to_mint_data_y[i + 1]`, so
//!   index 0 is never counted as an epoch cost.
//! - Any read past the end of a vector yields 0.

use crate::extract::ExtractedFields;
use crate::types::{EpochRecord, FieldName, ParameterSet};
use crate::{to_whole_units, TGE_LABEL};

/// Index into `cost_to_mint_data_y` holding the TGE cost.
pub const TGE_COST_INDEX: usize = 0;

/// Build the genesis record from parameters and the TGE cost.
pub fn tge_record(params: &ParameterSet, fields: &ExtractedFields) -> EpochRecord {
    let tge_whole = params.tge_allocation_whole();
    EpochRecord {
        test_id: params.test_id.clone(),
        epoch_label: TGE_LABEL.to_string(),
        cumulative_secondary_burned: 0.0,
        cumulative_primary_minted: tge_whole,
        primary_minted_in_epoch: tge_whole,
        usd_cost_per_token: fields.value_at(FieldName::CostToMintDataY, TGE_COST_INDEX),
        cumulative_usd_cost: 0.0,
        supply_minted_pct: params.supply_pct(tge_whole),
    }
}

/// Assemble the epoch table for one test case. Never empty; the TGE record is always first.
pub fn assemble(params: &ParameterSet, fields: &ExtractedFields) -> Vec<EpochRecord> {
    let labels = fields.labels();
    let mut records = Vec::with_capacity(labels.len() + 1);
    records.push(tge_record(params, fields));

    for (i, label) in labels.iter().enumerate() {
        let cumulative_primary = to_whole_units(fields.value_at(FieldName::CumulativeSupplyDataY, i));
        records.push(EpochRecord {
            test_id: params.test_id.clone(),
            epoch_label: label.clone(),
            cumulative_secondary_burned: to_whole_units(
                fields.value_at(FieldName::CumulativeSupplyDataX, i),
            ),
            cumulative_primary_minted: cumulative_primary,
            primary_minted_in_epoch: to_whole_units(
                fields.value_at(FieldName::MintedPerEpochDataY, i),
            ),
            usd_cost_per_token: fields.value_at(FieldName::CostToMintDataY, i + TGE_COST_INDEX + 1),
            cumulative_usd_cost: fields.value_at(FieldName::CumulativeUsdCostDataY, i),
            supply_minted_pct: params.supply_pct(cumulative_primary),
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::types::whole_to_subunits;
    use proptest::prelude::*;

    fn params() -> ParameterSet {
        ParameterSet::new(
            "A1",
            whole_to_subunits(1_000_000),
            whole_to_subunits(1),
            whole_to_subunits(1_000_000),
            50,
            whole_to_subunits(20_000),
        )
        .expect("valid params")
    }

    #[test]
    fn tge_record_uses_parameters_only() {
        let records = assemble(&params(), &ExtractedFields::default());
        assert_eq!(records.len(), 1);
        let tge = &records[0];
        assert!(tge.is_tge());
        assert_eq!(tge.cumulative_secondary_burned, 0.0);
        assert_eq!(tge.cumulative_primary_minted, 1.0);
        assert_eq!(tge.primary_minted_in_epoch, 1.0);
        assert_eq!(tge.usd_cost_per_token, 0.0);
        assert_eq!(tge.cumulative_usd_cost, 0.0);
        assert!((tge.supply_minted_pct - 0.0001).abs() < 1e-12);
    }

    #[test]
    fn empty_epoch_vectors_yield_tge_only() {
        let fields = extract("minted_per_epoch_data_x = vec {}; minted_per_epoch_data_y = vec {}");
        assert_eq!(assemble(&params(), &fields).len(), 1);
    }

    #[test]
    fn epochs_convert_subunits_and_keep_labels() {
        let fields = ExtractedFields::default()
            .with_labels(["Epoch 1", "Epoch 2"])
            .with_vector(FieldName::CumulativeSupplyDataX, vec![1e14, 3e14])
            .with_vector(FieldName::CumulativeSupplyDataY, vec![5e13, 1e14])
            .with_vector(FieldName::MintedPerEpochDataY, vec![5e13, 5e13])
            .with_vector(FieldName::CostToMintDataY, vec![0.0, 0.01, 0.02])
            .with_vector(FieldName::CumulativeUsdCostDataY, vec![5000.0, 15000.0]);

        let records = assemble(&params(), &fields);
        assert_eq!(records.len(), 3);

        let e1 = &records[1];
        assert_eq!(e1.epoch_label, "Epoch 1");
        assert_eq!(e1.cumulative_secondary_burned, 1_000_000.0);
        assert_eq!(e1.cumulative_primary_minted, 500_000.0);
        assert_eq!(e1.primary_minted_in_epoch, 500_000.0);
        assert_eq!(e1.usd_cost_per_token, 0.01);
        assert_eq!(e1.cumulative_usd_cost, 5000.0);
        assert_eq!(e1.supply_minted_pct, 50.0);

        let e2 = &records[2];
        assert_eq!(e2.usd_cost_per_token, 0.02);
        assert_eq!(e2.supply_minted_pct, 100.0);
    }

    #[test]
    fn tge_cost_is_index_zero_and_first_epoch_reads_index_one() {
        let raw = r#"minted_per_epoch_data_x = vec { "Epoch 1" };
                     cost_to_mint_data_y = vec { 0 : float64; 2.5 : float64 }"#;
        let records = assemble(&params(), &extract(raw));
        assert_eq!(records[0].usd_cost_per_token, 0.0);
        assert_eq!(records[1].usd_cost_per_token, 2.5);
    }

    #[test]
    fn short_vectors_pad_with_zero() {
        let fields = ExtractedFields::default()
            .with_labels(["Epoch 1", "Epoch 2", "Epoch 3"])
            .with_vector(FieldName::CumulativeSupplyDataY, vec![1e8]);
        let records = assemble(&params(), &fields);
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].cumulative_primary_minted, 1.0);
        assert_eq!(records[3].cumulative_primary_minted, 0.0);
        assert_eq!(records[3].usd_cost_per_token, 0.0);
        assert_eq!(records[3].cumulative_usd_cost, 0.0);
    }

    proptest! {
        #[test]
        fn tge_is_always_first(
            n in 0usize..16,
            tge in 0u64..1_000_000,
            supply in 1u64..10_000_000,
        ) {
            let p = ParameterSet::new(
                "P",
                whole_to_subunits(supply),
                whole_to_subunits(tge),
                whole_to_subunits(100),
                50,
                whole_to_subunits(10),
            ).expect("valid params");
            let labels: Vec<String> = (1..=n).map(|i| format!("Epoch {i}")).collect();
            let fields = ExtractedFields::default().with_labels(labels);
            let records = assemble(&p, &fields);
            prop_assert_eq!(records.len(), n + 1);
            prop_assert!(records[0].is_tge());
            prop_assert_eq!(records[0].cumulative_secondary_burned, 0.0);
        }

        #[test]
        fn cumulative_minted_is_monotone_for_well_formed_data(
            tge in 0u64..1_000,
            mints in proptest::collection::vec(1u64..1_000_000, 0..12),
        ) {
            let p = ParameterSet::new(
                "M",
                whole_to_subunits(100_000_000),
                whole_to_subunits(tge),
                whole_to_subunits(1_000),
                50,
                whole_to_subunits(10),
            ).expect("valid params");

            let mut cumulative = whole_to_subunits(tge) as f64;
            let mut cumulative_y = Vec::new();
            let mut per_epoch = Vec::new();
            for m in &mints {
                let m = whole_to_subunits(*m) as f64;
                cumulative += m;
                cumulative_y.push(cumulative);
                per_epoch.push(m);
            }
            let labels: Vec<String> = (1..=mints.len()).map(|i| format!("Epoch {i}")).collect();
            let fields = ExtractedFields::default()
                .with_labels(labels)
                .with_vector(FieldName::CumulativeSupplyDataY, cumulative_y)
                .with_vector(FieldName::MintedPerEpochDataY, per_epoch);

            let records = assemble(&p, &fields);
            for pair in records.windows(2) {
                prop_assert!(pair[1].cumulative_primary_minted >= pair[0].cumulative_primary_minted);
            }
        }
    }
}
