//! `tokgraph analyze`

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use tokgraph_core::batch::{load_raw_batch, pair_cases};
use tokgraph_core::metrics::PipelineMetricsSnapshot;
use tokgraph_core::scenarios::catalog;
use tokgraph_core::{
    BatchRunner, BatchSummary, EpochRecord, ExtractionQuality, Finding, ParameterSet,
    Recommendations, TestMetrics, TestOutcome, TokgraphConfig,
};

use super::fmt_multiplier;

#[derive(Serialize)]
struct OutcomeView<'a> {
    test_id: &'a str,
    metrics: &'a TestMetrics,
    quality: &'a ExtractionQuality,
    findings: &'a [Finding],
    #[serde(skip_serializing_if = "Option::is_none")]
    epochs: Option<&'a [EpochRecord]>,
}

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    outcomes: Vec<OutcomeView<'a>>,
    summary: BatchSummary,
    counters: &'a PipelineMetricsSnapshot,
    recommendations: Recommendations,
}

pub fn run(
    responses: PathBuf,
    params: Option<PathBuf>,
    format: String,
    epochs: bool,
    config: TokgraphConfig,
) -> Result<()> {
    if !matches!(format.as_str(), "json" | "human" | "report") {
        anyhow::bail!("unknown format: {format} (expected 'human', 'json' or 'report')");
    }

    let params = match params {
        Some(path) => load_params(&path)?,
        None => catalog().into_iter().map(|s| s.params).collect(),
    };
    let raw = load_raw_batch(&responses)?;
    let cases = pair_cases(params, raw);

    let runner = BatchRunner::new(config);
    let report = runner.run(&cases);

    if format == "report" {
        println!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    let output = AnalyzeOutput {
        outcomes: report
            .outcomes
            .iter()
            .map(|o| OutcomeView {
                test_id: &o.params.test_id,
                metrics: &o.metrics,
                quality: &o.quality,
                findings: &o.findings,
                epochs: epochs.then_some(o.epochs.as_slice()),
            })
            .collect(),
        summary: report.summary(),
        counters: &report.counters,
        recommendations: Recommendations::default(),
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_human(&report.outcomes, &output, epochs);
    }

    Ok(())
}

fn load_params(path: &Path) -> Result<Vec<ParameterSet>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read parameter sets {}", path.display()))?;
    let params: Vec<ParameterSet> = serde_json::from_str(&content)
        .with_context(|| format!("invalid parameter sets in {}", path.display()))?;
    for p in &params {
        p.validate()?;
    }
    Ok(params)
}

fn print_human(outcomes: &[TestOutcome], output: &AnalyzeOutput<'_>, epochs: bool) {
    println!(
        "{:<6} {:>6} {:>12} {:>12} {:>10} {:>16} {:>12}",
        "test", "epochs", "initial_$", "final_$", "mult", "total_usd", "valuation"
    );
    for o in outcomes {
        let m = &o.metrics;
        println!(
            "{:<6} {:>6} {:>12.4} {:>12.4} {:>10} {:>16.2} {:>12}",
            m.test_id,
            m.epochs_generated,
            m.initial_mint_cost,
            m.final_mint_cost,
            fmt_multiplier(m.cost_multiplier),
            m.total_valuation,
            if m.valuation_valid { "ok" } else { "LOW" }
        );
        for f in &o.findings {
            println!("       [{:?}] {}", f.severity, f.message);
        }
        if !o.quality.is_clean() {
            println!(
                "       quality: {} missing, {} truncated, {} conversion failures",
                o.quality.missing_fields.len(),
                o.quality.truncated_fields.len(),
                o.quality.conversion_failures.len()
            );
        }
        if epochs {
            for r in &o.epochs {
                println!(
                    "         {:<10} burned={:<14} minted={:<14} +{:<12} ${:<10.4} cum=${:<14.2} {:.2}%",
                    r.epoch_label,
                    r.cumulative_secondary_burned,
                    r.cumulative_primary_minted,
                    r.primary_minted_in_epoch,
                    r.usd_cost_per_token,
                    r.cumulative_usd_cost,
                    r.supply_minted_pct
                );
            }
        }
    }

    let s = &output.summary;
    println!();
    println!("Summary");
    println!("  total tests        = {}", s.total_tests);
    println!("  valid tests        = {}", s.valid_tests);
    println!("  low valuation      = {}", s.low_valuation_tests);
    println!("  degenerate         = {}", s.degenerate_tests);
    println!("  missing responses  = {}", output.counters.responses_missing);
    println!("  conversion failures= {}", output.counters.conversion_failures);

    let r = &output.recommendations;
    println!();
    println!("Recommended ranges");
    println!("  halving step       = {}-{}%", r.halving_step_min, r.halving_step_max);
    println!(
        "  burn unit          >= {} (recommended {})",
        r.burn_unit_min, r.burn_unit_recommended
    );
    println!("  epochs             = {}-{}", r.epochs_min, r.epochs_max);
}
