//! Batch execution: raw response files in, one [`TestOutcome`] per parameter set out.
//!
//! Raw batches are line-oriented, one `test_id|response text` per line. Test cases are
//! independent, so the runner fans them out over a rayon pool; outcomes keep input order.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::assemble::assemble;
use crate::assess::{assess, Finding};
use crate::cache::ExtractionCache;
use crate::config::TokgraphConfig;
use crate::derive::derive;
use crate::extract::{extract, ExtractedFields, ExtractionQuality};
use crate::metrics::{timed_case, PipelineMetrics, PipelineMetricsSnapshot};
use crate::types::{EpochRecord, ParameterSet, RawResponse, TestMetrics};
use crate::{Result, TokgraphError};

// =============================================================================
// Raw batch input
// =============================================================================

/// Parse `test_id|text` lines. Lines without a `|` (or with an empty id) are skipped.
pub fn parse_raw_batch(content: &str) -> Vec<RawResponse> {
    content
        .lines()
        .filter_map(|line| {
            let (id, text) = line.split_once('|')?;
            let id = id.trim();
            (!id.is_empty()).then(|| RawResponse::new(id, text))
        })
        .collect()
}

/// Read and parse a raw batch file.
pub fn load_raw_batch(path: impl AsRef<Path>) -> Result<Vec<RawResponse>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| TokgraphError::InputUnavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let responses = parse_raw_batch(&content);
    debug!(path = %path.display(), responses = responses.len(), "loaded raw batch");
    Ok(responses)
}

/// One parameter set with the engine's answer for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub params: ParameterSet,
    pub response: RawResponse,
}

/// Join parameter sets with responses by `test_id`.
///
/// Parameter sets without a response get [`RawResponse::missing`]. Responses without a
/// parameter set are dropped with a warning. For duplicate response ids the last line wins.
pub fn pair_cases(params: Vec<ParameterSet>, responses: Vec<RawResponse>) -> Vec<TestCase> {
    let mut by_id: HashMap<String, RawResponse> = responses
        .into_iter()
        .map(|r| (r.test_id.clone(), r))
        .collect();

    let cases: Vec<TestCase> = params
        .into_iter()
        .map(|params| {
            let response = by_id
                .remove(&params.test_id)
                .unwrap_or_else(|| RawResponse::missing(params.test_id.clone()));
            TestCase { params, response }
        })
        .collect();

    let mut orphans: Vec<String> = by_id.into_keys().collect();
    orphans.sort_unstable();
    for test_id in orphans {
        warn!(test_id = %test_id, "response has no matching parameter set; dropped");
    }

    cases
}

// =============================================================================
// Outcomes
// =============================================================================

/// Everything produced for one test case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub params: ParameterSet,
    pub epochs: Vec<EpochRecord>,
    pub metrics: TestMetrics,
    pub quality: ExtractionQuality,
    pub findings: Vec<Finding>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_tests: usize,
    /// Tests with at least one epoch.
    pub valid_tests: usize,
    pub low_valuation_tests: usize,
    pub degenerate_tests: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<TestOutcome>,
    pub counters: PipelineMetricsSnapshot,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total_tests: self.outcomes.len(),
            ..BatchSummary::default()
        };
        for outcome in &self.outcomes {
            if outcome.metrics.epochs_generated > 0 {
                summary.valid_tests += 1;
            } else {
                summary.degenerate_tests += 1;
            }
            if !outcome.metrics.valuation_valid {
                summary.low_valuation_tests += 1;
            }
        }
        summary
    }

    pub fn outcome(&self, test_id: &str) -> Option<&TestOutcome> {
        self.outcomes.iter().find(|o| o.params.test_id == test_id)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TokgraphError::Serialization(e.to_string()))
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Runs extract → assemble → derive → assess over a set of test cases.
pub struct BatchRunner {
    config: TokgraphConfig,
    cache: Option<ExtractionCache>,
}

impl BatchRunner {
    pub fn new(config: TokgraphConfig) -> Self {
        let cache = config.batch.memoize.then(ExtractionCache::new);
        Self { config, cache }
    }

    pub fn run(&self, cases: &[TestCase]) -> BatchReport {
        let metrics = PipelineMetrics::new();

        let outcomes = if self.config.batch.parallel && cases.len() > 1 {
            self.run_parallel(cases, &metrics)
        } else {
            cases.iter().map(|c| self.run_case(c, &metrics)).collect()
        };

        let report = BatchReport {
            outcomes,
            counters: metrics.snapshot(),
        };
        let summary = report.summary();
        info!(
            total = summary.total_tests,
            valid = summary.valid_tests,
            low_valuation = summary.low_valuation_tests,
            degenerate = summary.degenerate_tests,
            "batch complete"
        );
        report
    }

    fn run_parallel(&self, cases: &[TestCase], metrics: &PipelineMetrics) -> Vec<TestOutcome> {
        let fan_out =
            || -> Vec<TestOutcome> { cases.par_iter().map(|c| self.run_case(c, metrics)).collect() };

        match self.config.batch.max_workers {
            0 => fan_out(),
            workers => match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => pool.install(fan_out),
                Err(e) => {
                    warn!("worker pool unavailable, using global pool: {}", e);
                    fan_out()
                }
            },
        }
    }

    fn run_case(&self, case: &TestCase, metrics: &PipelineMetrics) -> TestOutcome {
        let _span = info_span!("test_case", test_id = %case.params.test_id).entered();

        timed_case(metrics, || {
            let fields = match case.response.text.as_deref() {
                Some(text) => {
                    let fields = self.extract_fields(text, metrics);
                    metrics.record_quality(fields.quality(), fields.length_mismatches().len());
                    fields
                }
                None => {
                    warn!("no engine response; treating every field as absent");
                    metrics.responses_missing.inc();
                    Arc::new(extract(""))
                }
            };

            let epochs = assemble(&case.params, &fields);
            let test_metrics = derive(&case.params, &epochs);
            if test_metrics.epochs_generated == 0 {
                metrics.degenerate_tests.inc();
            }
            if !test_metrics.valuation_valid {
                metrics.invalid_valuations.inc();
            }
            let findings = assess(&case.params, &test_metrics, &self.config.assessment);

            debug!(
                epochs = test_metrics.epochs_generated,
                final_cost = test_metrics.final_mint_cost,
                findings = findings.len(),
                "test case processed"
            );

            TestOutcome {
                params: case.params.clone(),
                epochs,
                metrics: test_metrics,
                quality: fields.quality().clone(),
                findings,
            }
        })
    }

    fn extract_fields(&self, text: &str, metrics: &PipelineMetrics) -> Arc<ExtractedFields> {
        match &self.cache {
            Some(cache) => {
                let (fields, hit) = cache.get_or_extract(text);
                if hit {
                    metrics.cache_hits.inc();
                }
                fields
            }
            None => Arc::new(extract(text)),
        }
    }
}
