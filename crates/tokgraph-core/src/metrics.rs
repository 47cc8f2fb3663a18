//! Pipeline counters for data-quality auditing.
//!
//! - **Counters**: responses processed, missing fields, conversion failures, degenerate tests
//! - **Latency**: per-test-case processing time
//!
//! # Usage
//!
//! ```rust,ignore
//! use tokgraph_core::metrics::{PipelineMetrics, timed_case};
//!
//! let metrics = PipelineMetrics::new();
//! let outcome = timed_case(&metrics, || run_one(case));
//! let snapshot = metrics.snapshot();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::extract::ExtractionQuality;

// =============================================================================
// Metric Types
// =============================================================================

/// Monotonic event count.
#[derive(Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Upper bounds (ms) of the latency buckets; one overflow bucket follows.
pub const CASE_LATENCY_BOUNDS_MS: [f64; 6] = [0.1, 1.0, 5.0, 25.0, 100.0, 500.0];

/// Per-case latency distribution, stored in whole microseconds.
#[derive(Default)]
pub struct CaseLatency {
    buckets: [AtomicU64; CASE_LATENCY_BOUNDS_MS.len() + 1],
    total_micros: AtomicU64,
    cases: AtomicU64,
}

impl CaseLatency {
    pub fn record(&self, elapsed_ms: f64) {
        let bucket = CASE_LATENCY_BOUNDS_MS
            .iter()
            .position(|bound| elapsed_ms <= *bound)
            .unwrap_or(CASE_LATENCY_BOUNDS_MS.len());
        self.buckets[bucket].fetch_add(1, Ordering::Relaxed);
        self.total_micros
            .fetch_add((elapsed_ms * 1000.0) as u64, Ordering::Relaxed);
        self.cases.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cases(&self) -> u64 {
        self.cases.load(Ordering::Relaxed)
    }

    pub fn mean_ms(&self) -> f64 {
        match self.cases() {
            0 => 0.0,
            n => self.total_micros.load(Ordering::Relaxed) as f64 / 1000.0 / n as f64,
        }
    }

    /// Cases per bucket, overflow last.
    pub fn histogram(&self) -> Vec<u64> {
        self.buckets
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect()
    }
}

// =============================================================================
// Pipeline Metrics Collection
// =============================================================================

/// Counters shared by every test case of a batch.
pub struct PipelineMetrics {
    pub responses_total: Counter,
    pub responses_missing: Counter,
    pub fields_missing: Counter,
    pub conversion_failures: Counter,
    pub length_mismatches: Counter,
    pub truncated_fields: Counter,
    pub degenerate_tests: Counter,
    pub invalid_valuations: Counter,
    pub cache_hits: Counter,

    pub case_latency: CaseLatency,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            responses_total: Counter::default(),
            responses_missing: Counter::default(),
            fields_missing: Counter::default(),
            conversion_failures: Counter::default(),
            length_mismatches: Counter::default(),
            truncated_fields: Counter::default(),
            degenerate_tests: Counter::default(),
            invalid_valuations: Counter::default(),
            cache_hits: Counter::default(),

            case_latency: CaseLatency::default(),
        }
    }

    /// Fold one extraction's quality flags into the counters.
    pub fn record_quality(&self, quality: &ExtractionQuality, length_mismatches: usize) {
        self.fields_missing
            .add(quality.missing_fields.len() as u64);
        self.truncated_fields
            .add(quality.truncated_fields.len() as u64);
        self.conversion_failures
            .add(quality.conversion_failures.len() as u64);
        self.length_mismatches.add(length_mismatches as u64);
    }

    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            responses_total: self.responses_total.get(),
            responses_missing: self.responses_missing.get(),
            fields_missing: self.fields_missing.get(),
            conversion_failures: self.conversion_failures.get(),
            length_mismatches: self.length_mismatches.get(),
            truncated_fields: self.truncated_fields.get(),
            degenerate_tests: self.degenerate_tests.get(),
            invalid_valuations: self.invalid_valuations.get(),
            cache_hits: self.cache_hits.get(),
            mean_case_latency_ms: self.case_latency.mean_ms(),
            case_latency_histogram: self.case_latency.histogram(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`PipelineMetrics`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetricsSnapshot {
    pub responses_total: u64,
    pub responses_missing: u64,
    pub fields_missing: u64,
    pub conversion_failures: u64,
    pub length_mismatches: u64,
    pub truncated_fields: u64,
    pub degenerate_tests: u64,
    pub invalid_valuations: u64,
    pub cache_hits: u64,
    pub mean_case_latency_ms: f64,
    /// Cases per [`CASE_LATENCY_BOUNDS_MS`] bucket, overflow last.
    pub case_latency_histogram: Vec<u64>,
}

// =============================================================================
// Instrumented Stage Timer
// =============================================================================

/// Timer for measuring per-case latency.
pub struct StageTimer<'a> {
    latency: &'a CaseLatency,
    start: Instant,
}

impl<'a> StageTimer<'a> {
    pub fn start(latency: &'a CaseLatency) -> Self {
        Self {
            latency,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for StageTimer<'a> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.latency.record(elapsed.as_secs_f64() * 1000.0);
    }
}

/// Run one test case with timing.
pub fn timed_case<F, T>(metrics: &PipelineMetrics, f: F) -> T
where
    F: FnOnce() -> T,
{
    let _timer = StageTimer::start(&metrics.case_latency);
    metrics.responses_total.inc();
    f()
}

// =============================================================================
// Tests
// =============================================================================
