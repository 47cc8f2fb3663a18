//! Configuration management for tokgraph.
//!
//! # Configuration Sources
//!
//! Configuration can be loaded from:
//! - Environment variables (prefixed with `TOKGRAPH_`)
//! - JSON files (see the CLI `--config` flag)
//! - Programmatic defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use tokgraph_core::config::TokgraphConfig;
//!
//! let config = TokgraphConfig::builder()
//!     .parallel(true)
//!     .max_workers(4)
//!     .build()?;
//! ```

use crate::{Result, TokgraphError};
use serde::{Deserialize, Serialize};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Upper bound on the batch worker pool size.
pub const MAX_WORKERS: usize = 256;

/// Complete tokgraph configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokgraphConfig {
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Batch execution configuration.
    pub batch: BatchConfig,

    /// Thresholds used when assessing parameter sets.
    pub assessment: AssessmentConfig,
}

impl TokgraphConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TokgraphConfigBuilder {
        TokgraphConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Looks for variables prefixed with `TOKGRAPH_`:
    /// - `TOKGRAPH_LOG_LEVEL` - Logging level (trace, debug, info, warn, error)
    /// - `TOKGRAPH_PARALLEL` - Fan test cases out over a worker pool (true/false)
    /// - `TOKGRAPH_MAX_WORKERS` - Worker pool size (0 = one per core)
    /// - `TOKGRAPH_MEMOIZE` - Reuse extraction results for identical responses (true/false)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`TokgraphConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(level) = lookup("TOKGRAPH_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(parallel) = lookup("TOKGRAPH_PARALLEL") {
            config.batch.parallel = parallel.parse().map_err(|e| {
                TokgraphError::Config(format!("Invalid TOKGRAPH_PARALLEL: {}", e))
            })?;
        }

        if let Some(workers) = lookup("TOKGRAPH_MAX_WORKERS") {
            config.batch.max_workers = workers.parse().map_err(|e| {
                TokgraphError::Config(format!("Invalid TOKGRAPH_MAX_WORKERS: {}", e))
            })?;
        }

        if let Some(memoize) = lookup("TOKGRAPH_MEMOIZE") {
            config.batch.memoize = memoize.parse().map_err(|e| {
                TokgraphError::Config(format!("Invalid TOKGRAPH_MEMOIZE: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TokgraphError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(TokgraphError::Config(format!(
                "log level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.logging.level
            )));
        }

        if self.batch.max_workers > MAX_WORKERS {
            return Err(TokgraphError::Config(format!(
                "max_workers must be at most {}",
                MAX_WORKERS
            )));
        }

        let a = &self.assessment;
        if a.min_fair_epochs > a.max_epochs {
            return Err(TokgraphError::Config(
                "min_fair_epochs must not exceed max_epochs".into(),
            ));
        }
        if a.halving_warn_below > a.halving_warn_above || a.halving_warn_above > 100 {
            return Err(TokgraphError::Config(
                "halving warning bounds must satisfy below <= above <= 100".into(),
            ));
        }
        if !(0.0..=1.0).contains(&a.max_reward_share) {
            return Err(TokgraphError::Config(
                "max_reward_share must be within [0, 1]".into(),
            ));
        }

        Ok(())
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// JSON output format.
    pub json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json_output: false,
        }
    }
}

/// Batch execution configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Process test cases on a worker pool.
    pub parallel: bool,

    /// Worker pool size; 0 lets the pool pick one thread per core.
    pub max_workers: usize,

    /// Reuse extraction results for byte-identical responses.
    pub memoize: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_workers: 0,
            memoize: false,
        }
    }
}

/// Thresholds for parameter findings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Fewer epochs than this is an unfair launch.
    pub min_fair_epochs: usize,

    /// More epochs than this is an extended distribution.
    pub max_epochs: usize,

    /// Halving steps below this front-load the distribution.
    pub halving_warn_below: u64,

    /// Halving steps above this inflate later epochs.
    pub halving_warn_above: u64,

    /// Largest initial reward, as a share of the non-TGE supply.
    pub max_reward_share: f64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            min_fair_epochs: 3,
            max_epochs: 30,
            halving_warn_below: 40,
            halving_warn_above: 75,
            max_reward_share: 0.1,
        }
    }
}

/// Builder for TokgraphConfig.
#[derive(Default)]
pub struct TokgraphConfigBuilder {
    config: TokgraphConfig,
}

impl TokgraphConfigBuilder {
    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Enable JSON log output.
    pub fn json_logs(mut self, enabled: bool) -> Self {
        self.config.logging.json_output = enabled;
        self
    }

    /// Enable or disable the worker pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.batch.parallel = parallel;
        self
    }

    /// Set the worker pool size.
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.config.batch.max_workers = workers;
        self
    }

    /// Enable extraction memoization.
    pub fn memoize(mut self, memoize: bool) -> Self {
        self.config.batch.memoize = memoize;
        self
    }

    /// Replace the assessment thresholds.
    pub fn assessment(mut self, assessment: AssessmentConfig) -> Self {
        self.config.assessment = assessment;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<TokgraphConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
