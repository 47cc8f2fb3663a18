//! CLI Command Implementations

pub mod analyze;
pub mod preview_args;
pub mod scenarios;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokgraph_core::TokgraphConfig;

/// Load config from an explicit JSON file, or from `TOKGRAPH_*` environment variables.
pub fn load_config(path: Option<PathBuf>) -> Result<TokgraphConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            Ok(TokgraphConfig::from_json(&content)?)
        }
        None => Ok(TokgraphConfig::from_env()?),
    }
}

/// Render `inf` for the cost-multiplier sentinel, two decimals otherwise.
pub(crate) fn fmt_multiplier(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}x")
    } else {
        "inf".to_string()
    }
}
