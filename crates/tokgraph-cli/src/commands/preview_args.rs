//! `tokgraph preview-args`

use anyhow::Result;
use tokgraph_core::scenarios;

pub fn run(id: String) -> Result<()> {
    let Some(scenario) = scenarios::find(&id) else {
        anyhow::bail!("unknown scenario: {id}");
    };
    println!("{}", scenario.to_preview_args());
    Ok(())
}
