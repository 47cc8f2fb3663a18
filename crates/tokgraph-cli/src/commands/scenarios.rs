//! `tokgraph scenarios`

use anyhow::Result;
use tokgraph_core::scenarios::catalog;
use tokgraph_core::to_whole_units;

pub fn run(format: String) -> Result<()> {
    let scenarios = catalog();

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&scenarios)?);
        }
        "human" => {
            println!(
                "{:<4} {:>12} {:>8} {:>12} {:>4} {:>10}  description",
                "id", "max_supply", "tge", "burn_unit", "hs%", "reward"
            );
            for s in &scenarios {
                let p = &s.params;
                println!(
                    "{:<4} {:>12} {:>8} {:>12} {:>4} {:>10}  {}",
                    s.id(),
                    to_whole_units(p.primary_max_supply as f64),
                    to_whole_units(p.tge_allocation as f64),
                    to_whole_units(p.initial_secondary_burn as f64),
                    p.halving_step,
                    to_whole_units(p.initial_reward_per_burn_unit as f64),
                    s.description
                );
            }
            println!();
            println!("{} scenarios", scenarios.len());
        }
        _ => anyhow::bail!("unknown format: {format} (expected 'human' or 'json')"),
    }

    Ok(())
}
