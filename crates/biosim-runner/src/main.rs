//! Headless runner: loads a scenario, simulates it and logs the outcome.

mod telemetry;

use anyhow::{Context, Result};
use biosim_core::SimulationConfig;
use biosim_world::{Simulation, SimulationResult};
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = match std::env::args().nth(1) {
        Some(path) => load_scenario(Path::new(&path))?,
        None => {
            info!("No scenario given, using the built-in default");
            SimulationConfig::default()
        }
    };

    let result = run(config)?;
    info!(
        years = result.years,
        herbivores = result.final_counts.herbivores,
        carnivores = result.final_counts.carnivores,
        "Simulation finished"
    );
    for summary in &result.summaries {
        info!(
            species = %summary.species,
            count = summary.count,
            mean_age = summary.mean_age,
            mean_weight = summary.mean_weight,
            mean_fitness = summary.mean_fitness,
            "Species summary"
        );
    }

    println!("{}", serde_json::to_string_pretty(&result.final_counts)?);
    Ok(())
}

fn load_scenario(path: &Path) -> Result<SimulationConfig> {
    info!(path = %path.display(), "Loading scenario");
    SimulationConfig::from_path(path)
        .with_context(|| format!("failed to load scenario {}", path.display()))
}

fn run(config: SimulationConfig) -> Result<SimulationResult> {
    let years = config.num_years;
    let mut simulation = Simulation::new(config).context("invalid scenario")?;
    Ok(simulation.simulate(years))
}
