//! Ageing, metabolic weight loss and death.

use crate::animal::{Animal, Population};
use crate::grid::Grid;
use biosim_core::{AnimalId, ParameterStore, Species, SpeciesParams};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Whether an animal that has just aged and lost weight dies this year
pub fn dies(animal: &Animal, params: &SpeciesParams, rng: &mut ChaCha8Rng) -> bool {
    if !animal.is_alive() {
        return true;
    }
    let p = params.omega * (1.0 - animal.fitness(params));
    rng.gen::<f64>() < p
}

/// Age every animal, apply weight loss and remove the dead; returns the number of deaths
pub fn age_and_cull(
    grid: &mut Grid,
    population: &mut Population,
    params: &ParameterStore,
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut deaths = 0;

    for cell in grid.cells_mut() {
        for species in Species::all() {
            let species_params = params.species(species);
            let mut dead: Vec<AnimalId> = Vec::new();

            for &id in cell.members(species) {
                let Some(animal) = population.get_mut(id) else {
                    continue;
                };
                animal.grow_older();
                animal.lose_weight(species_params);
                if dies(animal, species_params, rng) {
                    dead.push(id);
                }
            }

            if dead.is_empty() {
                continue;
            }
            cell.retain_members(species, |id| !dead.contains(id));
            for id in &dead {
                population.remove(*id);
            }
            trace!(%species, location = %cell.location(), deaths = dead.len(), "Animals died");
            deaths += dead.len();
        }
    }

    deaths
}
