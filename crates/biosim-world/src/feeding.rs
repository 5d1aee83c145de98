//! Fodder regrowth, grazing and predation.

use crate::animal::Population;
use crate::grid::{Cell, Grid};
use biosim_core::{AnimalId, Diet, ParameterStore, Species, SpeciesParams};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Totals from one feeding pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedingOutcome {
    pub fodder_eaten: f64,
    pub kills: usize,
}

impl FeedingOutcome {
    fn merge(&mut self, other: FeedingOutcome) {
        self.fodder_eaten += other.fodder_eaten;
        self.kills += other.kills;
    }
}

/// Run the feeding phase on every cell
pub fn feed(
    grid: &mut Grid,
    population: &mut Population,
    params: &ParameterStore,
    rng: &mut ChaCha8Rng,
) -> FeedingOutcome {
    let mut outcome = FeedingOutcome::default();
    for cell in grid.cells_mut() {
        outcome.merge(feed_cell(cell, population, params, rng));
    }
    outcome
}

/// Regrow the cell's fodder, then let grazers eat and predators hunt
pub fn feed_cell(
    cell: &mut Cell,
    population: &mut Population,
    params: &ParameterStore,
    rng: &mut ChaCha8Rng,
) -> FeedingOutcome {
    cell.regrow(params.f_max(cell.terrain()));

    let mut outcome = FeedingOutcome::default();
    for species in Species::all() {
        let species_params = params.species(species);
        match species_params.diet {
            Diet::Fodder => {
                outcome.fodder_eaten += graze(cell, population, species, species_params);
            }
            Diet::Prey { prey, delta_phi_max } => {
                outcome.kills += hunt(
                    cell,
                    population,
                    (species, species_params),
                    (prey, params.species(prey)),
                    delta_phi_max,
                    rng,
                );
            }
        }
    }
    outcome
}

/// Probability that a predator kills a prey, given both fitnesses
pub fn kill_probability(predator_fitness: f64, prey_fitness: f64, delta_phi_max: f64) -> f64 {
    let advantage = predator_fitness - prey_fitness;
    if advantage <= 0.0 {
        0.0
    } else if advantage > delta_phi_max {
        1.0
    } else {
        advantage / delta_phi_max
    }
}

fn ranked(ids: &[AnimalId], population: &Population, params: &SpeciesParams) -> Vec<(AnimalId, f64)> {
    ids.iter()
        .filter_map(|id| population.get(*id).map(|animal| (*id, animal.fitness(params))))
        .collect()
}

/// Fittest first; equal fitness keeps arrival order
fn fittest_first(ids: &[AnimalId], population: &Population, params: &SpeciesParams) -> Vec<AnimalId> {
    let mut ranking = ranked(ids, population, params);
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranking.into_iter().map(|(id, _)| id).collect()
}

fn graze(cell: &mut Cell, population: &mut Population, species: Species, params: &SpeciesParams) -> f64 {
    let mut total = 0.0;
    for id in fittest_first(cell.members(species), population, params) {
        if cell.fodder() <= 0.0 {
            break;
        }
        if let Some(animal) = population.get_mut(id) {
            let eaten = cell.consume(params.appetite);
            animal.gain_weight(eaten, params);
            total += eaten;
        }
    }
    total
}

fn hunt(
    cell: &mut Cell,
    population: &mut Population,
    (predator, predator_params): (Species, &SpeciesParams),
    (prey, prey_params): (Species, &SpeciesParams),
    delta_phi_max: f64,
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut kills = 0;

    for hunter_id in fittest_first(cell.members(predator), population, predator_params) {
        let mut appetite = predator_params.appetite;

        // weakest prey first
        let mut candidates = ranked(cell.members(prey), population, prey_params);
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (prey_id, prey_fitness) in candidates {
            if appetite <= 0.0 {
                break;
            }
            let hunter_fitness = match population.get(hunter_id) {
                Some(hunter) => hunter.fitness(predator_params),
                None => break,
            };

            let p = kill_probability(hunter_fitness, prey_fitness, delta_phi_max);
            if rng.gen::<f64>() >= p {
                continue;
            }

            if let Some(victim) = population.remove(prey_id) {
                cell.remove_member(prey, prey_id);
                let eaten = victim.weight.min(appetite);
                appetite -= eaten;
                if let Some(hunter) = population.get_mut(hunter_id) {
                    hunter.gain_weight(eaten, predator_params);
                }
                kills += 1;
                trace!(
                    hunter = %hunter_id,
                    victim = %prey_id,
                    eaten,
                    location = %cell.location(),
                    "Prey killed"
                );
            }
        }
    }

    kills
}
