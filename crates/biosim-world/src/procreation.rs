//! Births and maternal weight loss.

use crate::animal::{birth_weight, Population};
use crate::grid::{Cell, Grid};
use biosim_core::{ParameterStore, Species, SpeciesParams};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Run the procreation phase on every cell; returns the number of newborns
pub fn procreate(
    grid: &mut Grid,
    population: &mut Population,
    params: &ParameterStore,
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut births = 0;
    for cell in grid.cells_mut() {
        for species in Species::all() {
            births += procreate_species(cell, population, species, params.species(species), rng);
        }
    }
    births
}

/// Give every eligible animal of `species` in the cell one chance to give birth.
///
/// The same-species head count is taken before any birth, and newborns are
/// only added to the cell once every mother has had her turn.
pub fn procreate_species(
    cell: &mut Cell,
    population: &mut Population,
    species: Species,
    params: &SpeciesParams,
    rng: &mut ChaCha8Rng,
) -> usize {
    let head_count = cell.count(species);
    if head_count < 2 {
        return 0;
    }

    let threshold = params.procreation_threshold();
    let mut newborn_weights = Vec::new();

    for &id in cell.members(species) {
        let mother = match population.get_mut(id) {
            Some(animal) if !animal.is_newborn() => animal,
            _ => continue,
        };
        if mother.weight < threshold {
            continue;
        }

        let baby_weight = birth_weight(params, rng);
        let p = (params.gamma * mother.fitness(params) * head_count as f64).min(1.0);
        if rng.gen::<f64>() >= p {
            continue;
        }

        // too small a mother simply fails to give birth
        if mother.lose_birth_weight(baby_weight, params) {
            newborn_weights.push(baby_weight);
        }
    }

    let location = cell.location();
    for &weight in &newborn_weights {
        let id = population.spawn_newborn(species, location, weight);
        cell.add_member(species, id);
    }

    if !newborn_weights.is_empty() {
        trace!(%species, %location, births = newborn_weights.len(), "Animals born");
    }
    newborn_weights.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosim_core::{AnimalId, Location, Terrain};
    use rand::SeedableRng;

    fn lowland_with(population: &mut Population, species: Species, animals: &[(u32, f64)]) -> (Cell, Vec<AnimalId>) {
        let mut cell = Cell::new(Location::new(2, 2), Terrain::Lowland, 800.0);
        let ids = animals
            .iter()
            .map(|&(age, weight)| {
                let id = population.spawn(species, cell.location(), age, weight);
                cell.add_member(species, id);
                id
            })
            .collect();
        (cell, ids)
    }

    fn fertile_params() -> SpeciesParams {
        let mut params = SpeciesParams::defaults(Species::Herbivore);
        params.gamma = 1000.0;
        params
    }

    #[test]
    fn test_single_animal_cannot_procreate() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut population = Population::new();
        let (mut cell, _) = lowland_with(&mut population, Species::Herbivore, &[(5, 100.0)]);

        let births = procreate_species(&mut cell, &mut population, Species::Herbivore, &fertile_params(), &mut rng);
        assert_eq!(births, 0);
        assert_eq!(population.len(), 1);
    }

    #[test]
    fn test_certain_births_transfer_weight() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let params = fertile_params();
        let mut population = Population::new();
        let (mut cell, mothers) =
            lowland_with(&mut population, Species::Herbivore, &[(5, 100.0), (5, 100.0)]);

        let births = procreate_species(&mut cell, &mut population, Species::Herbivore, &params, &mut rng);
        assert_eq!(births, 2);
        assert_eq!(cell.count(Species::Herbivore), 4);
        assert_eq!(population.len(), 4);

        let lost: f64 = mothers
            .iter()
            .map(|id| 100.0 - population.get(*id).unwrap().weight)
            .sum();
        let newborn_weight: f64 = cell.members(Species::Herbivore)[2..]
            .iter()
            .map(|id| {
                let baby = population.get(*id).unwrap();
                assert_eq!(baby.age, 0);
                assert!(baby.is_newborn());
                baby.weight
            })
            .sum();
        assert!((lost - params.xi * newborn_weight).abs() < 1e-9);
    }

    #[test]
    fn test_light_animals_do_not_procreate() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let params = fertile_params();
        let mut population = Population::new();
        // below zeta * (w_birth + sigma_birth) = 33.25
        let (mut cell, _) =
            lowland_with(&mut population, Species::Herbivore, &[(5, 33.0), (5, 30.0), (5, 20.0)]);

        let births = procreate_species(&mut cell, &mut population, Species::Herbivore, &params, &mut rng);
        assert_eq!(births, 0);
        assert_eq!(cell.count(Species::Herbivore), 3);
    }

    #[test]
    fn test_no_births_without_gamma() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut params = SpeciesParams::defaults(Species::Carnivore);
        params.gamma = 0.0;
        let mut population = Population::new();
        let (mut cell, _) =
            lowland_with(&mut population, Species::Carnivore, &[(5, 80.0), (5, 80.0), (5, 80.0)]);

        let births = procreate_species(&mut cell, &mut population, Species::Carnivore, &params, &mut rng);
        assert_eq!(births, 0);
    }

    #[test]
    fn test_newborns_wait_a_year() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let params = fertile_params();
        let mut population = Population::new();
        let mut cell = Cell::new(Location::new(2, 2), Terrain::Lowland, 800.0);
        for _ in 0..3 {
            let id = population.spawn_newborn(Species::Herbivore, cell.location(), 100.0);
            cell.add_member(Species::Herbivore, id);
        }

        let births = procreate_species(&mut cell, &mut population, Species::Herbivore, &params, &mut rng);
        assert_eq!(births, 0);
    }
}
