//! The island: grid, population, parameters and the yearly cycle.

use crate::animal::{birth_weight, AnimalData, Population};
use crate::feeding::feed;
use crate::grid::Grid;
use crate::lifecycle::age_and_cull;
use crate::migration::migrate;
use crate::procreation::procreate;
use biosim_core::{
    Error, Location, ParameterStore, PopulationRecord, Result, Species, SpeciesCounts,
    SpeciesSummary, Terrain,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// What happened during one simulated year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Year count after the cycle
    pub year: u64,
    pub births: usize,
    pub deaths: usize,
    pub kills: usize,
    pub migrations: usize,
    pub fodder_eaten: f64,
}

/// Everything collaborators read about the animals, gathered in one pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationSnapshot {
    pub by_species: BTreeMap<Species, Vec<AnimalData>>,
    pub counts: SpeciesCounts,
    pub per_cell: BTreeMap<Location, SpeciesCounts>,
}

/// A bounded island where herbivores and carnivores live year by year
#[derive(Debug)]
pub struct Island {
    grid: Grid,
    population: Population,
    params: ParameterStore,
    rng: ChaCha8Rng,
    year: u64,
}

/// A placement that passed validation
struct Placement {
    loc: Location,
    species: Species,
    age: u32,
    weight: Option<f64>,
}

impl Island {
    /// Island with default parameters and a generator seeded from `seed`
    pub fn new(map: &str, seed: u64) -> Result<Self> {
        Self::with_parameters(map, ParameterStore::new(), ChaCha8Rng::seed_from_u64(seed))
    }

    /// Island drawing from a caller-supplied generator
    pub fn with_rng(map: &str, rng: ChaCha8Rng) -> Result<Self> {
        Self::with_parameters(map, ParameterStore::new(), rng)
    }

    pub fn with_parameters(map: &str, params: ParameterStore, rng: ChaCha8Rng) -> Result<Self> {
        let grid = Grid::parse(map, &params)?;
        debug!(rows = grid.rows, cols = grid.cols, "Island created");
        Ok(Self {
            grid,
            population: Population::new(),
            params,
            rng,
            year: 0,
        })
    }

    /// Island with an initial population in place
    pub fn populated(map: &str, seed: u64, records: &[PopulationRecord]) -> Result<Self> {
        let mut island = Self::new(map, seed)?;
        island.add_population(records)?;
        Ok(island)
    }

    pub fn year(&self) -> u64 {
        self.year
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    pub fn num_animals(&self) -> usize {
        self.population.len()
    }

    /// Place animals on the island.
    ///
    /// Every record is checked before anything is inserted, so a bad record
    /// leaves the island untouched. Each animal must be able to enter the
    /// terrain it is placed on. Missing ages default to 0 and missing
    /// weights are drawn from the species' birth-weight distribution.
    pub fn add_population(&mut self, records: &[PopulationRecord]) -> Result<()> {
        let placements = self.validate(records)?;

        for placement in &placements {
            let weight = match placement.weight {
                Some(weight) => weight,
                None => birth_weight(self.params.species(placement.species), &mut self.rng),
            };
            let id = self
                .population
                .spawn(placement.species, placement.loc, placement.age, weight);
            if let Some(cell) = self.grid.get_mut(placement.loc) {
                cell.add_member(placement.species, id);
            }
        }

        debug!(added = placements.len(), total = self.population.len(), "Population added");
        Ok(())
    }

    fn validate(&self, records: &[PopulationRecord]) -> Result<Vec<Placement>> {
        let mut placements = Vec::new();
        for record in records {
            let cell = self
                .grid
                .get(record.loc)
                .ok_or(Error::LocationOutOfBounds(record.loc))?;

            for animal in &record.pop {
                let species: Species = animal.species.parse()?;
                if !self.params.motion(species).can_enter(cell.terrain()) {
                    return Err(Error::ImpassableLocation(record.loc));
                }
                if let Some(weight) = animal.weight {
                    if !weight.is_finite() || weight <= 0.0 {
                        return Err(Error::InvalidAnimal(format!(
                            "{} at {} has weight {}",
                            species, record.loc, weight
                        )));
                    }
                }
                placements.push(Placement {
                    loc: record.loc,
                    species,
                    age: animal.age.unwrap_or(0),
                    weight: animal.weight,
                });
            }
        }
        Ok(placements)
    }

    /// Run feeding, procreation, migration and ageing once over every cell
    #[instrument(skip(self), fields(year = self.year))]
    pub fn yearly_cycle(&mut self) -> CycleReport {
        let feeding = feed(&mut self.grid, &mut self.population, &self.params, &mut self.rng);
        let births = procreate(&mut self.grid, &mut self.population, &self.params, &mut self.rng);
        let migrations = migrate(&mut self.grid, &mut self.population, &self.params, &mut self.rng);
        let deaths = age_and_cull(&mut self.grid, &mut self.population, &self.params, &mut self.rng);
        self.year += 1;

        let report = CycleReport {
            year: self.year,
            births,
            deaths,
            kills: feeding.kills,
            migrations,
            fodder_eaten: feeding.fodder_eaten,
        };
        debug!(
            births,
            deaths,
            kills = report.kills,
            migrations,
            alive = self.population.len(),
            "Year complete"
        );
        report
    }

    /// Override parameters of one species; invalid input changes nothing
    pub fn set_animal_parameters<K, I>(&mut self, species: Species, overrides: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        self.params.set_species_parameters(species, overrides)
    }

    /// Change a species' migration stride and the terrain it may enter
    pub fn set_motion<I>(&mut self, species: Species, stride: Option<f64>, movable: I) -> Result<()>
    where
        I: IntoIterator<Item = (char, bool)>,
    {
        self.params.set_motion(species, stride, movable)
    }

    /// Override parameters of the terrain with the given map letter
    pub fn set_terrain_parameters<K, I>(&mut self, letter: char, overrides: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let terrain = Terrain::from_letter(letter)
            .ok_or_else(|| Error::UnknownTerrainType(letter.to_string()))?;
        self.params.set_terrain_parameters(terrain, overrides)
    }

    /// Snapshots, totals and per-cell counts in one pass over the grid
    pub fn animals(&self) -> PopulationSnapshot {
        let mut snapshot = PopulationSnapshot::default();
        for species in Species::all() {
            snapshot.by_species.insert(species, Vec::new());
        }

        // Water cells only show up when a species that can enter them is there
        for cell in self.grid.cells().filter(|cell| cell.is_passable() || !cell.is_empty()) {
            let mut cell_counts = SpeciesCounts::default();
            for species in Species::all() {
                let params = self.params.species(species);
                for &id in cell.members(species) {
                    let Some(animal) = self.population.get(id) else {
                        continue;
                    };
                    cell_counts.increment(species);
                    snapshot.counts.increment(species);
                    if let Some(list) = snapshot.by_species.get_mut(&species) {
                        list.push(animal.snapshot(params));
                    }
                }
            }
            snapshot.per_cell.insert(cell.location(), cell_counts);
        }

        snapshot
    }

    pub fn animal_counts(&self) -> SpeciesCounts {
        self.animals().counts
    }

    /// Per-species counts for every habitable cell
    pub fn animal_counts_per_cell(&self) -> BTreeMap<Location, SpeciesCounts> {
        self.animals().per_cell
    }

    pub fn animals_by_species(&self) -> BTreeMap<Species, Vec<AnimalData>> {
        self.animals().by_species
    }

    /// Count and mean age, weight and fitness of each species
    pub fn species_summaries(&self) -> Vec<SpeciesSummary> {
        let by_species = self.animals_by_species();
        Species::all()
            .into_iter()
            .map(|species| {
                let mut summary = SpeciesSummary::new(species);
                for animal in by_species.get(&species).into_iter().flatten() {
                    summary.update(animal.age, animal.weight, animal.fitness);
                }
                summary
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosim_core::AnimalRecord;

    const SMALL_MAP: &str = "WWWWW\nWLHDW\nWLLLW\nWWWWW";

    fn herbivores(loc: Location, n: usize, weight: f64) -> PopulationRecord {
        let pop = (0..n)
            .map(|_| AnimalRecord::new(Species::Herbivore).with_age(5).with_weight(weight))
            .collect();
        PopulationRecord::new(loc, pop)
    }

    #[test]
    fn test_add_one_herbivore() {
        let mut island = Island::new(SMALL_MAP, 1).unwrap();
        island
            .add_population(&[herbivores(Location::new(2, 2), 1, 20.0)])
            .unwrap();

        let counts = island.animal_counts();
        assert_eq!(counts.herbivores, 1);
        assert_eq!(counts.carnivores, 0);
        assert_eq!(
            island.animal_counts_per_cell()[&Location::new(2, 2)].herbivores,
            1
        );
    }

    #[test]
    fn test_missing_weight_is_drawn() {
        let mut island = Island::new(SMALL_MAP, 1).unwrap();
        let record = PopulationRecord::new(
            Location::new(3, 3),
            vec![AnimalRecord::new(Species::Carnivore)],
        );
        island.add_population(&[record]).unwrap();

        let carnivores = &island.animals_by_species()[&Species::Carnivore];
        assert_eq!(carnivores.len(), 1);
        assert_eq!(carnivores[0].age, 0);
        assert!(carnivores[0].weight > 0.0);
    }

    #[test]
    fn test_invalid_placements_change_nothing() {
        let mut island = Island::new(SMALL_MAP, 1).unwrap();
        let good = herbivores(Location::new(2, 2), 3, 20.0);

        let water = herbivores(Location::new(1, 1), 1, 20.0);
        assert!(matches!(
            island.add_population(&[good.clone(), water]),
            Err(Error::ImpassableLocation(_))
        ));

        let outside = herbivores(Location::new(9, 2), 1, 20.0);
        assert!(matches!(
            island.add_population(&[good.clone(), outside]),
            Err(Error::LocationOutOfBounds(_))
        ));

        let mut unknown = herbivores(Location::new(2, 2), 1, 20.0);
        unknown.pop[0].species = "Omnivore".to_string();
        assert!(matches!(
            island.add_population(&[good.clone(), unknown]),
            Err(Error::UnknownSpecies(_))
        ));

        let weightless = herbivores(Location::new(2, 2), 1, -3.0);
        assert!(matches!(
            island.add_population(&[good, weightless]),
            Err(Error::InvalidAnimal(_))
        ));

        assert_eq!(island.num_animals(), 0);
    }

    #[test]
    fn test_empty_island_cycles() {
        let mut island = Island::new(SMALL_MAP, 1).unwrap();
        for expected in 1..=5 {
            let report = island.yearly_cycle();
            assert_eq!(report.year, expected);
        }
        assert_eq!(island.year(), 5);
        assert_eq!(island.animal_counts().total(), 0);
    }

    #[test]
    fn test_cycle_ages_and_slims_animals() {
        let mut island = Island::new(SMALL_MAP, 1).unwrap();
        island
            .set_animal_parameters(
                Species::Herbivore,
                [("omega", 0.0), ("mu", 0.0), ("gamma", 0.0), ("eta", 0.05)],
            )
            .unwrap();
        island
            .add_population(&[herbivores(Location::new(2, 4), 4, 20.0)])
            .unwrap();

        let report = island.yearly_cycle();
        assert_eq!(report.deaths, 0);
        assert_eq!(report.births, 0);

        for animal in &island.animals_by_species()[&Species::Herbivore] {
            assert_eq!(animal.age, 6);
            assert!((animal.weight - 19.0).abs() < 1e-9);
            assert_eq!(animal.location, Location::new(2, 4));
        }
    }

    #[test]
    fn test_enclosed_cell_keeps_its_animals() {
        let mut island = Island::new("WWW\nWLW\nWWW", 4).unwrap();
        island
            .set_animal_parameters(Species::Herbivore, [("mu", 1.0), ("omega", 0.0), ("gamma", 0.0)])
            .unwrap();
        island
            .add_population(&[herbivores(Location::new(2, 2), 20, 40.0)])
            .unwrap();

        for _ in 0..3 {
            assert_eq!(island.yearly_cycle().migrations, 0);
        }
        assert_eq!(island.animal_counts_per_cell()[&Location::new(2, 2)].herbivores, 20);
    }

    #[test]
    fn test_terrain_parameters_by_letter() {
        let mut island = Island::new(SMALL_MAP, 1).unwrap();
        island.set_terrain_parameters('H', [("f_max", 100.0)]).unwrap();
        assert_eq!(island.parameters().f_max(Terrain::Highland), 100.0);

        assert!(matches!(
            island.set_terrain_parameters('Q', [("f_max", 100.0)]),
            Err(Error::UnknownTerrainType(_))
        ));
        assert!(island.set_terrain_parameters('L', [("f_max", -1.0)]).is_err());
        assert_eq!(island.parameters().f_max(Terrain::Lowland), 800.0);
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = |seed| {
            let mut island = Island::new(SMALL_MAP, seed).unwrap();
            island
                .add_population(&[herbivores(Location::new(3, 2), 30, 25.0)])
                .unwrap();
            let carnivores = (0..5)
                .map(|_| AnimalRecord::new(Species::Carnivore).with_age(3).with_weight(30.0))
                .collect();
            island
                .add_population(&[PopulationRecord::new(Location::new(3, 3), carnivores)])
                .unwrap();
            (0..20).map(|_| island.yearly_cycle()).collect::<Vec<_>>()
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_species_summaries() {
        let mut island = Island::new(SMALL_MAP, 1).unwrap();
        island
            .add_population(&[
                herbivores(Location::new(2, 2), 2, 10.0),
                herbivores(Location::new(3, 3), 2, 30.0),
            ])
            .unwrap();

        let summaries = island.species_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].species, Species::Herbivore);
        assert_eq!(summaries[0].count, 4);
        assert!((summaries[0].mean_weight - 20.0).abs() < 1e-9);
        assert!((summaries[0].mean_age - 5.0).abs() < 1e-9);
        assert_eq!(summaries[1].count, 0);
    }

    #[test]
    fn test_snapshot_skips_water_cells() {
        let island = Island::new(SMALL_MAP, 1).unwrap();
        let snapshot = island.animals();
        assert_eq!(snapshot.per_cell.len(), 6);
        assert!(!snapshot.per_cell.contains_key(&Location::new(1, 1)));
    }

    #[test]
    fn test_placement_follows_motion() {
        let mut island = Island::new(SMALL_MAP, 1).unwrap();
        island.set_motion(Species::Herbivore, None, [('D', false)]).unwrap();

        assert!(matches!(
            island.add_population(&[herbivores(Location::new(2, 4), 1, 20.0)]),
            Err(Error::ImpassableLocation(_))
        ));
        // carnivores keep the default terrain table
        let carnivore = PopulationRecord::new(
            Location::new(2, 4),
            vec![AnimalRecord::new(Species::Carnivore).with_weight(20.0)],
        );
        island.add_population(&[carnivore]).unwrap();

        island.set_motion(Species::Herbivore, None, [('W', true)]).unwrap();
        island
            .add_population(&[herbivores(Location::new(1, 1), 2, 20.0)])
            .unwrap();
        assert_eq!(island.animal_counts_per_cell()[&Location::new(1, 1)].herbivores, 2);
        assert_eq!(island.animal_counts().total(), 3);
    }
}
