//! Multi-year simulation driver built from a scenario configuration.

use crate::island::{CycleReport, Island};
use biosim_core::{
    numeric_overrides, ParameterStore, PopulationRecord, Result, SimulationConfig, Species,
    SpeciesCounts, SpeciesSummary, Terrain,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{event, info, instrument, Level};

/// Counts and events of one simulated year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: u64,
    pub counts: SpeciesCounts,
    pub report: CycleReport,
}

pub struct Simulation {
    island: Island,
    report_interval: u64,
    history: Vec<YearRecord>,
}

impl Simulation {
    /// Apply the scenario's parameter overrides, build the island and place
    /// the initial population.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut params = ParameterStore::new();
        for (name, raw) in &config.animal_parameters {
            let species: Species = name.parse()?;
            params.set_species_parameters(species, numeric_overrides(name, raw)?)?;
        }
        for (name, motion) in &config.animal_motion {
            let species: Species = name.parse()?;
            params.set_motion(species, motion.stride, motion.movable_letters()?)?;
        }
        for (letter, raw) in &config.terrain_parameters {
            let terrain: Terrain = letter.parse()?;
            params.set_terrain_parameters(terrain, numeric_overrides(letter, raw)?)?;
        }

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut island = Island::with_parameters(&config.island_map, params, rng)?;
        island.add_population(&config.initial_population)?;

        info!(
            seed = config.seed,
            animals = island.num_animals(),
            "Simulation initialised"
        );

        Ok(Self {
            island,
            report_interval: config.report_interval,
            history: Vec::new(),
        })
    }

    /// Run `num_years` more years and summarise the whole run so far
    #[instrument(skip(self), fields(start_year = self.island.year()))]
    pub fn simulate(&mut self, num_years: u64) -> SimulationResult {
        info!("Simulating {} years", num_years);

        for _ in 0..num_years {
            let report = self.island.yearly_cycle();
            let counts = self.island.animal_counts();
            self.history.push(YearRecord {
                year: report.year,
                counts,
                report,
            });

            if self.report_interval > 0 && report.year % self.report_interval == 0 {
                self.emit_population_metrics(&report, counts);
            }
        }

        self.collect_results()
    }

    fn emit_population_metrics(&self, report: &CycleReport, counts: SpeciesCounts) {
        info!(
            event = "population_metrics",
            year = report.year,
            herbivores = counts.herbivores,
            carnivores = counts.carnivores,
            births = report.births,
            deaths = report.deaths,
            kills = report.kills,
            migrations = report.migrations,
            "Population metrics snapshot"
        );

        for species in Species::all() {
            event!(
                Level::INFO,
                gauge_name = "population",
                gauge_value = counts.get(species),
                species = %species,
                year = report.year,
                "Population gauge"
            );
        }
    }

    fn collect_results(&self) -> SimulationResult {
        SimulationResult {
            years: self.island.year(),
            final_counts: self.island.animal_counts(),
            summaries: self.island.species_summaries(),
            history: self.history.clone(),
        }
    }

    pub fn year(&self) -> u64 {
        self.island.year()
    }

    pub fn num_animals(&self) -> usize {
        self.island.num_animals()
    }

    pub fn num_animals_per_species(&self) -> SpeciesCounts {
        self.island.animal_counts()
    }

    /// Years simulated so far with their counts
    pub fn history(&self) -> &[YearRecord] {
        &self.history
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    /// Override parameters of the species with the given name
    pub fn set_animal_parameters<K, I>(&mut self, species: &str, overrides: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let species: Species = species.parse()?;
        self.island.set_animal_parameters(species, overrides)
    }

    /// Change the stride and movable terrain of the species with the given name
    pub fn set_motion<I>(&mut self, species: &str, stride: Option<f64>, movable: I) -> Result<()>
    where
        I: IntoIterator<Item = (char, bool)>,
    {
        let species: Species = species.parse()?;
        self.island.set_motion(species, stride, movable)
    }

    /// Override parameters of the terrain with the given map letter
    pub fn set_landscape_parameters<K, I>(&mut self, letter: &str, overrides: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let terrain: Terrain = letter.parse()?;
        self.island.set_terrain_parameters(terrain.letter(), overrides)
    }

    pub fn add_population(&mut self, records: &[PopulationRecord]) -> Result<()> {
        self.island.add_population(records)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub years: u64,
    pub final_counts: SpeciesCounts,
    pub summaries: Vec<SpeciesSummary>,
    pub history: Vec<YearRecord>,
}
