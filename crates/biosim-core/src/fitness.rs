//! Fitness and per-species summary statistics.

use crate::params::SpeciesParams;
use crate::types::Species;
use serde::{Deserialize, Serialize};

/// Fitness of an animal of the given age and weight, in [0, 1].
///
/// Zero for non-positive weight, otherwise the product of a falling age
/// sigmoid and a rising weight sigmoid shaped by the species parameters.
pub fn fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    let age_factor = 1.0 / (1.0 + (params.phi_age * (age as f64 - params.a_half)).exp());
    let weight_factor = 1.0 / (1.0 + (-params.phi_weight * (weight - params.w_half)).exp());
    age_factor * weight_factor
}

/// Running age, weight and fitness averages for one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSummary {
    pub species: Species,
    pub count: usize,
    pub mean_age: f64,
    pub mean_weight: f64,
    pub mean_fitness: f64,
}

impl SpeciesSummary {
    pub fn new(species: Species) -> Self {
        Self {
            species,
            count: 0,
            mean_age: 0.0,
            mean_weight: 0.0,
            mean_fitness: 0.0,
        }
    }

    /// Fold one more animal into the averages
    pub fn update(&mut self, age: u32, weight: f64, fitness: f64) {
        let n = self.count as f64;
        let new_n = n + 1.0;

        // incremental mean
        self.mean_age = (self.mean_age * n + age as f64) / new_n;
        self.mean_weight = (self.mean_weight * n + weight) / new_n;
        self.mean_fitness = (self.mean_fitness * n + fitness) / new_n;

        self.count += 1;
    }
}
