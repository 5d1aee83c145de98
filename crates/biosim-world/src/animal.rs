//! Animal state and the population registry.

use biosim_core::{fitness, AnimalId, Location, Species, SpeciesParams};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An animal on the island
#[derive(Debug, Clone)]
pub struct Animal {
    pub id: AnimalId,
    pub species: Species,
    pub age: u32,
    pub weight: f64,
    pub location: Location,
    newborn: bool,
}

impl Animal {
    pub fn new(id: AnimalId, species: Species, location: Location, age: u32, weight: f64) -> Self {
        Self {
            id,
            species,
            age,
            weight,
            location,
            newborn: false,
        }
    }

    /// An animal born this year; it sits out procreation and migration until it has aged once
    pub fn newborn(id: AnimalId, species: Species, location: Location, weight: f64) -> Self {
        Self {
            newborn: true,
            ..Self::new(id, species, location, 0, weight)
        }
    }

    pub fn is_newborn(&self) -> bool {
        self.newborn
    }

    pub fn is_alive(&self) -> bool {
        self.weight > 0.0
    }

    pub fn fitness(&self, params: &SpeciesParams) -> f64 {
        fitness(self.age, self.weight, params)
    }

    /// Turn eaten food into body weight
    pub fn gain_weight(&mut self, food: f64, params: &SpeciesParams) {
        self.weight += params.beta * food;
    }

    /// Yearly metabolic loss
    pub fn lose_weight(&mut self, params: &SpeciesParams) {
        self.weight -= params.eta * self.weight;
    }

    /// Give up weight for a newborn. Returns false, leaving the weight
    /// untouched, when the mother cannot carry it.
    pub fn lose_birth_weight(&mut self, baby_weight: f64, params: &SpeciesParams) -> bool {
        let loss = params.xi * baby_weight;
        if baby_weight >= self.weight || loss > self.weight {
            return false;
        }
        self.weight -= loss;
        true
    }

    pub fn grow_older(&mut self) {
        self.age += 1;
        self.newborn = false;
    }

    pub fn move_to(&mut self, location: Location) {
        self.location = location;
    }

    pub fn snapshot(&self, params: &SpeciesParams) -> AnimalData {
        AnimalData {
            id: self.id,
            species: self.species,
            age: self.age,
            weight: self.weight,
            fitness: self.fitness(params),
            location: self.location,
        }
    }
}

/// Draw a birth weight from the species' log-normal distribution.
///
/// `w_birth` and `sigma_birth` are the mean and standard deviation of the
/// weight itself, converted to the parameters of the underlying normal.
pub fn birth_weight(params: &SpeciesParams, rng: &mut ChaCha8Rng) -> f64 {
    let mean = params.w_birth;
    let sd = params.sigma_birth;
    let mu = (mean * mean / (mean * mean + sd * sd).sqrt()).ln();
    let sigma = (1.0 + (sd * sd) / (mean * mean)).ln().sqrt();

    // Box-Muller
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();

    (mu + sigma * z).exp()
}

/// Read-only view of an animal for summaries and visualisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalData {
    pub id: AnimalId,
    pub species: Species,
    pub age: u32,
    pub weight: f64,
    pub fitness: f64,
    pub location: Location,
}

/// Owner of every living animal, keyed by id.
///
/// Cells only hold ids; iteration order for the yearly cycle always comes
/// from the grid, never from this map.
#[derive(Debug, Default)]
pub struct Population {
    animals: HashMap<AnimalId, Animal>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> AnimalId {
        let id = AnimalId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn(&mut self, species: Species, location: Location, age: u32, weight: f64) -> AnimalId {
        let id = self.allocate_id();
        self.animals.insert(id, Animal::new(id, species, location, age, weight));
        id
    }

    pub fn spawn_newborn(&mut self, species: Species, location: Location, weight: f64) -> AnimalId {
        let id = self.allocate_id();
        self.animals.insert(id, Animal::newborn(id, species, location, weight));
        id
    }

    pub fn get(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(&id)
    }

    pub fn get_mut(&mut self, id: AnimalId) -> Option<&mut Animal> {
        self.animals.get_mut(&id)
    }

    pub fn remove(&mut self, id: AnimalId) -> Option<Animal> {
        self.animals.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn herbivore(age: u32, weight: f64) -> Animal {
        Animal::new(AnimalId(0), Species::Herbivore, Location::new(2, 2), age, weight)
    }

    #[test]
    fn test_animal_creation() {
        let animal = herbivore(3, 12.5);
        assert_eq!(animal.age, 3);
        assert_eq!(animal.weight, 12.5);
        assert!(animal.is_alive());
        assert!(!animal.is_newborn());

        let baby = Animal::newborn(AnimalId(1), Species::Carnivore, Location::new(2, 2), 5.0);
        assert_eq!(baby.age, 0);
        assert!(baby.is_newborn());
    }

    #[test]
    fn test_gain_weight() {
        let params = SpeciesParams::defaults(Species::Herbivore);
        let mut animal = herbivore(0, 10.0);
        for round in 1..=5 {
            animal.gain_weight(10.0, &params);
            let expected = 10.0 + round as f64 * params.beta * 10.0;
            assert!((animal.weight - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lose_weight() {
        let params = SpeciesParams::defaults(Species::Carnivore);
        let mut animal = herbivore(0, 40.0);
        for k in 1..=20 {
            animal.lose_weight(&params);
            let expected = 40.0 * (1.0 - params.eta).powi(k);
            assert!((animal.weight - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lose_birth_weight() {
        let params = SpeciesParams::defaults(Species::Herbivore);
        let mut mother = herbivore(5, 40.0);
        assert!(mother.lose_birth_weight(8.0, &params));
        assert!((mother.weight - (40.0 - params.xi * 8.0)).abs() < 1e-9);

        // a baby at least as heavy as the mother is never born
        let mut light = herbivore(5, 6.0);
        assert!(!light.lose_birth_weight(6.0, &params));
        // nor one whose cost exceeds the mother's weight
        assert!(!light.lose_birth_weight(5.5, &params));
        assert_eq!(light.weight, 6.0);
    }

    #[test]
    fn test_grow_older() {
        let mut baby = Animal::newborn(AnimalId(1), Species::Herbivore, Location::new(2, 2), 5.0);
        baby.grow_older();
        assert_eq!(baby.age, 1);
        assert!(!baby.is_newborn());
    }

    #[test]
    fn test_birth_weight_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let params = SpeciesParams::defaults(Species::Herbivore);
        let samples: Vec<f64> = (0..20_000).map(|_| birth_weight(&params, &mut rng)).collect();

        assert!(samples.iter().all(|w| *w > 0.0));
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!((mean - params.w_birth).abs() < 0.1, "mean {mean}");
        assert!((var.sqrt() - params.sigma_birth).abs() < 0.1, "sd {}", var.sqrt());
    }

    #[test]
    fn test_birth_weight_without_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut params = SpeciesParams::defaults(Species::Carnivore);
        params.sigma_birth = 0.0;
        let weight = birth_weight(&params, &mut rng);
        assert!((weight - params.w_birth).abs() < 1e-9);
    }

    #[test]
    fn test_population_registry() {
        let mut population = Population::new();
        let a = population.spawn(Species::Herbivore, Location::new(2, 2), 1, 10.0);
        let b = population.spawn_newborn(Species::Carnivore, Location::new(2, 2), 6.0);
        assert_ne!(a, b);
        assert_eq!(population.len(), 2);

        population.get_mut(a).unwrap().weight = 11.0;
        assert_eq!(population.get(a).unwrap().weight, 11.0);

        assert!(population.remove(a).is_some());
        assert!(population.get(a).is_none());
        assert_eq!(population.len(), 1);
    }

    #[test]
    fn test_snapshot() {
        let params = SpeciesParams::defaults(Species::Herbivore);
        let animal = herbivore(4, 25.0);
        let data = animal.snapshot(&params);
        assert_eq!(data.age, 4);
        assert_eq!(data.weight, 25.0);
        assert_eq!(data.fitness, animal.fitness(&params));
    }
}
