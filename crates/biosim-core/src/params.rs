//! Species and terrain parameters with validated overrides.
//!
//! Every island owns a [`ParameterStore`]. Defaults are fixed per species and
//! per terrain type; overrides are layered on top and shared by every animal
//! of that species on the island.

use crate::error::{Error, Result};
use crate::types::{Species, Terrain};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named set of numeric parameters that can be overridden key by key
pub trait ParameterSet: Clone {
    /// Every key this set accepts
    fn keys(&self) -> Vec<&'static str>;

    fn get(&self, key: &str) -> Option<f64>;

    /// Store `value` under `key`. Callers must pass a key from [`ParameterSet::keys`].
    fn assign(&mut self, key: &str, value: f64);

    /// Domain check for a single finite value
    fn check(key: &str, value: f64) -> std::result::Result<(), String>;

    fn to_map(&self) -> BTreeMap<String, f64> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}

/// What a species eats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Diet {
    /// Grazes on cell fodder
    Fodder,
    /// Hunts animals of `prey`; a fitness advantage above `delta_phi_max` makes a kill certain
    Prey { prey: Species, delta_phi_max: f64 },
}

const SPECIES_KEYS: [&str; 14] = [
    "w_birth",
    "sigma_birth",
    "beta",
    "eta",
    "a_half",
    "phi_age",
    "w_half",
    "phi_weight",
    "mu",
    "gamma",
    "zeta",
    "xi",
    "omega",
    "F",
];

const DELTA_PHI_MAX: &str = "DeltaPhiMax";

/// Parameters shared by all animals of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean birth weight
    pub w_birth: f64,
    /// Standard deviation of birth weight
    pub sigma_birth: f64,
    /// Fraction of eaten food turned into body weight
    pub beta: f64,
    /// Fraction of body weight lost each year
    pub eta: f64,
    /// Age at which the age factor of fitness is one half
    pub a_half: f64,
    pub phi_age: f64,
    /// Weight at which the weight factor of fitness is one half
    pub w_half: f64,
    pub phi_weight: f64,
    /// Migration factor
    pub mu: f64,
    /// Procreation factor
    pub gamma: f64,
    /// Minimum-reserve multiplier for giving birth
    pub zeta: f64,
    /// Weight lost by the mother per unit of newborn weight
    pub xi: f64,
    /// Death scaling; the yearly death probability is `omega * (1 - fitness)`
    pub omega: f64,
    /// Appetite `F`: food sought per year
    pub appetite: f64,
    pub diet: Diet,
}

impl SpeciesParams {
    pub fn defaults(species: Species) -> Self {
        match species {
            Species::Herbivore => Self {
                w_birth: 8.0,
                sigma_birth: 1.5,
                beta: 0.9,
                eta: 0.05,
                a_half: 40.0,
                phi_age: 0.6,
                w_half: 10.0,
                phi_weight: 0.1,
                mu: 0.25,
                gamma: 0.2,
                zeta: 3.5,
                xi: 1.2,
                omega: 1.0,
                appetite: 10.0,
                diet: Diet::Fodder,
            },
            Species::Carnivore => Self {
                w_birth: 6.0,
                sigma_birth: 1.0,
                beta: 0.75,
                eta: 0.125,
                a_half: 40.0,
                phi_age: 0.3,
                w_half: 4.0,
                phi_weight: 0.4,
                mu: 0.4,
                gamma: 0.8,
                zeta: 3.5,
                xi: 1.1,
                omega: 1.0,
                appetite: 50.0,
                diet: Diet::Prey {
                    prey: Species::Herbivore,
                    delta_phi_max: 10.0,
                },
            },
        }
    }

    /// Weight an animal needs before it may give birth
    pub fn procreation_threshold(&self) -> f64 {
        self.zeta * (self.w_birth + self.sigma_birth)
    }
}

impl ParameterSet for SpeciesParams {
    fn keys(&self) -> Vec<&'static str> {
        let mut keys = SPECIES_KEYS.to_vec();
        if matches!(self.diet, Diet::Prey { .. }) {
            keys.push(DELTA_PHI_MAX);
        }
        keys
    }

    fn get(&self, key: &str) -> Option<f64> {
        let value = match key {
            "w_birth" => self.w_birth,
            "sigma_birth" => self.sigma_birth,
            "beta" => self.beta,
            "eta" => self.eta,
            "a_half" => self.a_half,
            "phi_age" => self.phi_age,
            "w_half" => self.w_half,
            "phi_weight" => self.phi_weight,
            "mu" => self.mu,
            "gamma" => self.gamma,
            "zeta" => self.zeta,
            "xi" => self.xi,
            "omega" => self.omega,
            "F" => self.appetite,
            DELTA_PHI_MAX => match self.diet {
                Diet::Prey { delta_phi_max, .. } => delta_phi_max,
                Diet::Fodder => return None,
            },
            _ => return None,
        };
        Some(value)
    }

    fn assign(&mut self, key: &str, value: f64) {
        match key {
            "w_birth" => self.w_birth = value,
            "sigma_birth" => self.sigma_birth = value,
            "beta" => self.beta = value,
            "eta" => self.eta = value,
            "a_half" => self.a_half = value,
            "phi_age" => self.phi_age = value,
            "w_half" => self.w_half = value,
            "phi_weight" => self.phi_weight = value,
            "mu" => self.mu = value,
            "gamma" => self.gamma = value,
            "zeta" => self.zeta = value,
            "xi" => self.xi = value,
            "omega" => self.omega = value,
            "F" => self.appetite = value,
            DELTA_PHI_MAX => {
                if let Diet::Prey { delta_phi_max, .. } = &mut self.diet {
                    *delta_phi_max = value;
                }
            }
            _ => {}
        }
    }

    fn check(key: &str, value: f64) -> std::result::Result<(), String> {
        match key {
            DELTA_PHI_MAX | "w_birth" if value <= 0.0 => Err("must be positive".to_string()),
            _ if value < 0.0 => Err("must be non-negative".to_string()),
            "eta" if value > 1.0 => Err("must not exceed 1".to_string()),
            _ => Ok(()),
        }
    }
}

/// Parameters of one terrain type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Fodder carrying capacity
    pub f_max: f64,
}

impl TerrainParams {
    pub fn defaults(terrain: Terrain) -> Self {
        let f_max = match terrain {
            Terrain::Water | Terrain::Desert => 0.0,
            Terrain::Highland => 300.0,
            Terrain::Lowland => 800.0,
        };
        Self { f_max }
    }
}

impl ParameterSet for TerrainParams {
    fn keys(&self) -> Vec<&'static str> {
        vec!["f_max"]
    }

    fn get(&self, key: &str) -> Option<f64> {
        (key == "f_max").then_some(self.f_max)
    }

    fn assign(&mut self, key: &str, value: f64) {
        if key == "f_max" {
            self.f_max = value;
        }
    }

    fn check(_key: &str, value: f64) -> std::result::Result<(), String> {
        if value < 0.0 {
            return Err("must be non-negative".to_string());
        }
        Ok(())
    }
}

/// Validate every override against a copy of `current` and return the
/// updated set; on error nothing is applied
fn apply_overrides<P, K, I>(current: &P, scope: &str, overrides: I) -> Result<P>
where
    P: ParameterSet,
    K: AsRef<str>,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut candidate = current.clone();
    let keys = candidate.keys();

    for (key, value) in overrides {
        let key = key.as_ref();
        if !keys.iter().any(|known| *known == key) {
            return Err(Error::InvalidParameterKey {
                scope: scope.to_string(),
                key: key.to_string(),
            });
        }
        let checked = if value.is_finite() {
            P::check(key, value)
        } else {
            Err("must be a finite number".to_string())
        };
        if let Err(reason) = checked {
            return Err(Error::InvalidParameterValue {
                scope: scope.to_string(),
                key: key.to_string(),
                reason,
            });
        }
        candidate.assign(key, value);
    }

    Ok(candidate)
}

/// How far, and onto which terrain, a species moves when it migrates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motion {
    /// Cells covered by one migration step
    pub stride: u32,
    movable: [bool; Terrain::COUNT],
}

impl Motion {
    /// Whether the species may stand on `terrain`
    pub fn can_enter(&self, terrain: Terrain) -> bool {
        self.movable[terrain.index()]
    }

    /// Movability keyed by terrain letter
    pub fn movable(&self) -> BTreeMap<char, bool> {
        Terrain::all()
            .into_iter()
            .map(|terrain| (terrain.letter(), self.can_enter(terrain)))
            .collect()
    }
}

impl Default for Motion {
    /// One cell per step; everything but Water is enterable
    fn default() -> Self {
        Self {
            stride: 1,
            movable: Terrain::all().map(|terrain| terrain.is_passable()),
        }
    }
}

/// Effective species, motion and terrain parameters of one island
#[derive(Debug, Clone)]
pub struct ParameterStore {
    species: [SpeciesParams; Species::COUNT],
    motion: [Motion; Species::COUNT],
    terrain: [TerrainParams; Terrain::COUNT],
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            species: Species::all().map(SpeciesParams::defaults),
            motion: Species::all().map(|_| Motion::default()),
            terrain: Terrain::all().map(TerrainParams::defaults),
        }
    }

    pub fn species(&self, species: Species) -> &SpeciesParams {
        &self.species[species.index()]
    }

    /// Full effective parameter set of a species, keyed by parameter name
    pub fn species_parameters(&self, species: Species) -> BTreeMap<String, f64> {
        self.species(species).to_map()
    }

    pub fn set_species_parameters<K, I>(&mut self, species: Species, overrides: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let updated = apply_overrides(self.species(species), species.name(), overrides)?;
        self.species[species.index()] = updated;
        tracing::debug!(%species, "Species parameters updated");
        Ok(())
    }

    pub fn motion(&self, species: Species) -> &Motion {
        &self.motion[species.index()]
    }

    /// Change a species' stride and movable terrain.
    ///
    /// The stride is rounded to whole cells and must be finite and
    /// non-negative; `None` keeps the current one. Movability entries are
    /// keyed by terrain letter. Nothing changes unless every entry is valid.
    pub fn set_motion<I>(&mut self, species: Species, stride: Option<f64>, movable: I) -> Result<()>
    where
        I: IntoIterator<Item = (char, bool)>,
    {
        let mut candidate = self.motion(species).clone();

        if let Some(stride) = stride {
            if !stride.is_finite() || stride < 0.0 || stride > f64::from(u32::MAX) {
                return Err(Error::InvalidParameterValue {
                    scope: species.name().to_string(),
                    key: "stride".to_string(),
                    reason: format!("must be a non-negative whole number of cells, found {}", stride),
                });
            }
            candidate.stride = stride.round() as u32;
        }

        for (letter, enterable) in movable {
            let terrain = Terrain::from_letter(letter)
                .ok_or_else(|| Error::UnknownTerrainType(letter.to_string()))?;
            candidate.movable[terrain.index()] = enterable;
        }

        self.motion[species.index()] = candidate;
        tracing::debug!(%species, "Species motion updated");
        Ok(())
    }

    pub fn terrain(&self, terrain: Terrain) -> &TerrainParams {
        &self.terrain[terrain.index()]
    }

    pub fn f_max(&self, terrain: Terrain) -> f64 {
        self.terrain(terrain).f_max
    }

    pub fn terrain_parameters(&self, terrain: Terrain) -> BTreeMap<String, f64> {
        self.terrain(terrain).to_map()
    }

    pub fn set_terrain_parameters<K, I>(&mut self, terrain: Terrain, overrides: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let scope = format!("terrain '{}'", terrain.letter());
        let updated = apply_overrides(self.terrain(terrain), &scope, overrides)?;
        self.terrain[terrain.index()] = updated;
        tracing::debug!(terrain = %terrain.letter(), "Terrain parameters updated");
        Ok(())
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
