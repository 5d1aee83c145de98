//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::{AnimalRecord, Location, PopulationRecord, Species};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Parameter overrides as read from a scenario file, keyed by parameter name
pub type RawOverrides = BTreeMap<String, serde_json::Value>;

/// Motion changes for one species as written in a scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionOverrides {
    pub stride: Option<f64>,
    /// Terrain letter -> whether the species may enter it
    pub movable: BTreeMap<String, bool>,
}

impl MotionOverrides {
    /// Movable entries keyed by terrain letter; keys must be single letters
    pub fn movable_letters(&self) -> Result<Vec<(char, bool)>> {
        self.movable
            .iter()
            .map(|(key, enterable)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(letter), None) => Ok((letter, *enterable)),
                    _ => Err(Error::UnknownTerrainType(key.clone())),
                }
            })
            .collect()
    }
}

/// Simulation scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Terrain rows, one letter per cell
    pub island_map: String,
    /// Animals placed before the first year
    pub initial_population: Vec<PopulationRecord>,
    /// Species name -> parameter overrides
    pub animal_parameters: BTreeMap<String, RawOverrides>,
    /// Species name -> stride and movable terrain
    pub animal_motion: BTreeMap<String, MotionOverrides>,
    /// Terrain letter -> parameter overrides
    pub terrain_parameters: BTreeMap<String, RawOverrides>,
    /// Number of years to simulate
    pub num_years: u64,
    /// Years between population reports
    pub report_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let herbivores = (0..50)
            .map(|_| AnimalRecord::new(Species::Herbivore).with_age(5).with_weight(20.0))
            .collect();
        let carnivores = (0..20)
            .map(|_| AnimalRecord::new(Species::Carnivore).with_age(5).with_weight(20.0))
            .collect();

        Self {
            seed: 1,
            island_map: ["WWWWWWW", "WLLLHHW", "WLLDHHW", "WLLLLLW", "WWWWWWW"].join("\n"),
            initial_population: vec![
                PopulationRecord::new(Location::new(3, 3), herbivores),
                PopulationRecord::new(Location::new(3, 3), carnivores),
            ],
            animal_parameters: BTreeMap::new(),
            animal_motion: BTreeMap::new(),
            terrain_parameters: BTreeMap::new(),
            num_years: 100,
            report_interval: 10,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

/// Convert raw scenario overrides to numbers, rejecting anything non-numeric
pub fn numeric_overrides(scope: &str, raw: &RawOverrides) -> Result<Vec<(String, f64)>> {
    raw.iter()
        .map(|(key, value)| {
            value
                .as_f64()
                .map(|number| (key.clone(), number))
                .ok_or_else(|| Error::InvalidParameterValue {
                    scope: scope.to_string(),
                    key: key.clone(),
                    reason: format!("expected a number, found {}", value),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.seed, 1);
        assert_eq!(config.num_years, 100);
        assert_eq!(config.initial_population.len(), 2);
        assert_eq!(config.initial_population[0].pop.len(), 50);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "seed": 7,
            "island_map": "WWW\nWLW\nWWW",
            "initial_population": [{"loc": [2, 2], "pop": [{"species": "Herbivore"}]}],
            "animal_parameters": {"Herbivore": {"mu": 0.5}},
            "num_years": 3
        }"#;

        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.num_years, 3);
        // missing fields fall back to defaults
        assert_eq!(config.report_interval, 10);
        assert!(config.terrain_parameters.is_empty());
        assert_eq!(config.animal_parameters["Herbivore"]["mu"], json!(0.5));
    }

    #[test]
    fn test_numeric_overrides() {
        let mut raw = RawOverrides::new();
        raw.insert("mu".to_string(), json!(1));
        raw.insert("eta".to_string(), json!(0.1));
        let parsed = numeric_overrides("Herbivore", &raw).unwrap();
        assert_eq!(parsed, vec![("eta".to_string(), 0.1), ("mu".to_string(), 1.0)]);

        raw.insert("gamma".to_string(), json!("fast"));
        assert!(matches!(
            numeric_overrides("Herbivore", &raw),
            Err(Error::InvalidParameterValue { .. })
        ));
    }

    #[test]
    fn test_motion_from_json() {
        let json = r#"{"animal_motion": {"Carnivore": {"stride": 2, "movable": {"W": true}}}}"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        let motion = &config.animal_motion["Carnivore"];
        assert_eq!(motion.stride, Some(2.0));
        assert_eq!(motion.movable_letters().unwrap(), vec![('W', true)]);

        let bad = MotionOverrides {
            stride: None,
            movable: [("Lake".to_string(), true)].into(),
        };
        assert!(matches!(bad.movable_letters(), Err(Error::UnknownTerrainType(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimulationConfig::from_json_str("{not json"),
            Err(Error::Serialization(_))
        ));
    }
}
