//! Core type definitions for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an animal on an island
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimalId(pub u64);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 1-based (row, column) coordinate on the island
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn add(&self, drow: i32, dcol: i32) -> Self {
        Self {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }

    /// The neighbouring location one step in `direction`
    pub fn step(&self, direction: Direction) -> Self {
        let (drow, dcol) = direction.to_delta();
        self.add(drow, dcol)
    }

    /// `stride` cells in `direction`, or None if that leaves the coordinate range
    pub fn stride(&self, direction: Direction, stride: u32) -> Option<Self> {
        let (drow, dcol) = direction.to_delta();
        let stride = i32::try_from(stride).ok()?;
        Some(Self {
            row: self.row.checked_add(drow.checked_mul(stride)?)?,
            col: self.col.checked_add(dcol.checked_mul(stride)?)?,
        })
    }

    /// Manhattan distance to another location
    pub fn manhattan_distance(&self, other: &Location) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

impl From<(i32, i32)> for Location {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl From<Location> for (i32, i32) {
    fn from(loc: Location) -> Self {
        (loc.row, loc.col)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cardinal direction for migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

/// Terrain type of an island cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Lowland,
    Highland,
    Desert,
}

impl Terrain {
    pub const COUNT: usize = 4;

    pub fn all() -> [Terrain; Terrain::COUNT] {
        [
            Terrain::Water,
            Terrain::Lowland,
            Terrain::Highland,
            Terrain::Desert,
        ]
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'W' => Some(Terrain::Water),
            'L' => Some(Terrain::Lowland),
            'H' => Some(Terrain::Highland),
            'D' => Some(Terrain::Desert),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Terrain::Water => 'W',
            Terrain::Lowland => 'L',
            Terrain::Highland => 'H',
            Terrain::Desert => 'D',
        }
    }

    /// Animals can live in and migrate into every terrain except Water
    pub fn is_passable(&self) -> bool {
        !matches!(self, Terrain::Water)
    }

    pub fn index(&self) -> usize {
        match self {
            Terrain::Water => 0,
            Terrain::Lowland => 1,
            Terrain::Highland => 2,
            Terrain::Desert => 3,
        }
    }
}

impl FromStr for Terrain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => {
                Terrain::from_letter(letter).ok_or_else(|| Error::UnknownTerrainType(s.to_string()))
            }
            _ => Err(Error::UnknownTerrainType(s.to_string())),
        }
    }
}

/// Animal species living on the island
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const COUNT: usize = 2;

    /// Species in the order they are processed within a cell
    pub fn all() -> [Species; Species::COUNT] {
        [Species::Herbivore, Species::Carnivore]
    }

    pub fn index(&self) -> usize {
        match self {
            Species::Herbivore => 0,
            Species::Carnivore => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Species::all()
            .into_iter()
            .find(|species| species.name() == s)
            .ok_or_else(|| Error::UnknownSpecies(s.to_string()))
    }
}

/// Per-species animal counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCounts {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl SpeciesCounts {
    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    pub fn increment(&mut self, species: Species) {
        match species {
            Species::Herbivore => self.herbivores += 1,
            Species::Carnivore => self.carnivores += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }
}

/// One animal to place on the island
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl AnimalRecord {
    pub fn new(species: Species) -> Self {
        Self {
            species: species.name().to_string(),
            age: None,
            weight: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// A group of animals to place in one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub loc: Location,
    pub pop: Vec<AnimalRecord>,
}

impl PopulationRecord {
    pub fn new(loc: Location, pop: Vec<AnimalRecord>) -> Self {
        Self { loc, pop }
    }
}
