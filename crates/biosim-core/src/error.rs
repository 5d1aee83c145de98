//! Error types for the simulation.

use crate::types::Location;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Island map is empty")]
    EmptyMap,

    #[error("Island map is not rectangular: row {row} has {found} cells, expected {expected}")]
    NonRectangularMap {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Border cell {location} must be Water, found '{letter}'")]
    BorderNotWater { location: Location, letter: char },

    #[error("Unknown terrain '{letter}' at {location}")]
    UnknownTerrain { location: Location, letter: char },

    #[error("Unknown terrain type '{0}'")]
    UnknownTerrainType(String),

    #[error("Unknown species '{0}'")]
    UnknownSpecies(String),

    #[error("Invalid parameter key '{key}' for {scope}")]
    InvalidParameterKey { scope: String, key: String },

    #[error("Invalid value for parameter '{key}' of {scope}: {reason}")]
    InvalidParameterValue {
        scope: String,
        key: String,
        reason: String,
    },

    #[error("Location {0} is outside the island")]
    LocationOutOfBounds(Location),

    #[error("Location {0} is not habitable")]
    ImpassableLocation(Location),

    #[error("Invalid animal: {0}")]
    InvalidAnimal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
