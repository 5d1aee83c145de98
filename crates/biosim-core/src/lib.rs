//! Core types and parameters for the BioSim island ecosystem.

pub mod types;
pub mod config;
pub mod error;
pub mod fitness;
pub mod params;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use fitness::*;
pub use params::*;
