//! Island ecosystem simulation engine.
//!
//! This crate implements the bounded grid island where herbivores and
//! carnivores feed, procreate, migrate, age and die once per simulated year.

pub mod grid;
pub mod animal;
pub mod feeding;
pub mod procreation;
pub mod migration;
pub mod lifecycle;
pub mod island;
pub mod simulation;

pub use grid::{Cell, Grid};
pub use animal::{Animal, AnimalData, Population};
pub use island::{CycleReport, Island, PopulationSnapshot};
pub use simulation::{Simulation, SimulationResult};
