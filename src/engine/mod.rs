//! Simulation engine: clone generation and checkpoint kinetics

pub mod generator;
pub mod kinetics;

pub use generator::generate;
pub use kinetics::KineticsEngine;
