//! CloneScreen: high-throughput cell line screening
//!
//! Simulates a 7-day screening campaign over a plate of antibody-producing
//! clones: sample intrinsic traits, advance each culture through its
//! checkpoints, score the harvest and pick the clones to scale up.

pub mod campaign;
pub mod cell_line;
pub mod config;
pub mod engine;
pub mod error;
pub mod ranking;

pub use campaign::{Campaign, CampaignReport, CampaignSummary, CheckpointSummary};
pub use cell_line::{CellClone, Glycosylation, IntrinsicTraits, ObservedState};
pub use config::{ScreeningConfig, TraitDistribution};
pub use engine::{generate, KineticsEngine};
pub use error::{Result, ScreenError};
pub use ranking::{select_top_k, NormalizationBasis, ScoredClone, ScoringEngine};
