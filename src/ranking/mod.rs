//! Ranking: composite scoring and top-K selection

pub mod scoring;
pub mod selector;

pub use scoring::{
    MetricRange, NormalizationBasis, QualificationFlags, ScoreCard, ScoredClone, ScoringEngine,
};
pub use selector::{rank, select_top_k, select_top_k_with_tolerance, DEFAULT_TIE_TOLERANCE};
