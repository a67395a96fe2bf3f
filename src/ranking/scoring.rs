//! Scoring Engine: weighted multi-criteria score per clone
//!
//! score = titer_n × 0.40 + viability_n × 0.25 + growth_n × 0.10
//!       + stability_bonus + quality_weight × (1 − aggregation)
//!
//! Raw metrics are mapped onto [0, 1] before weighting, either against
//! fixed reference ranges or against the scored population's min/max.
//! Ranges are resolved once per population so every clone in a run is
//! scored on the same scale.

use crate::cell_line::{CellClone, Glycosylation};
use crate::config::{ScoringConfig, ScreeningConfig};
use crate::error::{Result, ScreenError};
use log::debug;
use serde::{Deserialize, Serialize};

/// Viability above which a clone counts as robust
pub const HIGH_VIABILITY: f64 = 0.85;

/// Aggregate fraction below which product quality is acceptable
pub const LOW_AGGREGATION: f64 = 0.05;

/// Closed interval a raw metric is rescaled from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub lo: f64,
    pub hi: f64,
}

impl MetricRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Smallest range covering every value; `[0, 0]` when empty
    pub fn observed(values: impl IntoIterator<Item = f64>) -> Self {
        let mut range: Option<Self> = None;
        for v in values {
            range = Some(match range {
                None => Self::new(v, v),
                Some(r) => Self::new(r.lo.min(v), r.hi.max(v)),
            });
        }
        range.unwrap_or(Self::new(0.0, 0.0))
    }

    /// Linear rescale onto [0, 1], clamped. A degenerate range maps
    /// everything at or above `lo` to 1.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.hi - self.lo;
        if span <= f64::EPSILON {
            return if value >= self.lo { 1.0 } else { 0.0 };
        }
        ((value - self.lo) / span).clamp(0.0, 1.0)
    }
}

/// Basis for normalizing raw metrics before weighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NormalizationBasis {
    /// Fixed reference ranges, comparable across runs
    FixedRange {
        titer: MetricRange,
        viability: MetricRange,
        growth_rate: MetricRange,
    },
    /// Observed min/max of the population being scored
    PopulationRange,
}

impl Default for NormalizationBasis {
    fn default() -> Self {
        Self::FixedRange {
            titer: MetricRange::new(0.0, 5.0),
            viability: MetricRange::new(0.0, 1.0),
            growth_rate: MetricRange::new(0.0, 0.045),
        }
    }
}

impl NormalizationBasis {
    pub(crate) fn validate(&self) -> Result<()> {
        if let Self::FixedRange { titer, viability, growth_rate } = self {
            let named = [("titer", titer), ("viability", viability), ("growth_rate", growth_rate)];
            for (name, r) in named {
                if !(r.lo.is_finite() && r.hi.is_finite()) || r.hi <= r.lo {
                    return Err(ScreenError::Configuration(format!(
                        "normalization range for {name} [{}, {}] is invalid",
                        r.lo, r.hi
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Per-term breakdown of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub titer_norm: f64,
    pub viability_norm: f64,
    pub growth_norm: f64,
    pub stability_bonus: f64,
    pub quality_bonus: f64,
    pub total: f64,
}

/// Pass/fail flags against the selection criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationFlags {
    pub high_producer: bool,
    pub high_viability: bool,
    pub low_aggregation: bool,
    pub stable: bool,
    pub optimal_glycosylation: bool,
}

/// Read-only snapshot of a scored clone, handed to selection and reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredClone {
    pub id: usize,
    pub label: String,
    pub titer: f64,
    pub viability: f64,
    pub density: f64,
    pub growth_rate: f64,
    pub aggregation: f64,
    pub stable: bool,
    pub glycosylation: Glycosylation,
    pub score: f64,
    pub breakdown: ScoreCard,
    pub flags: QualificationFlags,
}

/// Scores clones against ranges resolved for one population
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    high_producer_titer: f64,
    titer: MetricRange,
    viability: MetricRange,
    growth_rate: MetricRange,
}

impl ScoringEngine {
    /// Resolve the normalization ranges for `clones`
    pub fn for_population(config: &ScreeningConfig, clones: &[CellClone]) -> Result<Self> {
        config.scoring.validate()?;
        let (titer, viability, growth_rate) = match &config.scoring.normalization {
            NormalizationBasis::FixedRange { titer, viability, growth_rate } => {
                (*titer, *viability, *growth_rate)
            }
            NormalizationBasis::PopulationRange => (
                MetricRange::observed(clones.iter().map(|c| c.state.titer)),
                MetricRange::observed(clones.iter().map(|c| c.state.viability)),
                MetricRange::observed(clones.iter().map(|c| c.traits().growth_rate)),
            ),
        };
        debug!(
            "Scoring ranges: titer=[{:.3}, {:.3}] viability=[{:.3}, {:.3}] growth=[{:.4}, {:.4}]",
            titer.lo, titer.hi, viability.lo, viability.hi, growth_rate.lo, growth_rate.hi
        );
        Ok(Self {
            config: config.scoring.clone(),
            high_producer_titer: config.high_producer_titer,
            titer,
            viability,
            growth_rate,
        })
    }

    /// Composite score of a clone's current state
    pub fn score(&self, clone: &CellClone) -> f64 {
        self.score_card(clone).total
    }

    pub fn score_card(&self, clone: &CellClone) -> ScoreCard {
        let c = &self.config;
        let traits = clone.traits();
        let titer_norm = self.titer.normalize(clone.state.titer);
        let viability_norm = self.viability.normalize(clone.state.viability);
        let growth_norm = self.growth_rate.normalize(traits.growth_rate);
        let stability_bonus = if traits.stable { c.stability_bonus } else { 0.0 };
        let quality_bonus = c.quality_weight * (1.0 - clone.state.aggregation.clamp(0.0, 1.0));
        let total = titer_norm * c.titer_weight
            + viability_norm * c.viability_weight
            + growth_norm * c.growth_weight
            + stability_bonus
            + quality_bonus;
        ScoreCard {
            titer_norm,
            viability_norm,
            growth_norm,
            stability_bonus,
            quality_bonus,
            total,
        }
    }

    pub fn flags(&self, clone: &CellClone) -> QualificationFlags {
        QualificationFlags {
            high_producer: clone.state.titer > self.high_producer_titer,
            high_viability: clone.state.viability > HIGH_VIABILITY,
            low_aggregation: clone.state.aggregation < LOW_AGGREGATION,
            stable: clone.traits().stable,
            optimal_glycosylation: clone.traits().glycosylation == Glycosylation::Optimal,
        }
    }

    /// Score one clone into a reporting snapshot
    pub fn evaluate(&self, clone: &CellClone) -> ScoredClone {
        let breakdown = self.score_card(clone);
        ScoredClone {
            id: clone.id(),
            label: clone.label().to_string(),
            titer: clone.state.titer,
            viability: clone.state.viability,
            density: clone.state.density,
            growth_rate: clone.traits().growth_rate,
            aggregation: clone.state.aggregation,
            stable: clone.traits().stable,
            glycosylation: clone.traits().glycosylation,
            score: breakdown.total,
            breakdown,
            flags: self.flags(clone),
        }
    }

    pub fn evaluate_all(&self, clones: &[CellClone]) -> Vec<ScoredClone> {
        clones.iter().map(|c| self.evaluate(c)).collect()
    }
}
