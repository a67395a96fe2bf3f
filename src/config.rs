//! Screening configuration
//!
//! One bundle drives the whole campaign: trait distributions for the
//! generator, kinetic constants for the engine, scoring weights for the
//! ranking, and the checkpoint calendar. Defaults reproduce the reference
//! 96-clone, 7-day run.

use crate::error::{Result, ScreenError};
use crate::ranking::NormalizationBasis;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gaussian sampling parameters with a post-sampling clamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitDistribution {
    pub mean: f64,
    pub std_dev: f64,
    /// Sampled values below this are clamped up
    pub min: f64,
    /// Sampled values above this are clamped down
    pub max: f64,
}

impl TraitDistribution {
    pub fn new(mean: f64, std_dev: f64, min: f64, max: f64) -> Self {
        Self { mean, std_dev, min, max }
    }

    /// Zero-variance distribution that always yields `value`
    pub fn fixed(value: f64) -> Self {
        Self { mean: value, std_dev: 0.0, min: value, max: value }
    }

    /// Clamp a raw sample into the configured range
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.mean.is_finite() && self.std_dev.is_finite()) {
            return Err(ScreenError::Configuration(format!(
                "{name}: mean and std_dev must be finite"
            )));
        }
        if self.std_dev < 0.0 {
            return Err(ScreenError::Configuration(format!(
                "{name}: std_dev must be non-negative, got {}",
                self.std_dev
            )));
        }
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(ScreenError::Configuration(format!(
                "{name}: clamp range [{}, {}] is invalid",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Distributions for every intrinsic clone trait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitDistributions {
    /// Titer potential in g/L reached at the production horizon
    pub base_titer: TraitDistribution,
    /// Specific growth rate in 1/h
    pub growth_rate: TraitDistribution,
    /// Starting viability fraction
    pub viability: TraitDistribution,
    /// Starting aggregate fraction (lower is better)
    pub aggregation: TraitDistribution,
    /// Probability that a clone holds expression over time
    pub stability_probability: f64,
    /// Relative weights for Optimal / Good / Poor glycosylation
    pub glycosylation_weights: [u32; 3],
}

impl Default for TraitDistributions {
    fn default() -> Self {
        Self {
            base_titer: TraitDistribution::new(2.5, 1.5, 0.1, 6.0),
            growth_rate: TraitDistribution::new(0.032, 0.008, 0.015, 0.050),
            viability: TraitDistribution::new(0.94, 0.06, 0.60, 0.99),
            aggregation: TraitDistribution::new(0.04, 0.02, 0.005, 0.08),
            stability_probability: 0.75,
            glycosylation_weights: [2, 1, 1],
        }
    }
}

/// Constants of the kinetic model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KineticsParams {
    /// Viable cell density at seeding, cells/mL
    pub seeding_density: f64,
    /// Carrying capacity of a well, cells/mL
    pub density_ceiling: f64,
    /// Baseline viability loss per day
    pub viability_decay_per_day: f64,
    /// How strongly a low starting viability accelerates decay
    pub decay_modulation: f64,
    /// Std-dev of the multiplicative noise on viability decay
    pub decay_noise: f64,
    /// Std-dev of the multiplicative noise on titer increments
    pub titer_noise: f64,
    /// Days over which a clone reaches its full titer potential
    pub production_horizon_days: f64,
    /// Aggregate fraction gained per day by a stable clone
    pub aggregation_drift_per_day: f64,
    /// Drift multiplier applied to unstable clones
    pub unstable_drift_factor: f64,
    /// Std-dev of the multiplicative noise on aggregation drift
    pub aggregation_noise: f64,
}

impl Default for KineticsParams {
    fn default() -> Self {
        Self {
            seeding_density: 0.5e6,
            density_ceiling: 8.0e6,
            viability_decay_per_day: 0.005,
            decay_modulation: 4.0,
            decay_noise: 0.05,
            titer_noise: 0.05,
            production_horizon_days: 7.0,
            aggregation_drift_per_day: 0.002,
            unstable_drift_factor: 3.0,
            aggregation_noise: 0.05,
        }
    }
}

impl KineticsParams {
    pub(crate) fn validate(&self) -> Result<()> {
        let named = [
            ("seeding_density", self.seeding_density),
            ("density_ceiling", self.density_ceiling),
            ("viability_decay_per_day", self.viability_decay_per_day),
            ("decay_modulation", self.decay_modulation),
            ("decay_noise", self.decay_noise),
            ("titer_noise", self.titer_noise),
            ("production_horizon_days", self.production_horizon_days),
            ("aggregation_drift_per_day", self.aggregation_drift_per_day),
            ("unstable_drift_factor", self.unstable_drift_factor),
            ("aggregation_noise", self.aggregation_noise),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ScreenError::Configuration(format!(
                    "kinetics.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.seeding_density <= 0.0 || self.density_ceiling <= self.seeding_density {
            return Err(ScreenError::Configuration(format!(
                "density ceiling {:.3e} must exceed seeding density {:.3e}",
                self.density_ceiling, self.seeding_density
            )));
        }
        if self.production_horizon_days <= 0.0 {
            return Err(ScreenError::Configuration(
                "kinetics.production_horizon_days must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Composite score weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub titer_weight: f64,
    pub viability_weight: f64,
    pub growth_weight: f64,
    /// Flat bonus for stable clones
    pub stability_bonus: f64,
    /// Multiplier on (1 - aggregation)
    pub quality_weight: f64,
    /// Scores closer than this are treated as tied
    pub tie_tolerance: f64,
    pub normalization: NormalizationBasis,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            titer_weight: 0.40,
            viability_weight: 0.25,
            growth_weight: 0.10,
            stability_bonus: 0.05,
            quality_weight: 0.10,
            tie_tolerance: 1e-9,
            normalization: NormalizationBasis::default(),
        }
    }
}

impl ScoringConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        let named = [
            ("titer_weight", self.titer_weight),
            ("viability_weight", self.viability_weight),
            ("growth_weight", self.growth_weight),
            ("stability_bonus", self.stability_bonus),
            ("quality_weight", self.quality_weight),
            ("tie_tolerance", self.tie_tolerance),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ScreenError::Configuration(format!(
                    "scoring.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        self.normalization.validate()
    }
}

/// Checkpoint calendar and liquid volumes per protocol step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Days at which the culture is read and advanced; must start at 0
    pub checkpoint_days: Vec<u32>,
    pub well_volume_ul: f64,
    pub feed_volume_ul: f64,
    pub sample_volume_ul: f64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            checkpoint_days: vec![0, 3, 7],
            well_volume_ul: 200.0,
            feed_volume_ul: 50.0,
            sample_volume_ul: 50.0,
        }
    }
}

impl ProtocolConfig {
    fn validate(&self) -> Result<()> {
        if self.checkpoint_days.first() != Some(&0) {
            return Err(ScreenError::Configuration(
                "protocol.checkpoint_days must start at day 0".into(),
            ));
        }
        if self.checkpoint_days.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ScreenError::Configuration(format!(
                "protocol.checkpoint_days must be strictly increasing, got {:?}",
                self.checkpoint_days
            )));
        }
        Ok(())
    }
}

/// Full campaign configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Number of clones screened
    pub population: usize,
    /// Host cell line every clone derives from
    pub parent_line: String,
    /// Seed for the campaign RNG; `None` draws one from entropy
    pub seed: Option<u64>,
    /// Clones advanced after ranking
    pub top_k: usize,
    /// Final titer (g/L) above which a clone is a high producer
    pub high_producer_titer: f64,
    pub distributions: TraitDistributions,
    pub kinetics: KineticsParams,
    pub scoring: ScoringConfig,
    pub protocol: ProtocolConfig,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            population: 96,
            parent_line: "CHO-K1".to_string(),
            seed: None,
            top_k: 10,
            high_producer_titer: 3.0,
            distributions: TraitDistributions::default(),
            kinetics: KineticsParams::default(),
            scoring: ScoringConfig::default(),
            protocol: ProtocolConfig::default(),
        }
    }
}

impl ScreeningConfig {
    /// Reference configuration with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    /// Check every parameter; the first violation is returned
    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            return Err(ScreenError::Configuration(
                "population must be at least 1".into(),
            ));
        }
        if !self.high_producer_titer.is_finite() || self.high_producer_titer < 0.0 {
            return Err(ScreenError::Configuration(format!(
                "high_producer_titer must be finite and non-negative, got {}",
                self.high_producer_titer
            )));
        }
        let d = &self.distributions;
        d.base_titer.validate("distributions.base_titer")?;
        d.growth_rate.validate("distributions.growth_rate")?;
        d.viability.validate("distributions.viability")?;
        d.aggregation.validate("distributions.aggregation")?;
        if !(0.0..=1.0).contains(&d.stability_probability) {
            return Err(ScreenError::Configuration(format!(
                "distributions.stability_probability must lie in [0, 1], got {}",
                d.stability_probability
            )));
        }
        if d.glycosylation_weights.iter().all(|&w| w == 0) {
            return Err(ScreenError::Configuration(
                "distributions.glycosylation_weights must not all be zero".into(),
            ));
        }
        self.kinetics.validate()?;
        self.scoring.validate()?;
        self.protocol.validate()
    }

    /// Load a configuration from a JSON file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        info!("Loaded screening config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Write this configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
