//! Clone Generator: samples a population of clones at Day 0
//!
//! Every Gaussian trait is sampled, clamped to its configured range, then
//! forced into the biologically valid range. Invalid samples are clamped,
//! never resampled, so the RNG stream consumed per clone is fixed.

use crate::cell_line::{CellClone, Glycosylation, IntrinsicTraits};
use crate::config::{ScreeningConfig, TraitDistribution};
use crate::error::{Result, ScreenError};
use log::{debug, info};
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// A configured trait ready to draw from
struct TraitSampler {
    name: &'static str,
    normal: Normal<f64>,
    range: TraitDistribution,
}

impl TraitSampler {
    fn new(name: &'static str, range: TraitDistribution) -> Result<Self> {
        let normal = Normal::new(range.mean, range.std_dev).map_err(|e| {
            ScreenError::Configuration(format!("{name}: {e}"))
        })?;
        Ok(Self { name, normal, range })
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        let raw = self.normal.sample(rng);
        let clamped = self.range.clamp(raw);
        if clamped != raw {
            debug!("{} sample {:.4} clamped to {:.4}", self.name, raw, clamped);
        }
        clamped
    }
}

/// Generate `n` clones with independently sampled intrinsic traits.
///
/// Clones get ids `0..n` in creation order. Given the same RNG state the
/// output is identical.
pub fn generate(n: usize, config: &ScreeningConfig, rng: &mut impl Rng) -> Result<Vec<CellClone>> {
    if n == 0 {
        return Err(ScreenError::Configuration(
            "population must be at least 1".into(),
        ));
    }
    let dists = &config.distributions;
    if !(0.0..=1.0).contains(&dists.stability_probability) {
        return Err(ScreenError::Configuration(format!(
            "stability_probability must lie in [0, 1], got {}",
            dists.stability_probability
        )));
    }

    let titer = TraitSampler::new("base_titer", dists.base_titer)?;
    let growth = TraitSampler::new("growth_rate", dists.growth_rate)?;
    let viability = TraitSampler::new("viability", dists.viability)?;
    let aggregation = TraitSampler::new("aggregation", dists.aggregation)?;
    let glyco = WeightedIndex::new(dists.glycosylation_weights).map_err(|e| {
        ScreenError::Configuration(format!("glycosylation_weights: {e}"))
    })?;

    let mut clones = Vec::with_capacity(n);
    for id in 0..n {
        let traits = IntrinsicTraits {
            base_titer: titer.sample(rng),
            growth_rate: growth.sample(rng),
            baseline_viability: viability.sample(rng),
            stable: rng.gen_bool(dists.stability_probability),
            glycosylation: Glycosylation::ALL[glyco.sample(rng)],
            aggregation_baseline: aggregation.sample(rng),
        };
        clones.push(CellClone::new(
            id,
            config.parent_line.as_str(),
            traits,
            config.kinetics.seeding_density,
        ));
    }

    let stable = clones.iter().filter(|c| c.traits().stable).count();
    info!(
        "Generated {} clones from {} ({} stable, mean titer potential {:.2} g/L)",
        n,
        config.parent_line,
        stable,
        clones.iter().map(|c| c.traits().base_titer).sum::<f64>() / n as f64,
    );
    Ok(clones)
}
