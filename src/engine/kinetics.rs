//! Kinetics Engine: advances a clone's observed state between checkpoints
//!
//! Per call, in order:
//! - density follows logistic growth toward the well's carrying capacity
//! - viability decays at a rate set by the clone's starting viability
//! - titer gains base potential × viability × elapsed fraction of the horizon
//! - aggregation drifts upward, faster for unstable clones
//!
//! Each call draws exactly three Gaussian multipliers centred at 1.0,
//! clipped at 0, whatever the clone's condition.

use crate::cell_line::CellClone;
use crate::config::{KineticsParams, ScreeningConfig};
use crate::error::{Result, ScreenError};
use log::debug;
use rand::Rng;
use rand_distr::{Distribution, Normal};

const HOURS_PER_DAY: f64 = 24.0;

/// Stateless stepper over the configured kinetic constants
#[derive(Debug, Clone)]
pub struct KineticsEngine {
    params: KineticsParams,
    decay_noise: Normal<f64>,
    titer_noise: Normal<f64>,
    aggregation_noise: Normal<f64>,
}

impl KineticsEngine {
    pub fn new(params: KineticsParams) -> Result<Self> {
        params.validate()?;
        let noise = |name: &str, sigma: f64| {
            Normal::new(1.0, sigma)
                .map_err(|e| ScreenError::Configuration(format!("kinetics.{name}: {e}")))
        };
        Ok(Self {
            decay_noise: noise("decay_noise", params.decay_noise)?,
            titer_noise: noise("titer_noise", params.titer_noise)?,
            aggregation_noise: noise("aggregation_noise", params.aggregation_noise)?,
            params,
        })
    }

    pub fn from_config(config: &ScreeningConfig) -> Result<Self> {
        Self::new(config.kinetics.clone())
    }

    pub fn params(&self) -> &KineticsParams {
        &self.params
    }

    /// Apply the checkpoint at `day`, `elapsed_days` after the previous one.
    ///
    /// Zero elapsed time, or a repeat of the clone's current day, leaves the
    /// biological state untouched; the checkpoint is still recorded. A dead
    /// clone keeps its titer but never adds to it again.
    pub fn advance(
        &self,
        clone: &mut CellClone,
        day: u32,
        elapsed_days: f64,
        rng: &mut impl Rng,
    ) -> Result<()> {
        if !elapsed_days.is_finite() || elapsed_days < 0.0 {
            return Err(ScreenError::InvalidInput(format!(
                "elapsed time must be finite and non-negative, got {elapsed_days}"
            )));
        }
        if day < clone.state.day {
            return Err(ScreenError::InvalidInput(format!(
                "{}: checkpoint day {} precedes current day {}",
                clone.label(),
                day,
                clone.state.day
            )));
        }

        let decay_mult = multiplier(&self.decay_noise, rng);
        let titer_mult = multiplier(&self.titer_noise, rng);
        let drift_mult = multiplier(&self.aggregation_noise, rng);

        let repeated = day == clone.state.day;
        if repeated && elapsed_days > 0.0 {
            debug!(
                "{}: day {} already applied, ignoring {} elapsed days",
                clone.label(),
                day,
                elapsed_days
            );
        }

        clone.state.day = day;
        if !repeated && elapsed_days > 0.0 {
            let traits = *clone.traits();
            let p = &self.params;
            let state = &mut clone.state;

            if !state.is_dead() {
                state.density = logistic_density(
                    state.density,
                    traits.growth_rate,
                    elapsed_days * HOURS_PER_DAY,
                    p.density_ceiling,
                );

                let decay_rate = p.viability_decay_per_day
                    * (1.0 + p.decay_modulation * (1.0 - traits.baseline_viability));
                state.viability -= decay_rate * elapsed_days * decay_mult;
                state.viability = state.viability.clamp(0.0, 1.0);
            }

            if !state.is_dead() {
                let increment = traits.base_titer * state.viability * elapsed_days
                    / p.production_horizon_days
                    * titer_mult;
                state.titer += increment.max(0.0);
            }

            let drift_factor = if traits.stable { 1.0 } else { p.unstable_drift_factor };
            state.aggregation +=
                p.aggregation_drift_per_day * drift_factor * elapsed_days * drift_mult;
            state.clamp();
        }

        clone.record_checkpoint();
        debug!("Day {}: {}", day, clone.summary());
        Ok(())
    }

    /// Advance every clone in creation order
    pub fn advance_all(
        &self,
        clones: &mut [CellClone],
        day: u32,
        elapsed_days: f64,
        rng: &mut impl Rng,
    ) -> Result<()> {
        for clone in clones.iter_mut() {
            self.advance(clone, day, elapsed_days, rng)?;
        }
        Ok(())
    }
}

fn multiplier(noise: &Normal<f64>, rng: &mut impl Rng) -> f64 {
    noise.sample(rng).max(0.0)
}

/// Closed-form logistic growth from `density` over `hours`
fn logistic_density(density: f64, rate_per_hour: f64, hours: f64, ceiling: f64) -> f64 {
    if density <= 0.0 {
        return 0.0;
    }
    if density >= ceiling {
        return ceiling;
    }
    let growth = (-rate_per_hour * hours).exp();
    ceiling / (1.0 + (ceiling / density - 1.0) * growth)
}
