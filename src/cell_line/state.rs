//! Observed culture state, mutated at each checkpoint

use super::traits::{non_negative, unit_fraction, IntrinsicTraits};
use serde::{Deserialize, Serialize};

/// What the analyzer reads from a well on a given day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedState {
    /// Day of the last checkpoint applied
    pub day: u32,
    /// Viable cell density, cells/mL
    pub density: f64,
    /// Live cell fraction
    pub viability: f64,
    /// Accumulated antibody titer, g/L
    pub titer: f64,
    /// Aggregate fraction of the product
    pub aggregation: f64,
}

impl ObservedState {
    /// Day 0 state right after seeding
    pub fn seeded(traits: &IntrinsicTraits, seeding_density: f64) -> Self {
        Self {
            day: 0,
            density: non_negative(seeding_density),
            viability: unit_fraction(traits.baseline_viability),
            titer: 0.0,
            aggregation: unit_fraction(traits.aggregation_baseline),
        }
    }

    /// A culture with no live cells stops growing and producing
    pub fn is_dead(&self) -> bool {
        self.viability <= 0.0
    }

    /// Re-apply the range invariants after an update
    pub(crate) fn clamp(&mut self) {
        self.density = non_negative(self.density);
        self.viability = unit_fraction(self.viability);
        self.titer = non_negative(self.titer);
        self.aggregation = unit_fraction(self.aggregation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_line::Glycosylation;

    #[test]
    fn test_seeded_state() {
        let traits = IntrinsicTraits {
            base_titer: 2.0,
            growth_rate: 0.03,
            baseline_viability: 0.95,
            aggregation_baseline: 0.02,
            stable: false,
            glycosylation: Glycosylation::Good,
        };
        let state = ObservedState::seeded(&traits, 0.5e6);
        assert_eq!(state.day, 0);
        assert_eq!(state.density, 0.5e6);
        assert_eq!(state.viability, 0.95);
        assert_eq!(state.titer, 0.0);
        assert!(!state.is_dead());
    }

    #[test]
    fn test_clamp() {
        let mut state = ObservedState {
            day: 3,
            density: -5.0,
            viability: 1.2,
            titer: -0.1,
            aggregation: 2.0,
        };
        state.clamp();
        assert_eq!(state.density, 0.0);
        assert_eq!(state.viability, 1.0);
        assert_eq!(state.titer, 0.0);
        assert_eq!(state.aggregation, 1.0);
    }
}
