//! Intrinsic traits fixed at clone creation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Glycosylation profile of the expressed antibody
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Glycosylation {
    Optimal,
    Good,
    Poor,
}

impl Glycosylation {
    /// Order used when sampling with configured weights
    pub const ALL: [Glycosylation; 3] = [Self::Optimal, Self::Good, Self::Poor];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::Good => "Good",
            Self::Poor => "Poor",
        }
    }
}

impl fmt::Display for Glycosylation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters a clone carries for its whole life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicTraits {
    /// Titer potential in g/L at the production horizon
    pub base_titer: f64,
    /// Specific growth rate in 1/h
    pub growth_rate: f64,
    /// Viability fraction at seeding
    pub baseline_viability: f64,
    /// Aggregate fraction at seeding
    pub aggregation_baseline: f64,
    /// Whether expression holds over the campaign
    pub stable: bool,
    pub glycosylation: Glycosylation,
}

impl IntrinsicTraits {
    /// Force every value into its biologically valid range
    pub fn sanitized(self) -> Self {
        Self {
            base_titer: non_negative(self.base_titer),
            growth_rate: non_negative(self.growth_rate),
            baseline_viability: unit_fraction(self.baseline_viability),
            aggregation_baseline: unit_fraction(self.aggregation_baseline),
            ..self
        }
    }

    /// Doubling time in hours, infinite for a non-growing clone
    pub fn doubling_time_hours(&self) -> f64 {
        if self.growth_rate > 0.0 {
            std::f64::consts::LN_2 / self.growth_rate
        } else {
            f64::INFINITY
        }
    }
}

pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

pub(crate) fn unit_fraction(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traits() -> IntrinsicTraits {
        IntrinsicTraits {
            base_titer: 2.5,
            growth_rate: 0.032,
            baseline_viability: 0.94,
            aggregation_baseline: 0.04,
            stable: true,
            glycosylation: Glycosylation::Optimal,
        }
    }

    #[test]
    fn test_sanitize_clamps() {
        let raw = IntrinsicTraits {
            base_titer: -1.0,
            growth_rate: -0.01,
            baseline_viability: 1.4,
            aggregation_baseline: -0.2,
            ..traits()
        };
        let t = raw.sanitized();
        assert_eq!(t.base_titer, 0.0);
        assert_eq!(t.growth_rate, 0.0);
        assert_eq!(t.baseline_viability, 1.0);
        assert_eq!(t.aggregation_baseline, 0.0);
    }

    #[test]
    fn test_sanitize_keeps_valid() {
        assert_eq!(traits().sanitized(), traits());
    }

    #[test]
    fn test_doubling_time() {
        let t = traits();
        assert!((t.doubling_time_hours() - 21.66).abs() < 0.01);
        let still = IntrinsicTraits { growth_rate: 0.0, ..t };
        assert!(still.doubling_time_hours().is_infinite());
    }
}
