//! CellClone: one engineered cell line candidate

use super::{IntrinsicTraits, ObservedState};
use serde::{Deserialize, Serialize};

/// A screened clone. Identity and traits are fixed at creation; only
/// `state` changes, and each checkpoint appends a snapshot to the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellClone {
    id: usize,
    label: String,
    parent: String,
    traits: IntrinsicTraits,
    pub state: ObservedState,
    history: Vec<ObservedState>,
}

impl CellClone {
    /// Create a clone seeded at Day 0. `id` is the 0-based creation index.
    pub fn new(
        id: usize,
        parent: impl Into<String>,
        traits: IntrinsicTraits,
        seeding_density: f64,
    ) -> Self {
        let traits = traits.sanitized();
        let state = ObservedState::seeded(&traits, seeding_density);
        Self {
            id,
            label: format!("Clone_{:03}", id + 1),
            parent: parent.into(),
            traits,
            state,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn traits(&self) -> &IntrinsicTraits {
        &self.traits
    }

    /// Snapshots taken at each checkpoint, in day order
    pub fn history(&self) -> &[ObservedState] {
        &self.history
    }

    /// State as it was read on `day`, if that checkpoint ran
    pub fn at_day(&self, day: u32) -> Option<&ObservedState> {
        self.history.iter().find(|s| s.day == day)
    }

    /// Store the current state as the checkpoint for `state.day`,
    /// replacing an earlier snapshot of the same day.
    pub(crate) fn record_checkpoint(&mut self) {
        match self.history.last_mut() {
            Some(last) if last.day == self.state.day => *last = self.state,
            _ => self.history.push(self.state),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({}) | day={} | VCD={:.2}e6 | viability={:.1}% | titer={:.2} g/L | \
             aggregates={:.1}% | stable={} | glyco={}",
            self.label,
            self.parent,
            self.state.day,
            self.state.density / 1e6,
            self.state.viability * 100.0,
            self.state.titer,
            self.state.aggregation * 100.0,
            self.traits.stable,
            self.traits.glycosylation,
        )
    }
}
