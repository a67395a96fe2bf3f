//! Protocol steps and the per-well screening log

use crate::cell_line::CellClone;
use crate::config::ProtocolConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens to the plates at a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolStep {
    /// Dilute to seeding density and dispense into wells
    Seed,
    /// Withdraw a sample for counting, then add feed
    FeedAndSample,
    /// Harvest the full well for titer and quality assays
    HarvestAndAnalyze,
}

impl ProtocolStep {
    /// Step for checkpoint `index` of `total`: first seeds, last harvests
    pub fn for_checkpoint(index: usize, total: usize) -> Self {
        if index == 0 {
            Self::Seed
        } else if index + 1 >= total {
            Self::HarvestAndAnalyze
        } else {
            Self::FeedAndSample
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Seed => "Seeding",
            Self::FeedAndSample => "Feeding & Sampling",
            Self::HarvestAndAnalyze => "Harvest & Analysis",
        }
    }

    /// Past-tense action recorded in the log
    pub fn action(&self) -> &'static str {
        match self {
            Self::Seed => "seeded",
            Self::FeedAndSample => "fed_and_sampled",
            Self::HarvestAndAnalyze => "harvested",
        }
    }
}

impl fmt::Display for ProtocolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One well touched at one checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub day: u32,
    pub clone_id: usize,
    pub step: ProtocolStep,
    /// Liquid added to the well, µL
    pub dispensed_ul: f64,
    /// Liquid removed from the well, µL
    pub withdrawn_ul: f64,
    /// Well volume after the step, µL
    pub volume_ul: f64,
    pub density: f64,
    pub viability: f64,
}

/// Tracks well volumes across steps and emits log entries
#[derive(Debug, Clone)]
pub struct ScreeningLog {
    protocol: ProtocolConfig,
    volumes: Vec<f64>,
    entries: Vec<LogEntry>,
}

impl ScreeningLog {
    pub fn new(protocol: ProtocolConfig, wells: usize) -> Self {
        Self {
            protocol,
            volumes: vec![0.0; wells],
            entries: Vec::new(),
        }
    }

    /// Record `step` for a clone whose state was just read
    pub fn record(&mut self, step: ProtocolStep, clone: &CellClone) {
        let Some(volume) = self.volumes.get_mut(clone.id()) else {
            return;
        };
        let (dispensed, withdrawn) = match step {
            ProtocolStep::Seed => (self.protocol.well_volume_ul, 0.0),
            ProtocolStep::FeedAndSample => {
                let sample = self.protocol.sample_volume_ul.min(*volume);
                (self.protocol.feed_volume_ul, sample)
            }
            ProtocolStep::HarvestAndAnalyze => (0.0, *volume),
        };
        *volume = *volume - withdrawn + dispensed;
        self.entries.push(LogEntry {
            day: clone.state.day,
            clone_id: clone.id(),
            step,
            dispensed_ul: dispensed,
            withdrawn_ul: withdrawn,
            volume_ul: *volume,
            density: clone.state.density,
            viability: clone.state.viability,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}
