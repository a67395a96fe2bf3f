//! Campaign report: plain data for whatever renders or stores the results
//!
//! Run metadata (id, timestamps, calendar dates) varies between runs; the
//! fingerprint only covers the simulated results so two runs with the same
//! seed and config hash identically.

use super::protocol::{LogEntry, ProtocolStep};
use crate::cell_line::CellClone;
use crate::error::Result;
use crate::ranking::{rank, ScoredClone, DEFAULT_TIE_TOLERANCE};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use uuid::Uuid;

/// Aggregate statistics read at one checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSummary {
    pub day: u32,
    pub step: ProtocolStep,
    pub mean_density: f64,
    pub max_density: f64,
    pub mean_viability: f64,
    pub mean_titer: f64,
    pub max_titer: f64,
    /// Clones whose titer exceeds the high-producer threshold
    pub high_producers: usize,
    pub stable_clones: usize,
}

impl CheckpointSummary {
    pub fn from_clones(
        day: u32,
        step: ProtocolStep,
        clones: &[CellClone],
        high_producer_titer: f64,
    ) -> Self {
        let (mean_density, max_density) = mean_max(clones.iter().map(|c| c.state.density));
        let (mean_titer, max_titer) = mean_max(clones.iter().map(|c| c.state.titer));
        let (mean_viability, _) = mean_max(clones.iter().map(|c| c.state.viability));
        Self {
            day,
            step,
            mean_density,
            max_density,
            mean_viability,
            mean_titer,
            max_titer,
            high_producers: clones
                .iter()
                .filter(|c| c.state.titer > high_producer_titer)
                .count(),
            stable_clones: clones.iter().filter(|c| c.traits().stable).count(),
        }
    }
}

/// Mean and max of non-negative values, `(0, 0)` when empty
fn mean_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (count, sum, max) = values.fold((0usize, 0.0, 0.0_f64), |(n, sum, max), v| {
        (n + 1, sum + v, max.max(v))
    });
    if count == 0 {
        (0.0, 0.0)
    } else {
        (sum / count as f64, max)
    }
}

/// Calendar position of a checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCheckpoint {
    pub day: u32,
    pub step: ProtocolStep,
    pub date: NaiveDate,
}

/// Headline numbers of a finished campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub clones_screened: usize,
    pub clones_advanced: usize,
    /// Advanced / screened, as a percentage
    pub success_rate: f64,
    pub best_titer: f64,
    /// Label of the highest-scoring clone
    pub best_clone: Option<String>,
    pub high_producers: usize,
    pub stable_clones: usize,
}

/// Everything a campaign produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub campaign_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Seed the campaign RNG was built from, if known
    pub seed: Option<u64>,
    pub parent_line: String,
    pub schedule: Vec<ScheduledCheckpoint>,
    pub checkpoints: Vec<CheckpointSummary>,
    pub log: Vec<LogEntry>,
    /// Final clones with their full checkpoint history, in creation order
    pub clones: Vec<CellClone>,
    /// Every clone's score, in creation order
    pub scored: Vec<ScoredClone>,
    /// Top-K selection, best first
    pub selected: Vec<ScoredClone>,
}

#[derive(Serialize)]
struct FingerprintView<'a> {
    seed: Option<u64>,
    checkpoints: &'a [CheckpointSummary],
    scored: &'a [ScoredClone],
    selected: &'a [ScoredClone],
}

impl CampaignReport {
    pub fn summary(&self) -> CampaignSummary {
        let screened = self.scored.len();
        let advanced = self.selected.len();
        CampaignSummary {
            clones_screened: screened,
            clones_advanced: advanced,
            success_rate: if screened > 0 {
                advanced as f64 / screened as f64 * 100.0
            } else {
                0.0
            },
            best_titer: self.scored.iter().map(|s| s.titer).fold(0.0, f64::max),
            best_clone: self.best_clone().map(|s| s.label.clone()),
            high_producers: self.scored.iter().filter(|s| s.flags.high_producer).count(),
            stable_clones: self.scored.iter().filter(|s| s.stable).count(),
        }
    }

    /// Highest-ranked clone overall, whether or not any were selected
    pub fn best_clone(&self) -> Option<&ScoredClone> {
        self.selected
            .first()
            .or_else(|| rank(&self.scored, DEFAULT_TIE_TOLERANCE).first().copied())
    }

    /// The final checkpoint's statistics
    pub fn final_checkpoint(&self) -> Option<&CheckpointSummary> {
        self.checkpoints.last()
    }

    /// SHA-256 over the simulated results, hex encoded
    pub fn fingerprint(&self) -> Result<String> {
        let view = FingerprintView {
            seed: self.seed,
            checkpoints: &self.checkpoints,
            scored: &self.scored,
            selected: &self.selected,
        };
        let bytes = serde_json::to_vec(&view)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Save the report as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
