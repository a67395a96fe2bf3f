//! Campaign: runs the seed → feed/sample → harvest timeline end to end
//!
//! Generate the population, advance every clone through each checkpoint,
//! score the final state and select the top clones. The campaign owns the
//! RNG, so a fixed seed reproduces the whole run.

mod protocol;
mod report;

pub use protocol::{LogEntry, ProtocolStep, ScreeningLog};
pub use report::{CampaignReport, CampaignSummary, CheckpointSummary, ScheduledCheckpoint};

use crate::config::ScreeningConfig;
use crate::engine::{generate, KineticsEngine};
use crate::error::Result;
use crate::ranking::{select_top_k_with_tolerance, ScoringEngine};
use chrono::{Duration, Utc};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// A configured screening campaign, ready to run
#[derive(Debug, Clone)]
pub struct Campaign {
    config: ScreeningConfig,
    kinetics: KineticsEngine,
}

impl Campaign {
    pub fn new(config: ScreeningConfig) -> Result<Self> {
        config.validate()?;
        let kinetics = KineticsEngine::from_config(&config)?;
        Ok(Self { config, kinetics })
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Run with the configured seed, or a fresh one drawn from entropy
    pub fn run(&self) -> Result<CampaignReport> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.run_seeded(seed)
    }

    pub fn run_seeded(&self, seed: u64) -> Result<CampaignReport> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut report = self.run_with_rng(&mut rng)?;
        report.seed = Some(seed);
        Ok(report)
    }

    /// Run drawing every random value from `rng`
    pub fn run_with_rng(&self, rng: &mut impl Rng) -> Result<CampaignReport> {
        let config = &self.config;
        let campaign_id = Uuid::new_v4();
        let started_at = Utc::now();
        let days = &config.protocol.checkpoint_days;
        info!(
            "Campaign {} started: {} clones of {}, checkpoints {:?}",
            campaign_id, config.population, config.parent_line, days
        );

        let mut clones = generate(config.population, config, rng)?;
        let mut log = ScreeningLog::new(config.protocol.clone(), clones.len());
        let mut checkpoints = Vec::with_capacity(days.len());
        let mut schedule = Vec::with_capacity(days.len());

        let mut previous_day = 0;
        for (index, &day) in days.iter().enumerate() {
            let step = ProtocolStep::for_checkpoint(index, days.len());
            let elapsed = f64::from(day - previous_day);
            self.kinetics.advance_all(&mut clones, day, elapsed, rng)?;
            for clone in &clones {
                log.record(step, clone);
            }

            let summary =
                CheckpointSummary::from_clones(day, step, &clones, config.high_producer_titer);
            info!(
                "Day {} {}: mean VCD {:.2e} cells/mL (max {:.2e}), \
                 mean titer {:.2} g/L (max {:.2}), {} high producers",
                day,
                step,
                summary.mean_density,
                summary.max_density,
                summary.mean_titer,
                summary.max_titer,
                summary.high_producers,
            );
            checkpoints.push(summary);
            schedule.push(ScheduledCheckpoint {
                day,
                step,
                date: (started_at + Duration::days(i64::from(day))).date_naive(),
            });
            previous_day = day;
        }

        let scoring = ScoringEngine::for_population(config, &clones)?;
        let scored = scoring.evaluate_all(&clones);
        let selected: Vec<_> = select_top_k_with_tolerance(
            &scored,
            config.top_k,
            config.scoring.tie_tolerance,
        )
        .into_iter()
        .cloned()
        .collect();

        let report = CampaignReport {
            campaign_id,
            started_at,
            finished_at: Utc::now(),
            seed: None,
            parent_line: config.parent_line.clone(),
            schedule,
            checkpoints,
            log: log.into_entries(),
            clones,
            scored,
            selected,
        };
        let summary = report.summary();
        info!(
            "Campaign {} finished: {}/{} advanced ({:.1}%), best titer {:.2} g/L, best clone {}",
            campaign_id,
            summary.clones_advanced,
            summary.clones_screened,
            summary.success_rate,
            summary.best_titer,
            summary.best_clone.as_deref().unwrap_or("-"),
        );
        Ok(report)
    }
}
