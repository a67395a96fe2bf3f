//! End-to-end properties of a screening campaign

use clonescreen_core::campaign::ProtocolStep;
use clonescreen_core::ranking::{rank, select_top_k, DEFAULT_TIE_TOLERANCE};
use clonescreen_core::{
    generate, Campaign, CellClone, Glycosylation, IntrinsicTraits, KineticsEngine,
    NormalizationBasis, ScreenError, ScreeningConfig, ScoringEngine,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn reference(seed: u64) -> Campaign {
    Campaign::new(ScreeningConfig::seeded(seed)).unwrap()
}

#[test]
fn same_seed_same_ranking() {
    let a = reference(42).run().unwrap();
    let b = reference(42).run().unwrap();
    assert_ne!(a.campaign_id, b.campaign_id);
    assert_eq!(a.selected, b.selected);
    assert_eq!(a.scored, b.scored);
    assert_eq!(a.checkpoints, b.checkpoints);
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn different_seed_different_population() {
    let a = reference(1).run().unwrap();
    let b = reference(2).run().unwrap();
    assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn fractions_stay_in_unit_interval() {
    let report = reference(7).run().unwrap();
    for clone in &report.clones {
        assert_eq!(clone.history().len(), 3);
        for state in clone.history() {
            assert!((0.0..=1.0).contains(&state.viability), "{}", clone.summary());
            assert!((0.0..=1.0).contains(&state.aggregation), "{}", clone.summary());
        }
    }
}

#[test]
fn titer_never_decreases() {
    let report = reference(8).run().unwrap();
    for clone in &report.clones {
        let titers: Vec<f64> = [0, 3, 7]
            .iter()
            .map(|&d| clone.at_day(d).unwrap().titer)
            .collect();
        assert_eq!(titers[0], 0.0);
        assert!(titers[0] <= titers[1] && titers[1] <= titers[2], "{titers:?}");
    }
}

#[test]
fn density_stays_under_ceiling() {
    let report = reference(9).run().unwrap();
    for clone in &report.clones {
        assert_eq!(clone.at_day(0).unwrap().density, 0.5e6);
        for state in clone.history() {
            assert!(state.density <= 8.0e6);
        }
    }
    let harvest = report.final_checkpoint().unwrap();
    assert_eq!(harvest.step, ProtocolStep::HarvestAndAnalyze);
    assert!(harvest.mean_density > 5.0e6 && harvest.mean_density <= 8.0e6);
}

#[test]
fn selection_sorted_with_documented_ties() {
    let report = reference(10).run().unwrap();
    let ranked = rank(&report.scored, DEFAULT_TIE_TOLERANCE);
    let selected_ids: Vec<usize> = report.selected.iter().map(|s| s.id).collect();
    let prefix: Vec<usize> = ranked.iter().take(selected_ids.len()).map(|s| s.id).collect();
    assert_eq!(selected_ids, prefix);

    let mut start = 0;
    while start < ranked.len() {
        let head = ranked[start..].iter().map(|s| s.score).fold(f64::MIN, f64::max);
        let len = ranked[start..]
            .iter()
            .take_while(|s| head - s.score <= DEFAULT_TIE_TOLERANCE)
            .count();
        let end = start + len;
        for pair in ranked[start..end].windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(a.titer > b.titer || (a.titer == b.titer && a.id < b.id));
        }
        for s in &ranked[end..] {
            assert!(head - s.score > DEFAULT_TIE_TOLERANCE);
        }
        start = end;
    }

    // Nothing left out scores above the cutoff
    let cutoff = report.selected.last().unwrap().score;
    for s in report.scored.iter().filter(|s| !selected_ids.contains(&s.id)) {
        assert!(s.score <= cutoff + DEFAULT_TIE_TOLERANCE);
    }
}

#[test]
fn top_k_bounds() {
    let report = reference(11).run().unwrap();
    assert!(select_top_k(&report.scored, 0).is_empty());
    let all = select_top_k(&report.scored, 1000);
    assert_eq!(all.len(), report.scored.len());
    assert!(all.windows(2).all(|w| w[0].score + DEFAULT_TIE_TOLERANCE >= w[1].score));
}

#[test]
fn top_k_larger_than_population() {
    let config = ScreeningConfig { population: 5, top_k: 10, ..ScreeningConfig::seeded(3) };
    let report = Campaign::new(config).unwrap().run().unwrap();
    assert_eq!(report.selected.len(), 5);
    assert!((report.summary().success_rate - 100.0).abs() < 1e-9);
}

#[test]
fn titer_dominates_identical_baselines() {
    let config = ScreeningConfig::seeded(5);
    let engine = KineticsEngine::from_config(&config).unwrap();
    let mut clones: Vec<CellClone> = [1.0, 3.5, 0.2, 5.0]
        .into_iter()
        .enumerate()
        .map(|(id, base_titer)| {
            let traits = IntrinsicTraits {
                base_titer,
                growth_rate: 0.032,
                baseline_viability: 0.94,
                aggregation_baseline: 0.03,
                stable: true,
                glycosylation: Glycosylation::Good,
            };
            CellClone::new(id, "CHO-K1", traits, config.kinetics.seeding_density)
        })
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for (day, elapsed) in [(0, 0.0), (3, 3.0), (7, 4.0)] {
        engine.advance_all(&mut clones, day, elapsed, &mut rng).unwrap();
    }

    let scoring = ScoringEngine::for_population(&config, &clones).unwrap();
    let scored = scoring.evaluate_all(&clones);
    let order: Vec<usize> = select_top_k(&scored, 4).iter().map(|s| s.id).collect();
    assert_eq!(order, vec![3, 1, 0, 2]);
}

#[test]
fn population_range_spans_unit_interval() {
    let mut config = ScreeningConfig::seeded(13);
    config.scoring.normalization = NormalizationBasis::PopulationRange;
    let report = Campaign::new(config).unwrap().run().unwrap();
    let titer_norms: Vec<f64> = report.scored.iter().map(|s| s.breakdown.titer_norm).collect();
    assert!(titer_norms.iter().any(|&n| n == 0.0));
    assert!(titer_norms.iter().any(|&n| n == 1.0));
    let best = report.scored.iter().max_by(|a, b| a.titer.total_cmp(&b.titer)).unwrap();
    assert_eq!(best.breakdown.titer_norm, 1.0);
}

#[test]
fn dead_clone_stops_producing() {
    let config = ScreeningConfig::seeded(6);
    let engine = KineticsEngine::from_config(&config).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut clones = generate(8, &config, &mut rng).unwrap();
    engine.advance_all(&mut clones, 0, 0.0, &mut rng).unwrap();
    engine.advance_all(&mut clones, 3, 3.0, &mut rng).unwrap();

    let victim = &mut clones[4];
    victim.state.viability = 0.0;
    let day3_titer = victim.state.titer;

    engine.advance_all(&mut clones, 7, 4.0, &mut rng).unwrap();
    let victim = &clones[4];
    assert_eq!(victim.at_day(7).unwrap().titer, day3_titer);
    assert_eq!(victim.state.viability, 0.0);
    assert!(clones[3].state.titer > clones[3].at_day(3).unwrap().titer);
}

#[test]
fn misuse_fails_fast() {
    let config = ScreeningConfig::seeded(1);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(matches!(
        generate(0, &config, &mut rng),
        Err(ScreenError::Configuration(_))
    ));

    let engine = KineticsEngine::from_config(&config).unwrap();
    let mut clones = generate(1, &config, &mut rng).unwrap();
    assert!(matches!(
        engine.advance(&mut clones[0], 3, -3.0, &mut rng),
        Err(ScreenError::InvalidInput(_))
    ));
}

#[test]
fn report_survives_save_and_load() {
    let report = reference(12).run().unwrap();
    let path = std::env::temp_dir().join(format!("clonescreen-report-{}.json", report.campaign_id));
    report.save(&path).unwrap();
    let loaded = clonescreen_core::CampaignReport::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded.campaign_id, report.campaign_id);
    assert_eq!(loaded.selected.len(), report.selected.len());
    assert_eq!(loaded.log.len(), report.log.len());
}
