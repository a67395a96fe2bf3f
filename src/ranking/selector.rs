//! Selector: deterministic top-K over scored clones
//!
//! Order is score descending. A tie group is a run of scores within the tie
//! tolerance of the group's highest score; inside a group clones are ordered
//! by titer descending, then by creation index ascending. Grouping happens
//! after a total-order sort so the comparator stays transitive.

use super::scoring::ScoredClone;
use log::info;
use std::cmp::Ordering;

/// Scores closer than this are considered equal
pub const DEFAULT_TIE_TOLERANCE: f64 = 1e-9;

/// Full ranking of `scored`, best first
pub fn rank(scored: &[ScoredClone], tolerance: f64) -> Vec<&ScoredClone> {
    let mut order: Vec<&ScoredClone> = scored.iter().collect();
    order.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));

    let tolerance = if tolerance.is_finite() { tolerance.max(0.0) } else { 0.0 };
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && order[start].score - order[end].score <= tolerance {
            end += 1;
        }
        if end - start > 1 {
            order[start..end].sort_by(|a, b| tie_break(a, b));
        }
        start = end;
    }
    order
}

fn tie_break(a: &ScoredClone, b: &ScoredClone) -> Ordering {
    b.titer.total_cmp(&a.titer).then(a.id.cmp(&b.id))
}

/// Best `k` clones with the default tie tolerance.
/// `k` larger than the population returns everything.
pub fn select_top_k(scored: &[ScoredClone], k: usize) -> Vec<&ScoredClone> {
    select_top_k_with_tolerance(scored, k, DEFAULT_TIE_TOLERANCE)
}

pub fn select_top_k_with_tolerance(
    scored: &[ScoredClone],
    k: usize,
    tolerance: f64,
) -> Vec<&ScoredClone> {
    let k = k.min(scored.len());
    let mut ranked = rank(scored, tolerance);
    ranked.truncate(k);
    if let (Some(best), Some(cutoff)) = (ranked.first(), ranked.last()) {
        info!(
            "Selected {} of {} clones (best {} at {:.3}, cutoff {:.3})",
            ranked.len(),
            scored.len(),
            best.label,
            best.score,
            cutoff.score
        );
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_line::Glycosylation;
    use crate::ranking::{QualificationFlags, ScoreCard};

    fn scored(id: usize, score: f64, titer: f64) -> ScoredClone {
        ScoredClone {
            id,
            label: format!("Clone_{:03}", id + 1),
            titer,
            viability: 0.9,
            density: 7.0e6,
            growth_rate: 0.03,
            aggregation: 0.04,
            stable: true,
            glycosylation: Glycosylation::Good,
            score,
            breakdown: ScoreCard {
                titer_norm: 0.0,
                viability_norm: 0.0,
                growth_norm: 0.0,
                stability_bonus: 0.0,
                quality_bonus: 0.0,
                total: score,
            },
            flags: QualificationFlags {
                high_producer: false,
                high_viability: true,
                low_aggregation: true,
                stable: true,
                optimal_glycosylation: false,
            },
        }
    }

    fn ids(list: &[&ScoredClone]) -> Vec<usize> {
        list.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_descending_order() {
        let pool = vec![scored(0, 0.5, 1.0), scored(1, 0.9, 1.0), scored(2, 0.7, 1.0)];
        assert_eq!(ids(&select_top_k(&pool, 3)), vec![1, 2, 0]);
    }

    #[test]
    fn test_k_zero_is_empty() {
        let pool = vec![scored(0, 0.5, 1.0)];
        assert!(select_top_k(&pool, 0).is_empty());
    }

    #[test]
    fn test_k_clamped_to_population() {
        let pool = vec![scored(0, 0.1, 1.0), scored(1, 0.3, 1.0)];
        let top = select_top_k(&pool, 50);
        assert_eq!(ids(&top), vec![1, 0]);
    }

    #[test]
    fn test_tie_break_by_titer_then_index() {
        let pool = vec![
            scored(0, 0.8, 2.0),
            scored(1, 0.8, 3.0),
            scored(2, 0.8, 2.0),
            scored(3, 0.9, 0.5),
        ];
        assert_eq!(ids(&select_top_k(&pool, 4)), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_tolerance_groups_near_scores() {
        let pool = vec![scored(0, 0.8, 1.0), scored(1, 0.8 - 1e-12, 4.0)];
        assert_eq!(ids(&select_top_k(&pool, 2)), vec![1, 0]);
        // Outside the tolerance the score alone decides
        let pool = vec![scored(0, 0.8, 1.0), scored(1, 0.79, 4.0)];
        assert_eq!(ids(&select_top_k(&pool, 2)), vec![0, 1]);
    }

    #[test]
    fn test_tie_group_anchored_to_head() {
        // Neighbours sit inside the tolerance, the run as a whole does not
        let pool: Vec<_> = (0..5)
            .map(|i| scored(i, 1.0 - i as f64 * 0.9e-9, i as f64))
            .collect();
        let top = select_top_k(&pool, 5);
        assert_eq!(ids(&top), vec![1, 0, 3, 2, 4]);
        let head = top[0].score;
        assert!(pool[0].score - head <= DEFAULT_TIE_TOLERANCE);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let a = vec![scored(0, 0.4, 1.0), scored(1, 0.6, 2.0), scored(2, 0.6, 2.0)];
        let b = vec![a[2].clone(), a[0].clone(), a[1].clone()];
        assert_eq!(ids(&rank(&a, DEFAULT_TIE_TOLERANCE)), ids(&rank(&b, DEFAULT_TIE_TOLERANCE)));
    }

    #[test]
    fn test_does_not_mutate() {
        let pool = vec![scored(0, 0.2, 1.0), scored(1, 0.4, 1.0)];
        let before = pool.clone();
        let _ = select_top_k(&pool, 1);
        assert_eq!(pool, before);
    }
}
