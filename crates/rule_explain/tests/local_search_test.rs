//! K-neighbourhood trajectory search.

mod common;

use common::pool;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;
use rule_explain::optimization::{SearchContext, SearchStrategy};
use rule_explain::prelude::*;

/// +1 per active bit, -5 when bits {0, 2} are both on, -5 when {0, 1} are.
fn trap(bits: &[bool]) -> f64 {
    let mut score = bits.iter().filter(|&&b| b).count() as f64;
    if bits[0] && bits[2] {
        score -= 5.0;
    }
    if bits[0] && bits[1] {
        score -= 5.0;
    }
    score
}

#[rstest]
#[case(1, vec![true, false, false], 1.0)]
#[case(2, vec![false, true, true], 2.0)]
#[case(3, vec![false, true, true], 2.0)]
fn climb_reaches_k_optimum(#[case] radius: usize, #[case] bits: Vec<bool>, #[case] score: f64) {
    let search = TrajectorySearch::new(radius).unwrap();
    let end = search.climb(vec![false; 3], &trap);
    assert_eq!(end.bits, bits);
    assert_eq!(end.score, score);
}

#[test]
fn larger_radius_is_never_worse_on_the_trap() {
    let mut previous = f64::NEG_INFINITY;
    for radius in 1..=3 {
        let end = TrajectorySearch::new(radius)
            .unwrap()
            .climb(vec![false; 3], &trap);
        assert!(end.score >= previous);
        previous = end.score;
    }
}

#[test]
fn no_move_from_a_k_optimal_vector() {
    let search = TrajectorySearch::new(2).unwrap();
    let start = vec![false, true, true];
    let end = search.climb(start.clone(), &trap);
    assert_eq!(end.bits, start);
}

#[test]
fn neighbourhood_size_counts_flips() {
    let search = TrajectorySearch::new(2).unwrap();
    // C(5,1) + C(5,2)
    assert_eq!(search.neighbourhood_size(5), 15.0);
    // Radius is capped by the vector length
    assert_eq!(TrajectorySearch::new(4).unwrap().neighbourhood_size(2), 3.0);
}

#[test]
fn zero_radius_is_rejected() {
    assert!(matches!(
        TrajectorySearch::new(0),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn search_runs_one_trajectory_per_start_and_ranks_them() {
    let search = TrajectorySearch::new(1).unwrap();
    let pool = pool();
    let mut rng = StdRng::seed_from_u64(0);
    let mut ctx = SearchContext {
        pool: &pool,
        rng: &mut rng,
    };

    let starts = vec![vec![false; 3], vec![false, true, true]];
    let ranked = search.search(starts, 3, &trap, &mut ctx);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].bits, vec![false, true, true]);
    assert_eq!(ranked[0].score, 2.0);
    assert_eq!(ranked[1].bits, vec![true, false, false]);
}

/// Identical starts share one trajectory.
#[test]
fn repeated_starts_climb_once() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let search = TrajectorySearch::new(1).unwrap();
    let pool = pool();
    let evaluations = AtomicUsize::new(0);
    let counted = |bits: &[bool]| {
        evaluations.fetch_add(1, Ordering::Relaxed);
        trap(bits)
    };
    let run = |starts: Vec<Vec<bool>>| {
        evaluations.store(0, Ordering::Relaxed);
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = SearchContext {
            pool: &pool,
            rng: &mut rng,
        };
        let ranked = search.search(starts, 3, &counted, &mut ctx);
        (ranked, evaluations.load(Ordering::Relaxed))
    };

    let (single, single_cost) = run(vec![vec![true; 3]]);
    let (repeated, repeated_cost) = run(vec![vec![true; 3]; 4]);
    assert_eq!(repeated.len(), 1);
    assert_eq!(repeated, single);
    assert_eq!(repeated_cost, single_cost);
}
