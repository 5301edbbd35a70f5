use bottleneck_chains::{MaxLinearCost, PairCombiner, ParetoFrontier};
use proptest::prelude::*;

/// Sorted insert sequence: cumulative non-negative deltas on the bottleneck
/// axis, arbitrary linear costs. Zero deltas produce duplicate groups.
fn sorted_points(deltas: &[u8], linears: &[f64]) -> Vec<MaxLinearCost> {
    let mut max_cost = 0.0;
    deltas
        .iter()
        .zip(linears)
        .map(|(&d, &l)| {
            max_cost += f64::from(d);
            MaxLinearCost::new(max_cost, l)
        })
        .collect()
}

/// Reference scan: best combined cost over the whole frontier.
fn brute_force(frontier: &ParetoFrontier, single: MaxLinearCost) -> MaxLinearCost {
    if frontier.is_empty() {
        return single;
    }
    let mut best = MaxLinearCost::new(f64::INFINITY, f64::INFINITY);
    for entry in frontier.points() {
        let candidate = MaxLinearCost::new(
            entry.max_cost.max(single.max_cost),
            entry.linear_cost + single.linear_cost,
        );
        if candidate.total() < best.total() {
            best = candidate;
        }
    }
    best
}

proptest! {
    #[test]
    fn compression_keeps_one_entry_per_bottleneck_level(
        deltas in prop::collection::vec(0u8..4, 1..30),
        linears in prop::collection::vec(0.0f64..20.0, 30),
    ) {
        let points = sorted_points(&deltas, &linears);
        let mut frontier = ParetoFrontier::new();
        for p in &points {
            frontier.insert(*p).unwrap();
        }

        // Strictly increasing bottlenecks.
        for w in frontier.points().windows(2) {
            prop_assert!(w[0].max_cost < w[1].max_cost);
        }
        // Each retained entry holds its group's minimum linear cost.
        for entry in frontier.points() {
            let group_min = points
                .iter()
                .filter(|p| p.max_cost == entry.max_cost)
                .map(|p| p.linear_cost)
                .fold(f64::INFINITY, f64::min);
            prop_assert_eq!(entry.linear_cost, group_min);
        }
        // One entry per distinct level.
        let mut distinct: Vec<f64> = points.iter().map(|p| p.max_cost).collect();
        distinct.dedup();
        prop_assert_eq!(frontier.len(), distinct.len());
    }

    #[test]
    fn warm_start_matches_brute_force_on_monotone_queries(
        deltas in prop::collection::vec(0u8..4, 1..20),
        linears in prop::collection::vec(0.0f64..20.0, 20),
        query_deltas in prop::collection::vec(0u8..3, 1..20),
        query_linears in prop::collection::vec(0.0f64..5.0, 20),
    ) {
        let mut frontier = ParetoFrontier::new();
        for p in sorted_points(&deltas, &linears) {
            frontier.insert(p).unwrap();
        }
        let combiner = PairCombiner::new(&frontier);

        let mut prev_best = None;
        let mut single_max = 0.0;
        for (&d, &l) in query_deltas.iter().zip(&query_linears) {
            single_max += f64::from(d);
            let single = MaxLinearCost::new(single_max, l);
            let (idx, cost) = combiner.compute_best_index_and_cost(single, prev_best);
            let reference = brute_force(&frontier, single);
            prop_assert_eq!(cost.total(), reference.total(),
                "warm-started query diverged at single = {:?}", single);
            prev_best = Some(idx);
        }
    }

    #[test]
    fn replay_reproduces_a_fresh_build(
        deltas in prop::collection::vec(0u8..4, 1..20),
        first in prop::collection::vec(0.0f64..20.0, 20),
        second in prop::collection::vec(0.0f64..20.0, 20),
    ) {
        let build_points = sorted_points(&deltas, &first);
        let replay_points = sorted_points(&deltas, &second);

        let mut sealed = ParetoFrontier::new();
        for p in &build_points {
            sealed.insert(*p).unwrap();
        }
        sealed.seal();
        for p in &replay_points {
            sealed.insert(*p).unwrap();
        }

        let mut fresh = ParetoFrontier::new();
        for p in &replay_points {
            fresh.insert(*p).unwrap();
        }

        prop_assert_eq!(sealed.len(), fresh.len());
        for (a, b) in sealed.points().iter().zip(fresh.points()) {
            prop_assert_eq!(a.max_cost, b.max_cost);
            prop_assert_eq!(a.linear_cost, b.linear_cost);
        }
    }
}
