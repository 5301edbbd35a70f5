use bottleneck_chains::tables::Ragged3;
use bottleneck_chains::{ChainPathEngine, Direction, Restriction};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Build linear/max tables for a chain with the given label counts, cycling
/// through the supplied cost pools.
fn build_tables(labels: &[usize], lin: &[f64], max: &[f64]) -> (Ragged3<f64>, Ragged3<f64>) {
    let shapes: Vec<(usize, usize)> = labels.windows(2).map(|w| (w[0], w[1])).collect();
    let mut linear = Ragged3::from_shapes(&shapes, 0.0);
    let mut bottleneck = Ragged3::from_shapes(&shapes, 0.0);
    let mut idx = 0;
    for (p, &(a, b)) in shapes.iter().enumerate() {
        for i in 0..a {
            for j in 0..b {
                linear.set(p, i, j, lin[idx % lin.len()]);
                bottleneck.set(p, i, j, max[idx % max.len()]);
                idx += 1;
            }
        }
    }
    (linear, bottleneck)
}

fn label_counts(raw: &[usize], nodes: usize) -> Vec<usize> {
    (0..nodes).map(|i| 1 + raw[i % raw.len()] % 4).collect()
}

fn all_edges(labels: &[usize]) -> Vec<(usize, usize, usize)> {
    let mut edges = Vec::new();
    for n1 in 0..labels.len() - 1 {
        for l1 in 0..labels[n1] {
            for l2 in 0..labels[n1 + 1] {
                edges.push((n1, l1, l2));
            }
        }
    }
    edges
}

proptest! {
    #[test]
    fn shortest_distance_is_monotone_in_threshold(
        nodes in 2usize..7,
        raw_labels in prop::collection::vec(0usize..4, 1..8),
        lin in prop::collection::vec(0.0f64..10.0, 1..40),
        max in prop::collection::vec(0.0f64..5.0, 1..40),
        t1 in 0.0f64..5.0,
        t2 in 0.0f64..5.0,
    ) {
        let labels = label_counts(&raw_labels, nodes);
        let (linear, bottleneck) = build_tables(&labels, &lin, &max);
        let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let mut engine = ChainPathEngine::new(
            &linear, &bottleneck, &labels, Direction::Forward, Restriction::None,
        ).unwrap();
        engine.calculate_distances(lo);
        let at_lo = engine.shortest_distance();
        engine.calculate_distances(hi);
        let at_hi = engine.shortest_distance();
        prop_assert!(at_lo >= at_hi, "sd({lo}) = {at_lo} < sd({hi}) = {at_hi}");
    }

    #[test]
    fn incremental_activation_matches_batch_sweep(
        nodes in 2usize..6,
        raw_labels in prop::collection::vec(0usize..4, 1..8),
        lin in prop::collection::vec(0.0f64..10.0, 1..40),
        max in prop::collection::vec(0.0f64..5.0, 1..40),
        threshold in 0.0f64..5.0,
        seed in 0u64..1_000,
        backward in proptest::bool::ANY,
    ) {
        let labels = label_counts(&raw_labels, nodes);
        let (linear, bottleneck) = build_tables(&labels, &lin, &max);
        let direction = if backward { Direction::Backward } else { Direction::Forward };

        let mut batch = ChainPathEngine::new(
            &linear, &bottleneck, &labels, direction, Restriction::None,
        ).unwrap();
        batch.calculate_distances(threshold);

        let mut incr = ChainPathEngine::new(
            &linear, &bottleneck, &labels, direction, Restriction::None,
        ).unwrap();
        let mut admissible: Vec<_> = all_edges(&labels)
            .into_iter()
            .filter(|&(n1, l1, l2)| bottleneck.at(n1, l1, l2) <= threshold)
            .collect();
        admissible.shuffle(&mut StdRng::seed_from_u64(seed));
        for (n1, l1, l2) in admissible {
            incr.add_edge_with_update(n1, l1, l2, threshold);
        }

        for n in 0..labels.len() {
            for l in 0..labels[n] {
                prop_assert_eq!(incr.distance(n, l), batch.distance(n, l), "node {} label {}", n, l);
            }
        }
        prop_assert_eq!(incr.shortest_distance(), batch.shortest_distance());
    }

    #[test]
    fn reconstructed_path_realizes_the_shortest_distance(
        nodes in 2usize..7,
        raw_labels in prop::collection::vec(0usize..4, 1..8),
        lin in prop::collection::vec(0.0f64..10.0, 1..40),
        max in prop::collection::vec(0.0f64..5.0, 1..40),
        threshold in 0.0f64..5.0,
        backward in proptest::bool::ANY,
    ) {
        let labels = label_counts(&raw_labels, nodes);
        let (linear, bottleneck) = build_tables(&labels, &lin, &max);
        let direction = if backward { Direction::Backward } else { Direction::Forward };
        let mut engine = ChainPathEngine::new(
            &linear, &bottleneck, &labels, direction, Restriction::None,
        ).unwrap();
        engine.calculate_distances(threshold);
        if engine.shortest_distance() == f64::INFINITY {
            return Ok(());
        }
        let path = engine.shortest_path(threshold).unwrap();
        prop_assert_eq!(path.len(), labels.len());
        for n1 in 0..labels.len() - 1 {
            prop_assert!(path[n1] < labels[n1]);
            prop_assert!(bottleneck.at(n1, path[n1], path[n1 + 1]) <= threshold);
        }
        // Accumulate in the same association order as the sweep so the
        // float comparison is exact: forward sums left to right, backward
        // right to left.
        let mut linear_sum = 0.0;
        let edge_order: Vec<usize> = if backward {
            (0..labels.len() - 1).rev().collect()
        } else {
            (0..labels.len() - 1).collect()
        };
        for n1 in edge_order {
            linear_sum += linear.at(n1, path[n1], path[n1 + 1]);
        }
        prop_assert_eq!(linear_sum, engine.shortest_distance());
    }
}
