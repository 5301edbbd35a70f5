//! End-to-end tour of the per-chain machinery on a tiny 3x2 grid:
//! sweep a chain over increasing bottleneck thresholds, collect the Pareto
//! frontier, answer a warm-started two-node query, and round the grid.

use bottleneck_chains::tables::{Ragged2, Ragged3};
use bottleneck_chains::{
    ChainPathEngine, ChainTopology, Direction, GreedyRounder, MaxLinearCost, PairCombiner,
    ParetoFrontier, Restriction,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    let width = 3;
    let height = 2;
    let mut rng = StdRng::seed_from_u64(3);

    // Full decomposition: rows then columns; node 0 is the anchor.
    let mut chain_rows = Vec::new();
    for r in 0..height {
        chain_rows.push((0..width).map(|c| r * width + c).collect::<Vec<_>>());
    }
    for c in 0..width {
        chain_rows.push((0..height).map(|r| r * width + c).collect::<Vec<_>>());
    }
    let chains = Ragged2::from_nested(chain_rows);
    let mut node_labels = vec![3usize; width * height];
    node_labels[0] = 1;

    let mut linear_pots = Vec::new();
    let mut max_pots = Vec::new();
    for c in 0..chains.len() {
        let chain = chains.row(c);
        let shapes: Vec<(usize, usize)> = chain
            .windows(2)
            .map(|w| (node_labels[w[0]], node_labels[w[1]]))
            .collect();
        let mut linear = Ragged3::from_shapes(&shapes, 0.0);
        let mut max = Ragged3::from_shapes(&shapes, 0.0);
        for (p, &(a, b)) in shapes.iter().enumerate() {
            for i in 0..a {
                for j in 0..b {
                    linear.set(p, i, j, rng.gen_range(0.0..10.0));
                    max.set(p, i, j, f64::from(rng.gen_range(0u8..4)));
                }
            }
        }
        linear_pots.push(linear);
        max_pots.push(max);
    }

    let topo = ChainTopology::new(&chains).expect("valid decomposition");
    println!(
        "{} chains ({} horizontal, {} vertical), grid {}x{}",
        topo.num_chains(),
        topo.num_horizontal(),
        topo.num_vertical(),
        topo.horizontal_size(),
        topo.vertical_size()
    );
    let edge = topo.edge_ref_from_grid_edge(1, 4).expect("adjacent");
    println!("grid edge (1,4) lives on chain {} position {}", edge.chain, edge.position);

    // Threshold sweep on chain 0, building its frontier.
    let chain0_labels: Vec<usize> = chains.row(0).iter().map(|&n| node_labels[n]).collect();
    let mut engine = ChainPathEngine::new(
        &linear_pots[0],
        &max_pots[0],
        &chain0_labels,
        Direction::Forward,
        Restriction::None,
    )
    .expect("consistent chain");

    let mut frontier = ParetoFrontier::new();
    for t in 0..4 {
        let threshold = f64::from(t);
        engine.calculate_distances(threshold);
        let best = engine.shortest_distance();
        if best < f64::INFINITY {
            frontier
                .insert(MaxLinearCost::new(threshold, best))
                .expect("thresholds scanned in increasing order");
            let path = engine.shortest_path(threshold).expect("consistent sweep");
            println!("threshold {threshold}: best linear {best:.3}, path {path:?}");
        } else {
            println!("threshold {threshold}: sink unreachable");
        }
    }

    let combiner = PairCombiner::new(&frontier);
    let mut prev = None;
    for q in 0..3 {
        let single = MaxLinearCost::new(f64::from(q), 0.5);
        let (idx, cost) = combiner.compute_best_index_and_cost(single, prev);
        println!(
            "two-node query at bottleneck {}: frontier index {idx}, total {:.3}",
            single.max_cost,
            cost.total()
        );
        prev = Some(idx);
    }

    // Round the whole grid from the converged linear potentials.
    let rounder = GreedyRounder::new(&linear_pots, &chains).expect("anchor present");
    let solution = rounder.compute_solution().expect("connected grid");
    for c in 0..solution.len() {
        println!("chain {c}: labels {:?}", &solution[c]);
    }
}
