use bottleneck_chains::tables::{Ragged2, Ragged3};
use bottleneck_chains::GreedyRounder;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn grid_instance(width: usize, height: usize, seed: u64) -> (Vec<Ragged3<f64>>, Ragged2<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut chains = Vec::new();
    for r in 0..height {
        chains.push((0..width).map(|c| r * width + c).collect::<Vec<_>>());
    }
    for c in 0..width {
        chains.push((0..height).map(|r| r * width + c).collect::<Vec<_>>());
    }
    let chains = Ragged2::from_nested(chains);

    let mut node_labels = vec![0usize; width * height];
    for l in node_labels.iter_mut() {
        *l = rng.gen_range(2..6);
    }
    node_labels[0] = 1;

    let mut potentials = Vec::with_capacity(chains.len());
    for c in 0..chains.len() {
        let chain = chains.row(c);
        let shapes: Vec<(usize, usize)> = chain
            .windows(2)
            .map(|w| (node_labels[w[0]], node_labels[w[1]]))
            .collect();
        let mut pots = Ragged3::from_shapes(&shapes, 0.0);
        for (p, &(a, b)) in shapes.iter().enumerate() {
            for i in 0..a {
                for j in 0..b {
                    pots.set(p, i, j, rng.gen_range(0.0..10.0));
                }
            }
        }
        potentials.push(pots);
    }
    (potentials, chains)
}

fn bench_rounding(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_rounding");
    for &side in &[16usize, 32, 64] {
        let (potentials, chains) = grid_instance(side, side, 11);
        group.bench_function(format!("round_{side}x{side}"), |b| {
            let rounder = GreedyRounder::new(&potentials, &chains).unwrap();
            b.iter(|| criterion::black_box(rounder.compute_solution().unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rounding);
criterion_main!(benches);
