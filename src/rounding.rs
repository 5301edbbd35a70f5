//! Greedy rounding of per-chain relaxed results into one grid labeling.
//!
//! After the outer relaxation converges, each chain holds final linear
//! potentials. The rounder rebuilds the grid adjacency implied by the chain
//! decomposition and grows a labeling outward from the anchor node (the
//! unique node with a single admissible label), Prim-style: always finalize
//! the cheapest frontier node next, then offer each unfixed neighbour its
//! locally best label against the just-fixed one.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use thiserror::Error;

use crate::tables::{Ragged2, Ragged3};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundingError {
    /// No chain carries a node with label-cardinality 1 to seed from.
    #[error("no anchor node with a single label in any chain")]
    MissingAnchor,
    /// Greedy expansion exhausted the queue with nodes left unlabeled.
    #[error("rounding graph is disconnected: {unassigned} nodes unreachable from the anchor")]
    Disconnected { unassigned: usize },
}

/// Frontier entry; the heap pops the lowest cost, ties resolved in
/// insertion order.
struct QueueEntry {
    cost: f64,
    seq: u64,
    node: usize,
    label: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for QueueEntry {}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the cheapest (then earliest
        // inserted) entry surfaces first.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Greedy tree expansion over the node-adjacency graph of a chain
/// decomposition.
pub struct GreedyRounder<'a> {
    linear_potentials: &'a [Ragged3<f64>],
    chain_to_grid: &'a Ragged2<usize>,
    num_nodes: usize,
    /// Grid adjacency derived from consecutive chain nodes.
    neighbours: Vec<Vec<usize>>,
    /// Parallel to `neighbours`: `(chain, position)` locating the edge's
    /// potential table entry.
    edge_refs: Vec<Vec<(usize, usize)>>,
    anchor: usize,
}

impl<'a> GreedyRounder<'a> {
    /// Build the adjacency graph and locate the anchor node.
    ///
    /// `linear_potentials[c]` holds chain `c`'s final linear pairwise
    /// potentials; `chain_to_grid` maps chain-local nodes to grid ids.
    pub fn new(
        linear_potentials: &'a [Ragged3<f64>],
        chain_to_grid: &'a Ragged2<usize>,
    ) -> Result<Self, RoundingError> {
        assert_eq!(linear_potentials.len(), chain_to_grid.len());
        let num_nodes = (0..chain_to_grid.len())
            .flat_map(|c| chain_to_grid.row(c).iter().copied())
            .max()
            .map_or(0, |m| m + 1);

        let mut neighbours = vec![Vec::new(); num_nodes];
        let mut edge_refs = vec![Vec::new(); num_nodes];
        let mut anchor = None;
        for c in 0..chain_to_grid.len() {
            let chain = chain_to_grid.row(c);
            let pots = &linear_potentials[c];
            for n1 in 0..chain.len() - 1 {
                let n1_orig = chain[n1];
                let n2_orig = chain[n1 + 1];
                neighbours[n1_orig].push(n2_orig);
                edge_refs[n1_orig].push((c, n1));
                neighbours[n2_orig].push(n1_orig);
                edge_refs[n2_orig].push((c, n1));
                if anchor.is_none() && pots.dim2(n1) == 1 {
                    anchor = Some(n1_orig);
                }
            }
            // A chain may expose its single-label node only at its far end.
            let last = pots.dim1();
            if anchor.is_none() && last > 0 && pots.dim3(last - 1) == 1 {
                anchor = Some(chain[chain.len() - 1]);
            }
        }
        let anchor = anchor.ok_or(RoundingError::MissingAnchor)?;
        Ok(Self {
            linear_potentials,
            chain_to_grid,
            num_nodes,
            neighbours,
            edge_refs,
            anchor,
        })
    }

    /// Grid id of the seed node.
    #[inline]
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Grow one integral labeling from the anchor and reshape it per chain.
    ///
    /// A node may be pushed several times by different neighbours; only the
    /// first pop fixes it (lazy deletion). Every grid node must end up
    /// labeled, otherwise the decomposition does not connect the grid and
    /// the result would be meaningless.
    pub fn compute_solution(&self) -> Result<Ragged2<usize>, RoundingError> {
        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("greedy_rounding", num_nodes = self.num_nodes);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut solution = vec![usize::MAX; self.num_nodes];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;
        heap.push(QueueEntry {
            cost: 0.0,
            seq,
            node: self.anchor,
            label: 0,
        });
        while let Some(entry) = heap.pop() {
            if solution[entry.node] != usize::MAX {
                continue;
            }
            solution[entry.node] = entry.label;
            for (i, &nb) in self.neighbours[entry.node].iter().enumerate() {
                if solution[nb] != usize::MAX {
                    continue;
                }
                let (chain, position) = self.edge_refs[entry.node][i];
                let (label, cost) =
                    self.best_neighbour_label(entry.node, entry.label, nb, chain, position);
                seq += 1;
                heap.push(QueueEntry {
                    cost,
                    seq,
                    node: nb,
                    label,
                });
            }
        }

        let unassigned = solution.iter().filter(|&&l| l == usize::MAX).count();
        if unassigned > 0 {
            return Err(RoundingError::Disconnected { unassigned });
        }

        let mut per_chain = Vec::with_capacity(self.chain_to_grid.len());
        for c in 0..self.chain_to_grid.len() {
            per_chain.push(
                self.chain_to_grid
                    .row(c)
                    .iter()
                    .map(|&orig| solution[orig])
                    .collect(),
            );
        }
        Ok(Ragged2::from_nested(per_chain))
    }

    /// Cheapest label of `neighbour` against `root`'s fixed label, over the
    /// shared edge's linear potentials. Ties go to the lowest label index.
    fn best_neighbour_label(
        &self,
        root: usize,
        root_label: usize,
        neighbour: usize,
        chain: usize,
        position: usize,
    ) -> (usize, f64) {
        let pots = &self.linear_potentials[chain];
        let mut best_label = 0;
        let mut best_cost = f64::INFINITY;
        if root < neighbour {
            // Root is the edge's left node; neighbour labels index dim3.
            for ln in 0..pots.dim3(position) {
                let cost = pots.at(position, root_label, ln);
                if cost < best_cost {
                    best_cost = cost;
                    best_label = ln;
                }
            }
        } else {
            for ln in 0..pots.dim2(position) {
                let cost = pots.at(position, ln, root_label);
                if cost < best_cost {
                    best_cost = cost;
                    best_label = ln;
                }
            }
        }
        (best_label, best_cost)
    }
}
