//! Parametric shortest-path engine over one chain.
//!
//! For a chain of nodes with per-node label sets and pairwise potentials
//! split into a linear (sum) and a max (bottleneck) table, the engine finds
//! the minimum linear-cost labeling among those whose bottleneck cost stays
//! below a threshold. Two query regimes:
//! - [`ChainPathEngine::calculate_distances`]: full O(edges) sweep for an
//!   arbitrary threshold.
//! - [`ChainPathEngine::add_edge_with_update`]: amortized-incremental
//!   activation of a single edge while the caller scans a monotonically
//!   increasing threshold sequence.
//!
//! The chain is a DAG ordered by node index, so incremental relaxation is a
//! plain FIFO worklist rather than a priority queue.

use std::collections::VecDeque;

use thiserror::Error;

use crate::tables::{Ragged2, Ragged3};
use crate::utils::{argmin, min_value};

/// Sweep orientation: which end of the chain is the source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source at node 0, sink at the last node.
    Forward,
    /// Source at the last node, sink at node 0.
    Backward,
}

/// Edge filter fixed at construction.
///
/// `Boundary` and `Pinned` are mutually exclusive by construction; there is
/// no way to build an engine carrying both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Restriction {
    /// Every edge admissible under the threshold participates.
    #[default]
    None,
    /// Only edges whose left endpoint lies before (forward) or at/after
    /// (backward) the boundary node participate; solves a prefix/suffix
    /// subproblem.
    Boundary { node: usize },
    /// Edges must be consistent with one pinned label at one node; solves a
    /// subproblem anchored at that (node, label).
    Pinned { node: usize, label: usize },
}

/// Construction and query failures of the chain engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("chain needs at least two nodes, got {nodes}")]
    ChainTooShort { nodes: usize },
    #[error("potential tables disagree with the label counts at position {position}")]
    ShapeMismatch { position: usize },
    #[error("restriction refers to node {node} outside the chain")]
    RestrictionOutOfRange { node: usize },
    #[error(
        "no admissible predecessor at node {node} matches the distance table; \
         threshold or end point is inconsistent with the last sweep"
    )]
    InconsistentPath { node: usize },
}

struct ChainEdge {
    n1: usize,
    l1: usize,
    l2: usize,
}

/// DP engine over one chain, parametrized by direction and restriction.
///
/// Owns its distance table; never mutates the caller's potential tables.
pub struct ChainPathEngine<'a> {
    linear: &'a Ragged3<f64>,
    max: &'a Ragged3<f64>,
    num_labels: &'a [usize],
    direction: Direction,
    restriction: Restriction,
    /// `distance[node][label]`: best linear cost from the source side under
    /// the currently admissible edge set.
    distance: Ragged2<f64>,
    best_distance: f64,
}

impl<'a> ChainPathEngine<'a> {
    /// Validates table shapes against the label vector and the restriction
    /// indices, then initializes the distance table.
    pub fn new(
        linear: &'a Ragged3<f64>,
        max: &'a Ragged3<f64>,
        num_labels: &'a [usize],
        direction: Direction,
        restriction: Restriction,
    ) -> Result<Self, EngineError> {
        let nodes = num_labels.len();
        if nodes < 2 {
            return Err(EngineError::ChainTooShort { nodes });
        }
        if linear.dim1() != nodes - 1 || max.dim1() != nodes - 1 {
            return Err(EngineError::ShapeMismatch {
                position: linear.dim1().min(max.dim1()),
            });
        }
        for p in 0..nodes - 1 {
            let shape_ok = linear.dim2(p) == num_labels[p]
                && linear.dim3(p) == num_labels[p + 1]
                && max.dim2(p) == num_labels[p]
                && max.dim3(p) == num_labels[p + 1];
            if !shape_ok {
                return Err(EngineError::ShapeMismatch { position: p });
            }
        }
        match restriction {
            Restriction::None => {}
            Restriction::Boundary { node } => {
                if node >= nodes {
                    return Err(EngineError::RestrictionOutOfRange { node });
                }
            }
            Restriction::Pinned { node, label } => {
                if node >= nodes || label >= num_labels[node] {
                    return Err(EngineError::RestrictionOutOfRange { node });
                }
            }
        }
        let mut engine = Self {
            linear,
            max,
            num_labels,
            direction,
            restriction,
            distance: Ragged2::from_sizes(num_labels, f64::INFINITY),
            best_distance: f64::INFINITY,
        };
        engine.init();
        Ok(engine)
    }

    /// Reset the distance table: `0` across the source row, `+inf`
    /// elsewhere; best distance back to `+inf`.
    pub fn init(&mut self) {
        self.best_distance = f64::INFINITY;
        self.distance.fill(f64::INFINITY);
        let source = match self.direction {
            Direction::Forward => 0,
            Direction::Backward => self.num_labels.len() - 1,
        };
        for slot in self.distance.row_mut(source) {
            *slot = 0.0;
        }
    }

    /// Current best linear cost to reach `(node, label)` from the source
    /// side.
    #[inline]
    pub fn distance(&self, node: usize, label: usize) -> f64 {
        self.distance[node][label]
    }

    /// Best linear cost at the sink after the last sweep or update.
    #[inline]
    pub fn shortest_distance(&self) -> f64 {
        self.best_distance
    }

    /// Restriction filter on edge `(n1, l1, l2)` (n1 = edge position).
    fn admits(&self, n1: usize, l1: usize, l2: usize) -> bool {
        match self.restriction {
            Restriction::None => true,
            Restriction::Boundary { node } => match self.direction {
                Direction::Forward => n1 < node,
                Direction::Backward => n1 >= node,
            },
            Restriction::Pinned { node, label } => {
                !((n1 == node && l1 != label) || (n1 + 1 == node && l2 != label))
            }
        }
    }

    /// Full sweep: relax every admissible edge under `threshold`, source to
    /// sink, then record the sink minimum.
    pub fn calculate_distances(&mut self, threshold: f64) {
        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("calculate_distances", threshold);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        self.init();
        self.sweep(threshold, None);
    }

    /// Full sweep of the subchain anchored at `(start_node, start_label)`:
    /// the anchor becomes the only zero-distance entry and relaxation runs
    /// from there toward the sink.
    pub fn calculate_distances_from(
        &mut self,
        threshold: f64,
        start_node: usize,
        start_label: usize,
    ) {
        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("calculate_distances_from", threshold, start_node);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        self.best_distance = f64::INFINITY;
        self.distance.fill(f64::INFINITY);
        self.distance.row_mut(start_node)[start_label] = 0.0;
        self.sweep(threshold, Some(start_node));
    }

    fn sweep(&mut self, threshold: f64, start_node: Option<usize>) {
        let num_nodes = self.num_labels.len();
        match self.direction {
            Direction::Forward => {
                let first = start_node.unwrap_or(0);
                for n1 in first..num_nodes - 1 {
                    let n2 = n1 + 1;
                    for l1 in 0..self.num_labels[n1] {
                        let d1 = self.distance[n1][l1];
                        if d1 == f64::INFINITY {
                            continue;
                        }
                        for l2 in 0..self.num_labels[n2] {
                            if self.max.at(n1, l1, l2) > threshold || !self.admits(n1, l1, l2) {
                                continue;
                            }
                            let offered = d1 + self.linear.at(n1, l1, l2);
                            if offered < self.distance[n2][l2] {
                                self.distance.row_mut(n2)[l2] = offered;
                            }
                        }
                    }
                }
                self.best_distance = min_value(self.distance.row(num_nodes - 1));
            }
            Direction::Backward => {
                let first = start_node.unwrap_or(num_nodes - 1);
                for n2 in (1..=first).rev() {
                    let n1 = n2 - 1;
                    for l2 in 0..self.num_labels[n2] {
                        let d2 = self.distance[n2][l2];
                        if d2 == f64::INFINITY {
                            continue;
                        }
                        for l1 in 0..self.num_labels[n1] {
                            if self.max.at(n1, l1, l2) > threshold || !self.admits(n1, l1, l2) {
                                continue;
                            }
                            let offered = d2 + self.linear.at(n1, l1, l2);
                            if offered < self.distance[n1][l1] {
                                self.distance.row_mut(n1)[l1] = offered;
                            }
                        }
                    }
                }
                self.best_distance = min_value(self.distance.row(0));
            }
        }
    }

    /// Activate one newly admissible edge and propagate the improvement.
    ///
    /// Precondition: the edge's bottleneck cost is `<= threshold` (the
    /// caller is scanning thresholds in non-decreasing order). If the edge
    /// does not improve its target's distance this is a no-op. Otherwise a
    /// FIFO worklist pushes the improvement through already-admissible
    /// edges; reaching the sink only updates the best distance.
    ///
    /// Returns the `(node, label)` pairs whose distance changed (sink
    /// entries excluded), so a caller can forward the update to an
    /// adjoining chain sharing a node.
    pub fn add_edge_with_update(
        &mut self,
        n1: usize,
        l1: usize,
        l2: usize,
        threshold: f64,
    ) -> Vec<(usize, usize)> {
        debug_assert!(self.max.at(n1, l1, l2) <= threshold);
        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("add_edge_with_update", n1, l1, l2);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut updated = Vec::new();
        if !self.admits(n1, l1, l2) {
            return updated;
        }

        let last_edge = self.linear.dim1() - 1;
        let mut queue = VecDeque::new();
        queue.push_back(ChainEdge { n1, l1, l2 });

        while let Some(e) = queue.pop_front() {
            debug_assert!(e.n1 < self.linear.dim1());
            let (cur_node, next_node, cur_label, next_label) = match self.direction {
                Direction::Forward => (e.n1, e.n1 + 1, e.l1, e.l2),
                Direction::Backward => (e.n1 + 1, e.n1, e.l2, e.l1),
            };
            let offered = self.distance[cur_node][cur_label] + self.linear.at(e.n1, e.l1, e.l2);
            if self.distance[next_node][next_label] <= offered {
                continue;
            }
            self.distance.row_mut(next_node)[next_label] = offered;

            let reached_sink = match self.direction {
                Direction::Forward => e.n1 == last_edge,
                Direction::Backward => next_node == 0,
            };
            if reached_sink {
                if offered < self.best_distance {
                    self.best_distance = offered;
                }
                continue;
            }
            updated.push((next_node, next_label));

            match self.direction {
                Direction::Forward => {
                    // Out-edges of next_node sit at edge position next_node.
                    for child_label in 0..self.num_labels[next_node + 1] {
                        if self.max.at(next_node, next_label, child_label) <= threshold
                            && self.admits(next_node, next_label, child_label)
                        {
                            queue.push_back(ChainEdge {
                                n1: next_node,
                                l1: next_label,
                                l2: child_label,
                            });
                        }
                    }
                }
                Direction::Backward => {
                    // In-edges of next_node sit at edge position next_node - 1.
                    let child = next_node - 1;
                    for child_label in 0..self.num_labels[child] {
                        if self.max.at(child, child_label, next_label) <= threshold
                            && self.admits(child, child_label, next_label)
                        {
                            queue.push_back(ChainEdge {
                                n1: child,
                                l1: child_label,
                                l2: next_label,
                            });
                        }
                    }
                }
            }
        }
        updated
    }

    /// Backtrack the optimal labeling from the sink arg-min toward the
    /// source. Requires a preceding sweep with a compatible threshold.
    pub fn shortest_path(&self, threshold: f64) -> Result<Vec<usize>, EngineError> {
        let num_nodes = self.num_labels.len();
        match self.direction {
            Direction::Forward => {
                let ending = num_nodes - 1;
                let label = argmin(self.distance.row(ending))
                    .ok_or(EngineError::InconsistentPath { node: ending })?;
                self.backtrack_forward(threshold, ending, label)
            }
            Direction::Backward => {
                let label = argmin(self.distance.row(0))
                    .ok_or(EngineError::InconsistentPath { node: 0 })?;
                self.walk_backward(threshold, 0, label)
            }
        }
    }

    /// Backtrack from a caller-specified end point instead of the sink
    /// arg-min. Forward paths cover nodes `0..=ending_node`, backward paths
    /// `ending_node..num_nodes`.
    pub fn shortest_path_to(
        &self,
        threshold: f64,
        ending_node: usize,
        ending_label: usize,
    ) -> Result<Vec<usize>, EngineError> {
        match self.direction {
            Direction::Forward => self.backtrack_forward(threshold, ending_node, ending_label),
            Direction::Backward => self.walk_backward(threshold, ending_node, ending_label),
        }
    }

    fn backtrack_forward(
        &self,
        threshold: f64,
        ending_node: usize,
        ending_label: usize,
    ) -> Result<Vec<usize>, EngineError> {
        let mut path = vec![0usize; ending_node + 1];
        path[ending_node] = ending_label;
        for n2 in (1..=ending_node).rev() {
            let n1 = n2 - 1;
            let target = self.distance[n2][path[n2]];
            // Distances were produced by these exact additions, so exact
            // comparison identifies a valid predecessor.
            let pred = (0..self.num_labels[n1]).find(|&l1| {
                self.max.at(n1, l1, path[n2]) <= threshold
                    && self.distance[n1][l1] + self.linear.at(n1, l1, path[n2]) == target
            });
            match pred {
                Some(l1) => path[n1] = l1,
                None => return Err(EngineError::InconsistentPath { node: n1 }),
            }
        }
        Ok(path)
    }

    fn walk_backward(
        &self,
        threshold: f64,
        ending_node: usize,
        ending_label: usize,
    ) -> Result<Vec<usize>, EngineError> {
        let num_nodes = self.num_labels.len();
        let mut path = vec![0usize; num_nodes - ending_node];
        path[0] = ending_label;
        for (i, n1) in (ending_node..num_nodes - 1).enumerate() {
            let n2 = n1 + 1;
            let target = self.distance[n1][path[i]];
            let succ = (0..self.num_labels[n2]).find(|&l2| {
                self.max.at(n1, path[i], l2) <= threshold
                    && self.distance[n2][l2] + self.linear.at(n1, path[i], l2) == target
            });
            match succ {
                Some(l2) => path[i + 1] = l2,
                None => return Err(EngineError::InconsistentPath { node: n2 }),
            }
        }
        Ok(path)
    }
}
