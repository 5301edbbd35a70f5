//! Compressed Pareto frontiers over (bottleneck, linear) cost pairs.
//!
//! A frontier records, for each bottleneck level reached during a threshold
//! sweep, the best linear cost achievable at that level. Entries are kept
//! strictly increasing in bottleneck cost; equal-bottleneck inserts merge
//! into one entry holding the smaller linear cost.
//!
//! Two lifecycle phases:
//! 1. *Building*: append-only, inserts must arrive sorted by non-decreasing
//!    bottleneck cost.
//! 2. *Replaying* (after [`ParetoFrontier::seal`]): positional overwrite of
//!    linear costs against the same bottleneck breakpoints, so re-solving
//!    with updated linear potentials reuses the allocation.

use thiserror::Error;

/// A point on the trade-off curve between bottleneck and linear cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxLinearCost {
    /// Bottleneck (max-aggregated) component.
    pub max_cost: f64,
    /// Sum-aggregated component.
    pub linear_cost: f64,
}

impl MaxLinearCost {
    pub fn new(max_cost: f64, linear_cost: f64) -> Self {
        Self {
            max_cost,
            linear_cost,
        }
    }

    /// Combined objective value.
    #[inline]
    pub fn total(&self) -> f64 {
        self.max_cost + self.linear_cost
    }
}

/// Frontier lifecycle and ordering violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontierError {
    /// Building-phase insert arrived with a smaller bottleneck cost than the
    /// last retained entry.
    #[error("frontier insert out of order: {incoming} < last retained {last}")]
    UnsortedInsert { incoming: f64, last: f64 },
    /// Replay-phase insert does not match the sealed bottleneck breakpoints.
    #[error("replay insert at position {position} expected bottleneck {expected}, got {got}")]
    ReplayMismatch {
        position: usize,
        expected: f64,
        got: f64,
    },
    /// Replay-phase insert ran past the sealed frontier length.
    #[error("replay insert past end of sealed frontier (len {len})")]
    ReplayOverrun { len: usize },
}

/// Threshold-sorted curve of [`MaxLinearCost`] points for one subproblem.
#[derive(Debug, Clone, Default)]
pub struct ParetoFrontier {
    points: Vec<MaxLinearCost>,
    cursor: usize,
    sealed: bool,
    restricted: bool,
}

impl ParetoFrontier {
    /// Frontier keeping every distinct bottleneck level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frontier that additionally drops dominated points: an insert whose
    /// linear cost does not improve on the last retained entry is discarded,
    /// since it can never be optimal.
    pub fn restricted() -> Self {
        Self {
            restricted: true,
            ..Self::default()
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.points.reserve(additional);
    }

    /// Insert the next point of a sweep.
    ///
    /// Building phase: appends, merging equal-bottleneck entries and (in
    /// restricted mode) dropping dominated ones. Replay phase: overwrites
    /// the linear cost at the current cursor position, which must carry the
    /// same bottleneck cost as during building.
    pub fn insert(&mut self, point: MaxLinearCost) -> Result<(), FrontierError> {
        if !self.sealed {
            return self.insert_building(point);
        }
        self.insert_replaying(point)
    }

    fn insert_building(&mut self, point: MaxLinearCost) -> Result<(), FrontierError> {
        let Some(&last) = self.points.last() else {
            self.points.push(point);
            return Ok(());
        };
        if last.max_cost > point.max_cost {
            return Err(FrontierError::UnsortedInsert {
                incoming: point.max_cost,
                last: last.max_cost,
            });
        }
        if last.max_cost == point.max_cost {
            let slot = self.points.len() - 1;
            self.points[slot].linear_cost = last.linear_cost.min(point.linear_cost);
        } else if self.restricted && point.linear_cost >= last.linear_cost {
            // Dominated: a more permissive threshold with no linear
            // improvement can never be the optimum.
        } else {
            self.points.push(point);
        }
        Ok(())
    }

    fn insert_replaying(&mut self, point: MaxLinearCost) -> Result<(), FrontierError> {
        if self.cursor > 0 && self.points[self.cursor - 1].max_cost == point.max_cost {
            let prev = &mut self.points[self.cursor - 1];
            prev.linear_cost = prev.linear_cost.min(point.linear_cost);
            return Ok(());
        }
        if self.restricted
            && self.cursor > 0
            && point.linear_cost >= self.points[self.cursor - 1].linear_cost
        {
            return Ok(());
        }
        let Some(slot) = self.points.get_mut(self.cursor) else {
            return Err(FrontierError::ReplayOverrun {
                len: self.points.len(),
            });
        };
        if slot.max_cost != point.max_cost {
            return Err(FrontierError::ReplayMismatch {
                position: self.cursor,
                expected: slot.max_cost,
                got: point.max_cost,
            });
        }
        slot.linear_cost = point.linear_cost;
        self.cursor += 1;
        Ok(())
    }

    /// End the building phase. Subsequent inserts replay positionally from
    /// the front.
    pub fn seal(&mut self) {
        self.sealed = true;
        self.cursor = 0;
    }

    /// Rewind the replay cursor for another overwrite pass.
    pub fn rewind(&mut self) {
        debug_assert!(self.sealed);
        self.cursor = 0;
    }

    /// Drop all points and return to the building phase.
    pub fn clear(&mut self) {
        self.points.clear();
        self.cursor = 0;
        self.sealed = false;
    }

    #[inline]
    pub fn get(&self, i: usize) -> MaxLinearCost {
        self.points[i]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All retained points, sorted by strictly increasing bottleneck cost.
    #[inline]
    pub fn points(&self) -> &[MaxLinearCost] {
        &self.points
    }
}

/// Combines one node's frontier with a second, single-label node's cost.
///
/// Used by the outer relaxation to answer two-node subproblems: the first
/// node contributes a whole trade-off curve, the second a single
/// (bottleneck, linear) pair that shifts over the course of the sweep.
pub struct PairCombiner<'a> {
    frontier: &'a ParetoFrontier,
}

impl<'a> PairCombiner<'a> {
    pub fn new(frontier: &'a ParetoFrontier) -> Self {
        Self { frontier }
    }

    /// Index into the frontier minimizing
    /// `max(frontier[i].max_cost, single.max_cost) + frontier[i].linear_cost
    /// + single.linear_cost`, together with that combined cost.
    ///
    /// Warm start: if `prev_best` is still feasible (its bottleneck cost
    /// dominates `single.max_cost`) it stays optimal without rescanning;
    /// raising the counterpart's bottleneck can never make an earlier,
    /// lower-bottleneck entry preferable over one already chosen at a lower
    /// threshold. Otherwise falls back to a linear scan from `prev_best`.
    pub fn compute_best_index_and_cost(
        &self,
        single: MaxLinearCost,
        prev_best: Option<usize>,
    ) -> (usize, MaxLinearCost) {
        if self.frontier.is_empty() {
            return (0, single);
        }
        if let Some(prev) = prev_best {
            let entry = self.frontier.get(prev);
            if entry.max_cost >= single.max_cost {
                return (
                    prev,
                    MaxLinearCost::new(entry.max_cost, entry.linear_cost + single.linear_cost),
                );
            }
        }
        let start = prev_best.unwrap_or(0);
        let mut best_index = start;
        let mut best = MaxLinearCost::new(f64::INFINITY, f64::INFINITY);
        for i in start..self.frontier.len() {
            let entry = self.frontier.get(i);
            let candidate = MaxLinearCost::new(
                entry.max_cost.max(single.max_cost),
                entry.linear_cost,
            );
            if candidate.total() < best.total() {
                best = candidate;
                best_index = i;
            }
        }
        best.linear_cost += single.linear_cost;
        debug_assert!(best.max_cost < f64::INFINITY);
        (best_index, best)
    }
}
