//! Exact per-chain subroutines for bottleneck + linear labeling problems.
//!
//! This crate supplies the inner machinery of a decomposition-based
//! relaxation for grid labeling energies that mix a sum-aggregated
//! ("linear") smoothness term with a max-aggregated ("bottleneck") term,
//! such as surface tracking with a worst-case jump bound.
//!
//! ## Core pieces
//! 1. [`ChainPathEngine`]: parametric shortest paths along one chain. For a
//!    bottleneck threshold it restricts the chain to admissible edges and
//!    finds the minimum linear-cost labeling, either by a full sweep or by
//!    incremental edge activation while the threshold grows.
//! 2. [`ParetoFrontier`] and [`PairCombiner`]: the compressed trade-off
//!    curve between threshold and best linear cost, with warm-started
//!    two-node queries.
//! 3. [`ChainTopology`]: routes edges of a 2-D grid to the horizontal or
//!    vertical chain owning them.
//! 4. [`GreedyRounder`]: stitches independent per-chain results into one
//!    consistent integral grid labeling.
//!
//! The outer message-passing solver that sweeps thresholds and updates dual
//! variables lives elsewhere; everything here is a deterministic, in-process
//! call/return API.
//!
//! ## Quick start
//! ```
//! use bottleneck_chains::{ChainPathEngine, Direction, Restriction, tables::Ragged3};
//!
//! // Chain of 3 nodes with label counts [1, 2, 1].
//! let linear = Ragged3::from_nested(vec![
//!     vec![vec![2.0, 5.0]],
//!     vec![vec![1.0], vec![3.0]],
//! ]);
//! let max = Ragged3::from_shapes(&[(1, 2), (2, 1)], 0.0);
//! let labels = vec![1, 2, 1];
//!
//! let mut engine = ChainPathEngine::new(
//!     &linear, &max, &labels, Direction::Forward, Restriction::None,
//! ).unwrap();
//! engine.calculate_distances(0.0);
//! assert_eq!(engine.shortest_distance(), 3.0);
//! assert_eq!(engine.shortest_path(0.0).unwrap(), vec![0, 0, 0]);
//! ```

pub mod engine;
pub mod frontier;
pub mod rounding;
pub mod tables;
pub mod topology;
pub mod utils;

pub use crate::engine::{ChainPathEngine, Direction, EngineError, Restriction};
pub use crate::frontier::{FrontierError, MaxLinearCost, PairCombiner, ParetoFrontier};
pub use crate::rounding::{GreedyRounder, RoundingError};
pub use crate::topology::{ChainEdgeRef, ChainTopology, GridLayout, TopologyError};
