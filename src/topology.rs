//! Grid-to-chain topology mapping.
//!
//! A 2-D grid decomposed into horizontal and vertical chains is described
//! by the chain-local-to-grid-id map. This module classifies chains by
//! orientation, infers the grid extents, and routes grid edges to the chain
//! and chain-local position owning their potential table entry.
//!
//! Grid node ids are row-major with row length [`ChainTopology::horizontal_size`]:
//! a horizontal chain's row is `id / width`, a vertical chain's column is
//! `id % width`.

use thiserror::Error;

use crate::tables::Ragged2;

/// Which chain owns a grid edge, and where along the chain it sits.
///
/// `position` indexes the owning chain's potential tables; the edge runs
/// between chain-local nodes `position` and `position + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainEdgeRef {
    pub chain: usize,
    pub position: usize,
}

/// Shape of the decomposition.
///
/// The degenerate single-chain case is an explicit variant rather than an
/// inferred zero-count, so 1-D instances cannot silently misindex the
/// offset tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLayout {
    /// One horizontal chain and nothing else; every lookup maps to chain 0.
    SingleChain,
    /// A genuine 2-D decomposition.
    Grid { width: usize, height: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("chain {chain} has fewer than two nodes and cannot be oriented")]
    ChainTooShort { chain: usize },
    #[error("grid nodes {n1} and {n2} are not adjacent")]
    NotGridAdjacent { n1: usize, n2: usize },
}

/// Orientation and lookup tables for one chain decomposition; built once.
#[derive(Debug, Clone)]
pub struct ChainTopology {
    is_horizontal: Vec<bool>,
    /// Horizontal chain index per grid row.
    h_chain_at_row: Vec<usize>,
    /// Vertical chain index per grid column.
    v_chain_at_col: Vec<usize>,
    width: usize,
    height: usize,
    layout: GridLayout,
}

impl ChainTopology {
    /// Classify the chains of `chain_to_grid` (each row an ordered sequence
    /// of grid ids) and build the offset lookup tables.
    pub fn new(chain_to_grid: &Ragged2<usize>) -> Result<Self, TopologyError> {
        let num_chains = chain_to_grid.len();
        let mut is_horizontal = vec![false; num_chains];
        let mut num_horizontal = 0;
        let mut num_vertical = 0;
        let mut width = 1;
        let mut height = 1;
        for c in 0..num_chains {
            let chain = chain_to_grid.row(c);
            if chain.len() < 2 {
                return Err(TopologyError::ChainTooShort { chain: c });
            }
            if chain[1] == chain[0] + 1 {
                is_horizontal[c] = true;
                num_horizontal += 1;
                width = chain.len();
            } else {
                num_vertical += 1;
                height = chain.len();
            }
        }

        let layout = if num_vertical == 0 {
            GridLayout::SingleChain
        } else {
            GridLayout::Grid { width, height }
        };

        let mut h_chain_at_row = vec![0; if num_vertical == 0 { 1 } else { height }];
        let mut v_chain_at_col = vec![0; if num_vertical == 0 { 0 } else { width }];
        if num_vertical > 0 {
            for c in 0..num_chains {
                let head = chain_to_grid[c][0];
                if is_horizontal[c] {
                    h_chain_at_row[head / width] = c;
                } else {
                    v_chain_at_col[head % width] = c;
                }
            }
        }

        Ok(Self {
            is_horizontal,
            h_chain_at_row,
            v_chain_at_col,
            width,
            height,
            layout,
        })
    }

    #[inline]
    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    #[inline]
    pub fn num_chains(&self) -> usize {
        self.is_horizontal.len()
    }

    #[inline]
    pub fn is_horizontal(&self, chain: usize) -> bool {
        self.is_horizontal[chain]
    }

    #[inline]
    pub fn is_vertical(&self, chain: usize) -> bool {
        !self.is_horizontal[chain]
    }

    pub fn num_horizontal(&self) -> usize {
        self.is_horizontal.iter().filter(|&&h| h).count()
    }

    pub fn num_vertical(&self) -> usize {
        self.num_chains() - self.num_horizontal()
    }

    /// Length of a horizontal chain (grid width).
    #[inline]
    pub fn horizontal_size(&self) -> usize {
        self.width
    }

    /// Length of a vertical chain (grid height).
    #[inline]
    pub fn vertical_size(&self) -> usize {
        self.height
    }

    /// Column of a grid node.
    #[inline]
    pub fn horizontal_offset(&self, grid_loc: usize) -> usize {
        match self.layout {
            GridLayout::SingleChain => grid_loc,
            GridLayout::Grid { width, .. } => grid_loc % width,
        }
    }

    /// Row of a grid node.
    #[inline]
    pub fn vertical_offset(&self, grid_loc: usize) -> usize {
        match self.layout {
            GridLayout::SingleChain => 0,
            GridLayout::Grid { width, .. } => grid_loc / width,
        }
    }

    /// Horizontal chain covering the given grid node.
    #[inline]
    pub fn horizontal_chain_at(&self, grid_loc: usize) -> usize {
        self.h_chain_at_row[self.vertical_offset(grid_loc)]
    }

    /// Vertical chain covering the given grid node. Panics for a
    /// single-chain layout, which has no vertical chains.
    #[inline]
    pub fn vertical_chain_at(&self, grid_loc: usize) -> usize {
        self.v_chain_at_col[self.horizontal_offset(grid_loc)]
    }

    /// Horizontal chain at a given row.
    #[inline]
    pub fn horizontal_chain_at_row(&self, row: usize) -> usize {
        self.h_chain_at_row[row]
    }

    /// Vertical chain at a given column.
    #[inline]
    pub fn vertical_chain_at_col(&self, col: usize) -> usize {
        self.v_chain_at_col[col]
    }

    /// Route a grid edge `(n1, n2)` with `n1 < n2` to its owning chain and
    /// chain-local position. A unit id difference is a horizontal edge
    /// unless `n1` sits in the last column (the pair straddles a row break),
    /// a difference of the grid width a vertical edge unless `n1` sits in
    /// the last row.
    pub fn edge_ref_from_grid_edge(
        &self,
        n1: usize,
        n2: usize,
    ) -> Result<ChainEdgeRef, TopologyError> {
        debug_assert!(n1 < n2, "edge must be given low id first");
        if n2 - n1 == 1 && self.horizontal_offset(n1) + 1 < self.width {
            return Ok(ChainEdgeRef {
                chain: self.horizontal_chain_at(n1),
                position: self.horizontal_offset(n1),
            });
        }
        match self.layout {
            GridLayout::Grid { width, height }
                if n2 - n1 == width && self.vertical_offset(n1) + 1 < height =>
            {
                Ok(ChainEdgeRef {
                    chain: self.vertical_chain_at(n1),
                    position: self.vertical_offset(n1),
                })
            }
            _ => Err(TopologyError::NotGridAdjacent { n1, n2 }),
        }
    }

    /// Per orientation, the chain whose smallest per-node label count is
    /// globally minimal: a cheap anchor pair for alternating-chain
    /// constructive schemes. `None` when no chain of that orientation
    /// exists.
    pub fn seed_chains(&self, num_labels: &Ragged2<usize>) -> (Option<usize>, Option<usize>) {
        let mut best_h: Option<(usize, usize)> = None;
        let mut best_v: Option<(usize, usize)> = None;
        for c in 0..self.num_chains() {
            let chain_min = num_labels.row(c).iter().copied().min().unwrap_or(usize::MAX);
            let slot = if self.is_horizontal[c] {
                &mut best_h
            } else {
                &mut best_v
            };
            match slot {
                Some((_, best)) if *best <= chain_min => {}
                _ => *slot = Some((c, chain_min)),
            }
        }
        (best_h.map(|(c, _)| c), best_v.map(|(c, _)| c))
    }
}
