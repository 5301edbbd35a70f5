//! Dense ragged numeric tables.
//!
//! The engine consumes potentials through a narrow indexed interface:
//! `(position, label_a, label_b) -> cost` with per-position bounds. These
//! containers back that interface with flat storage and O(1) access; they
//! carry no algorithmic logic of their own.

/// Ragged 2-D table: `len()` rows, row `i` holding `dim2(i)` entries.
///
/// Used for the per-(node,label) distance table and for chain-to-grid-id
/// maps. Rows are contiguous slices.
#[derive(Debug, Clone, PartialEq)]
pub struct Ragged2<T> {
    data: Vec<T>,
    offsets: Vec<usize>, // len + 1 entries, offsets[i]..offsets[i+1] is row i
}

impl<T: Clone> Ragged2<T> {
    /// Build from explicit row sizes, every entry set to `init`.
    pub fn from_sizes(sizes: &[usize], init: T) -> Self {
        let mut offsets = Vec::with_capacity(sizes.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for &s in sizes {
            total += s;
            offsets.push(total);
        }
        Self {
            data: vec![init; total],
            offsets,
        }
    }

    /// Build from nested vectors.
    pub fn from_nested(rows: Vec<Vec<T>>) -> Self {
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut data = Vec::new();
        offsets.push(0);
        for row in rows {
            data.extend(row);
            offsets.push(data.len());
        }
        Self { data, offsets }
    }

    /// Overwrite every entry with `value`.
    pub fn fill(&mut self, value: T) {
        for slot in &mut self.data {
            *slot = value.clone();
        }
    }
}

impl<T> Ragged2<T> {
    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns true if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of row `i`.
    #[inline]
    pub fn dim2(&self, i: usize) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Row `i` as a mutable slice.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[self.offsets[i]..self.offsets[i + 1]]
    }
}

impl<T> std::ops::Index<usize> for Ragged2<T> {
    type Output = [T];
    #[inline]
    fn index(&self, i: usize) -> &[T] {
        self.row(i)
    }
}

/// Ragged 3-D table: `dim1()` positions, position `p` holding a
/// `dim2(p) x dim3(p)` dense block.
///
/// This is the layout of pairwise potentials along a chain: position `p`
/// is the edge between chain nodes `p` and `p+1`, dim2 the left node's
/// label count, dim3 the right node's.
#[derive(Debug, Clone, PartialEq)]
pub struct Ragged3<T> {
    data: Vec<T>,
    offsets: Vec<usize>, // dim1 + 1 entries
    shapes: Vec<(usize, usize)>,
}

impl<T: Clone> Ragged3<T> {
    /// Build from per-position `(dim2, dim3)` shapes, every entry `init`.
    pub fn from_shapes(shapes: &[(usize, usize)], init: T) -> Self {
        let mut offsets = Vec::with_capacity(shapes.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for &(a, b) in shapes {
            total += a * b;
            offsets.push(total);
        }
        Self {
            data: vec![init; total],
            offsets,
            shapes: shapes.to_vec(),
        }
    }

    /// Build from nested vectors; inner rows of one position must agree in
    /// length.
    pub fn from_nested(blocks: Vec<Vec<Vec<T>>>) -> Self {
        let mut shapes = Vec::with_capacity(blocks.len());
        let mut offsets = Vec::with_capacity(blocks.len() + 1);
        let mut data = Vec::new();
        offsets.push(0);
        for block in blocks {
            let d2 = block.len();
            let d3 = block.first().map_or(0, |r| r.len());
            for row in block {
                assert_eq!(row.len(), d3, "ragged inner rows within one position");
                data.extend(row);
            }
            shapes.push((d2, d3));
            offsets.push(data.len());
        }
        Self {
            data,
            offsets,
            shapes,
        }
    }
}

impl<T> Ragged3<T> {
    /// Number of positions.
    #[inline]
    pub fn dim1(&self) -> usize {
        self.shapes.len()
    }

    /// First-index extent at position `p`.
    #[inline]
    pub fn dim2(&self, p: usize) -> usize {
        self.shapes[p].0
    }

    /// Second-index extent at position `p`.
    #[inline]
    pub fn dim3(&self, p: usize) -> usize {
        self.shapes[p].1
    }

    #[inline]
    fn flat(&self, p: usize, a: usize, b: usize) -> usize {
        debug_assert!(a < self.shapes[p].0 && b < self.shapes[p].1);
        self.offsets[p] + a * self.shapes[p].1 + b
    }

    /// Entry at `(p, a, b)`.
    #[inline]
    pub fn get(&self, p: usize, a: usize, b: usize) -> &T {
        &self.data[self.flat(p, a, b)]
    }

    /// Overwrite the entry at `(p, a, b)`.
    #[inline]
    pub fn set(&mut self, p: usize, a: usize, b: usize, value: T) {
        let idx = self.flat(p, a, b);
        self.data[idx] = value;
    }
}

impl<T: Copy> Ragged3<T> {
    /// Copying accessor for small scalar payloads.
    #[inline]
    pub fn at(&self, p: usize, a: usize, b: usize) -> T {
        self.data[self.flat(p, a, b)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged2_sizes_and_rows() {
        let mut t = Ragged2::from_sizes(&[1, 3, 2], 0.0f64);
        assert_eq!(t.len(), 3);
        assert_eq!(t.dim2(1), 3);
        t.row_mut(1)[2] = 4.5;
        assert_eq!(t[1], [0.0, 0.0, 4.5]);
        t.fill(1.0);
        assert_eq!(t[2], [1.0, 1.0]);
    }

    #[test]
    fn ragged2_from_nested() {
        let t = Ragged2::from_nested(vec![vec![7usize], vec![1, 2]]);
        assert_eq!(t[0], [7]);
        assert_eq!(t[1], [1, 2]);
        assert!(!t.is_empty());
    }

    #[test]
    fn ragged3_indexing() {
        let t = Ragged3::from_nested(vec![
            vec![vec![2.0, 5.0]],               // 1x2 block
            vec![vec![1.0], vec![3.0]],         // 2x1 block
        ]);
        assert_eq!(t.dim1(), 2);
        assert_eq!(t.dim2(0), 1);
        assert_eq!(t.dim3(0), 2);
        assert_eq!(t.at(0, 0, 1), 5.0);
        assert_eq!(t.at(1, 1, 0), 3.0);
    }

    #[test]
    fn ragged3_set() {
        let mut t = Ragged3::from_shapes(&[(2, 2)], 0.0);
        t.set(0, 1, 0, 9.0);
        assert_eq!(t.at(0, 1, 0), 9.0);
        assert_eq!(t.at(0, 0, 0), 0.0);
    }
}
