//! Small float helpers shared by the engine and the rounder.

/// Index of the first minimum entry, or `None` for an empty slice.
///
/// Ties resolve to the lowest index, which is what path backtracking and
/// label selection rely on for determinism.
#[inline]
pub fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Minimum entry, `+inf` for an empty slice.
#[inline]
pub fn min_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}
