//! Axis-aligned boxes on the normalized integer lattice of a curve

use crate::{Coord, MAX_DIMENSION};

/// Half-open box `[min, max)` of normalized curve coordinates
///
/// This is used both for the query region, once normalized, and for the tile
/// that the range decomposition is currently looking at.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchEnvelope {
    min: [Coord; MAX_DIMENSION],
    max: [Coord; MAX_DIMENSION],
    dimension: usize,
}

impl SearchEnvelope {
    /// Build a search envelope from its inclusive lower and exclusive upper
    /// corners, given as arrays whose first `dimension` entries are used
    pub fn new(
        min: [Coord; MAX_DIMENSION],
        max: [Coord; MAX_DIMENSION],
        dimension: usize,
    ) -> Self {
        debug_assert!((2..=MAX_DIMENSION).contains(&dimension));
        Self {
            min,
            max,
            dimension,
        }
    }

    /// Build the hypercube `[min, max)^dimension`
    pub fn cube(min: Coord, max: Coord, dimension: usize) -> Self {
        Self::new([min; MAX_DIMENSION], [max; MAX_DIMENSION], dimension)
    }

    /// Number of dimensions
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Inclusive lower corner
    pub fn min(&self) -> &[Coord] {
        &self.min[..self.dimension]
    }

    /// Exclusive upper corner
    pub fn max(&self) -> &[Coord] {
        &self.max[..self.dimension]
    }

    /// Truth that a lattice point lies inside this box
    pub fn contains(&self, coord: &[Coord]) -> bool {
        coord
            .iter()
            .zip(self.min().iter().zip(self.max()))
            .all(|(&value, (&min, &max))| min <= value && value < max)
    }

    /// Truth that two boxes share at least one lattice point
    pub fn intersects(&self, other: &Self) -> bool {
        (0..self.dimension)
            .all(|dim| self.min[dim] < other.max[dim] && other.min[dim] < self.max[dim])
    }

    /// One of the 2^dimension sub-boxes obtained by halving every axis
    ///
    /// `halves[dim]` is 0 to pick the lower half of axis `dim` and 1 to pick
    /// the upper half. Halving a power-of-two wide tile this way splits it
    /// exactly where the next bit of the normalized coordinates flips, which
    /// is what keeps tiles and curve keys in sync.
    ///
    #[must_use]
    pub fn quadrant(&self, halves: &[Coord]) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        for (dim, &half) in halves.iter().enumerate().take(self.dimension) {
            let extent = (self.max[dim] - self.min[dim]) / 2;
            min[dim] = self.min[dim] + half * extent;
            max[dim] = self.min[dim] + (half + 1) * extent;
        }
        Self::new(min, max, self.dimension)
    }

    /// Fraction of `other` that is covered by this box
    ///
    /// Computed as the product over every axis of the overlap length divided
    /// by the length of `other`. Only meaningful if the boxes intersect.
    ///
    pub fn fraction_of(&self, other: &Self) -> f64 {
        (0..self.dimension)
            .map(|dim| {
                let min = self.min[dim].max(other.min[dim]);
                let max = self.max[dim].min(other.max[dim]);
                max.saturating_sub(min) as f64 / (other.max[dim] - other.min[dim]) as f64
            })
            .product()
    }

    /// Number of lattice points inside this box
    pub fn area(&self) -> u64 {
        (0..self.dimension)
            .map(|dim| self.max[dim].saturating_sub(self.min[dim]))
            .product()
    }
}
