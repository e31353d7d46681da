//! Axis-aligned boxes in real-valued coordinate space

use crate::{
    error::{CurveError, Result},
    LOG_TARGET, MAX_DIMENSION,
};
use tracing::debug;

/// Longest side of an envelope divided by its shortest side, at most
///
/// See [`Envelope::with_side_ratio_not_too_small()`].
///
pub const MAXIMAL_ENVELOPE_SIDE_RATIO: f64 = 100_000.0;

/// Axis-aligned box in 2D or 3D real space
///
/// The curve extent and spatial queries are both expressed as envelopes. An
/// envelope always satisfies `min(dim) <= max(dim)`: constructors collapse an
/// inverted axis to the degenerate range `[min, min]` instead of failing,
/// because open-ended spatial queries legitimately produce such ranges.
///
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Bounds", into = "Bounds")
)]
pub struct Envelope {
    min: [f64; MAX_DIMENSION],
    max: [f64; MAX_DIMENSION],
    dimension: usize,
}

impl Envelope {
    /// Build an envelope from its lower and upper corners
    ///
    /// # Errors
    ///
    /// Fails if the two corners do not have the same dimension, or if that
    /// dimension is not 2 or 3.
    ///
    pub fn new(min: &[f64], max: &[f64]) -> Result<Self> {
        if min.len() != max.len() {
            return Err(CurveError::DimensionMismatch {
                expected: min.len(),
                actual: max.len(),
            });
        }
        let dimension = min.len();
        if !(2..=MAX_DIMENSION).contains(&dimension) {
            return Err(CurveError::UnsupportedDimension(dimension));
        }
        let mut corners = [[0.0; MAX_DIMENSION]; 2];
        corners[0][..dimension].copy_from_slice(min);
        corners[1][..dimension].copy_from_slice(max);
        Ok(Self::from_corners(corners[0], corners[1], dimension))
    }

    /// Build a 2D envelope from its ranges along each axis
    pub fn rect(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self::from_corners([x_min, y_min, 0.0], [x_max, y_max, 0.0], 2)
    }

    /// Shared constructor, enforces `min <= max` on every axis
    pub(crate) fn from_corners(
        min: [f64; MAX_DIMENSION],
        mut max: [f64; MAX_DIMENSION],
        dimension: usize,
    ) -> Self {
        for axis in 0..dimension {
            if min[axis] > max[axis] {
                debug!(
                    target: LOG_TARGET,
                    axis,
                    min = min[axis],
                    max = max[axis],
                    "collapsing inverted envelope axis"
                );
                max[axis] = min[axis];
            }
        }
        Self {
            min,
            max,
            dimension,
        }
    }

    /// Number of dimensions (2 or 3)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Lower bound along one axis
    pub fn min(&self, dim: usize) -> f64 {
        self.mins()[dim]
    }

    /// Upper bound along one axis
    pub fn max(&self, dim: usize) -> f64 {
        self.maxs()[dim]
    }

    /// Lower corner
    pub fn mins(&self) -> &[f64] {
        &self.min[..self.dimension]
    }

    /// Upper corner
    pub fn maxs(&self) -> &[f64] {
        &self.max[..self.dimension]
    }

    /// Extent along one axis
    pub fn width(&self, dim: usize) -> f64 {
        self.max(dim) - self.min(dim)
    }

    /// Extent along every axis, divided by `divisor`
    ///
    /// With `divisor = 2^level`, this is the size of a curve tile at `level`.
    ///
    pub fn widths(&self, divisor: f64) -> Vec<f64> {
        (0..self.dimension)
            .map(|dim| self.width(dim) / divisor)
            .collect()
    }

    /// Product of the widths along every axis
    pub fn area(&self) -> f64 {
        (0..self.dimension).map(|dim| self.width(dim)).product()
    }

    /// Truth that this envelope has no extent along any axis
    pub fn is_point(&self) -> bool {
        (0..self.dimension).all(|dim| self.width(dim) == 0.0)
    }

    /// Truth that a point lies inside the closed box
    ///
    /// Range decompositions treat queries as half-open, so this is not the
    /// right test to post-filter their candidates. Use
    /// [`SpaceFillingCurve::query_contains()`] for that.
    ///
    /// [`SpaceFillingCurve::query_contains()`]: crate::SpaceFillingCurve::query_contains
    ///
    pub fn covers(&self, point: &[f64]) -> bool {
        point.len() == self.dimension
            && point
                .iter()
                .enumerate()
                .all(|(dim, &value)| self.min(dim) <= value && value <= self.max(dim))
    }

    /// Truth that two closed boxes share at least one point
    pub fn intersects(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && (0..self.dimension)
                .all(|dim| self.min(dim) <= other.max(dim) && other.min(dim) <= self.max(dim))
    }

    /// Common part of two boxes, if any
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        let mut min = self.min;
        let mut max = self.max;
        for dim in 0..self.dimension {
            min[dim] = min[dim].max(other.min(dim));
            max[dim] = max[dim].min(other.max(dim));
        }
        Some(Self::from_corners(min, max, self.dimension))
    }

    /// Fraction of the smaller of two boxes that lies inside the other one
    pub fn overlap(&self, other: &Self) -> f64 {
        let Some(intersection) = self.intersection(other) else {
            return 0.0;
        };
        let smallest_area = self.area().min(other.area());
        if smallest_area == 0.0 {
            1.0
        } else {
            intersection.area() / smallest_area
        }
    }

    /// Pad the short sides of this envelope
    ///
    /// Every side shorter than the longest side divided by
    /// [`MAXIMAL_ENVELOPE_SIDE_RATIO`] is widened symmetrically to that length.
    /// A very thin query would otherwise have a near-zero area, and the search
    /// depth derived from the area ratio would become absurdly large.
    ///
    #[must_use]
    pub fn with_side_ratio_not_too_small(&self) -> Self {
        let longest = (0..self.dimension)
            .map(|dim| self.width(dim))
            .fold(f64::MIN, f64::max);
        let shortest_allowed = longest / MAXIMAL_ENVELOPE_SIDE_RATIO;
        let mut min = self.min;
        let mut max = self.max;
        for dim in 0..self.dimension {
            if self.width(dim) < shortest_allowed {
                min[dim] -= shortest_allowed / 2.0;
                max[dim] += shortest_allowed / 2.0;
            }
        }
        Self::from_corners(min, max, self.dimension)
    }
}

/// Serialized form of an [`Envelope`]
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct Bounds {
    min: Vec<f64>,
    max: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<Bounds> for Envelope {
    type Error = CurveError;

    fn try_from(bounds: Bounds) -> Result<Self> {
        Self::new(&bounds.min, &bounds.max)
    }
}

#[cfg(feature = "serde")]
impl From<Envelope> for Bounds {
    fn from(envelope: Envelope) -> Self {
        Self {
            min: envelope.mins().to_vec(),
            max: envelope.maxs().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction() {
        let envelope = Envelope::new(&[-8.0, -20.0, -15.0], &[8.0, 0.0, 15.0]).unwrap();
        assert_eq!(envelope.dimension(), 3);
        assert_eq!(envelope.mins(), &[-8.0, -20.0, -15.0]);
        assert_eq!(envelope.maxs(), &[8.0, 0.0, 15.0]);
        assert_eq!(envelope.width(1), 20.0);
        assert_eq!(envelope.area(), 16.0 * 20.0 * 30.0);
        assert_eq!(envelope.widths(4.0), vec![4.0, 5.0, 7.5]);

        assert_eq!(
            Envelope::new(&[0.0, 0.0], &[1.0, 1.0, 1.0]),
            Err(CurveError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            Envelope::new(&[0.0], &[1.0]),
            Err(CurveError::UnsupportedDimension(1))
        );
        assert_eq!(
            Envelope::new(&[0.0; 4], &[1.0; 4]),
            Err(CurveError::UnsupportedDimension(4))
        );
    }

    #[test]
    fn inverted_axis_collapses() {
        let envelope = Envelope::rect(5.0, 2.0, -1.0, 1.0);
        assert_eq!(envelope.min(0), 5.0);
        assert_eq!(envelope.max(0), 5.0);
        assert_eq!(envelope.width(0), 0.0);
        assert_eq!(envelope.width(1), 2.0);
        assert_eq!(envelope.area(), 0.0);
        assert!(!envelope.is_point());
        assert!(Envelope::rect(1.0, 1.0, 2.0, 2.0).is_point());
    }

    #[test]
    fn covers() {
        let envelope = Envelope::rect(-1.0, 1.0, 0.0, 2.0);
        assert!(envelope.covers(&[0.0, 1.0]));
        assert!(envelope.covers(&[-1.0, 0.0]));
        assert!(envelope.covers(&[1.0, 2.0]));
        assert!(!envelope.covers(&[1.0, 2.5]));
        assert!(!envelope.covers(&[0.0, 1.0, 0.0]));
    }

    #[test]
    fn intersection_and_overlap() {
        let left = Envelope::rect(0.0, 4.0, 0.0, 4.0);
        let right = Envelope::rect(2.0, 6.0, 2.0, 3.0);
        let far = Envelope::rect(10.0, 11.0, 10.0, 11.0);

        assert!(left.intersects(&right));
        assert!(!left.intersects(&far));
        assert_eq!(left.intersection(&far), None);
        assert_eq!(
            left.intersection(&right),
            Some(Envelope::rect(2.0, 4.0, 2.0, 3.0))
        );

        // Half of the smaller box sticks out of the larger one
        assert_eq!(left.overlap(&right), 0.5);
        assert_eq!(right.overlap(&left), 0.5);
        assert_eq!(left.overlap(&far), 0.0);
        assert_eq!(left.overlap(&Envelope::rect(1.0, 1.0, 1.0, 1.0)), 1.0);

        // Touching boxes share their common edge
        let touching = Envelope::rect(4.0, 5.0, 0.0, 4.0);
        assert!(left.intersects(&touching));
        assert_eq!(left.overlap(&touching), 0.0);
    }

    #[test]
    fn side_ratio_padding() {
        // Sides that are long enough are left alone
        let square = Envelope::rect(0.0, 10.0, 0.0, 10.0);
        assert_eq!(square.with_side_ratio_not_too_small(), square);

        // A line gets widened to the shortest allowed side
        let line = Envelope::rect(0.0, 100_000.0, 5.0, 5.0);
        let padded = line.with_side_ratio_not_too_small();
        assert_eq!(padded.min(0), 0.0);
        assert_eq!(padded.max(0), 100_000.0);
        assert_eq!(padded.min(1), 4.5);
        assert_eq!(padded.max(1), 5.5);
        assert_eq!(padded.area(), 100_000.0);

        // A point has no longest side to derive a padding from
        let point = Envelope::rect(3.0, 3.0, 3.0, 3.0);
        assert_eq!(point.with_side_ratio_not_too_small().area(), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_validates() {
        let envelope = Envelope::rect(-180.0, 180.0, -90.0, 90.0);
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"min":[-180.0,-90.0],"max":[180.0,90.0]}"#);
        assert_eq!(serde_json::from_str::<Envelope>(&json).unwrap(), envelope);
        assert!(serde_json::from_str::<Envelope>(r#"{"min":[0.0],"max":[1.0]}"#).is_err());
    }
}
