//! Error types for curve construction and key computations

use crate::{Coord, CurveIdx, NumBits};

/// Result type alias using [`CurveError`]
pub type Result<T> = core::result::Result<T, CurveError>;

/// Errors reported by space-filling curves
///
/// All of these are programmer errors detected synchronously: the crate does
/// no I/O, so nothing here is transient or worth retrying as-is.
///
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// Only 2D and 3D curves exist
    #[error("space-filling curves support 2 or 3 dimensions, not {0}")]
    UnsupportedDimension(usize),

    /// The curve resolution does not fit a 63-bit key
    #[error("max level {max_level} is invalid for a {dimension}D curve, expected 1..={limit}")]
    InvalidMaxLevel {
        max_level: NumBits,
        dimension: usize,
        limit: NumBits,
    },

    /// A key was requested at a finer level than the curve resolution
    #[error("level {level} is finer than the curve resolution of {max_level} levels")]
    InvalidLevel { level: NumBits, max_level: NumBits },

    /// Coordinates or envelopes do not have the curve's dimension
    #[error("expected {expected}-dimensional input, got {actual} dimensions")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The curve extent has no usable width along an axis
    #[error("curve extent has an empty or non-finite width along axis {axis}")]
    DegenerateExtent { axis: usize },

    /// A normalized coordinate lies outside of the curve lattice
    #[error("normalized coordinate {value} on axis {axis} is outside of 0..{width}")]
    CoordinateOutOfRange {
        axis: usize,
        value: Coord,
        width: Coord,
    },

    /// A derived value lies outside of the curve key space
    #[error("derived value {value} is outside of 0..{value_width}")]
    ValueOutOfRange { value: CurveIdx, value_width: CurveIdx },
}

impl CurveError {
    /// Truth that this error can only come from building a curve
    ///
    /// Construction errors are fatal for the index that requested the curve.
    /// Other errors reject a single call and can be fixed by the caller, e.g.
    /// by asking for a coarser level.
    ///
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDimension(_)
                | Self::InvalidMaxLevel { .. }
                | Self::DegenerateExtent { .. }
        )
    }
}
