//! Space-filling curve keys for spatial data stored in 1D ordered indexes
//!
//! A [`SpaceFillingCurve`] maps points of a fixed 2D or 3D real-valued extent
//! onto a single integer key space, using either a Hilbert curve or a Z-order
//! (Morton) curve. Points that are close in space tend to get close keys,
//! which lets an ordinary ordered key/value index answer spatial queries:
//!
//! - To insert a point, store it under [`SpaceFillingCurve::derived_value_for`].
//! - To query a box, ask [`SpaceFillingCurve::ranges_for`] for a sorted set of
//!   key ranges, scan the index over each of them, and post-filter the
//!   candidates against the exact query geometry.
//!
//! The range decomposition never misses a point of the query box, but it is
//! allowed to return extra keys. How many extra keys are tolerated in exchange
//! for fewer, larger ranges is decided by a pluggable
//! [`SpaceFillingCurveConfiguration`].
//!
//! ```
//! use sfc_index::{Envelope, SpaceFillingCurve, StandardConfiguration};
//!
//! let curve = SpaceFillingCurve::hilbert_2d(Envelope::rect(0.0, 4.0, 0.0, 4.0), 2)?;
//! assert_eq!(curve.derived_value_for(&[0.0, 0.0])?, 0);
//!
//! let everything = curve.ranges_for(curve.extent(), &StandardConfiguration::default())?;
//! assert_eq!(everything.len(), 1);
//! assert_eq!((everything[0].min, everything[0].max), (0, 15));
//! # Ok::<(), sfc_index::CurveError>(())
//! ```

pub mod bits;
pub mod config;
pub mod curve;
pub mod envelope;
pub mod error;
pub mod hilbert;
pub mod monitor;
pub mod morton;
pub mod ranges;
pub mod rule;
pub mod search;
pub mod settings;

pub use config::{
    PartialOverlapConfiguration, SpaceFillingCurveConfiguration, StandardConfiguration,
};
pub use curve::{CurveFamily, SpaceFillingCurve};
pub use envelope::Envelope;
pub use error::{CurveError, Result};
pub use monitor::{HistogramMonitor, SpaceFillingCurveMonitor};
pub use ranges::LongRange;
pub use search::SearchEnvelope;
pub use settings::CurveSettings;

/// Integer type suitable for counting number of bits
///
/// Also used for curve levels, since a level is the number of bits that each
/// normalized coordinate carries.
///
pub type NumBits = u32;

/// Index of a point on a space-filling curve, also known as its derived value
///
/// Curves never use more than 63 bits, so every index can also be stored as a
/// signed 64-bit integer by the index that consumes it.
///
pub type CurveIdx = u64;

/// Coordinate of a point on the normalized integer lattice of a curve
pub type Coord = u64;

/// Highest number of dimensions supported by this crate
pub const MAX_DIMENSION: usize = 3;

/// Logging target used by all `tracing` events of this crate
pub(crate) const LOG_TARGET: &str = "sfc_index";
