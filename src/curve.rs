//! Space-filling curves over a bounded region of real space
//!
//! A [`SpaceFillingCurve`] overlays a regular grid of `2^max_level` tiles per
//! axis onto a real-valued extent, and numbers the tiles along a curve. The
//! number of a tile is its key, or derived value.
//!
//! Keys are computed from normalized coordinates, i.e. tile indices along
//! every axis, by walking the curve's rule table from the coarsest level to
//! the finest one. At each level, the next bit of every coordinate forms an
//! n-point, which the current rule maps to a position along the curve. These
//! positions, concatenated, form the key.

use crate::{
    bits,
    config::SpaceFillingCurveConfiguration,
    envelope::Envelope,
    error::{CurveError, Result},
    hilbert,
    monitor::SpaceFillingCurveMonitor,
    morton,
    ranges::{self, LongRange},
    rule::RuleTable,
    search::SearchEnvelope,
    Coord, CurveIdx, NumBits, LOG_TARGET, MAX_DIMENSION,
};
use tracing::debug;

/// Kind of space-filling curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveFamily {
    /// 2D Hilbert curve, starting in the bottom-left corner with an upward step
    Hilbert2D,
    /// 3D Hilbert curve, starting at the origin with an upward step
    Hilbert3D,
    /// 2D Z-order curve, starting in the top-left corner
    ZOrder2D,
}

impl CurveFamily {
    /// Number of dimensions of the curves of this family
    pub const fn dimension(self) -> usize {
        match self {
            Self::Hilbert2D | Self::ZOrder2D => 2,
            Self::Hilbert3D => 3,
        }
    }

    /// Finest resolution that keeps keys within 63 bits
    pub const fn max_level_limit(self) -> NumBits {
        63 / self.dimension() as NumBits
    }

    /// Resolution used when none is specified: 30 in 2D, 20 in 3D
    pub const fn default_max_level(self) -> NumBits {
        self.max_level_limit() - 1
    }

    /// Shared rule table of this family
    pub fn rules(self) -> &'static RuleTable {
        match self {
            Self::Hilbert2D => hilbert::rules_2d(),
            Self::Hilbert3D => hilbert::rules_3d(),
            Self::ZOrder2D => morton::rules_2d(),
        }
    }
}

/// Mapping between a bounded real-valued region and integer keys
///
/// Curves are immutable once built, and can be shared across threads.
///
#[derive(Clone, Debug)]
pub struct SpaceFillingCurve {
    family: CurveFamily,
    extent: Envelope,
    max_level: NumBits,
    width: Coord,
    value_width: CurveIdx,
    scaling_factor: [f64; MAX_DIMENSION],
    rules: &'static RuleTable,
}

impl SpaceFillingCurve {
    /// Build a curve of some family over `extent`, with `max_level` bits of
    /// resolution per axis
    ///
    /// # Errors
    ///
    /// Fails if `extent` does not have the family's dimension, if
    /// `max_level` is outside of `1..=family.max_level_limit()`, or if the
    /// extent has zero or non-finite width along some axis.
    ///
    pub fn new(family: CurveFamily, extent: Envelope, max_level: NumBits) -> Result<Self> {
        let dimension = family.dimension();
        if extent.dimension() != dimension {
            return Err(CurveError::DimensionMismatch {
                expected: dimension,
                actual: extent.dimension(),
            });
        }
        let limit = family.max_level_limit();
        if !(1..=limit).contains(&max_level) {
            return Err(CurveError::InvalidMaxLevel {
                max_level,
                dimension,
                limit,
            });
        }
        let width: Coord = 1 << max_level;
        let mut scaling_factor = [0.0; MAX_DIMENSION];
        for (axis, factor) in scaling_factor.iter_mut().enumerate().take(dimension) {
            let extent_width = extent.width(axis);
            if !(extent_width.is_finite() && extent_width > 0.0) {
                return Err(CurveError::DegenerateExtent { axis });
            }
            *factor = width as f64 / extent_width;
        }
        let value_width = 1 << (max_level as usize * dimension);
        debug!(
            target: LOG_TARGET,
            ?family,
            max_level,
            extent = ?extent,
            "built space-filling curve"
        );
        Ok(Self {
            family,
            extent,
            max_level,
            width,
            value_width,
            scaling_factor,
            rules: family.rules(),
        })
    }

    /// Build a curve with the family's default resolution
    pub fn with_default_level(family: CurveFamily, extent: Envelope) -> Result<Self> {
        Self::new(family, extent, family.default_max_level())
    }

    /// Build a 2D Hilbert curve
    pub fn hilbert_2d(extent: Envelope, max_level: NumBits) -> Result<Self> {
        Self::new(CurveFamily::Hilbert2D, extent, max_level)
    }

    /// Build a 3D Hilbert curve
    pub fn hilbert_3d(extent: Envelope, max_level: NumBits) -> Result<Self> {
        Self::new(CurveFamily::Hilbert3D, extent, max_level)
    }

    /// Build a 2D Z-order curve
    pub fn z_order_2d(extent: Envelope, max_level: NumBits) -> Result<Self> {
        Self::new(CurveFamily::ZOrder2D, extent, max_level)
    }

    /// Kind of curve
    pub fn family(&self) -> CurveFamily {
        self.family
    }

    /// Region of real space covered by the curve
    pub fn extent(&self) -> &Envelope {
        &self.extent
    }

    /// Number of dimensions
    pub fn dimension(&self) -> usize {
        self.family.dimension()
    }

    /// Bits of resolution per axis
    pub fn max_level(&self) -> NumBits {
        self.max_level
    }

    /// Number of tiles along each axis, i.e. `2^max_level`
    pub fn width(&self) -> Coord {
        self.width
    }

    /// Number of keys, i.e. `2^(max_level * dimension)`
    pub fn value_width(&self) -> CurveIdx {
        self.value_width
    }

    /// Width along axis `dim` of one tile at `level`
    pub fn tile_width(&self, dim: usize, level: NumBits) -> f64 {
        self.extent.width(dim) / 2f64.powi(level as i32)
    }

    pub(crate) fn rules(&self) -> &'static RuleTable {
        self.rules
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual == self.dimension() {
            Ok(())
        } else {
            Err(CurveError::DimensionMismatch {
                expected: self.dimension(),
                actual,
            })
        }
    }

    fn check_level(&self, level: NumBits) -> Result<()> {
        if level <= self.max_level {
            Ok(())
        } else {
            Err(CurveError::InvalidLevel {
                level,
                max_level: self.max_level,
            })
        }
    }

    // --- Normalization ---

    /// Tile index of `value` along `axis`, clamped to the extent
    ///
    /// The scaled value is truncated to get a first guess, then the guess is
    /// re-checked against the tile's own lower edge and fixed by one tile if
    /// needed. This keeps points that sit exactly on a tile edge in the upper
    /// tile, even where the scaling loses precision.
    ///
    fn normalize_axis(&self, axis: usize, value: f64) -> Coord {
        let min = self.extent.min(axis);
        if value >= self.extent.max(axis) {
            return self.width - 1;
        }
        let value = value.max(min);
        let factor = self.scaling_factor[axis];
        let mut tile = (((value - min) * factor) as Coord).min(self.width - 1);
        let offset = (value - (min + tile as f64 / factor)) * factor;
        if offset < 0.0 && tile > 0 {
            tile -= 1;
        } else if offset >= 1.0 && tile < self.width - 1 {
            tile += 1;
        }
        tile
    }

    fn normalize(&self, point: &[f64]) -> [Coord; MAX_DIMENSION] {
        let mut coords = [0; MAX_DIMENSION];
        for (axis, (coord, &value)) in coords.iter_mut().zip(point).enumerate() {
            *coord = self.normalize_axis(axis, value);
        }
        coords
    }

    /// Tile indices of a point, clamped to the curve extent
    ///
    /// # Errors
    ///
    /// Fails if `point` does not have the curve's dimension.
    ///
    pub fn normalized_coord(&self, point: &[f64]) -> Result<Vec<Coord>> {
        self.check_dimension(point.len())?;
        Ok(self.normalize(point)[..self.dimension()].to_vec())
    }

    /// Convert a query envelope into a search box on the tile lattice
    ///
    /// The query is treated as half-open: a tile whose lower edge is exactly
    /// the upper bound of the query is left out, unless that bound is the
    /// upper edge of the extent or the query is degenerate on that axis.
    ///
    pub(crate) fn search_envelope(&self, query: &Envelope) -> SearchEnvelope {
        let mut min = [0; MAX_DIMENSION];
        let mut max = [0; MAX_DIMENSION];
        for axis in 0..self.dimension() {
            let (extent_min, extent_max) = (self.extent.min(axis), self.extent.max(axis));
            let low = query.min(axis).clamp(extent_min, extent_max);
            let high = query.max(axis).clamp(extent_min, extent_max);
            min[axis] = self.normalize_axis(axis, low);
            let last = self.normalize_axis(axis, high);
            let last_lower_edge = extent_min + last as f64 / self.scaling_factor[axis];
            let end = if high > low && high < extent_max && last_lower_edge >= high {
                last
            } else {
                last + 1
            };
            max[axis] = end.max(min[axis] + 1);
        }
        SearchEnvelope::new(min, max, self.dimension())
    }

    // --- Encoding and decoding ---

    /// Key of the tile that contains `point`, at the finest level
    ///
    /// Points outside of the extent are clamped to its boundary.
    ///
    /// # Errors
    ///
    /// Fails if `point` does not have the curve's dimension.
    ///
    pub fn derived_value_for(&self, point: &[f64]) -> Result<CurveIdx> {
        self.check_dimension(point.len())?;
        let coords = self.normalize(point);
        self.encode(&coords[..self.dimension()], self.max_level)
    }

    /// Key of a tile given by its normalized coordinates
    ///
    /// If `level` is coarser than the curve's resolution, only the `level`
    /// most significant bits of each coordinate are used, and the key of the
    /// enclosing coarse tile is returned, left-aligned on the key space. All
    /// keys of a coarse tile's subtiles thus start with the coarse tile's key.
    ///
    /// # Errors
    ///
    /// Fails if `coords` does not have the curve's dimension, if a coordinate
    /// is not below [`width()`](Self::width), or if `level` is finer than
    /// [`max_level()`](Self::max_level).
    ///
    pub fn encode(&self, coords: &[Coord], level: NumBits) -> Result<CurveIdx> {
        self.check_dimension(coords.len())?;
        self.check_level(level)?;
        for (axis, &value) in coords.iter().enumerate() {
            if value >= self.width {
                return Err(CurveError::CoordinateOutOfRange {
                    axis,
                    value,
                    width: self.width,
                });
            }
        }

        let dimension = self.dimension() as NumBits;
        let mut rule = self.rules.root();
        let mut key: CurveIdx = 0;
        for bit_index in (self.max_level - level..self.max_level).rev() {
            let npoint = bits::gather_npoint(coords, bit_index);
            let index = self.rules.index_for_npoint(rule, npoint);
            key = (key << dimension) | index as CurveIdx;
            rule = self.rules.child_at(rule, index);
        }
        if level < self.max_level {
            key <<= dimension * (self.max_level - level);
        }
        Ok(key)
    }

    /// Normalized coordinates of the tile with a certain key
    ///
    /// This is the inverse of [`encode()`](Self::encode). At a coarse
    /// `level`, only the `level * dimension` most significant bits of `value`
    /// are used and the coordinates of the coarse tile's lower corner are
    /// returned.
    ///
    /// # Errors
    ///
    /// Fails if `value` is not below [`value_width()`](Self::value_width) or
    /// if `level` is finer than [`max_level()`](Self::max_level).
    ///
    pub fn decode(&self, value: CurveIdx, level: NumBits) -> Result<Vec<Coord>> {
        self.check_level(level)?;
        if value >= self.value_width {
            return Err(CurveError::ValueOutOfRange {
                value,
                value_width: self.value_width,
            });
        }

        let dimension = self.dimension();
        let index_mask = bits::low_order_mask(dimension as NumBits);
        let mut rule = self.rules.root();
        let mut coords = vec![0; dimension];
        for bit_index in (self.max_level - level..self.max_level).rev() {
            let index = ((value >> (bit_index as usize * dimension)) & index_mask) as usize;
            let npoint = bits::scatter_npoint(self.rules.npoint_for_index(rule, index), dimension);
            for (coord, bit) in coords.iter_mut().zip(npoint) {
                *coord = (*coord << 1) | bit;
            }
            rule = self.rules.child_at(rule, index);
        }
        if level < self.max_level {
            for coord in &mut coords {
                *coord <<= self.max_level - level;
            }
        }
        Ok(coords)
    }

    /// Same as [`decode()`](Self::decode) at the finest level
    pub fn normalized_coordinate_for(&self, value: CurveIdx) -> Result<Vec<Coord>> {
        self.decode(value, self.max_level)
    }

    /// Center of the finest tile with a certain key, in real space
    ///
    /// # Errors
    ///
    /// Fails if `value` is not below [`value_width()`](Self::value_width).
    ///
    pub fn center_point_for(&self, value: CurveIdx) -> Result<Vec<f64>> {
        self.center_point_at_level(value, self.max_level)
    }

    /// Center of the tile of a certain level that contains a key
    ///
    /// # Errors
    ///
    /// See [`decode()`](Self::decode).
    ///
    pub fn center_point_at_level(&self, value: CurveIdx, level: NumBits) -> Result<Vec<f64>> {
        let coords = self.decode(value, level)?;
        Ok(coords
            .into_iter()
            .enumerate()
            .map(|(axis, coord)| {
                let center = self.extent.min(axis)
                    + coord as f64 / self.scaling_factor[axis]
                    + self.tile_width(axis, level) / 2.0;
                center.clamp(self.extent.min(axis), self.extent.max(axis))
            })
            .collect())
    }

    // --- Range decomposition ---

    /// Key ranges covering every tile that intersects `query`
    ///
    /// The ranges are sorted, and separated by at least one key. Every point
    /// of the query lies in a tile whose key belongs to one of the ranges,
    /// but the ranges may also contain keys of tiles outside of the query,
    /// which the caller must filter out. `config` decides how many such false
    /// positives are tolerated. If a `monitor` is provided, it is told about
    /// every emitted tile.
    ///
    /// # Errors
    ///
    /// Fails if `query` does not have the curve's dimension.
    ///
    pub fn tiles_intersecting_envelope<C: SpaceFillingCurveConfiguration + ?Sized>(
        &self,
        query: &Envelope,
        config: &C,
        monitor: Option<&mut dyn SpaceFillingCurveMonitor>,
    ) -> Result<Vec<LongRange>> {
        self.check_dimension(query.dimension())?;
        let max_depth = config.max_depth(
            &query.with_side_ratio_not_too_small(),
            &self.extent,
            self.dimension(),
            self.max_level,
        );
        let search = self.search_envelope(query);
        Ok(ranges::decompose(self, search, config, max_depth, monitor))
    }

    /// Truth that `point` belongs to `query`, as the range decomposition
    /// understands it
    ///
    /// This is the test to post-filter the candidates scanned over the key
    /// ranges of `query`: every point it accepts has its key inside of those
    /// ranges. Like the decomposition, it treats each axis of the query as
    /// half-open, except on degenerate axes and where the upper bound reaches
    /// the upper edge of the curve extent, which are closed.
    ///
    /// # Errors
    ///
    /// Fails if `query` or `point` does not have the curve's dimension.
    ///
    pub fn query_contains(&self, query: &Envelope, point: &[f64]) -> Result<bool> {
        self.check_dimension(query.dimension())?;
        self.check_dimension(point.len())?;
        Ok(point.iter().enumerate().all(|(axis, &value)| {
            let (low, high) = (query.min(axis), query.max(axis));
            if !(low <= value && value <= high) {
                return false;
            }
            let (extent_min, extent_max) = (self.extent.min(axis), self.extent.max(axis));
            let closed = high.clamp(extent_min, extent_max) <= low.clamp(extent_min, extent_max)
                || high >= extent_max;
            value < high || closed
        }))
    }

    /// Same as [`tiles_intersecting_envelope()`] without monitoring
    ///
    /// [`tiles_intersecting_envelope()`]: Self::tiles_intersecting_envelope
    ///
    pub fn ranges_for<C: SpaceFillingCurveConfiguration + ?Sized>(
        &self,
        query: &Envelope,
        config: &C,
    ) -> Result<Vec<LongRange>> {
        self.tiles_intersecting_envelope(query, config, None)
    }

    /// Key ranges for a query whose bounds may be left open
    ///
    /// A missing bound is replaced by the matching bound of the curve extent.
    /// If a provided bound lies beyond the opposite edge of the extent, the
    /// query collapses onto that edge. If both bounds were provided and are
    /// inverted, the query collapses onto `to`.
    ///
    /// # Errors
    ///
    /// Fails if a bound does not have the curve's dimension.
    ///
    pub fn tiles_between<C: SpaceFillingCurveConfiguration + ?Sized>(
        &self,
        from: Option<&[f64]>,
        to: Option<&[f64]>,
        config: &C,
    ) -> Result<Vec<LongRange>> {
        let dimension = self.dimension();
        let from_given = from.is_some();
        let from = from.unwrap_or_else(|| self.extent.mins());
        let to = to.unwrap_or_else(|| self.extent.maxs());
        self.check_dimension(from.len())?;
        self.check_dimension(to.len())?;

        let mut min = [0.0; MAX_DIMENSION];
        let mut max = [0.0; MAX_DIMENSION];
        for axis in 0..dimension {
            let (low, high) = (from[axis], to[axis]);
            (min[axis], max[axis]) = match (low > high, from_given) {
                (false, _) => (low, high),
                (true, false) => (low, low),
                (true, true) => (high, high),
            };
        }
        let query = Envelope::from_corners(min, max, dimension);
        self.ranges_for(&query, config)
    }
}
