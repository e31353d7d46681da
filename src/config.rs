//! Policies that steer the range decomposition
//!
//! The range decomposition recursively splits the curve extent into tiles,
//! and must decide for every tile whether to emit it as a whole or to look
//! at its children. Emitting early produces fewer, larger ranges that contain
//! more keys outside of the query, which the consumer must then scan and
//! filter out. These policies pick a point on that trade-off.

use crate::{envelope::Envelope, NumBits};

/// Stopping rule of the range decomposition
pub trait SpaceFillingCurveConfiguration {
    /// Truth that a tile whose `overlap` fraction lies inside the query
    /// should be emitted as a whole, rather than split further
    ///
    /// This is never asked about the root tile, whose depth is 0.
    ///
    fn stop_at_this_depth(&self, overlap: f64, depth: NumBits, max_depth: NumBits) -> bool;

    /// Number of levels to search below the level whose tiles have about the
    /// same area as the query
    fn extra_levels(&self) -> NumBits {
        1
    }

    /// Deepest level that the decomposition will descend to
    ///
    /// A tile that is `k` levels deep has `2^(dimension * k)` times less area
    /// than the whole curve extent, so the level whose tiles match the area
    /// of the query is the base-`2^dimension` logarithm of the area ratio,
    /// rounded towards zero.
    /// The decomposition searches [`extra_levels()`] deeper than that. The
    /// result is always in `1..=max_level`, and a query of zero area is
    /// searched all the way down to `max_level`.
    ///
    /// `query` should be padded with
    /// [`Envelope::with_side_ratio_not_too_small()`] beforehand, so that very
    /// thin queries do not trigger a needlessly deep search.
    ///
    /// [`extra_levels()`]: SpaceFillingCurveConfiguration::extra_levels
    ///
    fn max_depth(
        &self,
        query: &Envelope,
        extent: &Envelope,
        dimension: usize,
        max_level: NumBits,
    ) -> NumBits {
        let area_ratio = extent.area() / query.area();
        if !area_ratio.is_finite() {
            return max_level;
        }
        let query_level =
            (area_ratio.ln() / (crate::bits::num_children(dimension) as f64).ln()) as i64;
        (query_level + i64::from(self.extra_levels())).clamp(1, i64::from(max_level)) as NumBits
    }

    /// Expected number of ranges, used to pre-allocate the output
    fn initial_ranges_capacity(&self) -> usize {
        1000
    }
}

/// Emit tiles that lie almost entirely inside of the query
///
/// A tile is emitted once 99% of it overlaps the query, or when the maximal
/// depth is reached. This produces few false positives.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StandardConfiguration {
    /// See [`SpaceFillingCurveConfiguration::extra_levels()`]
    pub extra_levels: NumBits,
}

impl StandardConfiguration {
    /// Minimal overlap for a tile to be emitted before the maximal depth
    pub const OVERLAP_THRESHOLD: f64 = 0.99;

    /// Search a given number of levels deeper than the query size suggests
    pub fn new(extra_levels: NumBits) -> Self {
        Self { extra_levels }
    }
}

impl Default for StandardConfiguration {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SpaceFillingCurveConfiguration for StandardConfiguration {
    fn stop_at_this_depth(&self, overlap: f64, depth: NumBits, max_depth: NumBits) -> bool {
        overlap >= Self::OVERLAP_THRESHOLD || depth >= max_depth
    }

    fn extra_levels(&self) -> NumBits {
        self.extra_levels
    }
}

/// Emit tiles that only partially overlap the query, more so as the
/// decomposition goes deeper
///
/// The overlap needed to emit a tile decreases linearly from `top_threshold`
/// at the root to `bottom_threshold` at the maximal depth. Compared to
/// [`StandardConfiguration`], this trades more false positives for far fewer
/// ranges.
///
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PartialOverlapConfiguration {
    /// See [`SpaceFillingCurveConfiguration::extra_levels()`]
    pub extra_levels: NumBits,
    /// Overlap needed to emit a tile right below the root
    pub top_threshold: f64,
    /// Overlap needed to emit a tile at the maximal depth
    pub bottom_threshold: f64,
}

impl PartialOverlapConfiguration {
    /// Set up the search depth and the interpolated overlap thresholds
    pub fn new(extra_levels: NumBits, top_threshold: f64, bottom_threshold: f64) -> Self {
        Self {
            extra_levels,
            top_threshold,
            bottom_threshold,
        }
    }

    /// Overlap needed to emit a tile at `depth`
    pub fn threshold(&self, depth: NumBits, max_depth: NumBits) -> f64 {
        let progress = f64::from(depth) / f64::from(max_depth.max(1));
        self.top_threshold + (self.bottom_threshold - self.top_threshold) * progress
    }
}

impl Default for PartialOverlapConfiguration {
    fn default() -> Self {
        Self::new(1, 0.99, 0.5)
    }
}

impl SpaceFillingCurveConfiguration for PartialOverlapConfiguration {
    fn stop_at_this_depth(&self, overlap: f64, depth: NumBits, max_depth: NumBits) -> bool {
        overlap >= self.threshold(depth, max_depth) || depth >= max_depth
    }

    fn extra_levels(&self) -> NumBits {
        self.extra_levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_stops() {
        let config = StandardConfiguration::default();
        assert_eq!(config.extra_levels(), 1);
        assert_eq!(config.initial_ranges_capacity(), 1000);
        assert!(config.stop_at_this_depth(1.0, 1, 5));
        assert!(config.stop_at_this_depth(0.99, 2, 5));
        assert!(!config.stop_at_this_depth(0.98, 2, 5));
        assert!(config.stop_at_this_depth(0.0, 5, 5));
    }

    #[test]
    fn partial_overlap_thresholds() {
        let config = PartialOverlapConfiguration::default();
        assert_eq!(config.threshold(0, 4), 0.99);
        assert_eq!(config.threshold(4, 4), 0.5);
        assert!((config.threshold(2, 4) - 0.745).abs() < 1e-12);
        assert!(config.stop_at_this_depth(0.8, 2, 4));
        assert!(!config.stop_at_this_depth(0.7, 2, 4));
        assert!(config.stop_at_this_depth(0.0, 4, 4));

        // Never stricter than the standard policy
        let standard = StandardConfiguration::default();
        for depth in 1..=8 {
            for percent in 0..=100 {
                let overlap = f64::from(percent) / 100.0;
                if standard.stop_at_this_depth(overlap, depth, 8) {
                    assert!(config.stop_at_this_depth(overlap, depth, 8));
                }
            }
        }
    }

    #[test]
    fn max_depth() {
        let config = StandardConfiguration::default();
        let extent = Envelope::rect(-8.0, 8.0, -8.0, 8.0);

        // Query tiles of level 2 have an area of 16, then one level of margin
        let query = Envelope::rect(0.0, 4.0, 0.0, 4.0);
        assert_eq!(config.max_depth(&query, &extent, 2, 10), 3);
        assert_eq!(StandardConfiguration::new(3).max_depth(&query, &extent, 2, 10), 5);
        assert_eq!(config.max_depth(&query, &extent, 2, 2), 2);

        // Large queries still get searched one level deep
        let huge = Envelope::rect(-100.0, 100.0, -100.0, 100.0);
        assert_eq!(StandardConfiguration::new(0).max_depth(&huge, &extent, 2, 10), 1);

        // Points have no area to compare against
        let point = Envelope::rect(1.0, 1.0, 1.0, 1.0);
        assert_eq!(config.max_depth(&point, &extent, 2, 10), 10);

        // 3D tiles shrink faster
        let extent = Envelope::new(&[0.0; 3], &[16.0; 3]).unwrap();
        let query = Envelope::new(&[0.0; 3], &[4.0; 3]).unwrap();
        assert_eq!(config.max_depth(&query, &extent, 3, 10), 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_defaults() {
        let config: PartialOverlapConfiguration =
            serde_json::from_str(r#"{"bottom_threshold":0.25}"#).unwrap();
        assert_eq!(config, PartialOverlapConfiguration::new(1, 0.99, 0.25));
        let config: StandardConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StandardConfiguration::default());
    }
}
