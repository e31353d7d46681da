//! Instrumentation of the range decomposition

use crate::NumBits;

/// Observer of a range decomposition
///
/// Areas are expressed in normalized units, i.e. as a number of tiles of the
/// finest curve level.
///
pub trait SpaceFillingCurveMonitor {
    /// Called once per decomposition with the area of the query
    fn register_search_area(&mut self, area: u64);

    /// Called for every tile that gets emitted, with its depth
    fn add_range_at_depth(&mut self, depth: NumBits);

    /// Called for every tile that gets emitted, with its area
    fn add_to_covered_area(&mut self, area: u64);
}

/// Monitor that tracks at which depth tiles get emitted
///
/// Reusing a monitor across decompositions accumulates their statistics.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistogramMonitor {
    counts: Vec<usize>,
    search_area: u64,
    covered_area: u64,
}

impl HistogramMonitor {
    /// Start with empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emitted tiles per depth, starting from depth 0
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Deepest level at which a tile was emitted
    pub fn highest_depth(&self) -> Option<NumBits> {
        self.counts
            .iter()
            .rposition(|&count| count > 0)
            .map(|depth| depth as NumBits)
    }

    /// Total emitted tiles
    pub fn num_tiles(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Area of the queries
    pub fn search_area(&self) -> u64 {
        self.search_area
    }

    /// Area of the emitted tiles
    pub fn covered_area(&self) -> u64 {
        self.covered_area
    }

    /// Fraction of the emitted area that lies outside of the query
    ///
    /// Zero if nothing was emitted.
    ///
    pub fn false_positive_ratio(&self) -> f64 {
        if self.covered_area == 0 {
            return 0.0;
        }
        self.covered_area.saturating_sub(self.search_area) as f64 / self.covered_area as f64
    }
}

impl SpaceFillingCurveMonitor for HistogramMonitor {
    fn register_search_area(&mut self, area: u64) {
        self.search_area = self.search_area.saturating_add(area);
    }

    fn add_range_at_depth(&mut self, depth: NumBits) {
        let depth = depth as usize;
        if self.counts.len() <= depth {
            self.counts.resize(depth + 1, 0);
        }
        self.counts[depth] += 1;
    }

    fn add_to_covered_area(&mut self, area: u64) {
        self.covered_area = self.covered_area.saturating_add(area);
    }
}
