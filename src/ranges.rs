//! Decomposition of a query box into ranges of curve keys
//!
//! The decomposition walks the curve's tiles from the root down, in curve
//! order. A tile that does not intersect the query is skipped. A tile that
//! the configuration deems covered well enough is emitted as the whole range
//! of keys it spans. Other tiles are split into their children. At the
//! finest level, tiles are single keys, which are emitted only if they lie
//! inside of the query.
//!
//! Because tiles are visited in key order, ranges come out sorted, and a
//! range that starts right after the previous one is merged into it.

use crate::{
    bits,
    config::SpaceFillingCurveConfiguration,
    curve::SpaceFillingCurve,
    monitor::SpaceFillingCurveMonitor,
    rule::{RuleId, RuleTable},
    search::SearchEnvelope,
    CurveIdx, NumBits, LOG_TARGET,
};
use tracing::trace;

/// Inclusive range of curve keys `[min, max]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongRange {
    /// First key of the range
    pub min: CurveIdx,
    /// Last key of the range
    pub max: CurveIdx,
}

impl LongRange {
    /// Range from `min` to `max`, both included
    pub fn new(min: CurveIdx, max: CurveIdx) -> Self {
        debug_assert!(min <= max, "Inverted key range [{min}, {max}]");
        Self { min, max }
    }

    /// Range containing only `value`
    pub fn single(value: CurveIdx) -> Self {
        Self::new(value, value)
    }

    /// Extend the range up to `max`
    pub fn expand_to_max(&mut self, max: CurveIdx) {
        debug_assert!(max >= self.max);
        self.max = max;
    }

    /// Truth that `value` lies within the range
    pub fn contains(&self, value: CurveIdx) -> bool {
        self.min <= value && value <= self.max
    }

    /// Number of keys in the range
    pub fn num_keys(&self) -> u64 {
        self.max - self.min + 1
    }
}

/// State of one decomposition
struct Decomposition<'config, 'monitor, C: ?Sized> {
    rules: &'static RuleTable,
    dimension: usize,
    search: SearchEnvelope,
    config: &'config C,
    max_depth: NumBits,
    monitor: Option<&'monitor mut dyn SpaceFillingCurveMonitor>,
    ranges: Vec<LongRange>,
}

impl<C: SpaceFillingCurveConfiguration + ?Sized> Decomposition<'_, '_, C> {
    /// Look at a tile spanning keys `[left, right)`, which intersects the
    /// search box
    fn descend(
        &mut self,
        depth: NumBits,
        tile: SearchEnvelope,
        rule: RuleId,
        left: CurveIdx,
        right: CurveIdx,
    ) {
        if depth > 0
            && self
                .config
                .stop_at_this_depth(self.search.fraction_of(&tile), depth, self.max_depth)
        {
            self.emit(depth, LongRange::new(left, right - 1), tile.area());
            return;
        }

        let child_width = (right - left) >> self.dimension;
        for index in 0..self.rules.length() {
            let npoint = self.rules.npoint_for_index(rule, index);
            let quadrant = tile.quadrant(&bits::scatter_npoint(npoint, self.dimension));
            if !self.search.intersects(&quadrant) {
                continue;
            }
            let child_left = left + index as CurveIdx * child_width;
            if child_width == 1 {
                if self.search.contains(quadrant.min()) {
                    self.emit(depth + 1, LongRange::single(child_left), 1);
                }
            } else {
                let child_rule = self.rules.child_at(rule, index);
                self.descend(
                    depth + 1,
                    quadrant,
                    child_rule,
                    child_left,
                    child_left + child_width,
                );
            }
        }
    }

    fn emit(&mut self, depth: NumBits, range: LongRange, area: u64) {
        if let Some(monitor) = self.monitor.as_deref_mut() {
            monitor.add_range_at_depth(depth);
            monitor.add_to_covered_area(area);
        }
        match self.ranges.last_mut() {
            Some(last) if last.max + 1 == range.min => last.expand_to_max(range.max),
            _ => self.ranges.push(range),
        }
    }
}

/// Sorted, merged key ranges covering every lattice point of `search`
pub(crate) fn decompose<C: SpaceFillingCurveConfiguration + ?Sized>(
    curve: &SpaceFillingCurve,
    search: SearchEnvelope,
    config: &C,
    max_depth: NumBits,
    mut monitor: Option<&mut dyn SpaceFillingCurveMonitor>,
) -> Vec<LongRange> {
    let dimension = curve.dimension();
    let whole = SearchEnvelope::cube(0, curve.width(), dimension);
    if let Some(monitor) = monitor.as_deref_mut() {
        monitor.register_search_area(search.area());
    }

    let mut decomposition = Decomposition {
        rules: curve.rules(),
        dimension,
        search,
        config,
        max_depth,
        monitor,
        ranges: Vec::with_capacity(config.initial_ranges_capacity()),
    };
    if search.intersects(&whole) {
        let root = decomposition.rules.root();
        decomposition.descend(0, whole, root, 0, curve.value_width());
    }

    let ranges = decomposition.ranges;
    trace!(
        target: LOG_TARGET,
        max_depth,
        num_ranges = ranges.len(),
        search_area = search.area(),
        "decomposed query envelope"
    );
    ranges
}
