//! Rules of the Z-order (Morton) space-filling curve
//!
//! A Morton code interleaves the bits of the coordinates of a point. Decoding
//! the set of Morton codes produces a fractal space-filling curve with a
//! recuring Z-shaped pattern that has reasonable spatial locality properties,
//! though it does brutally jump from one area of 2D space to another at times.
//!
//! Like every curve in this crate, the Z-order curve is described as a rule
//! table. It only needs one rule, which is its own child everywhere. Its
//! Z goes from the top-left quadrant to the top-right one, then jumps to the
//! bottom-left quadrant and ends in the bottom-right one. In other words, the
//! key of a point is the Morton code `[ ȳ1 x1 ȳ2 x2 ... ȳN xN ]` where `ȳ` is
//! the y coordinate mirrored along the vertical axis.

use crate::rule::{NPointOrder, RuleId, RuleTable, MAX_CHILDREN};
use std::sync::LazyLock;

/// Visiting order of the n-points of a tile: top-left, top-right,
/// bottom-left, bottom-right
const Z_ORDER: NPointOrder = [0b01, 0b11, 0b00, 0b10, 0, 0, 0, 0];

/// Rules of the 2D Z-order curve
pub fn rules_2d() -> &'static RuleTable {
    static Z_ORDER_2D: LazyLock<RuleTable> =
        LazyLock::new(|| RuleTable::wired(2, &[(Z_ORDER, [RuleId::ROOT; MAX_CHILDREN])]));
    &Z_ORDER_2D
}
