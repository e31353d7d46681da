//! Binary arithmetic utilities used for space-filling curve computations

use crate::{Coord, CurveIdx, NumBits, MAX_DIMENSION};

/// Count the number of bits of an integer
#[inline(always)]
pub const fn num_bits<T>() -> NumBits {
    (core::mem::size_of::<T>() * 8) as _
}

/// Generate a mask that selects a certain number of low-order bits: 0000...0011
#[inline(always)]
pub const fn low_order_mask(length: NumBits) -> CurveIdx {
    if length < num_bits::<CurveIdx>() {
        (1 << length) - 1
    } else {
        CurveIdx::MAX
    }
}

/// Number of children of a tile, i.e. 2^dimension
#[inline(always)]
pub const fn num_children(dimension: usize) -> usize {
    1 << dimension
}

/// Gather the bit at `bit_index` of every coordinate into an n-point
///
/// The first coordinate provides the most significant bit, so that in 3D the
/// resulting n-point reads as the binary number `xyz`. This is the raw child
/// selector of the tile that contains the coordinates at recursion level
/// `max_level - bit_index`.
///
#[inline]
pub fn gather_npoint(coords: &[Coord], bit_index: NumBits) -> usize {
    coords
        .iter()
        .fold(0, |npoint, &coord| (npoint << 1) | ((coord >> bit_index) & 1) as usize)
}

/// Split an n-point back into one bit per coordinate
///
/// This is the inverse of [`gather_npoint()`]. The returned array has
/// `dimension` meaningful entries, the rest are zero.
///
#[inline]
pub fn scatter_npoint(npoint: usize, dimension: usize) -> [Coord; MAX_DIMENSION] {
    let mut bits = [0; MAX_DIMENSION];
    for (dim, bit) in bits.iter_mut().take(dimension).enumerate() {
        let shift = dimension - dim - 1;
        *bit = ((npoint >> shift) & 1) as Coord;
    }
    bits
}


#[cfg(test)]
mod tests {
    use super::{test_utils::*, *};
    use quickcheck::quickcheck;

    #[test]
    fn key_masks() {
        assert_eq!(num_bits::<CurveIdx>(), 64);
        assert_eq!(super::low_order_mask(0), 0);
        assert_eq!(super::low_order_mask(2), 0b11);
        assert_eq!(super::low_order_mask(3), 0b111);
        assert_eq!(super::low_order_mask(63), i64::MAX as CurveIdx);
        assert_eq!(super::low_order_mask(64), CurveIdx::MAX);

        // One mask bit per child selector bit
        let mut mask: CurveIdx = 0;
        for dimension in 1..=MAX_DIMENSION {
            push_bit(&mut mask, true);
            assert_eq!(super::low_order_mask(dimension as NumBits), mask);
            assert_eq!(mask + 1, num_children(dimension) as CurveIdx);
        }
    }

    #[test]
    fn gather_npoint() {
        // x = 110, y = 100, z = 011
        let coords = [0b110, 0b100, 0b011];
        assert_eq!(super::gather_npoint(&coords, 2), 0b110);
        assert_eq!(super::gather_npoint(&coords, 1), 0b101);
        assert_eq!(super::gather_npoint(&coords, 0), 0b001);
        assert_eq!(super::gather_npoint(&coords[..2], 2), 0b11);
        assert_eq!(super::gather_npoint(&coords[..2], 0), 0b00);
    }

    // Whichever coordinates we start from, taking every bit plane apart and
    // putting it back together must reproduce them.
    quickcheck! {
        fn scatter_inverts_gather(x: u16, y: u16, z: u16) -> bool {
            for dimension in 2..=MAX_DIMENSION {
                let coords = [Coord::from(x), Coord::from(y), Coord::from(z)];
                let mut rebuilt = [0 as Coord; MAX_DIMENSION];
                for bit_index in (0..num_bits::<u16>()).rev() {
                    let npoint = super::gather_npoint(&coords[..dimension], bit_index);
                    let mut bits = super::scatter_npoint(npoint, dimension);
                    for (target, bit) in rebuilt.iter_mut().zip(bits.iter_mut()) {
                        push_bit(target, pop_bit(bit));
                    }
                }
                if rebuilt[..dimension] != coords[..dimension] {
                    return false;
                }
            }
            true
        }
    }
}
