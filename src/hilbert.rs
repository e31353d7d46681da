//! Rules of the Hilbert space-filling curve, in 2D and 3D
//!
//! Compared to the Morton curve, the Hilbert curve mostly moves from one tile
//! to one of its direct neighbors, which gives it superior spatial locality.
//! The price to pay is that every tile is traversed in one of several
//! rotated or mirrored versions of the basic pattern, and which version is
//! used depends on where the tile sits in its parent.
//!
//! Throughout this module, an n-point is the raw child selector of a tile:
//! one bit per axis, with x as the most significant bit. So in 2D, `0b01` is
//! the top-left child and `0b10` the bottom-right child, and in 3D `0b100`
//! is the child at the right, bottom, back corner.

use crate::rule::{NPointOrder, RuleId, RuleTable, MAX_CHILDREN};
use std::sync::LazyLock;

/// Direction of the first step of a 2D Hilbert rule
///
/// Every 2D orientation is named after the way it leaves its first child,
/// which is enough to tell all four of them apart.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction2D {
    /// `00 -> 01`
    Up = 0,
    /// `00 -> 10`
    Right = 1,
    /// `11 -> 10`
    Down = 2,
    /// `11 -> 01`
    Left = 3,
}

impl Direction2D {
    /// Direction of the step between two n-points
    pub fn of_step(start: u8, end: u8) -> Option<Self> {
        match i32::from(end) - i32::from(start) {
            1 => Some(Self::Up),
            2 => Some(Self::Right),
            -1 => Some(Self::Down),
            -2 => Some(Self::Left),
            _ => None,
        }
    }

    /// Name of the rule with a given n-point order
    pub fn of_rule(npoints: &NPointOrder) -> Option<Self> {
        Self::of_step(npoints[0], npoints[1])
    }

    const fn id(self) -> RuleId {
        // Discriminants are the rule positions in HILBERT_2D
        [RuleId::ROOT, RULE_RIGHT, RULE_DOWN, RULE_LEFT][self as usize]
    }

    /// Visiting order of the n-points of a tile for this orientation
    const fn npoints(self) -> NPointOrder {
        match self {
            Self::Up => [0, 1, 3, 2, 0, 0, 0, 0],
            Self::Right => [0, 2, 3, 1, 0, 0, 0, 0],
            Self::Down => [3, 2, 0, 1, 0, 0, 0, 0],
            Self::Left => [3, 1, 0, 2, 0, 0, 0, 0],
        }
    }

    /// Orientations of the children of a tile, in visiting order
    ///
    /// The first child is transposed so that it ends next to the second one,
    /// the middle two are traversed like their parent, and the last one is
    /// transposed the other way so that it exits where the parent does.
    ///
    const fn children(self) -> [Self; 4] {
        use Direction2D::*;
        match self {
            Up => [Right, Up, Up, Left],
            Right => [Up, Right, Right, Down],
            Down => [Left, Down, Down, Right],
            Left => [Down, Left, Left, Up],
        }
    }
}

const RULE_RIGHT: RuleId = RuleId::ROOT.next();
const RULE_DOWN: RuleId = RULE_RIGHT.next();
const RULE_LEFT: RuleId = RULE_DOWN.next();

/// Rules of the 2D Hilbert curve
///
/// The curve starts in the bottom-left corner with an upward step, i.e. its
/// first level visits the bottom-left, top-left, top-right and bottom-right
/// quadrants in that order.
///
pub fn rules_2d() -> &'static RuleTable {
    static HILBERT_2D: LazyLock<RuleTable> = LazyLock::new(|| {
        let wiring = [
            Direction2D::Up,
            Direction2D::Right,
            Direction2D::Down,
            Direction2D::Left,
        ]
        .map(|direction| {
            let mut children = [RuleId::ROOT; MAX_CHILDREN];
            for (child, orientation) in children.iter_mut().zip(direction.children()) {
                *child = orientation.id();
            }
            (direction.npoints(), children)
        });
        RuleTable::wired(2, &wiring)
    });
    &HILBERT_2D
}

// ---

/// Rotate the bits of a 3D n-point to the left: `xyz -> yzx`
///
/// Applied to every n-point of a rule, this turns the tile by a third of a
/// revolution around its main diagonal (the `000 -> 111` one).
///
#[inline]
pub const fn rotate_npoint_left(npoint: u8) -> u8 {
    ((npoint << 1) & 0b111) | ((npoint & 0b100) >> 2)
}

/// Rotate the bits of a 3D n-point to the right: `xyz -> zxy`
///
/// This is the inverse of [`rotate_npoint_left()`].
///
#[inline]
pub const fn rotate_npoint_right(npoint: u8) -> u8 {
    (npoint >> 1) | ((npoint & 0b001) << 2)
}

/// Mirror a 3D n-point along the x axis
#[inline]
const fn flip_x(npoint: u8) -> u8 {
    npoint ^ 0b100
}

/// Direction of a single step between two corners of a 2x2x2 cube
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction3D {
    /// `000 -> 001`
    Front,
    /// `000 -> 010`
    Up,
    /// `000 -> 100`
    Right,
    /// `111 -> 011`
    Left,
    /// `111 -> 101`
    Down,
    /// `111 -> 110`
    Back,
}

impl Direction3D {
    /// Direction from one n-point to another, which must differ by one bit
    pub fn of_step(start: u8, end: u8) -> Option<Self> {
        match i32::from(end) - i32::from(start) {
            1 => Some(Self::Front),
            2 => Some(Self::Up),
            4 => Some(Self::Right),
            -4 => Some(Self::Left),
            -2 => Some(Self::Down),
            -1 => Some(Self::Back),
            _ => None,
        }
    }
}

/// Identity of a 3D Hilbert orientation
///
/// The first two steps and the overall direction from entry to exit
/// determine a 3D Hilbert rule, so this is the memoization key of the rule
/// table.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubCurve3D {
    /// Step from the first child to the second one
    pub first_move: Direction3D,
    /// Step from the second child to the third one
    pub second_move: Direction3D,
    /// Direction from the first child to the last one
    pub overall_direction: Direction3D,
}

impl SubCurve3D {
    /// Identify the orientation of a 3D rule
    ///
    /// # Panics
    ///
    /// If the n-point order is not that of a 3D Hilbert rule.
    ///
    pub fn of_rule(npoints: &NPointOrder) -> Self {
        let step = |start: usize, end: usize| {
            Direction3D::of_step(npoints[start], npoints[end]).unwrap_or_else(|| {
                panic!("{npoints:?} is not a 3D Hilbert rule, {start} -> {end} is diagonal")
            })
        };
        Self {
            first_move: step(0, 1),
            second_move: step(1, 2),
            overall_direction: step(0, MAX_CHILDREN - 1),
        }
    }
}

/// Sense of a third of a revolution around a cube diagonal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    /// Rotate the n-point bits to the left
    Left,
    /// Rotate the n-point bits to the right
    Right,
}

/// Transform that derives a child orientation from its parent's
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation3D {
    /// Rotate around the `000 -> 111` diagonal
    MainDiagonal(Turn),
    /// Rotate around the `100 -> 011` diagonal, i.e. mirror along x, rotate
    /// around the main diagonal and mirror back
    OppositeDiagonal(Turn),
    /// Half a revolution around the x axis, which flips y and z
    AboutX,
}

impl Rotation3D {
    /// Apply this transform to a single n-point
    pub const fn apply(self, npoint: u8) -> u8 {
        const fn turn(turn: Turn, npoint: u8) -> u8 {
            match turn {
                Turn::Left => rotate_npoint_left(npoint),
                Turn::Right => rotate_npoint_right(npoint),
            }
        }
        match self {
            Self::MainDiagonal(direction) => turn(direction, npoint),
            Self::OppositeDiagonal(direction) => flip_x(turn(direction, flip_x(npoint))),
            Self::AboutX => npoint ^ 0b011,
        }
    }

    /// Apply this transform to every n-point of a rule
    pub fn apply_all(self, npoints: &NPointOrder) -> NPointOrder {
        npoints.map(|npoint| self.apply(npoint))
    }
}

/// Transform used to derive each child of a 3D tile, in visiting order
///
/// The first child is turned so that it exits upwards into the second child,
/// the two middle pairs keep the direction of travel going, and the last
/// child mirrors the first one so that the curve exits where its parent does.
///
pub const CHILD_ROTATIONS_3D: [Rotation3D; MAX_CHILDREN] = [
    Rotation3D::MainDiagonal(Turn::Right),
    Rotation3D::MainDiagonal(Turn::Left),
    Rotation3D::MainDiagonal(Turn::Left),
    Rotation3D::AboutX,
    Rotation3D::AboutX,
    Rotation3D::OppositeDiagonal(Turn::Left),
    Rotation3D::OppositeDiagonal(Turn::Left),
    Rotation3D::OppositeDiagonal(Turn::Right),
];

/// First level of the 3D Hilbert curve
///
/// Starting from the origin, go up, forward, down, right, up, back and down,
/// ending in the right, bottom, back corner.
///
const ROOT_3D: NPointOrder = [0b000, 0b010, 0b011, 0b001, 0b101, 0b111, 0b110, 0b100];

/// Rules of the 3D Hilbert curve
///
/// Generated once, by applying [`CHILD_ROTATIONS_3D`] to [`ROOT_3D`] and to
/// every orientation found along the way, until no new one shows up.
///
pub fn rules_3d() -> &'static RuleTable {
    static HILBERT_3D: LazyLock<RuleTable> = LazyLock::new(|| {
        RuleTable::closure(3, ROOT_3D, SubCurve3D::of_rule, |parent, index| {
            CHILD_ROTATIONS_3D[index].apply_all(parent)
        })
    });
    &HILBERT_3D
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rules_2d() {
        let table = super::rules_2d();
        assert_eq!(table.dimension(), 2);
        assert_eq!(table.num_rules(), 4);
        for (id, rule) in table.iter() {
            let name = Direction2D::of_rule(rule.npoints()).unwrap();
            assert_eq!(name.id(), id, "Rule {:?} is stored at the wrong place", rule);
        }

        let up = table.root();
        assert_eq!(Direction2D::of_rule(table.rule(up).npoints()), Some(Direction2D::Up));
        assert_eq!(
            (0..4).map(|index| table.npoint_for_index(up, index)).collect::<Vec<_>>(),
            vec![0b00, 0b01, 0b11, 0b10]
        );
        assert_eq!(table.child_at(up, 0), RULE_RIGHT);
        assert_eq!(table.child_at(up, 3), RULE_LEFT);
    }

    #[test]
    fn rotate_npoint_left() {
        assert_eq!(super::rotate_npoint_left(0b000), 0b000);
        assert_eq!(super::rotate_npoint_left(0b001), 0b010);
        assert_eq!(super::rotate_npoint_left(0b010), 0b100);
        assert_eq!(super::rotate_npoint_left(0b100), 0b001);
        assert_eq!(super::rotate_npoint_left(0b011), 0b110);
        assert_eq!(super::rotate_npoint_left(0b110), 0b101);
        assert_eq!(super::rotate_npoint_left(0b101), 0b011);
        assert_eq!(super::rotate_npoint_left(0b111), 0b111);
    }

    #[test]
    fn rotate_npoint_right() {
        assert_eq!(super::rotate_npoint_right(0b000), 0b000);
        assert_eq!(super::rotate_npoint_right(0b001), 0b100);
        assert_eq!(super::rotate_npoint_right(0b100), 0b010);
        assert_eq!(super::rotate_npoint_right(0b010), 0b001);
        assert_eq!(super::rotate_npoint_right(0b011), 0b101);
        assert_eq!(super::rotate_npoint_right(0b101), 0b110);
        assert_eq!(super::rotate_npoint_right(0b110), 0b011);
        assert_eq!(super::rotate_npoint_right(0b111), 0b111);
        for npoint in 0..8 {
            assert_eq!(super::rotate_npoint_left(super::rotate_npoint_right(npoint)), npoint);
        }
    }

    #[test]
    fn first_children_3d() {
        let table = super::rules_3d();
        let root = table.root();
        let order = |rule| (0..8).map(|index| table.npoint_for_index(rule, index)).collect::<Vec<_>>();
        assert_eq!(order(root), vec![0b000, 0b010, 0b011, 0b001, 0b101, 0b111, 0b110, 0b100]);
        assert_eq!(
            order(table.child_at(root, 0)),
            vec![0b000, 0b001, 0b101, 0b100, 0b110, 0b111, 0b011, 0b010]
        );
        assert_eq!(
            order(table.child_at(root, 1)),
            vec![0b000, 0b100, 0b110, 0b010, 0b011, 0b111, 0b101, 0b001]
        );
        assert_eq!(table.child_at(root, 1), table.child_at(root, 2));
        assert_eq!(
            order(table.child_at(root, 7)),
            vec![0b110, 0b111, 0b011, 0b010, 0b000, 0b001, 0b101, 0b100]
        );
    }

    #[test]
    fn closure_3d() {
        let table = super::rules_3d();
        assert_eq!(table.dimension(), 3);

        // Only half of the 24 rotations of the cube are reachable from the
        // root, and every one of them must be stored exactly once.
        assert_eq!(table.num_rules(), 12);
        let orders = table.iter().map(|(_, rule)| *rule.npoints()).collect::<HashSet<_>>();
        let names = table.iter().map(|(_, rule)| SubCurve3D::of_rule(rule.npoints())).collect::<HashSet<_>>();
        assert_eq!(orders.len(), table.num_rules());
        assert_eq!(names.len(), table.num_rules());

        for (id, rule) in table.iter() {
            // Hilbert rules never jump across the cube...
            for step in rule.npoints().windows(2) {
                assert!(Direction3D::of_step(step[0], step[1]).is_some(), "{:?} jumps", rule);
            }
            // ...and always start from a corner of even parity
            assert!([0b000, 0b011, 0b101, 0b110].contains(&rule.npoints()[0]));

            // Children are closed over the table
            for index in 0..8 {
                let child = table.child_at(id, index);
                assert_eq!(
                    *table.rule(child).npoints(),
                    CHILD_ROTATIONS_3D[index].apply_all(rule.npoints())
                );
            }
        }
    }

    #[test]
    fn rules_are_shared() {
        assert!(std::ptr::eq(super::rules_2d(), super::rules_2d()));
        assert!(std::ptr::eq(super::rules_3d(), super::rules_3d()));
    }
}
