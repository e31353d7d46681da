//! Arena of curve orientation rules
//!
//! A space-filling curve is built by recursively subdividing space into
//! 2^dimension tiles and visiting them in some order. Which order, and how
//! each tile is in turn traversed, is described by a [`CurveRule`]. Although
//! the recursion is unbounded, only a handful of distinct orientations ever
//! occur, and tiles at different positions share them. A curve family's
//! rules thus form a small cyclic graph, which we store as a flat table
//! indexed by [`RuleId`] handles.

use crate::{bits, LOG_TARGET, MAX_DIMENSION};
use std::{collections::HashMap, hash::Hash};
use tracing::debug;

/// Maximal number of children of a tile
pub const MAX_CHILDREN: usize = bits::num_children(MAX_DIMENSION);

/// Order in which a rule visits the n-points of a tile
///
/// Only the first 2^dimension entries are meaningful.
///
pub type NPointOrder = [u8; MAX_CHILDREN];

/// Handle to a rule inside of its [`RuleTable`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RuleId(u8);

impl RuleId {
    /// Rule that every curve of a family starts from
    pub const ROOT: Self = Self(0);

    /// Position of this rule in its table
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Handle of the rule stored right after this one
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    fn from_index(index: usize) -> Self {
        debug_assert!(index <= u8::MAX as usize, "Too many curve orientations");
        Self(index as u8)
    }
}

/// One orientation of a curve
///
/// A rule maps the raw child selector of a tile, or n-point, to its position
/// along the curve (its selector index), and tells which rule should be used
/// to traverse each child.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveRule {
    npoints: NPointOrder,
    indices: NPointOrder,
    children: [RuleId; MAX_CHILDREN],
}

impl CurveRule {
    fn new(npoints: NPointOrder, length: usize) -> Self {
        let mut indices = [0; MAX_CHILDREN];
        for (index, &npoint) in npoints.iter().enumerate().take(length) {
            indices[npoint as usize] = index as u8;
        }
        debug_assert!(
            (0..length).all(|npoint| npoints[indices[npoint] as usize] as usize == npoint),
            "Curve rule {npoints:?} is not a permutation of its n-points"
        );
        Self {
            npoints,
            indices,
            children: [RuleId::ROOT; MAX_CHILDREN],
        }
    }

    /// Order in which this rule visits the n-points of a tile
    pub fn npoints(&self) -> &NPointOrder {
        &self.npoints
    }
}

/// Immutable set of rules describing one curve family
#[derive(Clone, Debug)]
pub struct RuleTable {
    dimension: usize,
    rules: Vec<CurveRule>,
}

impl RuleTable {
    /// Build a table from explicitly wired rules
    ///
    /// Each entry gives the n-point order of one rule and the rules of its
    /// children, in visiting order. The first entry is the root.
    ///
    pub(crate) fn wired(
        dimension: usize,
        wiring: &[(NPointOrder, [RuleId; MAX_CHILDREN])],
    ) -> Self {
        let length = bits::num_children(dimension);
        let rules = wiring
            .iter()
            .map(|(npoints, children)| {
                debug_assert!(children[..length].iter().all(|child| child.index() < wiring.len()));
                CurveRule {
                    children: *children,
                    ..CurveRule::new(*npoints, length)
                }
            })
            .collect();
        Self::finish(dimension, rules)
    }

    /// Build a table by closing a root rule over a child derivation
    ///
    /// `derive_child(parent, index)` computes the n-point order of the child
    /// visited at position `index` of `parent`. Derived orders are memoized
    /// by `orientation_of`, so that every orientation gets exactly one rule
    /// no matter how many times it is rediscovered. New rules are expanded in
    /// discovery order until no new orientation appears.
    ///
    pub(crate) fn closure<K: Eq + Hash>(
        dimension: usize,
        root: NPointOrder,
        orientation_of: impl Fn(&NPointOrder) -> K,
        derive_child: impl Fn(&NPointOrder, usize) -> NPointOrder,
    ) -> Self {
        let length = bits::num_children(dimension);
        let mut rules = vec![CurveRule::new(root, length)];
        let mut memo = HashMap::new();
        memo.insert(orientation_of(&root), RuleId::ROOT);

        let mut next = 0;
        while next < rules.len() {
            let parent = rules[next].npoints;
            for index in 0..length {
                let npoints = derive_child(&parent, index);
                let child = *memo.entry(orientation_of(&npoints)).or_insert_with(|| {
                    rules.push(CurveRule::new(npoints, length));
                    RuleId::from_index(rules.len() - 1)
                });
                debug_assert_eq!(
                    rules[child.index()].npoints, npoints,
                    "Two different orientations were given the same key"
                );
                rules[next].children[index] = child;
            }
            next += 1;
        }
        Self::finish(dimension, rules)
    }

    fn finish(dimension: usize, rules: Vec<CurveRule>) -> Self {
        debug!(
            target: LOG_TARGET,
            dimension,
            orientations = rules.len(),
            "built curve rule table"
        );
        Self { dimension, rules }
    }

    /// Number of dimensions of the curves described by this table
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of children of every tile, i.e. 2^dimension
    pub fn length(&self) -> usize {
        bits::num_children(self.dimension)
    }

    /// Number of distinct orientations
    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Rule that curves of this family start from
    pub fn root(&self) -> RuleId {
        RuleId::ROOT
    }

    /// Access a rule by handle
    pub fn rule(&self, rule: RuleId) -> &CurveRule {
        &self.rules[rule.index()]
    }

    /// Iterate over all rules
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &CurveRule)> + '_ {
        self.rules
            .iter()
            .enumerate()
            .map(|(index, rule)| (RuleId::from_index(index), rule))
    }

    /// Raw n-point of the child visited at position `index`
    #[inline]
    pub fn npoint_for_index(&self, rule: RuleId, index: usize) -> usize {
        self.rule(rule).npoints[index] as usize
    }

    /// Position along the curve of the child with raw n-point `npoint`
    #[inline]
    pub fn index_for_npoint(&self, rule: RuleId, npoint: usize) -> usize {
        self.rule(rule).indices[npoint] as usize
    }

    /// Rule used to traverse the child visited at position `index`
    #[inline]
    pub fn child_at(&self, rule: RuleId, index: usize) -> RuleId {
        self.rule(rule).children[index]
    }
}
