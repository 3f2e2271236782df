// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node abstraction shared by the point and bounds quad-trees.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::types::{Rect, Scalar};

/// Subdivision policy copied unchanged from a node to its children.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodePolicy {
    /// Depth at which nodes stop subdividing. The root is depth 0.
    pub max_depth: u32,
    /// Items a leaf may hold before it subdivides.
    pub max_children: usize,
}

impl Default for NodePolicy {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_children: 4,
        }
    }
}

impl NodePolicy {
    /// Deepest `max_depth` a [`QuadTreeIndex`](crate::QuadTreeIndex) accepts.
    ///
    /// Insertion recurses once per level, and 32 halvings already reduce any
    /// whole-unit extent below one unit.
    pub const MAX_DEPTH: u32 = 32;

    /// Whether a leaf at `depth` holding `len` items must subdivide.
    ///
    /// Leaves at `max_depth` never split and may exceed `max_children`.
    #[inline]
    pub(crate) fn should_split(&self, depth: u32, len: usize) -> bool {
        depth < self.max_depth && len > self.max_children
    }
}

/// One of the four sub-regions of a subdivided node, in storage order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Index 0.
    TopLeft = 0,
    /// Index 1.
    TopRight = 1,
    /// Index 2.
    BottomLeft = 2,
    /// Index 3.
    BottomRight = 3,
}

impl Quadrant {
    /// All quadrants in storage order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Pick the quadrant of `bounds` that owns the position `(x, y)`.
    ///
    /// A coordinate exactly on the center line belongs to the left/top side.
    #[inline]
    pub fn select<T: Scalar>(bounds: &Rect<T>, x: T, y: T) -> Self {
        let (cx, cy) = bounds.center();
        let right = x > cx;
        let bottom = y > cy;
        match (right, bottom) {
            (false, false) => Self::TopLeft,
            (true, false) => Self::TopRight,
            (false, true) => Self::BottomLeft,
            (true, true) => Self::BottomRight,
        }
    }

    /// Position of this quadrant in a node's subnode array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Which quadrants of `bounds` may hold an item that touches `query`.
    ///
    /// Mirrors the tie-breaking in [`select`][Self::select]: anything routed
    /// right or down has its position strictly past the center line.
    pub(crate) fn reachable<T: Scalar>(bounds: &Rect<T>, query: &Rect<T>) -> [bool; 4] {
        let (cx, cy) = bounds.center();
        let left = query.x <= cx;
        let right = query.right() > cx;
        let top = query.y <= cy;
        let bottom = query.bottom() > cy;
        [left && top, right && top, left && bottom, right && bottom]
    }
}

/// Quarter `bounds`, flooring the half width and height.
///
/// With odd extents the children do not cover the last unit on the right and
/// bottom edges; bounded items reaching into that strip stay on the parent.
pub fn quadrants<T: Scalar>(bounds: &Rect<T>) -> [Rect<T>; 4] {
    let hw = T::half_extent(bounds.width);
    let hh = T::half_extent(bounds.height);
    let mx = T::add(bounds.x, hw);
    let my = T::add(bounds.y, hh);
    [
        Rect::new(bounds.x, bounds.y, hw, hh),
        Rect::new(mx, bounds.y, hw, hh),
        Rect::new(bounds.x, my, hw, hh),
        Rect::new(mx, my, hw, hh),
    ]
}

/// Build the four children of a node at `depth`.
pub(crate) fn split<T: Scalar, N>(
    bounds: &Rect<T>,
    depth: u32,
    policy: NodePolicy,
    make: impl Fn(Rect<T>, u32, NodePolicy) -> N,
) -> Box<[N; 4]> {
    Box::new(quadrants(bounds).map(|b| make(b, depth + 1, policy)))
}

/// A quad-tree node: either a leaf holding items or an internal node with
/// exactly four children.
///
/// The two implementations share subdivision ([`quadrants`], [`Quadrant::select`])
/// and differ in how they route inserts and gather candidates.
pub trait SpatialNode<T: Scalar, I> {
    /// Region covered by this node. Fixed at creation.
    fn bounds(&self) -> Rect<T>;

    /// Distance from the root.
    fn depth(&self) -> u32;

    /// Whether this node has not subdivided.
    fn is_leaf(&self) -> bool;

    /// Insert an item, subdividing leaves that overflow.
    fn insert(&mut self, item: I);

    /// Append the candidates for `query` to `out`.
    ///
    /// Only the quadrant owning the query's top-left corner is descended at
    /// each level.
    fn retrieve_into(&self, query: &Rect<T>, out: &mut Vec<I>);

    /// Append the candidates for `query` to `out`, descending into every
    /// quadrant the query rectangle can reach.
    fn retrieve_overlapping_into(&self, query: &Rect<T>, out: &mut Vec<I>);

    /// Total items held by this node and its descendants.
    fn len(&self) -> usize;

    /// Whether no items are held anywhere below this node.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all items and subnodes, leaving an empty leaf.
    fn clear(&mut self);

    /// Candidates for `query` in a fresh vector.
    fn retrieve(&self, query: &Rect<T>) -> Vec<I> {
        let mut out = Vec::new();
        self.retrieve_into(query, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_breaks_ties_toward_top_left() {
        let b = Rect::new(0.0_f64, 0.0, 100.0, 100.0);
        assert_eq!(Quadrant::select(&b, 50.0, 50.0), Quadrant::TopLeft);
        assert_eq!(Quadrant::select(&b, 50.5, 50.0), Quadrant::TopRight);
        assert_eq!(Quadrant::select(&b, 50.0, 50.5), Quadrant::BottomLeft);
        assert_eq!(Quadrant::select(&b, 99.0, 99.0), Quadrant::BottomRight);
    }

    #[test]
    fn quadrants_floor_odd_extents() {
        let q = quadrants(&Rect::new(10_i64, 20, 101, 51));
        assert_eq!(q[0], Rect::new(10, 20, 50, 25));
        assert_eq!(q[1], Rect::new(60, 20, 50, 25));
        assert_eq!(q[2], Rect::new(10, 45, 50, 25));
        assert_eq!(q[3], Rect::new(60, 45, 50, 25));

        let q = quadrants(&Rect::new(0.0_f64, 0.0, 101.0, 101.0));
        assert_eq!(q[3], Rect::new(50.0, 50.0, 50.0, 50.0));
    }

    #[test]
    fn reachable_follows_query_extent() {
        let b = Rect::new(0.0_f64, 0.0, 100.0, 100.0);
        let small = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert_eq!(Quadrant::reachable(&b, &small), [true, false, false, false]);

        let wide = Rect::new(40.0, 10.0, 20.0, 5.0);
        assert_eq!(Quadrant::reachable(&b, &wide), [true, true, false, false]);

        let everything = Rect::new(-10.0, -10.0, 200.0, 200.0);
        assert_eq!(Quadrant::reachable(&b, &everything), [true; 4]);

        // A query ending on the center line cannot meet items routed right.
        let edge = Rect::new(10.0, 10.0, 40.0, 5.0);
        assert_eq!(Quadrant::reachable(&b, &edge), [true, false, false, false]);
    }

    #[test]
    fn policy_stops_at_max_depth() {
        let p = NodePolicy {
            max_depth: 2,
            max_children: 1,
        };
        assert!(p.should_split(0, 2));
        assert!(!p.should_split(0, 1));
        assert!(!p.should_split(2, 100));
    }
}
