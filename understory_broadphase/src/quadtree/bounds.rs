// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded-object quad-tree node.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use tracing::trace;

use super::node::{NodePolicy, Quadrant, SpatialNode, split};
use crate::types::{Rect, Scalar, Spatial};

/// Quad-tree node for items with extent.
///
/// Items are routed by their top-left corner and pushed into a child only if
/// their whole AABB fits inside it. Items that straddle a quadrant boundary
/// stay on this node as *stuck* children for good.
///
/// Retrieval is deliberately conservative: it may return items that do not
/// overlap the query, and callers run their own narrow-phase test afterward.
pub struct BoundsNode<T, I> {
    bounds: Rect<T>,
    depth: u32,
    policy: NodePolicy,
    children: Vec<I>,
    stuck: Vec<I>,
    subnodes: Option<Box<[Self; 4]>>,
}

impl<T: Scalar, I> Debug for BoundsNode<T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoundsNode")
            .field("bounds", &self.bounds)
            .field("depth", &self.depth)
            .field("children", &self.children.len())
            .field("stuck", &self.stuck.len())
            .field("leaf", &self.subnodes.is_none())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, I> BoundsNode<T, I> {
    /// Create an empty root node.
    pub fn new(bounds: Rect<T>, policy: NodePolicy) -> Self {
        Self::with_depth(bounds, 0, policy)
    }

    pub(crate) fn with_depth(bounds: Rect<T>, depth: u32, policy: NodePolicy) -> Self {
        Self {
            bounds,
            depth,
            policy,
            children: Vec::new(),
            stuck: Vec::new(),
            subnodes: None,
        }
    }

    /// Direct children followed by stuck children. Does not descend.
    pub fn children(&self) -> impl Iterator<Item = &I> + '_ {
        self.children.iter().chain(self.stuck.iter())
    }

    /// Items that straddle this node's quadrants.
    pub fn stuck_children(&self) -> &[I] {
        &self.stuck
    }

    /// The four subnodes in [`Quadrant`] order, if subdivided.
    pub fn subnodes(&self) -> Option<&[Self; 4]> {
        self.subnodes.as_deref()
    }

    /// Subdivision policy.
    pub fn policy(&self) -> NodePolicy {
        self.policy
    }
}

impl<T: Scalar, I: Spatial<T> + Clone> BoundsNode<T, I> {
    fn subdivide(&mut self) {
        trace!(
            depth = self.depth,
            items = self.children.len(),
            "subdividing bounds node"
        );
        self.subnodes = Some(split(
            &self.bounds,
            self.depth,
            self.policy,
            Self::with_depth,
        ));
        // Re-running insert applies the straddle test to every held item.
        for item in core::mem::take(&mut self.children) {
            self.insert(item);
        }
    }
}

impl<T: Scalar, I: Spatial<T> + Clone> SpatialNode<T, I> for BoundsNode<T, I> {
    fn bounds(&self) -> Rect<T> {
        self.bounds
    }

    fn depth(&self) -> u32 {
        self.depth
    }

    fn is_leaf(&self) -> bool {
        self.subnodes.is_none()
    }

    fn insert(&mut self, item: I) {
        if let Some(subnodes) = self.subnodes.as_deref_mut() {
            let rect = item.bounds();
            let node = &mut subnodes[Quadrant::select(&self.bounds, rect.x, rect.y).index()];
            if node.bounds.contains(&rect) {
                node.insert(item);
            } else {
                self.stuck.push(item);
            }
            return;
        }

        self.children.push(item);
        if self.policy.should_split(self.depth, self.children.len()) {
            self.subdivide();
        }
    }

    fn retrieve_into(&self, query: &Rect<T>, out: &mut Vec<I>) {
        if let Some(subnodes) = self.subnodes.as_deref() {
            let q = Quadrant::select(&self.bounds, query.x, query.y);
            subnodes[q.index()].retrieve_into(query, out);
        }
        out.extend_from_slice(&self.stuck);
        out.extend_from_slice(&self.children);
    }

    fn retrieve_overlapping_into(&self, query: &Rect<T>, out: &mut Vec<I>) {
        if let Some(subnodes) = self.subnodes.as_deref() {
            let reach = Quadrant::reachable(&self.bounds, query);
            for (node, hit) in subnodes.iter().zip(reach) {
                if hit {
                    node.retrieve_overlapping_into(query, out);
                }
            }
        }
        out.extend_from_slice(&self.stuck);
        out.extend_from_slice(&self.children);
    }

    fn len(&self) -> usize {
        let below = self
            .subnodes
            .as_deref()
            .map_or(0, |s| s.iter().map(|n| n.len()).sum());
        self.children.len() + self.stuck.len() + below
    }

    fn clear(&mut self) {
        self.stuck.clear();
        self.children.clear();
        self.subnodes = None;
    }
}
