// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point quad-tree node.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use tracing::trace;

use super::node::{NodePolicy, Quadrant, SpatialNode, split};
use crate::types::{Rect, Scalar, Spatial};

/// Quad-tree node for point items.
///
/// Every item belongs to exactly one quadrant, chosen from its `x`/`y`, so a
/// query returns the contents of the single leaf its position falls in.
pub struct Node<T, I> {
    bounds: Rect<T>,
    depth: u32,
    policy: NodePolicy,
    children: Vec<I>,
    subnodes: Option<Box<[Self; 4]>>,
}

impl<T: Scalar, I> Debug for Node<T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("bounds", &self.bounds)
            .field("depth", &self.depth)
            .field("children", &self.children.len())
            .field("leaf", &self.subnodes.is_none())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, I> Node<T, I> {
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
            subnodes: None,
        }
    }

    /// Items held directly by this node. Empty once it has subdivided.
    pub fn children(&self) -> &[I] {
        &self.children
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

impl<T: Scalar, I: Spatial<T> + Clone> Node<T, I> {
    fn subdivide(&mut self) {
        trace!(
            depth = self.depth,
            items = self.children.len(),
            "subdividing point node"
        );
        self.subnodes = Some(split(
            &self.bounds,
            self.depth,
            self.policy,
            Self::with_depth,
        ));
        for item in core::mem::take(&mut self.children) {
            self.insert(item);
        }
    }
}

impl<T: Scalar, I: Spatial<T> + Clone> SpatialNode<T, I> for Node<T, I> {
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
            let q = Quadrant::select(&self.bounds, item.x(), item.y());
            subnodes[q.index()].insert(item);
            return;
        }

        self.children.push(item);
        if self.policy.should_split(self.depth, self.children.len()) {
            self.subdivide();
        }
    }

    fn retrieve_into(&self, query: &Rect<T>, out: &mut Vec<I>) {
        match self.subnodes.as_deref() {
            Some(subnodes) => {
                let q = Quadrant::select(&self.bounds, query.x, query.y);
                subnodes[q.index()].retrieve_into(query, out);
            }
            None => out.extend_from_slice(&self.children),
        }
    }

    fn retrieve_overlapping_into(&self, query: &Rect<T>, out: &mut Vec<I>) {
        match self.subnodes.as_deref() {
            Some(subnodes) => {
                let reach = Quadrant::reachable(&self.bounds, query);
                for (node, hit) in subnodes.iter().zip(reach) {
                    if hit {
                        node.retrieve_overlapping_into(query, out);
                    }
                }
            }
            None => out.extend_from_slice(&self.children),
        }
    }

    fn len(&self) -> usize {
        let below = self
            .subnodes
            .as_deref()
            .map_or(0, |s| s.iter().map(|n| n.len()).sum());
        self.children.len() + below
    }

    fn clear(&mut self) {
        self.children.clear();
        self.subnodes = None;
    }
}
