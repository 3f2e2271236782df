// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recursive quad-tree index.
//!
//! - [`Node`]: point items, one quadrant per item.
//! - [`BoundsNode`]: items with extent; straddlers stay on the node where they
//!   stop fitting.
//! - [`QuadTreeIndex`]: the facade that picks a root node from its
//!   [`QuadTreeConfig`] and hands back caller-owned result vectors.
//!
//! Items cannot be removed one at a time. The intended pattern is to
//! [`clear`][QuadTreeIndex::clear] and re-insert current positions once per
//! simulation tick.

mod bounds;
mod node;
mod point;

use alloc::vec::Vec;
use core::fmt::Debug;

use tracing::debug;

use crate::error::Error;
use crate::types::{Rect, Scalar, Spatial};

pub use bounds::BoundsNode;
pub use node::{NodePolicy, Quadrant, SpatialNode, quadrants};
pub use point::Node;

/// Constructor options for [`QuadTreeIndex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadTreeConfig<T> {
    /// Region covered by the root node.
    pub bounds: Rect<T>,
    /// Store points (`true`) or bounded items (`false`, the default).
    #[cfg_attr(feature = "serde", serde(default))]
    pub point_mode: bool,
    /// Depth at which nodes stop subdividing.
    #[cfg_attr(feature = "serde", serde(default = "default_max_depth"))]
    pub max_depth: u32,
    /// Items a leaf may hold before it subdivides.
    #[cfg_attr(feature = "serde", serde(default = "default_max_children"))]
    pub max_children: usize,
}

#[cfg(feature = "serde")]
fn default_max_depth() -> u32 {
    NodePolicy::default().max_depth
}

#[cfg(feature = "serde")]
fn default_max_children() -> usize {
    NodePolicy::default().max_children
}

impl<T> QuadTreeConfig<T> {
    /// Bounds-mode configuration with the default depth and capacity (4 and 4).
    pub fn new(bounds: Rect<T>) -> Self {
        let policy = NodePolicy::default();
        Self {
            bounds,
            point_mode: false,
            max_depth: policy.max_depth,
            max_children: policy.max_children,
        }
    }

    /// Choose point or bounds mode.
    pub fn with_point_mode(mut self, point_mode: bool) -> Self {
        self.point_mode = point_mode;
        self
    }

    /// Set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the per-leaf capacity.
    pub fn with_max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children;
        self
    }

    /// The subdivision policy every node in the tree will share.
    pub fn policy(&self) -> NodePolicy {
        NodePolicy {
            max_depth: self.max_depth,
            max_children: self.max_children,
        }
    }
}

enum Root<T, I> {
    Points(Node<T, I>),
    Bounds(BoundsNode<T, I>),
}

/// Quad-tree facade over a point or bounds root node.
///
/// ## Example
///
/// ```rust
/// use understory_broadphase::{QuadTreeConfig, QuadTreeIndex, Rect};
///
/// let config = QuadTreeConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0))
///     .with_point_mode(true)
///     .with_max_children(2);
/// let mut tree = QuadTreeIndex::new(config).unwrap();
/// tree.insert_all([(10.0, 10.0), (20.0, 20.0), (80.0, 80.0)]);
///
/// assert_eq!(tree.retrieve(&(15.0, 15.0)), vec![(10.0, 10.0), (20.0, 20.0)]);
/// assert_eq!(tree.retrieve(&(85.0, 85.0)), vec![(80.0, 80.0)]);
/// ```
pub struct QuadTreeIndex<T, I> {
    config: QuadTreeConfig<T>,
    root: Root<T, I>,
}

impl<T: Scalar, I> Debug for QuadTreeIndex<T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let root: &dyn Debug = match &self.root {
            Root::Points(n) => n,
            Root::Bounds(n) => n,
        };
        f.debug_struct("QuadTreeIndex")
            .field("config", &self.config)
            .field("root", root)
            .finish()
    }
}

impl<T: Scalar, I: Spatial<T> + Clone> QuadTreeIndex<T, I> {
    /// Build an empty tree.
    ///
    /// Fails with [`Error::InvalidBounds`] if the bounds have no area,
    /// [`Error::InvalidDepth`] if `max_depth` exceeds [`NodePolicy::MAX_DEPTH`]
    /// and [`Error::InvalidCapacity`] if `max_children` is zero.
    pub fn new(config: QuadTreeConfig<T>) -> Result<Self, Error> {
        let b = config.bounds;
        if !(b.width > T::zero() && b.height > T::zero()) {
            return Err(Error::InvalidBounds);
        }
        if config.max_depth > NodePolicy::MAX_DEPTH {
            return Err(Error::InvalidDepth);
        }
        if config.max_children == 0 {
            return Err(Error::InvalidCapacity);
        }
        debug!(
            point_mode = config.point_mode,
            max_depth = config.max_depth,
            max_children = config.max_children,
            "created quad-tree index"
        );
        let root = if config.point_mode {
            Root::Points(Node::new(b, config.policy()))
        } else {
            Root::Bounds(BoundsNode::new(b, config.policy()))
        };
        Ok(Self { config, root })
    }

    fn root(&self) -> &dyn SpatialNode<T, I> {
        match &self.root {
            Root::Points(n) => n,
            Root::Bounds(n) => n,
        }
    }

    fn root_mut(&mut self) -> &mut dyn SpatialNode<T, I> {
        match &mut self.root {
            Root::Points(n) => n,
            Root::Bounds(n) => n,
        }
    }

    /// Insert a single item.
    pub fn insert(&mut self, item: I) {
        self.root_mut().insert(item);
    }

    /// Insert each item of a batch independently.
    pub fn insert_all<It: IntoIterator<Item = I>>(&mut self, items: It) {
        let root = self.root_mut();
        for item in items {
            root.insert(item);
        }
    }

    /// Candidates near `query`, as a fresh vector the caller owns.
    ///
    /// Point mode returns the leaf the query position falls in. Bounds mode
    /// returns that leaf's path plus every item stuck along it; it descends
    /// only the quadrant owning the query's top-left corner, so a query
    /// rectangle spanning several quadrants can miss items. Use
    /// [`retrieve_overlapping`][Self::retrieve_overlapping] for those.
    pub fn retrieve<Q: Spatial<T> + ?Sized>(&self, query: &Q) -> Vec<I> {
        let mut out = Vec::new();
        self.retrieve_into(query, &mut out);
        out
    }

    /// Like [`retrieve`][Self::retrieve], appending into an existing buffer.
    pub fn retrieve_into<Q: Spatial<T> + ?Sized>(&self, query: &Q, out: &mut Vec<I>) {
        self.root().retrieve_into(&query.bounds(), out);
    }

    /// Candidates for every quadrant the query rectangle reaches.
    ///
    /// Never misses an item whose AABB touches `query`; may still include
    /// items that do not.
    pub fn retrieve_overlapping<Q: Spatial<T> + ?Sized>(&self, query: &Q) -> Vec<I> {
        let mut out = Vec::new();
        self.root()
            .retrieve_overlapping_into(&query.bounds(), &mut out);
        out
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        debug!(items = self.len(), "clearing quad-tree index");
        self.root_mut().clear();
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        self.root().len()
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.root().is_empty()
    }
}

impl<T, I> QuadTreeIndex<T, I> {
    /// The configuration this tree was built with.
    pub fn config(&self) -> &QuadTreeConfig<T> {
        &self.config
    }

    /// Whether the root is a point node.
    pub fn is_point_mode(&self) -> bool {
        matches!(self.root, Root::Points(_))
    }
}

impl<T: Scalar, I: Spatial<T> + Clone> Extend<I> for QuadTreeIndex<T, I> {
    fn extend<It: IntoIterator<Item = I>>(&mut self, iter: It) {
        self.insert_all(iter);
    }
}
