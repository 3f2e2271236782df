// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_broadphase --heading-base-level=0

//! Understory Broadphase: spatial indexes for the broad phase of 2D collision detection.
//!
//! Both indexes answer "which objects are near this object or region?" and
//! leave exact geometric testing to the caller. False positives are expected;
//! a candidate that truly overlaps the query is never dropped.
//!
//! - [`QuadTreeIndex`]: recursive quad-tree holding points or bounded items.
//!   Built to be cleared and refilled once per simulation tick.
//! - [`SpatialHashIndex`]: sparse uniform grid with an [`Entry`] handle per
//!   object. Moving objects pay only for the cells they enter and leave.
//!
//! The two are independent; pick the one whose maintenance profile fits.
//!
//! Items describe themselves through [`Spatial`] (position, optional extent)
//! and, for the spatial hash, [`Identified`] (a stable id used for
//! deduplication and removal).
//!
//! # Example
//!
//! ```rust
//! use understory_broadphase::{QuadTreeConfig, QuadTreeIndex, Rect};
//!
//! let config = QuadTreeConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0)).with_max_children(1);
//! let mut tree = QuadTreeIndex::new(config).unwrap();
//! let small = Rect::new(10.0, 10.0, 5.0, 5.0);
//! let straddler = Rect::new(45.0, 45.0, 10.0, 10.0);
//! tree.insert_all([small, straddler]);
//!
//! // The straddler is stuck at the root, so every query sees it.
//! let hits = tree.retrieve(&Rect::new(80.0, 80.0, 2.0, 2.0));
//! assert_eq!(hits, vec![straddler]);
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Rect`], [`CellRange`] and both
//!   configuration types.
//! - `kurbo`: [`Spatial<f64>`] for `kurbo::Point` and `kurbo::Rect`.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds may assert.
//!
//! Indexes are not synchronized. Mutate and query each instance from one
//! thread, or wrap it in your own lock.

#![no_std]

extern crate alloc;

mod error;
pub mod hash;
pub mod quadtree;
mod types;

pub use error::Error;
pub use hash::{CellRange, Entry, GridScalar, MapId, SpatialHashConfig, SpatialHashIndex};
pub use quadtree::{BoundsNode, Node, NodePolicy, QuadTreeConfig, QuadTreeIndex, SpatialNode};
pub use types::{Identified, Rect, Scalar, Spatial};
