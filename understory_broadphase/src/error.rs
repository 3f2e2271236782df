// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract violations reported at the index boundary.

use thiserror::Error;

/// Errors returned when a caller hands an index invalid configuration or a
/// handle it does not own.
///
/// Capacity pressure is never an error: leaves at `max_depth` keep growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Quad-tree bounds with zero, negative or NaN width/height.
    #[error("Quad-tree bounds must have a positive width and height")]
    InvalidBounds,

    /// A `max_depth` above [`NodePolicy::MAX_DEPTH`](crate::NodePolicy::MAX_DEPTH).
    #[error("Quad-tree max_depth must not exceed 32")]
    InvalidDepth,

    /// A `max_children` of zero.
    #[error("Quad-tree nodes must hold at least one item before splitting")]
    InvalidCapacity,

    /// A spatial hash cell size that is not strictly positive.
    #[error("Spatial hash cell size must be strictly positive")]
    InvalidCellSize,

    /// An object whose id is already live in the spatial hash.
    #[error("An object with this id is already indexed")]
    DuplicateObject,

    /// An entry issued by a different spatial hash.
    #[error("Entry belongs to a different spatial hash")]
    ForeignEntry,

    /// An entry whose object has since been removed.
    #[error("Entry refers to an object that is no longer indexed")]
    StaleEntry,
}
