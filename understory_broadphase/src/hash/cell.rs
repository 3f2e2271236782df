// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid cell coordinates and inclusive cell ranges.

use core::fmt;

use crate::types::Scalar;

/// Scalar types the spatial hash can bucket.
///
/// [`SpatialHashIndex::key`](super::SpatialHashIndex::key) calls
/// [`cell_coord`][Self::cell_coord] four times per AABB: once for each of the
/// left, top, right and bottom edges. Right and bottom edges are mapped like
/// any other coordinate, so an edge lying exactly on a cell boundary lands in
/// the cell that starts there.
pub trait GridScalar: Scalar {
    /// Cell edge length used when none is configured.
    const DEFAULT_CELL_SIZE: Self;

    /// Column (or row) holding `value` on a grid whose cell 0 starts at
    /// `origin`, i.e. `floor((value - origin) / cell_size)`.
    ///
    /// Coordinates whose column does not fit in `i32` clamp to its bounds.
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32;
}

macro_rules! float_grid_scalar {
    ($ty:ty) => {
        impl GridScalar for $ty {
            const DEFAULT_CELL_SIZE: Self = 64.0;

            #[allow(
                clippy::cast_possible_truncation,
                reason = "`as` saturates float-to-int casts, which is the clamping we want."
            )]
            #[inline]
            fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
                debug_assert!(cell_size > 0.0, "spatial hash cell_size must be positive");
                let t = (value - origin) / cell_size;
                let column = t as i32;
                // Only negative fractions truncate upward; step them down one column.
                if (column as Self) > t {
                    column.saturating_sub(1)
                } else {
                    column
                }
            }
        }
    };
}

float_grid_scalar!(f32);
float_grid_scalar!(f64);

impl GridScalar for i64 {
    const DEFAULT_CELL_SIZE: Self = 64;

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Checked against the i32 range just above."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(cell_size > 0, "cell_size must be strictly positive (i64)");
        // Euclidean division by a positive divisor is floor division.
        let coord = value.saturating_sub(origin).div_euclid(cell_size);
        coord.clamp(Self::from(i32::MIN), Self::from(i32::MAX)) as i32
    }
}

/// Inclusive block of grid cells covered by an AABB.
///
/// `x1`/`y1` come from the top-left corner and `x2`/`y2` from the
/// bottom-right corner, so a box whose right edge lands exactly on a cell
/// boundary also occupies the next cell over.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// First column.
    pub x1: i32,
    /// First row.
    pub y1: i32,
    /// Last column (inclusive).
    pub x2: i32,
    /// Last row (inclusive).
    pub y2: i32,
}

impl CellRange {
    /// Every `(column, row)` in the range, column-major.
    pub fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        let Self { x1, y1, x2, y2 } = self;
        (x1..=x2).flat_map(move |ix| (y1..=y2).map(move |iy| (ix, iy)))
    }

    /// Whether the cell `(ix, iy)` lies in the range.
    pub fn contains_cell(&self, ix: i32, iy: i32) -> bool {
        (self.x1..=self.x2).contains(&ix) && (self.y1..=self.y2).contains(&iy)
    }
}

/// Canonical `"x1 y1 x2 y2"` form.
impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x1, self.y1, self.x2, self.y2)
    }
}
