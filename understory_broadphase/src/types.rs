// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and the item traits both indexes are generic over.

use core::fmt::Debug;
use core::hash::Hash;

/// Axis-aligned rectangle in world units, stored as origin and size.
///
/// `x`/`y` is the top-left corner; `y` grows downward, matching the quadrant
/// naming used by the quad-tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect<T> {
    /// Left edge.
    pub x: T,
    /// Top edge.
    pub y: T,
    /// Horizontal extent.
    pub width: T,
    /// Vertical extent.
    pub height: T,
}

impl<T> Rect<T> {
    /// Create a rectangle from origin and size.
    #[inline(always)]
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl<T: Scalar> Rect<T> {
    /// A zero-extent rectangle at `(x, y)`.
    #[inline]
    pub fn point(x: T, y: T) -> Self {
        Self::new(x, y, T::zero(), T::zero())
    }

    /// Right edge (`x + width`).
    #[inline]
    pub fn right(&self) -> T {
        T::add(self.x, self.width)
    }

    /// Bottom edge (`y + height`).
    #[inline]
    pub fn bottom(&self) -> T {
        T::add(self.y, self.height)
    }

    /// Center of the rectangle.
    ///
    /// Exact for floating-point scalars; rounded toward -∞ for integers.
    #[inline]
    pub fn center(&self) -> (T, T) {
        (T::mid(self.x, self.right()), T::mid(self.y, self.bottom()))
    }

    /// Whether `other` lies entirely inside this rectangle. Edges are inclusive.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Whether the interiors of the two rectangles intersect.
    ///
    /// Rectangles that only share an edge do **not** overlap. This is the
    /// test the spatial hash uses to drop cell-level false positives.
    ///
    /// # Examples
    ///
    /// ```
    /// use understory_broadphase::Rect;
    ///
    /// let a = Rect::new(0, 0, 10, 10);
    /// assert!(a.overlaps(&Rect::new(5, 5, 10, 10)));
    /// assert!(!a.overlaps(&Rect::new(10, 0, 10, 10)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Whether the two rectangles overlap or share an edge.
    #[inline]
    pub fn touches(&self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// Return true if the rectangle has no area (or a negative extent). Assumes no NaN.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= T::zero() || self.height <= T::zero()
    }
}

/// Numeric scalar abstraction for world coordinates.
///
/// Only the handful of operations the indexes need: edge arithmetic, the
/// quadrant split point and the floored half-extent used when a node is
/// quartered.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Midpoint between a and b (the quadrant split line).
    fn mid(a: Self, b: Self) -> Self;

    /// Half of `v`, rounded toward zero to a whole unit.
    ///
    /// Subdivided nodes use this for their width and height, so child bounds
    /// always land on whole units even for floating-point scalars.
    fn half_extent(v: Self) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Guarded: only magnitudes below 2^23 are cast, and those fit in i32."
    )]
    #[inline]
    fn half_extent(v: Self) -> Self {
        const EXACT: f32 = 8_388_608.0;
        let h = 0.5 * v;
        // Beyond 2^23 every f32 is already a whole number.
        if -EXACT < h && h < EXACT {
            (h as i32) as Self
        } else {
            h
        }
    }
}

impl Scalar for f64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Guarded: only magnitudes below 2^52 are cast, and those fit in i64."
    )]
    #[inline]
    fn half_extent(v: Self) -> Self {
        const EXACT: f64 = 4_503_599_627_370_496.0;
        let h = 0.5 * v;
        if -EXACT < h && h < EXACT {
            (h as i64) as Self
        } else {
            h
        }
    }
}

impl Scalar for i64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline(always)]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        // Average without overflow: (a & b) + ((a ^ b) >> 1)
        (a & b) + ((a ^ b) >> 1)
    }

    #[inline]
    fn half_extent(v: Self) -> Self {
        v / 2
    }
}

/// Anything with a position and, optionally, an extent.
///
/// Point-mode quad-trees only read [`x`][Self::x] and [`y`][Self::y]. Bounds-mode
/// quad-trees and the spatial hash read the full [`bounds`][Self::bounds];
/// implement [`width`][Self::width] and [`height`][Self::height] for those.
pub trait Spatial<T: Scalar> {
    /// Left edge (or the point's x coordinate).
    fn x(&self) -> T;

    /// Top edge (or the point's y coordinate).
    fn y(&self) -> T;

    /// Horizontal extent. Zero for points.
    fn width(&self) -> T {
        T::zero()
    }

    /// Vertical extent. Zero for points.
    fn height(&self) -> T {
        T::zero()
    }

    /// The item's AABB.
    fn bounds(&self) -> Rect<T> {
        Rect::new(self.x(), self.y(), self.width(), self.height())
    }
}

impl<T: Scalar> Spatial<T> for Rect<T> {
    #[inline]
    fn x(&self) -> T {
        self.x
    }

    #[inline]
    fn y(&self) -> T {
        self.y
    }

    #[inline]
    fn width(&self) -> T {
        self.width
    }

    #[inline]
    fn height(&self) -> T {
        self.height
    }

    #[inline]
    fn bounds(&self) -> Rect<T> {
        *self
    }
}

impl<T: Scalar> Spatial<T> for (T, T) {
    #[inline]
    fn x(&self) -> T {
        self.0
    }

    #[inline]
    fn y(&self) -> T {
        self.1
    }
}

impl<T: Scalar, S: Spatial<T> + ?Sized> Spatial<T> for &S {
    #[inline]
    fn x(&self) -> T {
        (**self).x()
    }

    #[inline]
    fn y(&self) -> T {
        (**self).y()
    }

    #[inline]
    fn width(&self) -> T {
        (**self).width()
    }

    #[inline]
    fn height(&self) -> T {
        (**self).height()
    }
}

/// An object with a stable, application-defined identity.
///
/// The spatial hash deduplicates multi-cell hits and locates objects for
/// removal by this id, so two live objects in one index must never share it.
pub trait Identified {
    /// Identity type.
    type Id: Copy + Eq + Hash + Debug;

    /// This object's identity.
    fn id(&self) -> Self::Id;
}

impl<O: Identified + ?Sized> Identified for &O {
    type Id = O::Id;

    #[inline]
    fn id(&self) -> Self::Id {
        (**self).id()
    }
}

#[cfg(feature = "kurbo")]
impl Spatial<f64> for kurbo::Point {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    fn y(&self) -> f64 {
        self.y
    }
}

#[cfg(feature = "kurbo")]
impl Spatial<f64> for kurbo::Rect {
    #[inline]
    fn x(&self) -> f64 {
        self.x0
    }

    #[inline]
    fn y(&self) -> f64 {
        self.y0
    }

    #[inline]
    fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

#[cfg(feature = "kurbo")]
impl From<kurbo::Rect> for Rect<f64> {
    fn from(r: kurbo::Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}
