// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caller-held handles for objects in a [`SpatialHashIndex`].

use core::fmt::Debug;
use core::hash::Hash;
use core::sync::atomic::{AtomicU32, Ordering};

use super::SpatialHashIndex;
use super::cell::{CellRange, GridScalar};
use crate::error::Error;
use crate::types::{Identified, Rect, Spatial};

static NEXT_MAP_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one [`SpatialHashIndex`] instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapId(u32);

impl MapId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle returned by [`SpatialHashIndex::insert`].
///
/// Remembers the cells the object currently occupies so that
/// [`update`][Self::update] can skip all grid work while the object stays
/// inside the same cell footprint. The index never drops entries itself;
/// discard the handle once the object is removed.
///
/// An entry is tied to one placement of its object. After the object is
/// removed or the index is cleared, the entry (and any clone of it) is stale,
/// even if an object with the same id is inserted again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<Id> {
    pub(crate) keys: CellRange,
    pub(crate) id: Id,
    pub(crate) map: MapId,
    pub(crate) generation: u32,
}

impl<Id: Copy + Eq + Hash + Debug> Entry<Id> {
    /// Cells the object occupied as of the last insert or relocation.
    pub fn keys(&self) -> CellRange {
        self.keys
    }

    /// Id of the tracked object.
    pub fn id(&self) -> Id {
        self.id
    }

    /// The index that issued (or last reused) this entry.
    pub fn map(&self) -> MapId {
        self.map
    }

    /// Record the object's new AABB, relocating it only if its cells changed.
    ///
    /// Returns whether any cell membership changed. Shorthand for
    /// [`SpatialHashIndex::update`].
    pub fn update<T, O>(
        &mut self,
        map: &mut SpatialHashIndex<T, O>,
        rect: Rect<T>,
    ) -> Result<bool, Error>
    where
        T: GridScalar,
        O: Spatial<T> + Identified<Id = Id> + Clone,
    {
        map.update(self, rect)
    }

    /// Remove the tracked object from `map`, consuming the handle.
    pub fn remove<T, O>(self, map: &mut SpatialHashIndex<T, O>) -> Result<O, Error>
    where
        T: GridScalar,
        O: Spatial<T> + Identified<Id = Id> + Clone,
    {
        map.remove_entry(self)
    }
}
