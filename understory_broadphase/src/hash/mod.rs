// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid spatial hash with incremental relocation.
//!
//! Objects are bucketed into every fixed-size cell their AABB touches.
//! Queries visit only the cells under the query rectangle. Moving an object
//! costs nothing until it crosses into a different set of cells; see
//! [`Entry::update`].

mod cell;
mod entry;

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::types::{Identified, Rect, Spatial};

pub use cell::{CellRange, GridScalar};
pub use entry::{Entry, MapId};

/// Constructor options for [`SpatialHashIndex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(default, bound(deserialize = "T: GridScalar + serde::Deserialize<'de>"))
)]
pub struct SpatialHashConfig<T> {
    /// Edge length of every cell. Must be strictly positive.
    pub cell_size: T,
    /// World x coordinate of the left edge of column 0.
    pub origin_x: T,
    /// World y coordinate of the top edge of row 0.
    pub origin_y: T,
}

impl<T: GridScalar> Default for SpatialHashConfig<T> {
    fn default() -> Self {
        Self {
            cell_size: T::DEFAULT_CELL_SIZE,
            origin_x: T::zero(),
            origin_y: T::zero(),
        }
    }
}

struct Slot<T, O> {
    object: O,
    // Latest AABB reported for the object; the source of truth for filtering.
    rect: Rect<T>,
    // Cells the id is actually stored in.
    keys: CellRange,
    generation: u32,
}

/// Uniform grid spatial hash over identified objects.
///
/// ## Example
///
/// ```rust
/// use understory_broadphase::{Identified, Rect, Spatial, SpatialHashIndex};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Ball {
///     id: u32,
///     rect: Rect<f64>,
/// }
///
/// impl Spatial<f64> for Ball {
///     fn x(&self) -> f64 { self.rect.x }
///     fn y(&self) -> f64 { self.rect.y }
///     fn width(&self) -> f64 { self.rect.width }
///     fn height(&self) -> f64 { self.rect.height }
/// }
///
/// impl Identified for Ball {
///     type Id = u32;
///     fn id(&self) -> u32 { self.id }
/// }
///
/// let mut hash = SpatialHashIndex::<f64, Ball>::default();
/// let ball = Ball { id: 1, rect: Rect::new(0.0, 0.0, 10.0, 10.0) };
/// let mut entry = hash.insert(ball.clone()).unwrap();
/// assert_eq!(hash.search(&Rect::new(0.0, 0.0, 10.0, 10.0)), vec![ball]);
///
/// // Crossing into the next column relocates the object.
/// assert!(entry.update(&mut hash, Rect::new(70.0, 0.0, 10.0, 10.0)).unwrap());
/// assert!(hash.search(&Rect::new(0.0, 0.0, 10.0, 10.0)).is_empty());
/// ```
pub struct SpatialHashIndex<T, O: Identified> {
    id: MapId,
    cell_size: T,
    origin_x: T,
    origin_y: T,
    // Bumped on every placement and never reset, so entries from before a
    // `clear` or a remove/re-insert of the same id no longer match.
    next_generation: u32,
    cells: HashMap<(i32, i32), SmallVec<[O::Id; 8]>>,
    objects: HashMap<O::Id, Slot<T, O>>,
}

impl<T: GridScalar, O: Identified> Debug for SpatialHashIndex<T, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialHashIndex")
            .field("id", &self.id)
            .field("cell_size", &self.cell_size)
            .field("origin_x", &self.origin_x)
            .field("origin_y", &self.origin_y)
            .field("objects", &self.objects.len())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

impl<T, O> Default for SpatialHashIndex<T, O>
where
    T: GridScalar,
    O: Spatial<T> + Identified + Clone,
{
    fn default() -> Self {
        Self::from_valid_config(SpatialHashConfig::default())
    }
}

impl<T, O> SpatialHashIndex<T, O>
where
    T: GridScalar,
    O: Spatial<T> + Identified + Clone,
{
    /// Create an empty index.
    ///
    /// Fails with [`Error::InvalidCellSize`] unless `cell_size` is strictly positive.
    pub fn new(config: SpatialHashConfig<T>) -> Result<Self, Error> {
        if !(config.cell_size > T::zero()) {
            return Err(Error::InvalidCellSize);
        }
        Ok(Self::from_valid_config(config))
    }

    /// Create an empty index with origin at (0, 0).
    pub fn with_cell_size(cell_size: T) -> Result<Self, Error> {
        Self::new(SpatialHashConfig {
            cell_size,
            ..SpatialHashConfig::default()
        })
    }

    fn from_valid_config(config: SpatialHashConfig<T>) -> Self {
        let id = MapId::next();
        debug!(?id, cell_size = ?config.cell_size, "created spatial hash");
        Self {
            id,
            cell_size: config.cell_size,
            origin_x: config.origin_x,
            origin_y: config.origin_y,
            next_generation: 1,
            cells: HashMap::new(),
            objects: HashMap::new(),
        }
    }

    /// Identity checked against [`Entry::map`].
    pub fn id(&self) -> MapId {
        self.id
    }

    /// Cell edge length.
    pub fn cell_size(&self) -> T {
        self.cell_size
    }

    /// The cells covered by `object`'s AABB.
    pub fn key<S: Spatial<T> + ?Sized>(&self, object: &S) -> CellRange {
        let r = object.bounds();
        CellRange {
            x1: T::cell_coord(r.x, self.origin_x, self.cell_size),
            y1: T::cell_coord(r.y, self.origin_y, self.cell_size),
            x2: T::cell_coord(r.right(), self.origin_x, self.cell_size),
            y2: T::cell_coord(r.bottom(), self.origin_y, self.cell_size),
        }
    }

    /// Insert `object` into every cell its AABB touches.
    ///
    /// Fails with [`Error::DuplicateObject`] if an object with the same id is
    /// already indexed.
    pub fn insert(&mut self, object: O) -> Result<Entry<O::Id>, Error> {
        let map = self.id;
        let (keys, id, generation) = self.place(object)?;
        Ok(Entry {
            keys,
            id,
            map,
            generation,
        })
    }

    /// Insert `object`, reusing `entry` instead of issuing a new handle.
    ///
    /// The entry is rewritten to point at this index and the object's cells.
    pub fn insert_with(&mut self, object: O, entry: &mut Entry<O::Id>) -> Result<(), Error> {
        let (keys, id, generation) = self.place(object)?;
        entry.keys = keys;
        entry.id = id;
        entry.map = self.id;
        entry.generation = generation;
        Ok(())
    }

    fn place(&mut self, object: O) -> Result<(CellRange, O::Id, u32), Error> {
        let id = object.id();
        if self.objects.contains_key(&id) {
            return Err(Error::DuplicateObject);
        }
        let rect = object.bounds();
        let keys = self.key(&rect);
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.add_to_cells(id, keys);
        self.objects.insert(
            id,
            Slot {
                object,
                rect,
                keys,
                generation,
            },
        );
        Ok((keys, id, generation))
    }

    fn add_to_cells(&mut self, id: O::Id, keys: CellRange) {
        for cell in keys.cells() {
            self.cells.entry(cell).or_default().push(id);
        }
    }

    fn remove_from_cells(&mut self, id: O::Id, keys: CellRange) {
        for (ix, iy) in keys.cells() {
            let Some(cell) = self.cells.get_mut(&(ix, iy)) else {
                warn!(?id, ix, iy, "removing from a cell that does not exist");
                continue;
            };
            match cell.iter().position(|&s| s == id) {
                Some(pos) => {
                    cell.remove(pos);
                }
                None => warn!(?id, ix, iy, "object not found in expected cell"),
            }
            if cell.is_empty() {
                // Dropping empty cells keeps the map compact for sparse grids.
                self.cells.remove(&(ix, iy));
            }
        }
    }

    /// Objects whose AABB overlaps `query`, each reported once.
    ///
    /// Objects that only share a cell with the query, or only touch its edge,
    /// are filtered out.
    pub fn search<Q: Spatial<T> + ?Sized>(&self, query: &Q) -> Vec<O> {
        let rect = query.bounds();
        let mut seen: HashSet<O::Id> = HashSet::new();
        let mut out = Vec::new();
        for cell in self.key(&rect).cells() {
            let Some(ids) = self.cells.get(&cell) else {
                continue;
            };
            for id in ids {
                let Some(slot) = self.objects.get(id) else {
                    continue;
                };
                if slot.rect.overlaps(&rect) && seen.insert(*id) {
                    out.push(slot.object.clone());
                }
            }
        }
        out
    }

    /// Every object in every cell under `query`, without deduplication or
    /// overlap checks.
    ///
    /// An object spanning several of the visited cells appears once per cell.
    pub fn search_unfiltered<Q: Spatial<T> + ?Sized>(&self, query: &Q) -> Vec<O> {
        let mut out = Vec::new();
        for cell in self.key(query).cells() {
            let Some(ids) = self.cells.get(&cell) else {
                continue;
            };
            out.extend(
                ids.iter()
                    .filter_map(|id| self.objects.get(id))
                    .map(|slot| slot.object.clone()),
            );
        }
        out
    }

    /// Remove `object` (matched by id) from every cell it occupies.
    pub fn remove(&mut self, object: &O) -> Option<O> {
        self.take(object.id())
    }

    /// Remove the object with `id`, given the cells the caller believes it
    /// occupies, e.g. from [`Entry::keys`].
    ///
    /// The id is always cleared from the cells it is actually stored in. A
    /// `keys` that disagrees with them is logged and otherwise ignored, so a
    /// wrong range can never leave the id behind in the grid.
    pub fn remove_keys(&mut self, keys: CellRange, id: O::Id) -> Option<O> {
        let slot = self.objects.get(&id)?;
        if slot.keys != keys {
            warn!(
                ?id,
                given = %keys,
                stored = %slot.keys,
                "remove_keys with a stale cell range"
            );
        }
        self.take(id)
    }

    fn take(&mut self, id: O::Id) -> Option<O> {
        let slot = self.objects.remove(&id)?;
        self.remove_from_cells(id, slot.keys);
        Some(slot.object)
    }

    /// Remove the object tracked by `entry`.
    ///
    /// Fails with [`Error::StaleEntry`] if that object is gone, including when
    /// an object with the same id has been inserted since.
    pub fn remove_entry(&mut self, entry: Entry<O::Id>) -> Result<O, Error> {
        self.check_entry(&entry)?;
        self.take(entry.id).ok_or(Error::StaleEntry)
    }

    fn check_entry(&self, entry: &Entry<O::Id>) -> Result<&Slot<T, O>, Error> {
        if entry.map != self.id {
            return Err(Error::ForeignEntry);
        }
        match self.objects.get(&entry.id) {
            Some(slot) if slot.generation == entry.generation => Ok(slot),
            _ => Err(Error::StaleEntry),
        }
    }

    /// Record a new AABB for the object behind `entry`.
    ///
    /// If the new AABB covers the same cells the grid is left untouched.
    /// Otherwise the object moves from its old cells to the new ones and the
    /// entry is rewritten in place. Returns whether the object moved.
    ///
    /// Fails with [`Error::ForeignEntry`] for an entry from another index and
    /// [`Error::StaleEntry`] for one whose object has been removed or
    /// re-inserted since; the grid is left untouched in both cases.
    pub fn update(&mut self, entry: &mut Entry<O::Id>, rect: Rect<T>) -> Result<bool, Error> {
        let old = self.check_entry(entry)?.keys;
        let keys = self.key(&rect);
        if let Some(slot) = self.objects.get_mut(&entry.id) {
            slot.rect = rect;
            slot.keys = keys;
        }
        entry.keys = keys;
        if keys == old {
            return Ok(false);
        }

        trace!(id = ?entry.id, from = %old, to = %keys, "relocating object");
        self.remove_from_cells(entry.id, old);
        self.add_to_cells(entry.id, keys);
        Ok(true)
    }

    /// The indexed object with `id`.
    pub fn get(&self, id: O::Id) -> Option<&O> {
        self.objects.get(&id).map(|slot| &slot.object)
    }

    /// The latest AABB recorded for `id`.
    pub fn bounds_of(&self, id: O::Id) -> Option<Rect<T>> {
        self.objects.get(&id).map(|slot| slot.rect)
    }

    /// Ids stored in cell `(ix, iy)`, in insertion order.
    pub fn cell(&self, ix: i32, iy: i32) -> &[O::Id] {
        self.cells
            .get(&(ix, iy))
            .map_or(&[][..], |ids| ids.as_slice())
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of indexed objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are indexed.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object. Outstanding entries become stale.
    pub fn clear(&mut self) {
        debug!(objects = self.objects.len(), "clearing spatial hash");
        self.cells.clear();
        self.objects.clear();
    }
}
