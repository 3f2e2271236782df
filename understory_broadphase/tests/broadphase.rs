// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Randomized checks of the broad-phase guarantees: no false negatives,
//! exact filtering in the spatial hash, and cell coverage under churn.

use understory_broadphase::{
    Entry, Identified, QuadTreeConfig, QuadTreeIndex, Rect, Spatial, SpatialHashIndex,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1_u64 << 53) as f64)
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Body {
    id: u32,
    rect: Rect<f64>,
}

impl Spatial<f64> for Body {
    fn x(&self) -> f64 {
        self.rect.x
    }
    fn y(&self) -> f64 {
        self.rect.y
    }
    fn width(&self) -> f64 {
        self.rect.width
    }
    fn height(&self) -> f64 {
        self.rect.height
    }
}

impl Identified for Body {
    type Id = u32;
    fn id(&self) -> u32 {
        self.id
    }
}

const WORLD: f64 = 1024.0;

fn random_rect(rng: &mut Rng, max_size: f64) -> Rect<f64> {
    let w = rng.range(1.0, max_size);
    let h = rng.range(1.0, max_size);
    Rect::new(
        rng.range(0.0, WORLD - w),
        rng.range(0.0, WORLD - h),
        w,
        h,
    )
}

fn random_bodies(rng: &mut Rng, n: u32, max_size: f64) -> Vec<Body> {
    (0..n)
        .map(|id| Body {
            id,
            rect: random_rect(rng, max_size),
        })
        .collect()
}

fn ids(bodies: &[Body]) -> Vec<u32> {
    let mut ids: Vec<u32> = bodies.iter().map(|b| b.id).collect();
    ids.sort_unstable();
    ids
}

#[test]
fn point_tree_finds_every_point_in_its_own_leaf() {
    let mut rng = Rng::new(0x5eed_0001);
    let config = QuadTreeConfig::new(Rect::new(0.0, 0.0, WORLD, WORLD))
        .with_point_mode(true)
        .with_max_children(3)
        .with_max_depth(6);
    let mut tree = QuadTreeIndex::new(config).unwrap();
    let points: Vec<(f64, f64)> = (0..500)
        .map(|_| (rng.range(0.0, WORLD), rng.range(0.0, WORLD)))
        .collect();
    tree.insert_all(points.iter().copied());
    assert_eq!(tree.len(), points.len());

    for p in &points {
        let leaf = tree.retrieve(p);
        let hits = leaf.iter().filter(|q| *q == p).count();
        assert_eq!(hits, 1, "point {p:?} must be in its leaf exactly once");
    }
}

#[test]
fn bounds_tree_point_queries_have_no_false_negatives() {
    let mut rng = Rng::new(0x5eed_0002);
    let bodies = random_bodies(&mut rng, 400, 80.0);
    let config = QuadTreeConfig::new(Rect::new(0.0, 0.0, WORLD, WORLD)).with_max_depth(6);
    let mut tree = QuadTreeIndex::new(config).unwrap();
    tree.insert_all(bodies.iter().cloned());

    for _ in 0..300 {
        let (x, y) = (rng.range(0.0, WORLD), rng.range(0.0, WORLD));
        let probe = Rect::point(x, y);
        let candidates = ids(&tree.retrieve(&probe));
        for b in bodies.iter().filter(|b| b.rect.touches(&probe)) {
            assert!(
                candidates.binary_search(&b.id).is_ok(),
                "body {} contains ({x}, {y}) but was not returned",
                b.id
            );
        }
    }
}

#[test]
fn bounds_tree_overlapping_queries_have_no_false_negatives() {
    let mut rng = Rng::new(0x5eed_0003);
    let bodies = random_bodies(&mut rng, 400, 80.0);
    let config = QuadTreeConfig::new(Rect::new(0.0, 0.0, WORLD, WORLD)).with_max_depth(6);
    let mut tree = QuadTreeIndex::new(config).unwrap();
    tree.insert_all(bodies.iter().cloned());

    for _ in 0..200 {
        let query = random_rect(&mut rng, 300.0);
        let candidates = ids(&tree.retrieve_overlapping(&query));
        let expected: Vec<u32> = bodies
            .iter()
            .filter(|b| b.rect.touches(&query))
            .map(|b| b.id)
            .collect();
        for id in expected {
            assert!(
                candidates.binary_search(&id).is_ok(),
                "body {id} touches {query:?} but was not returned"
            );
        }
    }
}

#[test]
fn rebuilt_tree_matches_a_fresh_one() {
    let mut rng = Rng::new(0x5eed_0004);
    let config = QuadTreeConfig::new(Rect::new(0.0, 0.0, WORLD, WORLD));
    let mut reused = QuadTreeIndex::new(config).unwrap();
    reused.insert_all(random_bodies(&mut rng, 200, 40.0));
    reused.clear();

    let tick = random_bodies(&mut rng, 200, 40.0);
    reused.insert_all(tick.iter().cloned());
    let mut fresh = QuadTreeIndex::new(config).unwrap();
    fresh.insert_all(tick.iter().cloned());

    for _ in 0..50 {
        let query = random_rect(&mut rng, 100.0);
        assert_eq!(reused.retrieve(&query), fresh.retrieve(&query));
    }
}

#[test]
fn spatial_hash_search_is_exact_under_churn() {
    let mut rng = Rng::new(0x5eed_0005);
    let mut bodies = random_bodies(&mut rng, 300, 150.0);
    let mut map = SpatialHashIndex::<f64, Body>::default();
    let mut entries: Vec<Entry<u32>> = bodies
        .iter()
        .map(|b| map.insert(b.clone()).unwrap())
        .collect();

    for round in 0..5 {
        for (body, entry) in bodies.iter_mut().zip(entries.iter_mut()) {
            let dx = rng.range(-40.0, 40.0);
            let dy = rng.range(-40.0, 40.0);
            body.rect.x = (body.rect.x + dx).clamp(0.0, WORLD);
            body.rect.y = (body.rect.y + dy).clamp(0.0, WORLD);
            entry.update(&mut map, body.rect).unwrap();
            assert_eq!(entry.keys(), map.key(&body.rect));
        }

        for body in &bodies {
            for (ix, iy) in map.key(body).cells() {
                assert!(
                    map.cell(ix, iy).contains(&body.id),
                    "round {round}: body {} missing from cell ({ix}, {iy})",
                    body.id
                );
            }
        }

        for _ in 0..50 {
            let query = random_rect(&mut rng, 200.0);
            let found = ids(&map.search(&query));
            let expected: Vec<u32> = bodies
                .iter()
                .filter(|b| b.rect.overlaps(&query))
                .map(|b| b.id)
                .collect();
            assert_eq!(found, expected, "round {round}: search({query:?})");
        }
    }

    // Removing through the entries empties every cell.
    for entry in entries {
        entry.remove(&mut map).unwrap();
    }
    assert!(map.is_empty());
    assert_eq!(map.occupied_cells(), 0);
}
