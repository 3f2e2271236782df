// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_broadphase::{
    Entry, Identified, QuadTreeConfig, QuadTreeIndex, Rect, Spatial, SpatialHashIndex,
};

const WORLD: f64 = 4096.0;

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
        (v as f64) / ((1u64 << 53) as f64)
    }
}

#[derive(Clone, Copy, Debug)]
struct Body {
    id: u32,
    rect: Rect<f64>,
    vx: f64,
    vy: f64,
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

fn gen_bodies(count: usize, size: f64, seed: u64) -> Vec<Body> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|i| Body {
            id: i as u32,
            rect: Rect::new(
                rng.next_f64() * (WORLD - size),
                rng.next_f64() * (WORLD - size),
                size,
                size,
            ),
            vx: (rng.next_f64() - 0.5) * 8.0,
            vy: (rng.next_f64() - 0.5) * 8.0,
        })
        .collect()
}

fn step(bodies: &mut [Body]) {
    for b in bodies {
        b.rect.x = (b.rect.x + b.vx).clamp(0.0, WORLD - b.rect.width);
        b.rect.y = (b.rect.y + b.vy).clamp(0.0, WORLD - b.rect.height);
    }
}

fn bench_quadtree(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree");
    let config = QuadTreeConfig::new(Rect::new(0.0, 0.0, WORLD, WORLD))
        .with_max_depth(6)
        .with_max_children(8);
    for &n in &[1_000usize, 5_000, 20_000] {
        let bodies = gen_bodies(n, 16.0, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("rebuild_and_query_n{}", n), |b| {
            let mut tree = QuadTreeIndex::new(config).unwrap();
            let mut out = Vec::new();
            b.iter(|| {
                tree.clear();
                tree.insert_all(bodies.iter().copied());
                let mut total = 0;
                for body in &bodies {
                    out.clear();
                    tree.retrieve_into(body, &mut out);
                    total += out.len();
                }
                black_box(total);
            });
        });
    }
    group.finish();
}

fn bench_spatial_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_hash");
    for &n in &[1_000usize, 5_000, 20_000] {
        let bodies = gen_bodies(n, 16.0, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("insert_n{}", n), |b| {
            b.iter_batched(
                SpatialHashIndex::<f64, Body>::default,
                |mut map| {
                    for body in &bodies {
                        let _ = map.insert(*body).unwrap();
                    }
                    black_box(map.occupied_cells());
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("tick_update_and_search_n{}", n), |b| {
            let mut map = SpatialHashIndex::<f64, Body>::default();
            let mut moving = bodies.clone();
            let mut entries: Vec<Entry<u32>> =
                moving.iter().map(|b| map.insert(*b).unwrap()).collect();
            b.iter(|| {
                step(&mut moving);
                let mut relocated = 0;
                for (body, entry) in moving.iter().zip(entries.iter_mut()) {
                    if entry.update(&mut map, body.rect).unwrap() {
                        relocated += 1;
                    }
                }
                let mut total = 0;
                for body in &moving {
                    total += map.search(&body.rect).len();
                }
                black_box((relocated, total));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_quadtree, bench_spatial_hash);
criterion_main!(benches);
