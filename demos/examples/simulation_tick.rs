// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drive both broad-phase indexes through a few simulation ticks.
//!
//! Run:
//! - `cargo run -p understory_broadphase_demos --example simulation_tick`
//! - `cargo run -p understory_broadphase_demos --example simulation_tick -- demos/broadphase.toml`
//!
//! Set `RUST_LOG=understory_broadphase=trace` to watch subdivisions and cell moves.

use std::path::Path;

use kurbo::{Point, Rect as KRect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use understory_broadphase::{
    Entry, Identified, QuadTreeConfig, QuadTreeIndex, Rect, Spatial, SpatialHashConfig,
    SpatialHashIndex,
};

/// Demo configuration, loaded from TOML when a path is given.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
struct DemoConfig {
    ticks: u32,
    bodies: u32,
    quadtree: QuadTreeConfig<f64>,
    spatial_hash: SpatialHashConfig<f64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks: 3,
            bodies: 100,
            quadtree: QuadTreeConfig::new(Rect::new(0.0, 0.0, 1024.0, 1024.0)),
            spatial_hash: SpatialHashConfig::default(),
        }
    }
}

impl DemoConfig {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&contents)?)
            }
            None => {
                info!("No config path given, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[derive(Clone, Debug)]
struct Body {
    id: u32,
    bounds: KRect,
    velocity: (f64, f64),
}

impl Spatial<f64> for Body {
    fn x(&self) -> f64 {
        self.bounds.x0
    }
    fn y(&self) -> f64 {
        self.bounds.y0
    }
    fn width(&self) -> f64 {
        self.bounds.width()
    }
    fn height(&self) -> f64 {
        self.bounds.height()
    }
}

impl Identified for Body {
    type Id = u32;
    fn id(&self) -> u32 {
        self.id
    }
}

// Deterministic layout so runs are comparable.
fn spawn(count: u32, world: Rect<f64>) -> Vec<Body> {
    (0..count)
        .map(|id| {
            let t = f64::from(id);
            let x = world.x + (t * 37.0) % (world.width - 24.0);
            let y = world.y + (t * 61.0) % (world.height - 24.0);
            let size = 8.0 + (t * 7.0) % 16.0;
            Body {
                id,
                bounds: KRect::new(x, y, x + size, y + size),
                velocity: ((t % 5.0) - 2.0, (t % 3.0) - 1.0),
            }
        })
        .collect()
}

fn step(bodies: &mut [Body], world: Rect<f64>) {
    for body in bodies {
        let (vx, vy) = body.velocity;
        let size = body.bounds.size();
        let x = (body.bounds.x0 + vx * 8.0).clamp(world.x, world.right() - size.width);
        let y = (body.bounds.y0 + vy * 8.0).clamp(world.y, world.bottom() - size.height);
        body.bounds = KRect::from_origin_size((x, y), size);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1);
    let config = DemoConfig::load(path.as_deref().map(Path::new))?;
    info!(?config, "Loaded configuration");

    let world = config.quadtree.bounds;
    let mut bodies = spawn(config.bodies, world);

    let mut tree = QuadTreeIndex::new(config.quadtree)?;
    let mut centers = QuadTreeIndex::new(config.quadtree.with_point_mode(true))?;
    let mut grid = SpatialHashIndex::<f64, Body>::new(config.spatial_hash)?;
    let mut entries: Vec<Entry<u32>> = Vec::with_capacity(bodies.len());
    for body in &bodies {
        entries.push(grid.insert(body.clone())?);
    }

    let mut candidates = Vec::new();
    for tick in 0..config.ticks {
        step(&mut bodies, world);

        // Quad-tree: rebuild from scratch every tick.
        tree.clear();
        tree.insert_all(bodies.iter().cloned());
        centers.clear();
        centers.extend(bodies.iter().map(|b| b.bounds.center()));

        let mut tree_pairs = 0;
        let mut neighbours = 0;
        for body in &bodies {
            candidates.clear();
            tree.retrieve_into(body, &mut candidates);
            tree_pairs += candidates
                .iter()
                .filter(|other| {
                    other.id > body.id && !other.bounds.intersect(body.bounds).is_zero_area()
                })
                .count();
            let center: Point = body.bounds.center();
            neighbours += centers.retrieve(&center).len().saturating_sub(1);
        }

        // Spatial hash: move entries, then query.
        let mut relocated = 0;
        for (body, entry) in bodies.iter().zip(entries.iter_mut()) {
            if entry.update(&mut grid, Rect::from(body.bounds))? {
                relocated += 1;
            }
        }
        let grid_pairs: usize = bodies
            .iter()
            .map(|body| {
                grid.search(body)
                    .iter()
                    .filter(|other| other.id > body.id)
                    .count()
            })
            .sum();

        info!(
            tick,
            tree_pairs,
            grid_pairs,
            neighbours,
            relocated,
            cells = grid.occupied_cells(),
            "Tick complete"
        );
    }

    // Remove the first half through their entries.
    let keep = entries.split_off(entries.len() / 2);
    for entry in entries {
        let body = entry.remove(&mut grid)?;
        debug!(id = body.id, "Removed body");
    }
    info!(remaining = grid.len(), kept = keep.len(), "Done");

    Ok(())
}
