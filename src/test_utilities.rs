use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_hc::Hc128Rng;

use crate::context::Context;
use crate::entry::Entry;
use crate::selector::{MinimalVolumeIncrease, RStarSelector};
use crate::splitter::{QuadraticSplitter, RStarSplitter};

pub type Seed = [u8; 32];

pub const SEED_1: &Seed = b"fTdyPdMlxXnjBEYKpOyeNC9bJp04SGHU";
pub const SEED_2: &Seed = b"mn1wQloJmcPCRCCnZOelmZkZ97kvig8S";

/// Point entries with coordinates in `[0, 100)` and the index as the
/// value.
pub fn create_random_point_entries(
    count: usize,
    dimensions: usize,
    seed: &Seed,
) -> Vec<Entry<usize>> {
    let mut rng = Hc128Rng::from_seed(*seed);
    (0..count)
        .map(|value| {
            let coordinates: Vec<f64> =
                (0..dimensions).map(|_| rng.random::<f64>() * 100.0).collect();
            Entry::point(value, &coordinates)
        })
        .collect()
}

/// Small two-dimensional rectangle entries with corners in `[0, 110)`
/// and the index as the value.
pub fn create_random_rect_entries(count: usize, seed: &Seed) -> Vec<Entry<usize>> {
    let mut rng = Hc128Rng::from_seed(*seed);
    (0..count)
        .map(|value| {
            let x = rng.random::<f64>() * 100.0;
            let y = rng.random::<f64>() * 100.0;
            let w = rng.random::<f64>() * 10.0;
            let h = rng.random::<f64>() * 10.0;
            Entry::rect(value, &[x, y], &[x + w, y + h])
        })
        .collect()
}

pub fn guttman_context(dimensions: usize, min_children: usize, max_children: usize) -> Context {
    Context::new(
        dimensions,
        min_children,
        max_children,
        0.7,
        Arc::new(MinimalVolumeIncrease),
        Arc::new(QuadraticSplitter),
    )
}

pub fn star_context(dimensions: usize, min_children: usize, max_children: usize) -> Context {
    Context::new(
        dimensions,
        min_children,
        max_children,
        0.7,
        Arc::new(RStarSelector),
        Arc::new(RStarSplitter),
    )
}
