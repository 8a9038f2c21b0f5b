pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod noise;
pub mod path;
pub mod render;
pub mod ring;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod session;

use std::time::Instant;

use config::{Params, Viewport};
use noise::{GradientNoise, NoiseField};
use scene::Scene;

pub use error::{ChromeclothError, ChromeclothResult};
pub use session::Session;

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Generates the full scene for `params` with a noise field seeded by `noise_seed`.
pub fn generate(noise_seed: u64, viewport: Viewport, params: &Params) -> (Scene, Vec<Timing>) {
    generate_with(params, viewport, &GradientNoise::new(noise_seed))
}

/// Generates the full scene against an existing noise field.
///
/// Runs to completion on the calling thread; the scene is all-or-nothing.
pub fn generate_with<N: NoiseField + ?Sized>(
    params: &Params,
    viewport: Viewport,
    noise: &N,
) -> (Scene, Vec<Timing>) {
    let total_start = Instant::now();

    if params.vertices_per_ring < 3 {
        log::warn!(
            "vertices_per_ring = {} is degenerate, rings will not form polygons",
            params.vertices_per_ring
        );
    }
    if params.ring_count == 0 {
        log::warn!("ring_count = 0, nothing to draw");
    }

    let (scene, mut timings) = scene::compose_timed(params, viewport, noise);

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });

    (scene, timings)
}
