use std::time::Instant;

use serde::Serialize;

use crate::Timing;
use crate::config::{Params, PathMethod, Viewport};
use crate::geometry::Point;
use crate::noise::NoiseField;
use crate::path::Path;
use crate::ring::RingBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassKind {
    Base,
    Moire,
}

impl PassKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PassKind::Base => "base",
            PassKind::Moire => "moire",
        }
    }
}

/// One full sweep over all radii.
#[derive(Clone, Debug, PartialEq)]
pub struct Pass {
    pub kind: PassKind,
    pub paths: Vec<Path>,
}

/// Everything one generation produces, in drawing order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub passes: Vec<Pass>,
}

impl Scene {
    pub fn path_count(&self) -> usize {
        self.passes.iter().map(|p| p.paths.len()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.passes
            .iter()
            .flat_map(|p| &p.paths)
            .map(Path::len)
            .sum()
    }

    pub fn pass(&self, kind: PassKind) -> Option<&Pass> {
        self.passes.iter().find(|p| p.kind == kind)
    }
}

/// Normalized ring radii: `inner_hole + k / ring_count` for `k = 0, 1, ...` while below 1.
///
/// Radii come from the integer step index so there is no accumulated drift.
/// A negative or NaN hole is treated as no hole.
pub fn radius_steps(params: &Params) -> impl Iterator<Item = f64> {
    let count = params.ring_count;
    let inner = params.inner_hole.max(0.0);
    (0usize..)
        .map(move |k| inner + k as f64 / count as f64)
        .take_while(move |r| count > 0 && *r < 1.0)
}

/// Builds one pass. `translation` is applied to every sampled vertex.
pub fn compose_pass<N: NoiseField + ?Sized>(
    params: &Params,
    viewport: Viewport,
    noise: &N,
    kind: PassKind,
    translation: Point,
) -> Pass {
    let builder = RingBuilder::new(params, viewport, noise).translated(translation);
    let n = params.vertices_per_ring;

    let paths = match params.path_method {
        PathMethod::Polygons => radius_steps(params)
            .map(|r| {
                let mut path = Path::with_capacity(n);
                builder.trace(r, &mut path);
                path
            })
            .filter(|path| !path.is_empty())
            .collect(),
        PathMethod::Spiral => {
            let mut path = Path::new();
            for r in radius_steps(params) {
                builder.trace(r, &mut path);
            }
            // The last vertex of the last ring is the stray end of the sweep.
            path.remove_last_segment();
            if path.is_empty() { Vec::new() } else { vec![path] }
        }
    };

    Pass { kind, paths }
}

/// Base pass, plus a duplicate shifted by `moire_offset` when the moiré overlay is on.
pub fn compose<N: NoiseField + ?Sized>(params: &Params, viewport: Viewport, noise: &N) -> Scene {
    compose_timed(params, viewport, noise).0
}

/// [`compose`], also reporting how long each pass took.
pub fn compose_timed<N: NoiseField + ?Sized>(
    params: &Params,
    viewport: Viewport,
    noise: &N,
) -> (Scene, Vec<Timing>) {
    let mut timings = Vec::new();
    let mut passes = Vec::with_capacity(2);

    let mut run = |kind: PassKind, name: &'static str, translation: Point| {
        let t = Instant::now();
        passes.push(compose_pass(params, viewport, noise, kind, translation));
        timings.push(Timing {
            name,
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });
    };

    run(PassKind::Base, "base_pass", Point::ZERO);
    // Moiré duplicate, same radii, shifted
    if params.moire_enabled {
        run(PassKind::Moire, "moire_pass", params.moire_offset);
    }

    (Scene { passes }, timings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::GradientNoise;
    use approx::assert_relative_eq;

    #[test]
    fn generation_and_composition_share_one_pipeline() {
        let noise = GradientNoise::new(3);
        let viewport = Viewport::default();
        let params = Params {
            ring_count: 5,
            moire_enabled: true,
            ..Params::default()
        };
        let (scene, timings) = compose_timed(&params, viewport, &noise);
        assert_eq!(scene, compose(&params, viewport, &noise));
        let names: Vec<&str> = timings.iter().map(|t| t.name).collect();
        assert_eq!(names, ["base_pass", "moire_pass"]);

        let (generated, timings) = crate::generate_with(&params, viewport, &noise);
        assert_eq!(generated, scene);
        let names: Vec<&str> = timings.iter().map(|t| t.name).collect();
        assert_eq!(names, ["base_pass", "moire_pass", "TOTAL"]);
    }

    #[test]
    fn radii_start_at_the_hole_and_stay_below_one() {
        let params = Params {
            ring_count: 4,
            inner_hole: 0.3,
            ..Params::default()
        };
        let radii: Vec<f64> = radius_steps(&params).collect();
        assert_eq!(radii.len(), 3);
        assert_relative_eq!(radii[0], 0.3);
        assert_relative_eq!(radii[1], 0.55);
        assert_relative_eq!(radii[2], 0.8);
    }

    #[test]
    fn degenerate_ring_counts_produce_no_rings() {
        let params = Params {
            ring_count: 0,
            ..Params::default()
        };
        assert_eq!(radius_steps(&params).count(), 0);
        let params = Params {
            inner_hole: 1.0,
            ..Params::default()
        };
        assert_eq!(radius_steps(&params).count(), 0);
        let params = Params {
            inner_hole: f64::NAN,
            ring_count: 5,
            ..Params::default()
        };
        assert_eq!(radius_steps(&params).count(), 5);
    }

    #[test]
    fn empty_spiral_has_no_paths() {
        let params = Params {
            ring_count: 0,
            path_method: PathMethod::Spiral,
            ..Params::default()
        };
        let noise = GradientNoise::new(1);
        let scene = compose(&params, Viewport::default(), &noise);
        assert_eq!(scene.passes.len(), 2);
        assert_eq!(scene.path_count(), 0);
    }

    #[test]
    fn moire_toggle_controls_pass_count() {
        let noise = GradientNoise::new(8);
        let params = Params {
            ring_count: 10,
            path_method: PathMethod::Polygons,
            moire_enabled: false,
            ..Params::default()
        };
        let scene = compose(&params, Viewport::default(), &noise);
        assert_eq!(scene.passes.len(), 1);
        assert_eq!(scene.passes[0].kind, PassKind::Base);
        assert!(scene.pass(PassKind::Moire).is_none());

        let params = Params { moire_enabled: true, ..params };
        let scene = compose(&params, Viewport::default(), &noise);
        assert_eq!(scene.passes.len(), 2);
        assert_eq!(scene.passes[1].paths.len(), 10);
    }
}
