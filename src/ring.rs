use std::f64::consts::TAU;

use crate::config::{Params, PathMethod, SmoothingSampling, Viewport};
use crate::geometry::{Point, guard_divisor, remap};
use crate::noise::NoiseField;
use crate::path::{Path, SmoothRange};
use crate::sampler::PositionSampler;

/// Angle of vertex `j` of `n` on the ring of normalized radius `r`.
#[inline]
pub fn vertex_angle(j: usize, n: usize, r: f64, angle_offset: f64) -> f64 {
    TAU * (j as f64 / n as f64) + r * angle_offset
}

/// Tension factor shared by every segment of the ring at radius `r`.
#[inline]
pub fn radius_factor(r: f64, inversed: bool) -> f64 {
    if inversed {
        remap(r, 0.0, 1.0, 1.0, 0.0)
    } else {
        remap(r, 0.0, 1.0, 0.0, 1.0)
    }
}

/// Samples rings and appends them to a path, smoothing as configured.
pub struct RingBuilder<'a, N: NoiseField + ?Sized> {
    params: &'a Params,
    noise: &'a N,
    sampler: PositionSampler<'a, N>,
    translation: Point,
}

impl<'a, N: NoiseField + ?Sized> RingBuilder<'a, N> {
    pub fn new(params: &'a Params, viewport: Viewport, noise: &'a N) -> Self {
        Self {
            params,
            noise,
            sampler: PositionSampler::new(params, viewport, noise),
            translation: Point::ZERO,
        }
    }

    /// Every appended vertex is moved by `offset` (the moiré duplicate pass).
    pub fn translated(mut self, offset: Point) -> Self {
        self.translation = offset;
        self
    }

    fn noise_factor(&self, r: f64, theta: f64) -> f64 {
        let s = guard_divisor(self.params.path_noise_smoothing);
        let raw = self.noise.sample(r / s, theta / s, self.params.seed);
        remap(raw, -1.0, 1.0, 0.0, 1.0)
    }

    /// Appends the ring at radius `r` to `path`.
    ///
    /// In polygon mode `path` is expected to be fresh and is closed afterwards.
    /// In spiral mode `path` is the running spiral and stays open.
    pub fn trace(&self, r: f64, path: &mut Path) {
        let p = self.params;
        let n = p.vertices_per_ring;
        if n == 0 {
            return;
        }
        // Noise sampling smooths as it goes; `smooth_enabled` only gates the per-ring pass.
        let per_vertex_smoothing = p.smoothing_sampling == SmoothingSampling::Noise;

        for j in 0..n {
            let theta = vertex_angle(j, n, r, p.angle_offset);
            path.add(self.sampler.sample(r, theta) + self.translation);
            if per_vertex_smoothing {
                let factor = self.noise_factor(r, theta);
                path.smooth(p.smoothing_method, factor, SmoothRange::Span { from: -1, to: -2 });
            }
        }

        let per_ring_smoothing = p.smooth_enabled && p.smoothing_sampling == SmoothingSampling::Radius;
        let factor = radius_factor(r, p.inversed);
        match p.path_method {
            PathMethod::Polygons => {
                path.close();
                if per_ring_smoothing {
                    path.smooth(p.smoothing_method, factor, SmoothRange::All);
                }
            }
            PathMethod::Spiral => {
                if per_ring_smoothing {
                    // The ring just traced plus the two joints around it.
                    let span = -(n as isize) - 2;
                    path.smooth(p.smoothing_method, factor, SmoothRange::Span { from: -1, to: span });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmoothingMethod;
    use crate::noise::GradientNoise;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::f64::consts::FRAC_PI_2;

    fn still() -> Params {
        Params {
            x_multiplier: 0.0,
            y_multiplier: 0.0,
            angle_offset: 0.0,
            smooth_enabled: false,
            vertices_per_ring: 4,
            path_method: PathMethod::Polygons,
            ..Params::default()
        }
    }

    #[test]
    fn angles_step_evenly_and_twist_with_radius() {
        assert_relative_eq!(vertex_angle(1, 4, 0.0, 0.0), FRAC_PI_2);
        let twist = vertex_angle(3, 4, 0.5, 2.0) - vertex_angle(3, 4, 0.0, 2.0);
        assert_relative_eq!(twist, 1.0);
        assert_relative_eq!(
            vertex_angle(0, 7, 0.5, 2.0) - vertex_angle(0, 7, 0.0, 0.0),
            vertex_angle(5, 7, 0.5, 2.0) - vertex_angle(5, 7, 0.0, 0.0)
        );
    }

    #[test]
    fn radius_factor_respects_inversion() {
        assert_relative_eq!(radius_factor(0.3, false), 0.3);
        assert_relative_eq!(radius_factor(0.3, true), 0.7);
    }

    #[test]
    fn polygon_ring_is_closed_with_n_vertices() {
        let params = still();
        let noise = GradientNoise::new(1);
        let builder = RingBuilder::new(&params, Viewport::new(100.0, 100.0), &noise);
        let mut path = Path::new();
        builder.trace(0.5, &mut path);
        assert!(path.is_closed());
        assert_eq!(path.len(), 4);
        let first = path.segments()[0].point;
        assert_relative_eq!(first.x, 50.0 + 0.5 * 40.0);
        assert_relative_eq!(first.y, 50.0);
    }

    #[test]
    fn translation_moves_every_vertex() {
        let params = still();
        let noise = GradientNoise::new(1);
        let viewport = Viewport::new(100.0, 100.0);
        let mut base = Path::new();
        RingBuilder::new(&params, viewport, &noise).trace(0.75, &mut base);
        let mut shifted = Path::new();
        RingBuilder::new(&params, viewport, &noise)
            .translated(Point::new(3.0, -2.0))
            .trace(0.75, &mut shifted);
        for (a, b) in base.points().zip(shifted.points()) {
            assert_relative_eq!(b.x - a.x, 3.0, epsilon = 1e-9);
            assert_relative_eq!(b.y - a.y, -2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn spiral_ring_stays_open() {
        let params = Params {
            path_method: PathMethod::Spiral,
            smooth_enabled: true,
            ..still()
        };
        let noise = GradientNoise::new(1);
        let builder = RingBuilder::new(&params, Viewport::default(), &noise);
        let mut path = Path::new();
        builder.trace(0.2, &mut path);
        builder.trace(0.4, &mut path);
        assert!(!path.is_closed());
        assert_eq!(path.len(), 8);
    }

    #[test]
    fn noise_sampling_smooths_while_tracing() {
        let params = Params {
            smooth_enabled: true,
            smoothing_sampling: SmoothingSampling::Noise,
            smoothing_method: SmoothingMethod::CatmullRom,
            vertices_per_ring: 6,
            ..still()
        };
        let noise = GradientNoise::new(4);
        let builder = RingBuilder::new(&params, Viewport::default(), &noise);
        let mut path = Path::new();
        builder.trace(0.6, &mut path);
        assert!(path.is_closed());
        let smoothed = path
            .segments()
            .iter()
            .filter(|s| !s.handle_in.is_zero() || !s.handle_out.is_zero())
            .count();
        assert!(smoothed >= 4);
    }

    #[test]
    fn spiral_smoothing_only_touches_the_latest_ring_and_its_joints() {
        let params = Params {
            path_method: PathMethod::Spiral,
            smooth_enabled: true,
            smoothing_method: SmoothingMethod::Geometric,
            ..still()
        };
        let noise = GradientNoise::new(1);
        let builder = RingBuilder::new(&params, Viewport::default(), &noise);
        let mut path = Path::new();
        builder.trace(0.2, &mut path);
        let first_ring = path.segments().to_vec();
        // The open end has no next neighbour yet.
        assert!(first_ring[3].handle_in.is_zero() && first_ring[3].handle_out.is_zero());

        builder.trace(0.4, &mut path);
        let segs = path.segments();
        assert_eq!(segs.len(), 8);
        // Span -1..=-(4 + 2) resolves to indices 2..=7 on an 8-segment path.
        assert_eq!(&segs[..2], &first_ring[..2]);
        assert_eq!(segs[2].handle_in, first_ring[2].handle_in);
        assert_ne!(segs[2].handle_out, first_ring[2].handle_out);
        assert!(!segs[3].handle_in.is_zero() && !segs[3].handle_out.is_zero());
        for s in &segs[4..7] {
            assert!(!s.handle_in.is_zero() && !s.handle_out.is_zero());
        }
        assert!(segs[7].handle_in.is_zero() && segs[7].handle_out.is_zero());
    }

    #[test]
    fn noise_factor_samples_radius_and_angle_over_path_noise_smoothing() {
        let params = Params {
            smoothing_sampling: SmoothingSampling::Noise,
            path_noise_smoothing: 0.5,
            seed: 7.0,
            vertices_per_ring: 3,
            ..still()
        };
        let seen = RefCell::new(Vec::new());
        let recorder = |x: f64, y: f64, z: f64| {
            seen.borrow_mut().push((x, y, z));
            0.0
        };
        let mut path = Path::new();
        RingBuilder::new(&params, Viewport::default(), &recorder).trace(0.4, &mut path);

        let calls = seen.borrow();
        for j in 0..3 {
            let theta = vertex_angle(j, 3, 0.4, params.angle_offset);
            let expected = (0.4 / 0.5, theta / 0.5, 7.0);
            assert!(calls.contains(&expected), "missing factor sample {expected:?}");
        }
    }

    #[test]
    fn noise_sampling_smooths_even_with_smoothing_disabled() {
        let params = Params {
            path_method: PathMethod::Spiral,
            smooth_enabled: false,
            smoothing_sampling: SmoothingSampling::Noise,
            smoothing_method: SmoothingMethod::CatmullRom,
            vertices_per_ring: 6,
            ..still()
        };
        let noise = GradientNoise::new(4);
        let builder = RingBuilder::new(&params, Viewport::default(), &noise);
        let mut path = Path::new();
        builder.trace(0.3, &mut path);
        builder.trace(0.6, &mut path);
        let curved = path.segments().iter().filter(|s| !s.handle_out.is_zero()).count();
        assert!(curved >= 6);
    }

    #[test]
    fn zero_vertices_adds_nothing() {
        let params = Params {
            vertices_per_ring: 0,
            ..still()
        };
        let noise = GradientNoise::new(1);
        let mut path = Path::new();
        RingBuilder::new(&params, Viewport::default(), &noise).trace(0.5, &mut path);
        assert!(path.is_empty());
    }
}
