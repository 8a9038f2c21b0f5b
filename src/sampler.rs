use crate::config::{Params, Viewport};
use crate::geometry::{Point, guard_divisor, remap};
use crate::noise::NoiseField;

/// z-distance between the x- and y-offset slices of the noise field when the
/// two axes are decorrelated.
pub const AXIS_DECORRELATION: f64 = 200000.0;

/// Upper end of the `smoothing_scale` slider. Polar noise coordinates live in a
/// unit-scaled plane, so the slider value is normalized against it first.
pub const SMOOTHING_SLIDER_MAX: f64 = 200.0;

/// Turns (normalized radius, angle) into a noise-displaced viewport point.
pub struct PositionSampler<'a, N: NoiseField + ?Sized> {
    params: &'a Params,
    noise: &'a N,
    center: Point,
    radius: f64,
    cartesian_scale: f64,
    polar_scale: f64,
}

impl<'a, N: NoiseField + ?Sized> PositionSampler<'a, N> {
    pub fn new(params: &'a Params, viewport: Viewport, noise: &'a N) -> Self {
        Self {
            params,
            noise,
            center: viewport.center(),
            radius: viewport.min_side() / guard_divisor(params.radius_scale),
            cartesian_scale: guard_divisor(params.smoothing_scale),
            polar_scale: guard_divisor(remap(
                params.smoothing_scale,
                0.0,
                SMOOTHING_SLIDER_MAX,
                0.0,
                1.0,
            )),
        }
    }

    /// Radius, in viewport units, that `r = 1` maps to.
    pub fn fitted_radius(&self) -> f64 {
        self.radius
    }

    /// Point on the undisplaced circle of normalized radius `r`.
    pub fn circle_point(&self, r: f64, theta: f64) -> Point {
        Point::new(
            r * theta.cos() * self.radius + self.center.x,
            r * theta.sin() * self.radius + self.center.y,
        )
    }

    /// Raw (x, y) offsets for a vertex, after the optional [-1, 1] → [0, 1] remap.
    pub fn offsets(&self, r: f64, theta: f64, at: Point) -> (f64, f64) {
        let p = self.params;
        let (nx, ny) = if p.polar_sampling {
            (r / self.polar_scale, theta / self.polar_scale)
        } else {
            (at.x / self.cartesian_scale, at.y / self.cartesian_scale)
        };
        let z_y = if p.single_axis_noise { p.seed } else { p.seed + AXIS_DECORRELATION };

        let mut x_offset = self.noise.sample(nx, ny, p.seed);
        let mut y_offset = self.noise.sample(nx, ny, z_y);
        if p.map_offset_to_unit_range {
            x_offset = remap(x_offset, -1.0, 1.0, 0.0, 1.0);
            y_offset = remap(y_offset, -1.0, 1.0, 0.0, 1.0);
        }
        (x_offset, y_offset)
    }

    pub fn sample(&self, r: f64, theta: f64) -> Point {
        let at = self.circle_point(r, theta);
        let (x_offset, y_offset) = self.offsets(r, theta, at);
        Point::new(
            at.x - x_offset * self.params.x_multiplier,
            at.y - y_offset * self.params.y_multiplier,
        )
    }
}
