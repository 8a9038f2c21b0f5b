use crate::rng::{hash3, seed_u32};

const SALT_FIELD: u64 = 0xC107_4F1E_1D00_5EED;

/// A deterministic, continuous scalar field over 3D space with values in [-1, 1].
pub trait NoiseField {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Any `Fn(x, y, z)` is a noise field. Handy for flat or analytic fields.
impl<F> NoiseField for F
where
    F: Fn(f64, f64, f64) -> f64,
{
    #[inline]
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self(x, y, z)
    }
}

#[inline]
fn smootherstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn grad(hash: u32, dx: f64, dy: f64, dz: f64) -> f64 {
    // 12 cube-edge gradients, four of them repeated to fill 16 slots.
    match hash & 15 {
        0 => dx + dy,
        1 => -dx + dy,
        2 => dx - dy,
        3 => -dx - dy,
        4 => dx + dz,
        5 => -dx + dz,
        6 => dx - dz,
        7 => -dx - dz,
        8 => dy + dz,
        9 => -dy + dz,
        10 => dy - dz,
        11 => -dy - dz,
        12 => dx + dy,
        13 => -dy + dz,
        14 => -dx + dy,
        _ => -dy - dz,
    }
}

/// 3D gradient noise (Perlin-style) over an integer lattice hashed with splitmix.
///
/// The field is seeded once; the same seed always produces the same field.
#[derive(Clone, Copy, Debug)]
pub struct GradientNoise {
    seed: u32,
}

impl GradientNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            seed: seed_u32(seed, SALT_FIELD),
        }
    }
}

impl NoiseField for GradientNoise {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return 0.0;
        }
        let (fx0, fy0, fz0) = (x.floor(), y.floor(), z.floor());
        let (ix, iy, iz) = (fx0 as i64, fy0 as i64, fz0 as i64);
        let (fx, fy, fz) = (x - fx0, y - fy0, z - fz0);
        let (sx, sy, sz) = (smootherstep(fx), smootherstep(fy), smootherstep(fz));

        let corner = |cx: i64, cy: i64, cz: i64| {
            let h = hash3(ix + cx, iy + cy, iz + cz, self.seed);
            grad(h, fx - cx as f64, fy - cy as f64, fz - cz as f64)
        };

        let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), sx);
        let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), sx);
        let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), sx);
        let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), sx);
        let y0 = lerp(x00, x10, sy);
        let y1 = lerp(x01, x11, sy);

        lerp(y0, y1, sz).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let a = GradientNoise::new(1000);
        let b = GradientNoise::new(1000);
        for i in 0..50 {
            let t = i as f64 * 0.37;
            assert_eq!(a.sample(t, -t, t * 0.5).to_bits(), b.sample(t, -t, t * 0.5).to_bits());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = GradientNoise::new(1);
        let b = GradientNoise::new(2);
        let differs = (0..50).any(|i| {
            let t = i as f64 * 0.31 + 0.1;
            (a.sample(t, t * 1.7, 0.5) - b.sample(t, t * 1.7, 0.5)).abs() > 1e-9
        });
        assert!(differs);
    }

    #[test]
    fn stays_in_unit_range() {
        let n = GradientNoise::new(42);
        for i in 0..2000 {
            let t = i as f64 * 0.173;
            let v = n.sample(t, (t * 3.1).sin() * 40.0, t * 0.07 + 200000.0);
            assert!((-1.0..=1.0).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn vanishes_on_lattice_points() {
        let n = GradientNoise::new(9);
        assert_eq!(n.sample(3.0, -4.0, 12.0), 0.0);
    }

    #[test]
    fn is_continuous() {
        let n = GradientNoise::new(5);
        let a = n.sample(1.2345, 6.789, 1000.0);
        let b = n.sample(1.2345 + 1e-7, 6.789, 1000.0);
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn closures_are_noise_fields() {
        let flat = |_x: f64, _y: f64, _z: f64| 0.25;
        assert_eq!(flat.sample(1.0, 2.0, 3.0), 0.25);
    }
}
