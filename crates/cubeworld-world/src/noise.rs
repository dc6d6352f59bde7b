//! Height sources for terrain generation.
//!
//! Every source maps a point in noise space to a height in `[0, 1]` and must
//! be a pure function of its input so chunks can be generated in any order,
//! on any thread.

use std::f64::consts::FRAC_1_SQRT_2;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// A deterministic 2D height field with values in `[0, 1]`.
pub trait HeightSource: Send + Sync {
    /// Height at `(x, z)` in noise space.
    fn height(&self, x: f64, z: f64) -> f64;
}

/// Largest magnitude of [`GradientNoise::raw`] with unit gradients (√2/2).
pub const GRADIENT_NOISE_AMPLITUDE: f64 = FRAC_1_SQRT_2;

const GRADIENTS: [[f64; 2]; 8] = [
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [FRAC_1_SQRT_2, FRAC_1_SQRT_2],
    [-FRAC_1_SQRT_2, FRAC_1_SQRT_2],
    [FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
    [-FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
];

/// Perlin-style gradient noise over an integer lattice.
///
/// Each lattice corner gets one of eight unit gradients picked by an
/// xxHash-style integer mix of its coordinates and the seed. The raw value
/// lies in `±√2/2` and is mapped to `[0, 1]` by `(n + √2/2) / √2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradientNoise {
    seed: u32,
}

impl GradientNoise {
    /// Create a noise field for a seed.
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    fn hash(&self, x: i32, y: i32) -> u32 {
        let mut h = (x as u32)
            .wrapping_mul(3_266_489_917)
            .wrapping_add((y as u32).wrapping_mul(668_265_263))
            .wrapping_add(self.seed.wrapping_mul(374_761_393));
        h ^= h >> 15;
        h = h.wrapping_mul(2_246_822_519);
        h ^= h >> 13;
        h = h.wrapping_mul(3_266_489_917);
        h ^= h >> 16;
        h
    }

    /// Gradient assigned to lattice corner `(x, y)`.
    pub(crate) fn gradient(&self, x: i32, y: i32) -> [f64; 2] {
        GRADIENTS[(self.hash(x, y) & 7) as usize]
    }

    /// Un-normalized noise in `[-√2/2, √2/2]`.
    pub fn raw(&self, x: f64, y: f64) -> f64 {
        let fx = x.floor();
        let fy = y.floor();
        let cx = fx as i32;
        let cy = fy as i32;
        let dx = x - fx;
        let dy = y - fy;

        let corner = |ox: i32, oy: i32| {
            let [gx, gy] = self.gradient(cx.wrapping_add(ox), cy.wrapping_add(oy));
            gx * (dx - f64::from(ox)) + gy * (dy - f64::from(oy))
        };

        let u = fade(dx);
        let v = fade(dy);
        let top = lerp(corner(0, 0), corner(1, 0), u);
        let bottom = lerp(corner(0, 1), corner(1, 1), u);
        lerp(top, bottom, v)
    }
}

impl HeightSource for GradientNoise {
    fn height(&self, x: f64, z: f64) -> f64 {
        let normalized =
            (self.raw(x, z) + GRADIENT_NOISE_AMPLITUDE) / (2.0 * GRADIENT_NOISE_AMPLITUDE);
        normalized.clamp(0.0, 1.0)
    }
}

/// `6t^5 - 15t^4 + 10t^3`
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

/// Octave fractal Perlin noise, for rolling terrain with finer detail.
pub struct FractalNoise {
    fbm: Fbm<Perlin>,
}

impl FractalNoise {
    /// Create a fractal noise source.
    pub fn new(seed: u32, octaves: usize, lacunarity: f64, persistence: f64) -> Self {
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(octaves)
            .set_lacunarity(lacunarity)
            .set_persistence(persistence);
        Self { fbm }
    }
}

impl HeightSource for FractalNoise {
    fn height(&self, x: f64, z: f64) -> f64 {
        // Fbm returns roughly [-1, 1]
        ((self.fbm.get([x, z]) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// The same height everywhere. Used for flat test worlds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantHeight(pub f64);

impl HeightSource for ConstantHeight {
    fn height(&self, _x: f64, _z: f64) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn deterministic_and_bounded() {
        let a = GradientNoise::new(7);
        let b = GradientNoise::new(7);
        for i in -200..200 {
            for j in -200..200 {
                let x = f64::from(i) * 0.37;
                let z = f64::from(j) * 0.53;
                let h = a.height(x, z);
                assert!((0.0..=1.0).contains(&h), "height {h} at ({x}, {z})");
                assert_eq!(h.to_bits(), b.height(x, z).to_bits());
            }
        }
    }

    #[test]
    fn raw_is_zero_on_lattice_points() {
        let noise = GradientNoise::new(3);
        for x in -5..5 {
            for y in -5..5 {
                assert_relative_eq!(noise.raw(f64::from(x), f64::from(y)), 0.0);
                assert_relative_eq!(noise.height(f64::from(x), f64::from(y)), 0.5);
            }
        }
    }

    #[test]
    fn negative_coordinates_use_the_floor_cell() {
        let noise = GradientNoise::new(11);
        let (x, y) = (-0.25, 0.5);
        // floor puts the point in cell (-1, 0) with offset (0.75, 0.5)
        let (dx, dy) = (0.75, 0.5);
        let dot = |cx: i32, cy: i32, ox: f64, oy: f64| {
            let [gx, gy] = noise.gradient(cx, cy);
            gx * ox + gy * oy
        };
        let u = fade(dx);
        let v = fade(dy);
        let top = lerp(dot(-1, 0, dx, dy), dot(0, 0, dx - 1.0, dy), u);
        let bottom = lerp(dot(-1, 1, dx, dy - 1.0), dot(0, 1, dx - 1.0, dy - 1.0), u);
        assert_relative_eq!(noise.raw(x, y), lerp(top, bottom, v), epsilon = 1e-12);
    }

    #[test]
    fn continuous_across_cell_borders() {
        let noise = GradientNoise::new(5);
        for y in [-2.3, -0.7, 0.4, 1.9] {
            let left = noise.raw(-1e-9, y);
            let right = noise.raw(1e-9, y);
            assert!((left - right).abs() < 1e-6);
        }
    }

    #[test]
    fn fade_endpoints() {
        assert_relative_eq!(fade(0.0), 0.0);
        assert_relative_eq!(fade(0.5), 0.5);
        assert_relative_eq!(fade(1.0), 1.0);
    }

    #[test]
    fn different_seeds_differ() {
        let a = GradientNoise::new(1);
        let b = GradientNoise::new(2);
        let differences = (0..100)
            .filter(|&i| {
                let x = f64::from(i) * 0.31 + 0.5;
                (a.height(x, 0.5) - b.height(x, 0.5)).abs() > 1e-9
            })
            .count();
        assert!(differences > 50, "seeds should produce different fields");
    }

    #[test]
    fn fractal_noise_is_bounded() {
        let noise = FractalNoise::new(42, 4, 2.0, 0.5);
        for i in -50..50 {
            let h = noise.height(f64::from(i) * 0.13, f64::from(i) * -0.29);
            assert!((0.0..=1.0).contains(&h));
        }
    }

    #[test]
    fn constant_height_is_clamped() {
        assert_relative_eq!(ConstantHeight(0.5).height(3.0, -8.0), 0.5);
        assert_relative_eq!(ConstantHeight(4.0).height(0.0, 0.0), 1.0);
    }
}
