//! Seeded coherent-noise generator over 1, 2 or 3 dimensions
//!
//! Each logical field (elevation, elevation distortion, moisture, weather)
//! owns one `NoiseChannel` with its own permutation and gradient tables,
//! derived once from an integer seed. Sampling is a pure function after
//! construction.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// =============================================================================
// TABLE CONSTANTS
// =============================================================================

/// Lattice period (number of distinct gradients per channel)
const B: usize = 0x100;
/// Mask for wrapping lattice coordinates
const BM: usize = 0xff;
/// Offset added to sample coordinates so lattice decomposition stays positive
const N: f64 = 0x1000 as f64;

/// Table length: the first `B + 2` entries are duplicated past `B` so that
/// index chains like `perm[perm[bx] + by]` never wrap mid-lookup.
const TABLE: usize = B + B + 2;

/// Cubic smoothstep used for all lattice interpolation.
#[inline]
fn s_curve(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Decompose one coordinate into lattice cell indices and fractional offsets.
/// Truncation and masking go through i64 so coordinates past the positive
/// offset still wrap onto the lattice instead of saturating.
#[inline]
fn setup(v: f64) -> (usize, usize, f64, f64) {
    let t = v + N;
    let it = t as i64;
    let b0 = (it & BM as i64) as usize;
    let b1 = (b0 + 1) & BM;
    let r0 = t - it as f64;
    let r1 = r0 - 1.0;
    (b0, b1, r0, r1)
}

fn normalize2(v: [f64; 2]) -> [f64; 2] {
    let s = (v[0] * v[0] + v[1] * v[1]).sqrt();
    [v[0] / s, v[1] / s]
}

fn normalize3(v: [f64; 3]) -> [f64; 3] {
    let s = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / s, v[1] / s, v[2] / s]
}

// =============================================================================
// CHANNEL
// =============================================================================

/// One seeded noise channel: a permutation table plus 1D/2D/3D gradient
/// tables. Immutable after construction.
pub struct NoiseChannel {
    seed: u64,
    perm: Box<[usize; TABLE]>,
    g1: Box<[f64; TABLE]>,
    g2: Box<[[f64; 2]; TABLE]>,
    g3: Box<[[f64; 3]; TABLE]>,
}

impl NoiseChannel {
    /// Build a channel's tables from a seed. The same seed always produces
    /// the same tables, and therefore bit-identical noise.
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut perm = Box::new([0usize; TABLE]);
        let mut g1 = Box::new([0.0f64; TABLE]);
        let mut g2 = Box::new([[0.0f64; 2]; TABLE]);
        let mut g3 = Box::new([[0.0f64; 3]; TABLE]);

        // Random gradient components in [-1, 1), identity permutation.
        let comp = |rng: &mut ChaCha8Rng| -> f64 {
            (rng.gen_range(0..2 * B as i64) - B as i64) as f64 / B as f64
        };

        for i in 0..B {
            perm[i] = i;
            g1[i] = comp(&mut rng);
            g2[i] = normalize2([comp(&mut rng), comp(&mut rng)]);
            g3[i] = normalize3([comp(&mut rng), comp(&mut rng), comp(&mut rng)]);
        }

        // Downward swap shuffle of the permutation table.
        for i in (1..B).rev() {
            let j = rng.gen_range(0..B);
            perm.swap(i, j);
        }

        // Duplicate the head of every table past B so index chains can
        // run off the end without wrapping.
        for i in 0..B + 2 {
            perm[B + i] = perm[i];
            g1[B + i] = g1[i];
            g2[B + i] = g2[i];
            g3[B + i] = g3[i];
        }

        Self { seed, perm, g1, g2, g3 }
    }

    /// Seed this channel's tables were derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 1D gradient noise in roughly [-1, 1].
    pub fn noise1(&self, x: f64) -> f64 {
        let (bx0, bx1, rx0, rx1) = setup(x);

        let sx = s_curve(rx0);
        let u = rx0 * self.g1[self.perm[bx0]];
        let v = rx1 * self.g1[self.perm[bx1]];

        lerp(sx, u, v)
    }

    /// 2D gradient noise in roughly [-1, 1].
    pub fn noise2(&self, x: f64, y: f64) -> f64 {
        let (bx0, bx1, rx0, rx1) = setup(x);
        let (by0, by1, ry0, ry1) = setup(y);

        let i = self.perm[bx0];
        let j = self.perm[bx1];

        let b00 = self.perm[i + by0];
        let b10 = self.perm[j + by0];
        let b01 = self.perm[i + by1];
        let b11 = self.perm[j + by1];

        let sx = s_curve(rx0);
        let sy = s_curve(ry0);

        let at2 = |q: [f64; 2], rx: f64, ry: f64| rx * q[0] + ry * q[1];

        let u = at2(self.g2[b00], rx0, ry0);
        let v = at2(self.g2[b10], rx1, ry0);
        let a = lerp(sx, u, v);

        let u = at2(self.g2[b01], rx0, ry1);
        let v = at2(self.g2[b11], rx1, ry1);
        let b = lerp(sx, u, v);

        lerp(sy, a, b)
    }

    /// 3D gradient noise in roughly [-1, 1].
    pub fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        let (bx0, bx1, rx0, rx1) = setup(x);
        let (by0, by1, ry0, ry1) = setup(y);
        let (bz0, bz1, rz0, rz1) = setup(z);

        let i = self.perm[bx0];
        let j = self.perm[bx1];

        let b00 = self.perm[i + by0];
        let b10 = self.perm[j + by0];
        let b01 = self.perm[i + by1];
        let b11 = self.perm[j + by1];

        let t = s_curve(rx0);
        let sy = s_curve(ry0);
        let sz = s_curve(rz0);

        let at3 = |q: [f64; 3], rx: f64, ry: f64, rz: f64| rx * q[0] + ry * q[1] + rz * q[2];

        let u = at3(self.g3[b00 + bz0], rx0, ry0, rz0);
        let v = at3(self.g3[b10 + bz0], rx1, ry0, rz0);
        let a = lerp(t, u, v);

        let u = at3(self.g3[b01 + bz0], rx0, ry1, rz0);
        let v = at3(self.g3[b11 + bz0], rx1, ry1, rz0);
        let b = lerp(t, u, v);

        let c = lerp(sy, a, b);

        let u = at3(self.g3[b00 + bz1], rx0, ry0, rz1);
        let v = at3(self.g3[b10 + bz1], rx1, ry0, rz1);
        let a = lerp(t, u, v);

        let u = at3(self.g3[b01 + bz1], rx0, ry1, rz1);
        let v = at3(self.g3[b11 + bz1], rx1, ry1, rz1);
        let b = lerp(t, u, v);

        let d = lerp(sy, a, b);

        lerp(sz, c, d)
    }

    // =========================================================================
    // HARMONIC SUMS
    // =========================================================================

    /// 1D fractal sum: octave `i` samples at frequency `lacunarity^i` and is
    /// divided by `persistence^i`.
    pub fn fractal1(&self, x: f64, persistence: f64, lacunarity: f64, octaves: u32) -> f64 {
        let mut p = x;
        let mut scale = 1.0;
        let mut sum = 0.0;
        for _ in 0..octaves {
            sum += self.noise1(p) / scale;
            scale *= persistence;
            p *= lacunarity;
        }
        sum
    }

    /// 2D fractal sum.
    pub fn fractal2(&self, x: f64, y: f64, persistence: f64, lacunarity: f64, octaves: u32) -> f64 {
        let mut px = x;
        let mut py = y;
        let mut scale = 1.0;
        let mut sum = 0.0;
        for _ in 0..octaves {
            sum += self.noise2(px, py) / scale;
            scale *= persistence;
            px *= lacunarity;
            py *= lacunarity;
        }
        sum
    }

    /// 3D fractal sum.
    pub fn fractal3(
        &self,
        x: f64,
        y: f64,
        z: f64,
        persistence: f64,
        lacunarity: f64,
        octaves: u32,
    ) -> f64 {
        let mut px = x;
        let mut py = y;
        let mut pz = z;
        let mut scale = 1.0;
        let mut sum = 0.0;
        for _ in 0..octaves {
            sum += self.noise3(px, py, pz) / scale;
            scale *= persistence;
            px *= lacunarity;
            py *= lacunarity;
            pz *= lacunarity;
        }
        sum
    }

    /// Musgrave's ridged multifractal. The first octave is `(offset - |n|)²`;
    /// each later octave is weighted by the previous signal scaled by `gain`
    /// and clamped to [0, 1], then summed with spectral weight
    /// `frequency^-h`. Good starting parameters: h = 1, offset = 1, gain = 2.
    pub fn ridged_multifractal2(
        &self,
        x: f64,
        y: f64,
        h: f64,
        lacunarity: f64,
        octaves: u32,
        offset: f64,
        gain: f64,
    ) -> f64 {
        // Per-octave spectral weights.
        let mut exponents = Vec::with_capacity(octaves as usize + 1);
        let mut frequency = 1.0f64;
        for _ in 0..=octaves {
            exponents.push(frequency.powf(-h));
            frequency *= lacunarity;
        }

        let mut px = x;
        let mut py = y;

        let mut signal = offset - self.noise2(px, py).abs();
        signal *= signal;
        let mut result = signal;

        for exponent in exponents.iter().take(octaves as usize).skip(1) {
            px *= lacunarity;
            py *= lacunarity;

            let weight = (signal * gain).clamp(0.0, 1.0);
            signal = offset - self.noise2(px, py).abs();
            signal *= signal;
            signal *= weight;
            result += signal * exponent;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_noise() {
        let a = NoiseChannel::new(27023);
        let b = NoiseChannel::new(27023);

        for i in 0..200 {
            let x = i as f64 * 0.173 - 17.0;
            let y = i as f64 * 0.091 + 3.0;
            assert_eq!(a.noise2(x, y), b.noise2(x, y));
            assert_eq!(a.noise1(x), b.noise1(x));
            assert_eq!(a.noise3(x, y, 0.5), b.noise3(x, y, 0.5));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseChannel::new(1);
        let b = NoiseChannel::new(2);

        // Different tables should disagree somewhere in a short sweep.
        let differs = (0..100).any(|i| {
            let x = i as f64 * 0.31;
            a.noise2(x, 0.7) != b.noise2(x, 0.7)
        });
        assert!(differs);
    }

    #[test]
    fn test_table_duplication() {
        let c = NoiseChannel::new(42);
        for i in 0..B + 2 {
            assert_eq!(c.perm[B + i], c.perm[i]);
            assert_eq!(c.g1[B + i], c.g1[i]);
            assert_eq!(c.g2[B + i], c.g2[i]);
        }
    }

    #[test]
    fn test_gradients_normalized() {
        let c = NoiseChannel::new(7);
        for i in 0..B {
            let [gx, gy] = c.g2[i];
            let len = (gx * gx + gy * gy).sqrt();
            assert!((len - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fractal_sum_determinism() {
        let a = NoiseChannel::new(3);
        let b = NoiseChannel::new(3);
        assert_eq!(
            a.fractal2(0.4, -0.9, 2.0, 2.0, 16),
            b.fractal2(0.4, -0.9, 2.0, 2.0, 16)
        );
    }

    #[test]
    fn test_ridged_multifractal_is_finite() {
        let c = NoiseChannel::new(9);
        for i in 0..50 {
            let x = i as f64 * 0.17;
            let v = c.ridged_multifractal2(x, 1.3, 1.0, 2.0, 8, 1.0, 2.0);
            assert!(v.is_finite());
            // First octave is a square, later octaves are non-negative.
            assert!(v >= 0.0);
        }
    }
}
