//! Perlin Noise Generation
//!
//! [`NoiseGenerator`] owns a seeded permutation table of the values `0..=255`
//! duplicated to 512 entries, so neighbouring lattice lookups never wrap.
//! Coordinates are pixel positions; the lattice spacing is derived from the
//! target extent and the requested frequency.

use crate::error::{Error, Result};
use crate::util::Rng;

/// Frequencies summed by the fractal variant
pub const FRACTAL_FREQUENCIES: [usize; 6] = [4, 8, 16, 32, 64, 128];

/// Quintic fade curve (Ken Perlin's improved version): 6t⁵ - 15t⁴ + 10t³
#[inline]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Dot product with one of eight fixed gradient directions, chosen by `hash & 7`
#[inline]
pub fn grad(hash: u8, x: f32, y: f32) -> f32 {
    match hash & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Lattice spacing in pixels: `max(width, height) / freq`.
///
/// Fails when the spacing would be zero (`freq == 0` or `freq` larger than
/// the extent).
pub fn grid_size(width: usize, height: usize, freq: usize) -> Result<usize> {
    let extent = width.max(height);
    if freq == 0 || freq > extent {
        return Err(Error::FrequencyOutOfRange { freq, extent });
    }
    Ok(extent / freq)
}

/// Stateful Perlin noise provider
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    seed: u64,
    perm: [u8; 512],
    rng: Rng,
}

impl NoiseGenerator {
    /// Build the permutation table from `seed`
    pub fn new(seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        rng.shuffle(&mut table);

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);

        log::debug!("noise generator seeded with {}", seed);
        Self { seed, perm, rng }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn permutation(&self) -> &[u8; 512] {
        &self.perm
    }

    /// Next uniform value in `[0, 255]`
    #[inline]
    pub fn next_value(&mut self) -> u8 {
        self.rng.next_u8()
    }

    /// Perlin noise at pixel `(x, y)` with lattice spacing `grid` pixels.
    /// Returns a value in [0, 1].
    pub fn perlin_at_grid(&self, x: usize, y: usize, grid: usize) -> f32 {
        let p = &self.perm;

        let cell_x = x / grid;
        let cell_y = y / grid;
        let x1 = cell_x & 255;
        let y1 = cell_y & 255;
        let x2 = x1 + 1;
        let y2 = y1 + 1;

        // Offsets inside the cell, always in [0, 1)
        let xf = (x - cell_x * grid) as f32 / grid as f32;
        let yf = (y - cell_y * grid) as f32 / grid as f32;

        let u = fade(xf);
        let v = fade(yf);

        let dot_a = grad(p[x1 + p[y1] as usize], xf, yf);
        let dot_b = grad(p[x1 + p[y2] as usize], xf, yf - 1.0);
        let dot_c = grad(p[x2 + p[y1] as usize], xf - 1.0, yf);
        let dot_d = grad(p[x2 + p[y2] as usize], xf - 1.0, yf - 1.0);

        let left = lerp(dot_a, dot_b, v);
        let right = lerp(dot_c, dot_d, v);
        let n = lerp(left, right, u);

        ((n + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Perlin noise at pixel `(x, y)` of a `width x height` target
    pub fn perlin_noise(
        &self,
        x: usize,
        y: usize,
        freq: usize,
        width: usize,
        height: usize,
    ) -> Result<f32> {
        let grid = grid_size(width, height, freq)?;
        Ok(self.perlin_at_grid(x, y, grid))
    }

    /// Sum of `perlin / freq * 2` over [`FRACTAL_FREQUENCIES`]. The result
    /// is not clamped; it stays below 1.0 because the weights sum to 63/64.
    pub fn fractal_noise(&self, x: usize, y: usize, width: usize, height: usize) -> Result<f32> {
        let mut sum = 0.0;
        for freq in FRACTAL_FREQUENCIES {
            sum += self.perlin_noise(x, y, freq, width, height)? / freq as f32 * 2.0;
        }
        Ok(sum)
    }
}
