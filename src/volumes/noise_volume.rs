// Copyright @yucwang 2026

//! Procedural cloud density for scenes without authored volume data.

use crate::math::constants::{Float, Vector3f};
use crate::volumes::grid_volume::GridVolume;
use crate::volumes::VolumeError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSettings {
    pub resolution: usize,
    pub seed: u32,
    /// Lattice cells across the unit cube for the lowest octave.
    pub frequency: Float,
    pub octaves: u32,
    /// Noise level below which the field is empty.
    pub threshold: Float,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            resolution: 64,
            seed: 7,
            frequency: 4.0,
            octaves: 4,
            threshold: 0.35,
        }
    }
}

/// Bakes thresholded fBm value noise, faded out toward the cube's surface,
/// into a dense grid.
pub fn bake(settings: &NoiseSettings) -> Result<GridVolume, VolumeError> {
    let res = settings.resolution.max(2);
    let inv = 1.0 / (res as Float - 1.0);
    let center = Vector3f::new(0.5, 0.5, 0.5);
    let span = (1.0 - settings.threshold).max(1e-3);

    let mut data = Vec::with_capacity(res * res * res);
    for z in 0..res {
        for y in 0..res {
            for x in 0..res {
                let p = Vector3f::new(x as Float, y as Float, z as Float) * inv;
                let q = p * settings.frequency;
                let n = fbm(q.x, q.y, q.z, settings.octaves, settings.seed);
                let shaped = ((n - settings.threshold) / span).max(0.0);

                let r = (p - center).norm() * 2.0;
                let falloff = 1.0 - smoothstep(((r - 0.6) / 0.4).clamp(0.0, 1.0));
                data.push(shaped * falloff);
            }
        }
    }

    log::debug!("Baked {}^3 noise grid (seed {}, {} octaves).", res, settings.seed, settings.octaves);
    GridVolume::from_data(res, res, res, data)
}

fn noise_hash(x: i32, y: i32, z: i32, seed: u32) -> Float {
    let mut h = seed.wrapping_add(x as u32).wrapping_mul(374761393);
    h = h.wrapping_add(y as u32).wrapping_mul(668265263);
    h = h.wrapping_add(z as u32).wrapping_mul(2147483647);
    h = (h ^ (h >> 13)).wrapping_mul(1274126177);
    h ^= h >> 16;
    (h & 0x7fff) as Float / 0x7fff as Float
}

fn smoothstep(t: Float) -> Float {
    t * t * (3.0 - 2.0 * t)
}

fn value_noise(x: Float, y: Float, z: Float, seed: u32) -> Float {
    let (ix, iy, iz) = (x.floor() as i32, y.floor() as i32, z.floor() as i32);
    let fx = smoothstep(x - ix as Float);
    let fy = smoothstep(y - iy as Float);
    let fz = smoothstep(z - iz as Float);

    let corner = |dx: i32, dy: i32, dz: i32| noise_hash(ix + dx, iy + dy, iz + dz, seed);
    let x0 = corner(0, 0, 0) + (corner(1, 0, 0) - corner(0, 0, 0)) * fx;
    let x1 = corner(0, 1, 0) + (corner(1, 1, 0) - corner(0, 1, 0)) * fx;
    let x2 = corner(0, 0, 1) + (corner(1, 0, 1) - corner(0, 0, 1)) * fx;
    let x3 = corner(0, 1, 1) + (corner(1, 1, 1) - corner(0, 1, 1)) * fx;

    let y0 = x0 + (x1 - x0) * fy;
    let y1 = x2 + (x3 - x2) * fy;
    y0 + (y1 - y0) * fz
}

// Normalized back into [0, 1].
fn fbm(x: Float, y: Float, z: Float, octaves: u32, seed: u32) -> Float {
    let mut sum = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    let mut norm = 0.0;
    for octave in 0..octaves.max(1) {
        sum += amplitude * value_noise(x * frequency, y * frequency, z * frequency, seed.wrapping_add(octave));
        norm += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    sum / norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::volume::DensityField;

    #[test]
    fn baked_grid_is_non_negative_and_empty_at_corners() {
        let settings = NoiseSettings { resolution: 16, ..NoiseSettings::default() };
        let grid = bake(&settings).unwrap();
        assert_eq!(grid.resolution(), (16, 16, 16));
        assert_eq!(grid.sample(Vector3f::new(0.0, 0.0, 0.0)), 0.0);
        assert_eq!(grid.sample(Vector3f::new(1.0, 1.0, 1.0)), 0.0);
        for i in 0..=10 {
            let t = i as Float / 10.0;
            assert!(grid.sample(Vector3f::new(t, 0.5, 1.0 - t)) >= 0.0);
        }
    }

    #[test]
    fn baking_is_deterministic() {
        let settings = NoiseSettings { resolution: 8, ..NoiseSettings::default() };
        let a = bake(&settings).unwrap();
        let b = bake(&settings).unwrap();
        let p = Vector3f::new(0.4, 0.55, 0.5);
        assert_eq!(a.sample(p), b.sample(p));
    }

    #[test]
    fn value_noise_stays_in_unit_range() {
        for i in 0..50 {
            let t = i as Float * 0.37;
            let v = value_noise(t, t * 0.5, -t, 3);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
