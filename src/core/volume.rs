// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

/// Scalar density over the unit cube `[0,1]^3`.
pub trait DensityField: Send + Sync {
    /// Interpolated value at a normalized coordinate. Callers only pass
    /// coordinates inside the unit cube.
    fn sample(&self, uvw: Vector3f) -> Float;

    /// Voxel resolution, `(1, 1, 1)` for analytic fields.
    fn resolution(&self) -> (usize, usize, usize) {
        (1, 1, 1)
    }
}
