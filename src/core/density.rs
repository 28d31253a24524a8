// Copyright @yucwang 2026

use crate::core::volume::DensityField;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};

/// World-space view of a density field stretched over a bounding box.
pub struct DensitySampler<'a> {
    field: &'a dyn DensityField,
    bounds: AABB,
    multiplier: Float,
}

impl<'a> DensitySampler<'a> {
    pub fn new(field: &'a dyn DensityField, bounds: AABB, multiplier: Float) -> Self {
        Self { field, bounds, multiplier }
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Non-negative density at `p_world`; exactly zero outside the box.
    pub fn density(&self, p_world: Vector3f) -> Float {
        let uvw = self.bounds.to_unit(&p_world);
        let inside = (0..3).all(|idx| uvw[idx] >= 0.0 && uvw[idx] <= 1.0);
        if !inside {
            return 0.0;
        }
        (self.field.sample(uvw) * self.multiplier).max(0.0)
    }
}
