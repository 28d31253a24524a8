// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};
use super::ray::Ray3f;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

/// Where a ray enters a box and how far it travels inside it.
///
/// Both distances are zero when the forward ray misses the box.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct VolumeIntersection {
    pub distance_to_volume: Float,
    pub distance_inside_volume: Float,
}

impl VolumeIntersection {
    pub fn is_hit(&self) -> bool {
        self.distance_inside_volume > 0.0
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::new(-1.0, -1.0, -1.0),
               p_max: Vector3f::new(1.0, 1.0, 1.0) }
    }
}

impl AABB {
    pub fn new(p_min: Vector3f, p_max: Vector3f) -> Self {
        let mut min = Vector3f::new(0.0, 0.0, 0.0);
        let mut max = Vector3f::new(0.0, 0.0, 0.0);
        for idx in 0..3 {
            min[idx] = p_min[idx].min(p_max[idx]);
            max[idx] = p_max[idx].max(p_min[idx]);
        }
        Self { p_min: min, p_max: max }
    }

    pub fn center(&self) -> Vector3f {
        0.5f32 * self.p_min + 0.5f32 * self.p_max
    }

    pub fn diagnal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn is_valid(&self) -> bool {
        (0..3).all(|idx| self.p_min[idx] <= self.p_max[idx])
    }

    pub fn has_zero_extent(&self) -> bool {
        let d = self.diagnal();
        (0..3).any(|idx| !(d[idx] > 0.0))
    }

    /// Affine remap of a world position into the box's unit cube. Positions
    /// outside the box land outside `[0,1]^3`.
    pub fn to_unit(&self, p: &Vector3f) -> Vector3f {
        (p - self.p_min).component_div(&self.diagnal())
    }

    /// Slab test against the forward half of `ray`.
    ///
    /// A zero direction component yields infinite slab bounds through the
    /// reciprocal, which leaves that axis unconstrained. The one NaN case,
    /// an origin lying exactly on a slab plane of such an axis, is read as
    /// unconstrained too.
    pub fn ray_distances(&self, ray: &Ray3f) -> VolumeIntersection {
        let o = ray.origin();
        let inv_dir = ray.dir().map(|c| 1.0 / c);

        let mut dst_a = Float::NEG_INFINITY;
        let mut dst_b = Float::INFINITY;
        for idx in 0..3 {
            let t0 = (self.p_min[idx] - o[idx]) * inv_dir[idx];
            let t1 = (self.p_max[idx] - o[idx]) * inv_dir[idx];
            if t0.is_nan() || t1.is_nan() {
                continue;
            }
            dst_a = dst_a.max(t0.min(t1));
            dst_b = dst_b.min(t0.max(t1));
        }

        let distance_to_volume = dst_a.max(0.0);
        let distance_inside_volume = dst_b - distance_to_volume;
        if !(distance_inside_volume > 0.0) || !distance_inside_volume.is_finite() {
            return VolumeIntersection::default();
        }

        VolumeIntersection { distance_to_volume, distance_inside_volume }
    }
}

/* Test for AABB */
