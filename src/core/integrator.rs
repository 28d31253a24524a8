// Copyright @yucwang 2026

use crate::core::scene::Scene;
use crate::math::constants::Vector3f;

pub trait Integrator: Sync {
    /// Final composited color of pixel `(x, y)`. Expects a validated scene.
    fn shade_pixel(&self, scene: &Scene, x: usize, y: usize) -> Vector3f;
    fn name(&self) -> &'static str;
}
