// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{Matrix4f, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// Camera described by a combined view-projection matrix and the camera's
/// world position, as handed over by a host renderer.
pub struct ViewProjectionCamera {
    world_to_clip: Transform,
    position: Vector3f,
    width: usize,
    height: usize,
}

impl ViewProjectionCamera {
    /// Returns `None` if `view_proj` cannot be inverted.
    pub fn new(view_proj: Matrix4f, position: Vector3f, width: usize, height: usize) -> Option<Self> {
        let world_to_clip = Transform::new(view_proj)?;
        Some(Self {
            world_to_clip,
            position,
            width,
            height,
        })
    }
}

impl Sensor for ViewProjectionCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let ndc = Vector3f::new(2.0 * u.x - 1.0, 1.0 - 2.0 * u.y, 1.0);
        let far = self.world_to_clip.inv_apply_point(ndc);
        Ray3f::new(self.position, far - self.position)
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn describe(&self) -> String {
        format!("ViewProjectionCamera {}x{}", self.width, self.height)
    }
}
