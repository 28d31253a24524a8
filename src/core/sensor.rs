// Copyright @yucwang 2026

use crate::math::constants::Vector2f;
use crate::math::ray::Ray3f;

pub trait Sensor: Send + Sync {
    /// World-space ray through the film position `u` in `[0,1]^2`, with
    /// `(0, 0)` at the top-left corner.
    fn sample_ray(&self, u: &Vector2f) -> Ray3f;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn describe(&self) -> String {
        String::from("Sensor")
    }

    /// Ray through the center of pixel `(x, y)`.
    fn pixel_ray(&self, x: usize, y: usize) -> Ray3f {
        let u = Vector2f::new(
            (x as f32 + 0.5) / self.width().max(1) as f32,
            (y as f32 + 0.5) / self.height().max(1) as f32,
        );
        self.sample_ray(&u)
    }
}
