// Copyright @yucwang 2026

use crate::core::density::DensitySampler;
use crate::core::sensor::Sensor;
use crate::core::settings::{validate_bounds, ConfigError, ScatteringParameters};
use crate::core::volume::DensityField;
use crate::emitters::directional::DirectionalLight;
use crate::math::aabb::AABB;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector3f;
use std::sync::Arc;

/// Color behind the cloud, produced by an earlier pass.
#[derive(Debug, Clone)]
pub enum Background {
    Constant(Vector3f),
    Image(Bitmap),
}

impl Background {
    pub fn at(&self, x: usize, y: usize) -> Vector3f {
        match self {
            Background::Constant(color) => *color,
            Background::Image(bitmap) => bitmap[(x, y)],
        }
    }
}

/// Everything a frame reads while rendering. Nothing in here is written
/// during a render pass.
pub struct Scene {
    camera: Box<dyn Sensor>,
    light: DirectionalLight,
    bounds: AABB,
    params: ScatteringParameters,
    field: Arc<dyn DensityField>,
    background: Background,
}

impl Scene {
    pub fn new(camera: Box<dyn Sensor>,
               light: DirectionalLight,
               bounds: AABB,
               params: ScatteringParameters,
               field: Arc<dyn DensityField>,
               background: Background) -> Self {
        Self { camera, light, bounds, params, field, background }
    }

    pub fn camera(&self) -> &dyn Sensor {
        self.camera.as_ref()
    }

    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn params(&self) -> &ScatteringParameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ScatteringParameters {
        &mut self.params
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn density_sampler(&self) -> DensitySampler<'_> {
        DensitySampler::new(self.field.as_ref(), self.bounds, self.params.density_multiplier)
    }

    /// Frame-level checks. Once this passes, shading a pixel cannot fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        validate_bounds(&self.bounds)?;

        let (width, height) = (self.camera.width(), self.camera.height());
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if let Background::Image(bitmap) = &self.background {
            let found = (bitmap.width(), bitmap.height());
            if found != (width, height) {
                return Err(ConfigError::BackgroundSize { expected: (width, height), found });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::volumes::const_volume::ConstantVolume;

    fn scene_with(background: Background, bounds: AABB) -> Scene {
        let camera = PerspectiveCamera::new(
            Vector3f::new(0.0, 0.0, -5.0),
            Vector3f::zeros(),
            Vector3f::new(0.0, 1.0, 0.0),
            0.8,
            4,
            3,
        );
        Scene::new(
            Box::new(camera),
            DirectionalLight::default(),
            bounds,
            ScatteringParameters::default(),
            Arc::new(ConstantVolume::new(1.0)),
            background,
        )
    }

    #[test]
    fn valid_scene_passes() {
        let scene = scene_with(Background::Image(Bitmap::new(4, 3)), AABB::default());
        assert_eq!(scene.validate(), Ok(()));
    }

    #[test]
    fn mismatched_background_is_rejected() {
        let scene = scene_with(Background::Image(Bitmap::new(3, 3)), AABB::default());
        assert_eq!(
            scene.validate(),
            Err(ConfigError::BackgroundSize { expected: (4, 3), found: (3, 3) })
        );
    }

    #[test]
    fn zero_extent_bounds_are_rejected() {
        let bounds = AABB::new(Vector3f::new(0.0, -1.0, -1.0), Vector3f::new(0.0, 1.0, 1.0));
        let scene = scene_with(Background::Constant(Vector3f::zeros()), bounds);
        assert_eq!(scene.validate(), Err(ConfigError::DegenerateBounds));
    }

    #[test]
    fn invalid_parameters_surface_before_rendering() {
        let mut scene = scene_with(Background::Constant(Vector3f::zeros()), AABB::default());
        scene.params_mut().step_count = 0;
        assert_eq!(scene.validate(), Err(ConfigError::InvalidStepCount));
    }
}
