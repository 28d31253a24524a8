// Copyright @yucwang 2026

use crate::core::settings::ConfigError;
use crate::math::constants::Vector3f;

/// Distant light, seen from every point of the volume along the same
/// direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    to_light: Vector3f,
    color: Vector3f,
}

impl DirectionalLight {
    /// `to_light` points from the scene toward the light and is normalized
    /// here.
    pub fn new(to_light: Vector3f, color: Vector3f) -> Result<Self, ConfigError> {
        let len = to_light.norm();
        if !(len > 0.0) || !len.is_finite() {
            return Err(ConfigError::InvalidLightDirection);
        }
        if !color.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::NonFiniteParameter("light color"));
        }
        Ok(Self { to_light: to_light / len, color })
    }

    /// Builds the light from its propagation direction, the way scene files
    /// describe directional emitters.
    pub fn from_propagation(direction: Vector3f, color: Vector3f) -> Result<Self, ConfigError> {
        Self::new(-direction, color)
    }

    pub fn to_light(&self) -> Vector3f {
        self.to_light
    }

    pub fn color(&self) -> Vector3f {
        self.color
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            to_light: Vector3f::new(0.0, 1.0, 0.0),
            color: Vector3f::new(1.0, 1.0, 1.0),
        }
    }
}
