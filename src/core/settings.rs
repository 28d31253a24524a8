// Copyright @yucwang 2026

use crate::integrators::composite::CompositeMode;
use crate::integrators::phase::PhaseFunction;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use std::fmt;

/// Problems found while validating a frame's configuration. Checked once per
/// frame, never per pixel.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidStepCount,
    InvalidLightStepCount,
    DegenerateBounds,
    InvalidDarkness(Float),
    InvalidAsymmetry(Float),
    InvalidBlend(Float),
    NonFiniteParameter(&'static str),
    NegativeParameter(&'static str),
    InvalidLightDirection,
    ZeroResolution,
    BackgroundSize { expected: (usize, usize), found: (usize, usize) },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidStepCount => write!(f, "primary step count must be positive"),
            ConfigError::InvalidLightStepCount => write!(f, "light step count must be positive"),
            ConfigError::DegenerateBounds => write!(f, "bounding volume has zero extent on some axis"),
            ConfigError::InvalidDarkness(v) => write!(f, "darkness threshold {} is outside [0, 1]", v),
            ConfigError::InvalidAsymmetry(g) => write!(f, "phase asymmetry {} is outside (-1, 1)", g),
            ConfigError::InvalidBlend(b) => write!(f, "phase lobe blend {} is outside [0, 1]", b),
            ConfigError::NonFiniteParameter(name) => write!(f, "parameter {} is not finite", name),
            ConfigError::NegativeParameter(name) => write!(f, "parameter {} must not be negative", name),
            ConfigError::InvalidLightDirection => write!(f, "light direction must be a non-zero finite vector"),
            ConfigError::ZeroResolution => write!(f, "image resolution must be non-zero"),
            ConfigError::BackgroundSize { expected, found } => write!(
                f,
                "background is {}x{} but the camera renders {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunable scattering parameters, constant for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringParameters {
    pub step_count: u32,
    pub light_step_count: u32,
    /// In-scattering per unit density. Scales the light gathered toward the
    /// eye but not the extinction.
    pub scattering: Float,
    /// Extinction per unit density along the view ray.
    pub absorption: Float,
    /// Extinction per unit density along the shadow ray.
    pub light_absorption: Float,
    /// Lower bound of the shadow term.
    pub darkness_threshold: Float,
    /// World-space length of the per-pixel start offset.
    pub ray_offset_strength: Float,
    pub phase: PhaseFunction,
    pub base_brightness: Float,
    pub phase_factor: Float,
    pub density_multiplier: Float,
    pub composite: CompositeMode,
}

impl Default for ScatteringParameters {
    fn default() -> Self {
        Self {
            step_count: 250,
            light_step_count: 20,
            scattering: 1.0,
            absorption: 0.85,
            light_absorption: 1.21,
            darkness_threshold: 0.16,
            ray_offset_strength: 0.015,
            phase: PhaseFunction::DualLobe { g_forward: 0.83, g_back: 0.3, blend: 0.5 },
            base_brightness: 0.05,
            phase_factor: 0.55,
            density_multiplier: 1.0,
            composite: CompositeMode::Additive,
        }
    }
}

impl ScatteringParameters {
    /// Phase weight applied to every in-scattering event of a pixel.
    pub fn phase_value(&self, cos_theta: Float) -> Float {
        self.base_brightness + self.phase_factor * self.phase.eval(cos_theta)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_count == 0 {
            return Err(ConfigError::InvalidStepCount);
        }
        if self.light_step_count == 0 {
            return Err(ConfigError::InvalidLightStepCount);
        }

        let scalars = [
            ("scattering", self.scattering),
            ("absorption", self.absorption),
            ("light_absorption", self.light_absorption),
            ("ray_offset_strength", self.ray_offset_strength),
            ("base_brightness", self.base_brightness),
            ("phase_factor", self.phase_factor),
            ("density_multiplier", self.density_multiplier),
        ];
        for (name, value) in scalars.iter() {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteParameter(*name));
            }
            if *value < 0.0 {
                return Err(ConfigError::NegativeParameter(*name));
            }
        }

        if !(0.0..=1.0).contains(&self.darkness_threshold) {
            return Err(ConfigError::InvalidDarkness(self.darkness_threshold));
        }

        self.phase.validate()
    }
}

pub fn validate_bounds(bounds: &AABB) -> Result<(), ConfigError> {
    let finite = (0..3).all(|idx| bounds.p_min[idx].is_finite() && bounds.p_max[idx].is_finite());
    if !finite {
        return Err(ConfigError::NonFiniteParameter("bounds"));
    }
    if !bounds.is_valid() || bounds.has_zero_extent() {
        return Err(ConfigError::DegenerateBounds);
    }
    Ok(())
}
