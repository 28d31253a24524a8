// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

/// Alpha written for every pixel: fully opaque, already composited.
pub const OUTPUT_ALPHA: Float = 1.0;

/// How in-scattered light is blended over the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// `background * T + energy * light_color`.
    Additive,
    /// `background * T + energy * light_color * (1 - T)`.
    Coverage,
}

impl CompositeMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "additive" => Some(CompositeMode::Additive),
            "coverage" => Some(CompositeMode::Coverage),
            _ => None,
        }
    }
}

pub fn composite(background: Vector3f,
                 light_energy: Float,
                 transmittance: Float,
                 light_color: Vector3f,
                 mode: CompositeMode) -> Vector3f {
    let cloud = light_color * light_energy;
    match mode {
        CompositeMode::Additive => background * transmittance + cloud,
        CompositeMode::Coverage => background * transmittance + cloud * (1.0 - transmittance),
    }
}
