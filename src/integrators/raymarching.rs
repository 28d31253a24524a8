// Copyright @yucwang 2026

use crate::core::density::DensitySampler;
use crate::core::hash::pixel_hash;
use crate::core::integrator::Integrator;
use crate::core::scene::Scene;
use crate::core::settings::ScatteringParameters;
use crate::emitters::directional::DirectionalLight;
use crate::integrators::composite::composite;
use crate::integrators::shadow::{beers, light_march};
use crate::math::aabb::VolumeIntersection;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

/// Transmittance below which the rest of the view ray is skipped.
pub const MIN_TRANSMITTANCE: Float = 0.01;

/// Per-pixel state of the view-ray march.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchState {
    pub distance_travelled: Float,
    pub light_energy: Float,
    pub transmittance: Float,
}

impl MarchState {
    pub fn new(start_offset: Float) -> Self {
        Self {
            distance_travelled: start_offset,
            light_energy: 0.0,
            transmittance: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    pub light_energy: Float,
    pub transmittance: Float,
    /// Executed iterations, never more than the configured step count.
    pub steps: u32,
}

impl MarchResult {
    pub fn empty() -> Self {
        Self { light_energy: 0.0, transmittance: 1.0, steps: 0 }
    }
}

/// Integrates in-scattered light along `ray` through the box segment `hit`.
///
/// `start_offset` shifts the first sample into the segment; `phase_value`
/// is the phase weight for this ray, shared by all of its steps.
pub fn march(sampler: &DensitySampler<'_>,
             params: &ScatteringParameters,
             light: &DirectionalLight,
             ray: &Ray3f,
             hit: &VolumeIntersection,
             start_offset: Float,
             phase_value: Float) -> MarchResult {
    march_with(sampler, params, light, ray, hit, start_offset, phase_value, |_| {})
}

/// Same as [`march`], calling `observer` after every step.
pub fn march_with<F>(sampler: &DensitySampler<'_>,
                     params: &ScatteringParameters,
                     light: &DirectionalLight,
                     ray: &Ray3f,
                     hit: &VolumeIntersection,
                     start_offset: Float,
                     phase_value: Float,
                     mut observer: F) -> MarchResult
where
    F: FnMut(&MarchState),
{
    if !hit.is_hit() || params.step_count == 0 {
        return MarchResult::empty();
    }

    let step_size = hit.distance_inside_volume / params.step_count as Float;
    let entry = ray.at(hit.distance_to_volume);
    let mut state = MarchState::new(start_offset.max(0.0));
    let mut steps = 0u32;

    while steps < params.step_count
        && state.distance_travelled < hit.distance_inside_volume
        && state.transmittance >= MIN_TRANSMITTANCE
    {
        let p = entry + ray.dir() * state.distance_travelled;
        let density = sampler.density(p);

        if density > 0.0 {
            let shadow = light_march(sampler, params, p, light.to_light());
            state.light_energy += params.scattering * density * step_size * state.transmittance * shadow * phase_value;
            state.transmittance *= beers(density * step_size * params.absorption);
        }

        state.distance_travelled += step_size;
        steps += 1;
        observer(&state);
    }

    MarchResult {
        light_energy: state.light_energy,
        transmittance: state.transmittance,
        steps,
    }
}

/// Everything computed for one pixel, kept for inspection tools.
#[derive(Debug, Clone, Copy)]
pub struct PixelTrace {
    pub ray: Ray3f,
    pub hit: VolumeIntersection,
    pub background: Vector3f,
    pub phase_value: Float,
    pub start_offset: Float,
    pub result: MarchResult,
    pub color: Vector3f,
}

/// Single-scattering cloud renderer over a background pass.
pub struct RaymarchingIntegrator;

impl RaymarchingIntegrator {
    pub fn new() -> Self {
        Self
    }

    pub fn trace(&self, scene: &Scene, x: usize, y: usize) -> PixelTrace {
        let ray = scene.camera().pixel_ray(x, y);
        let background = scene.background().at(x, y);
        let hit = scene.bounds().ray_distances(&ray);

        if !hit.is_hit() {
            return PixelTrace {
                ray,
                hit,
                background,
                phase_value: 0.0,
                start_offset: 0.0,
                result: MarchResult::empty(),
                color: background,
            };
        }

        let params = scene.params();
        let light = scene.light();
        let phase_value = params.phase_value(ray.dir().dot(&light.to_light()));
        let start_offset = pixel_hash(x as u32, y as u32) * params.ray_offset_strength;

        let sampler = scene.density_sampler();
        let result = march(&sampler, params, light, &ray, &hit, start_offset, phase_value);
        let color = composite(
            background,
            result.light_energy,
            result.transmittance,
            light.color(),
            params.composite,
        );

        PixelTrace { ray, hit, background, phase_value, start_offset, result, color }
    }
}

impl Default for RaymarchingIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Integrator for RaymarchingIntegrator {
    fn shade_pixel(&self, scene: &Scene, x: usize, y: usize) -> Vector3f {
        self.trace(scene, x, y).color
    }

    fn name(&self) -> &'static str {
        "raymarching"
    }
}
