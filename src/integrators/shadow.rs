// Copyright @yucwang 2026

use crate::core::density::DensitySampler;
use crate::core::settings::ScatteringParameters;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

/// Beer-Lambert transmittance for an optical depth.
pub fn beers(optical_depth: Float) -> Float {
    (-optical_depth).exp()
}

/// Light reaching `p` from the directional light, as a fraction in
/// `[darkness_threshold, 1]`.
///
/// Walks the whole segment from `p` to the box boundary in
/// `light_step_count` equal steps, sampling each at its midpoint. Shadow
/// rays never terminate early.
pub fn light_march(sampler: &DensitySampler<'_>,
                   params: &ScatteringParameters,
                   p: Vector3f,
                   to_light: Vector3f) -> Float {
    let ray = Ray3f::new(p, to_light);
    let hit = sampler.bounds().ray_distances(&ray);
    let step_count = params.light_step_count.max(1);
    let step_size = hit.distance_inside_volume / step_count as Float;

    let mut total_density = 0.0;
    if step_size > 0.0 {
        let start = ray.at(hit.distance_to_volume);
        for i in 0..step_count {
            let sample = start + ray.dir() * (step_size * (i as Float + 0.5));
            total_density += sampler.density(sample) * step_size;
        }
    }

    let transmittance = beers(total_density * params.light_absorption);
    params.darkness_threshold + transmittance * (1.0 - params.darkness_threshold)
}
