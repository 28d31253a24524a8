// Copyright @yucwang 2026

use crate::core::settings::ConfigError;
use crate::math::constants::{Float, INV_FOUR_PI, PI};

/// Largest asymmetry magnitude fed into a lobe. At |g| = 1 the lobe
/// collapses to a delta and the denominator reaches zero.
pub const MAX_ASYMMETRY: Float = 0.999;

/// Scattering lobe shape, picked once per configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseFunction {
    Isotropic,
    Rayleigh,
    HenyeyGreenstein { g: Float },
    /// Forward lobe `g_forward` blended with a backward lobe `-g_back`.
    DualLobe { g_forward: Float, g_back: Float, blend: Float },
    CornetteShanks { g: Float },
}

impl PhaseFunction {
    /// Phase value for the cosine between the view ray and the direction
    /// toward the light. `cos_theta = 1` is pure forward scattering.
    pub fn eval(&self, cos_theta: Float) -> Float {
        let cos_theta = cos_theta.clamp(-1.0, 1.0);
        match *self {
            PhaseFunction::Isotropic => INV_FOUR_PI,
            PhaseFunction::Rayleigh => rayleigh(cos_theta),
            PhaseFunction::HenyeyGreenstein { g } => henyey_greenstein(cos_theta, g),
            PhaseFunction::DualLobe { g_forward, g_back, blend } => {
                let blend = blend.clamp(0.0, 1.0);
                henyey_greenstein(cos_theta, g_forward) * (1.0 - blend)
                    + henyey_greenstein(cos_theta, -g_back) * blend
            }
            PhaseFunction::CornetteShanks { g } => cornette_shanks(cos_theta, g),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let check_g = |g: Float| {
            if !g.is_finite() {
                Err(ConfigError::NonFiniteParameter("phase asymmetry"))
            } else if g.abs() >= 1.0 {
                Err(ConfigError::InvalidAsymmetry(g))
            } else {
                Ok(())
            }
        };

        match *self {
            PhaseFunction::Isotropic | PhaseFunction::Rayleigh => Ok(()),
            PhaseFunction::HenyeyGreenstein { g } | PhaseFunction::CornetteShanks { g } => check_g(g),
            PhaseFunction::DualLobe { g_forward, g_back, blend } => {
                check_g(g_forward)?;
                check_g(g_back)?;
                if !(0.0..=1.0).contains(&blend) {
                    return Err(ConfigError::InvalidBlend(blend));
                }
                Ok(())
            }
        }
    }

    /// Parses the configuration name of a lobe shape, filling asymmetry
    /// values from `self` where the shapes share them.
    pub fn with_name(&self, name: &str) -> Option<PhaseFunction> {
        let (g, g_back, blend) = self.parameters();
        match name {
            "isotropic" => Some(PhaseFunction::Isotropic),
            "rayleigh" => Some(PhaseFunction::Rayleigh),
            "hg" | "henyey_greenstein" => Some(PhaseFunction::HenyeyGreenstein { g }),
            "dual_lobe" | "dual" => Some(PhaseFunction::DualLobe { g_forward: g, g_back, blend }),
            "cornette_shanks" | "cs" => Some(PhaseFunction::CornetteShanks { g }),
            _ => None,
        }
    }

    /// `(forward asymmetry, backward asymmetry, blend)` carried by this shape.
    pub fn parameters(&self) -> (Float, Float, Float) {
        match *self {
            PhaseFunction::HenyeyGreenstein { g } | PhaseFunction::CornetteShanks { g } => (g, 0.3, 0.5),
            PhaseFunction::DualLobe { g_forward, g_back, blend } => (g_forward, g_back, blend),
            PhaseFunction::Isotropic | PhaseFunction::Rayleigh => (0.83, 0.3, 0.5),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PhaseFunction::Isotropic => "isotropic",
            PhaseFunction::Rayleigh => "rayleigh",
            PhaseFunction::HenyeyGreenstein { .. } => "henyey_greenstein",
            PhaseFunction::DualLobe { .. } => "dual_lobe",
            PhaseFunction::CornetteShanks { .. } => "cornette_shanks",
        }
    }
}

pub fn henyey_greenstein(cos_theta: Float, g: Float) -> Float {
    let g = g.clamp(-MAX_ASYMMETRY, MAX_ASYMMETRY);
    let g2 = g * g;
    let denom = 1.0 + g2 - 2.0 * g * cos_theta;
    INV_FOUR_PI * (1.0 - g2) / (denom * denom.sqrt())
}

pub fn cornette_shanks(cos_theta: Float, g: Float) -> Float {
    let g = g.clamp(-MAX_ASYMMETRY, MAX_ASYMMETRY);
    let g2 = g * g;
    let num = (1.0 - g2) * (1.0 + cos_theta * cos_theta);
    let denom = (2.0 + g2) * (1.0 + g2 - 2.0 * g * cos_theta).powf(1.5);
    3.0 / (8.0 * PI) * num / denom
}

pub fn rayleigh(cos_theta: Float) -> Float {
    3.0 / (16.0 * PI) * (1.0 + cos_theta * cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Midpoint-rule integral of the lobe over the sphere.
    fn sphere_integral(phase: &PhaseFunction) -> Float {
        let n = 4000;
        let mut sum = 0.0f64;
        for i in 0..n {
            let cos_theta = -1.0 + 2.0 * (i as f64 + 0.5) / n as f64;
            sum += phase.eval(cos_theta as Float) as f64 * (2.0 / n as f64);
        }
        (sum * 2.0 * std::f64::consts::PI) as Float
    }

    #[test]
    fn forward_lobe_dominates_for_positive_g() {
        let phase = PhaseFunction::HenyeyGreenstein { g: 0.8 };
        assert!(phase.eval(1.0) > phase.eval(-1.0));
        assert!(henyey_greenstein(1.0, 0.8) > 10.0 * henyey_greenstein(-1.0, 0.8));
    }

    #[test]
    fn zero_asymmetry_is_isotropic() {
        let v = henyey_greenstein(0.3, 0.0);
        assert!((v - INV_FOUR_PI).abs() < 1e-6);
    }

    #[test]
    fn lobes_are_normalized() {
        let shapes = [
            PhaseFunction::Isotropic,
            PhaseFunction::Rayleigh,
            PhaseFunction::HenyeyGreenstein { g: 0.6 },
            PhaseFunction::DualLobe { g_forward: 0.8, g_back: 0.3, blend: 0.5 },
            PhaseFunction::CornetteShanks { g: 0.5 },
        ];
        for phase in shapes.iter() {
            let integral = sphere_integral(phase);
            assert!((integral - 1.0).abs() < 1e-2, "{} integrates to {}", phase.name(), integral);
        }
    }

    #[test]
    fn extreme_asymmetry_stays_finite() {
        assert!(henyey_greenstein(1.0, 1.0).is_finite());
        assert!(henyey_greenstein(-1.0, -1.0).is_finite());
        assert!(cornette_shanks(1.0, 1.0).is_finite());
    }

    #[test]
    fn dual_lobe_blends_backward_lobe() {
        let forward_only = PhaseFunction::DualLobe { g_forward: 0.8, g_back: 0.8, blend: 0.0 };
        let backward_only = PhaseFunction::DualLobe { g_forward: 0.8, g_back: 0.8, blend: 1.0 };
        assert!(forward_only.eval(1.0) > forward_only.eval(-1.0));
        assert!(backward_only.eval(-1.0) > backward_only.eval(1.0));
    }

    #[test]
    fn validate_rejects_out_of_range_asymmetry() {
        assert!(PhaseFunction::HenyeyGreenstein { g: -1.0 }.validate().is_err());
        assert!(PhaseFunction::DualLobe { g_forward: 0.5, g_back: 0.3, blend: 2.0 }.validate().is_err());
        assert!(PhaseFunction::CornetteShanks { g: 0.7 }.validate().is_ok());
    }

    #[test]
    fn names_round_trip_through_with_name() {
        let base = PhaseFunction::DualLobe { g_forward: 0.7, g_back: 0.2, blend: 0.4 };
        assert_eq!(base.with_name("hg"), Some(PhaseFunction::HenyeyGreenstein { g: 0.7 }));
        assert_eq!(base.with_name("rayleigh"), Some(PhaseFunction::Rayleigh));
        assert_eq!(base.with_name("nope"), None);
    }
}
