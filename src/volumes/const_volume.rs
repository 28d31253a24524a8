// Copyright @yucwang 2026

use crate::core::volume::DensityField;
use crate::math::constants::{Float, Vector3f};

pub struct ConstantVolume {
    value: Float,
}

impl ConstantVolume {
    pub fn new(value: Float) -> Self {
        Self { value }
    }
}

impl DensityField for ConstantVolume {
    fn sample(&self, _uvw: Vector3f) -> Float {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_volume_ignores_position() {
        let vol = ConstantVolume::new(2.0);
        assert_eq!(vol.resolution(), (1, 1, 1));
        assert_eq!(vol.sample(Vector3f::new(0.1, 0.2, 0.3)), 2.0);
        assert_eq!(vol.sample(Vector3f::new(0.9, 0.0, 1.0)), 2.0);
    }
}
