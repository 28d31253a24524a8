// Copyright 2020 @TwoCookingMice

use super::constants::{ Vector3f, Matrix4f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Transform {
    /// Returns `None` for a singular matrix.
    pub fn new(matrix: Matrix4f) -> Option<Self> {
        let inv_matrix = matrix.try_inverse()?;
        Some(Self { matrix, inv_matrix })
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        project(&self.matrix, p)
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        project(&self.inv_matrix, p)
    }
}

// Homogeneous transform of a point followed by the perspective divide.
fn project(m: &Matrix4f, p: Vector3f) -> Vector3f {
    let h = m * nalgebra::Vector4::new(p.x, p.y, p.z, 1.0);
    Vector3f::new(h.x / h.w, h.y / h.w, h.z / h.w)
}
