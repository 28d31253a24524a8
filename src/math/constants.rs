/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;
pub type Matrix4f = nalgebra::Matrix4<Float>;

pub const PI: Float = 3.14159265359;
pub const INV_FOUR_PI: Float = 0.07957747154;
