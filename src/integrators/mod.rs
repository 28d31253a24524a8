// Copyright @yucwang 2026

pub mod composite;
pub mod phase;
pub mod raymarching;
pub mod shadow;
