// Copyright @yucwang 2026

pub mod const_volume;
pub mod grid_volume;
pub mod noise_volume;

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeFilterMode {
    Nearest,
    Trilinear,
}

impl VolumeFilterMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nearest" => Some(VolumeFilterMode::Nearest),
            "trilinear" => Some(VolumeFilterMode::Trilinear),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum VolumeError {
    Io(std::io::Error),
    Format(String),
}

impl From<std::io::Error> for VolumeError {
    fn from(err: std::io::Error) -> Self {
        VolumeError::Io(err)
    }
}

impl fmt::Display for VolumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeError::Io(err) => write!(f, "io error: {}", err),
            VolumeError::Format(msg) => write!(f, "invalid volume: {}", msg),
        }
    }
}

impl std::error::Error for VolumeError {}
