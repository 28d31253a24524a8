// Copyright @yucwang 2021

use crate::core::scene::Scene;
use crate::core::settings::ConfigError;
use crate::math::bitmap::Bitmap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    Config(ConfigError),
}

impl From<ConfigError> for RenderError {
    fn from(err: ConfigError) -> Self {
        RenderError::Config(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Config(err) => write!(f, "invalid frame configuration: {}", err),
        }
    }
}

impl std::error::Error for RenderError {}

pub trait Renderer {
    fn render(&self, scene: &Scene) -> Result<Bitmap, RenderError>;
}
