// Copyright 2020 @TwoCookingMice

pub mod exr_utils;
pub mod image_utils;

use crate::math::bitmap::Bitmap;
use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum ImageIoError {
    Exr(String),
    Image(String),
    UnsupportedFormat(String),
}

impl fmt::Display for ImageIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageIoError::Exr(msg) => write!(f, "exr error: {}", msg),
            ImageIoError::Image(msg) => write!(f, "image error: {}", msg),
            ImageIoError::UnsupportedFormat(ext) => write!(f, "unsupported image format: {}", ext),
        }
    }
}

impl std::error::Error for ImageIoError {}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Reads a linear-light bitmap, picking the decoder by file extension.
pub fn read_bitmap<P: AsRef<Path>>(path: P) -> Result<Bitmap, ImageIoError> {
    let path = path.as_ref();
    match extension_of(path).as_str() {
        "exr" => exr_utils::read_exr_from_file(path),
        "png" | "jpg" | "jpeg" | "bmp" | "tga" => image_utils::read_ldr_from_file(path),
        other => Err(ImageIoError::UnsupportedFormat(other.to_string())),
    }
}

/// Writes the frame, as float RGBA for EXR or as an sRGB preview otherwise.
pub fn write_bitmap<P: AsRef<Path>>(bitmap: &Bitmap, path: P) -> Result<(), ImageIoError> {
    let path = path.as_ref();
    match extension_of(path).as_str() {
        "exr" => exr_utils::write_exr_to_file(bitmap, path),
        "png" | "jpg" | "jpeg" | "bmp" | "tga" => image_utils::write_ldr_to_file(bitmap, path),
        other => Err(ImageIoError::UnsupportedFormat(other.to_string())),
    }
}
