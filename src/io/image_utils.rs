// Copyright @yucwang 2026

use crate::io::ImageIoError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f};
use image::io::Reader as ImageReader;
use image::{GenericImageView, Rgb, RgbImage};
use std::path::Path;

pub fn srgb_to_linear(v: Float) -> Float {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(v: Float) -> Float {
    let v = v.clamp(0.0, 1.0);
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Decodes an 8-bit sRGB image into linear light.
pub fn read_ldr_from_file(path: &Path) -> Result<Bitmap, ImageIoError> {
    let img = ImageReader::open(path)
        .map_err(|e| ImageIoError::Image(format!("failed to open image {}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| ImageIoError::Image(format!("failed to decode image {}: {}", path.display(), e)))?;

    let (width, height) = img.dimensions();
    let rgb = img.to_rgb32f();
    let data = rgb
        .pixels()
        .map(|p| Vector3f::new(srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])))
        .collect();
    log::info!("Loaded {}x{} background from {}.", width, height, path.display());
    Bitmap::from_pixels(width as usize, height as usize, data)
        .ok_or_else(|| ImageIoError::Image("pixel count mismatch".to_string()))
}

/// Clamps to `[0, 1]` and encodes as 8-bit sRGB.
pub fn write_ldr_to_file(bitmap: &Bitmap, path: &Path) -> Result<(), ImageIoError> {
    let width = bitmap.width();
    let img = RgbImage::from_fn(width as u32, bitmap.height() as u32, |x, y| {
        let p = bitmap.pixels()[y as usize * width + x as usize];
        Rgb([encode(p.x), encode(p.y), encode(p.z)])
    });
    img.save(path)
        .map_err(|e| ImageIoError::Image(format!("failed to write {}: {}", path.display(), e)))?;
    log::info!("Image written to: {}.", path.display());
    Ok(())
}

fn encode(v: Float) -> u8 {
    (linear_to_srgb(v) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_curve_round_trips() {
        for i in 0..=20 {
            let v = i as Float / 20.0;
            assert!((srgb_to_linear(linear_to_srgb(v)) - v).abs() < 1e-4);
        }
    }

    #[test]
    fn png_round_trip_is_close() {
        let mut path = std::env::temp_dir();
        path.push("nimbus_png_round_trip.png");

        let mut bitmap = Bitmap::new(2, 2);
        bitmap[(1, 0)] = Vector3f::new(0.5, 1.0, 3.0);
        write_ldr_to_file(&bitmap, &path).unwrap();

        let back = read_ldr_from_file(&path).unwrap();
        assert_eq!((back.width(), back.height()), (2, 2));
        assert!((back[(1, 0)].x - 0.5).abs() < 0.01);
        assert!((back[(1, 0)].y - 1.0).abs() < 1e-4);
        // Out-of-range values are clipped.
        assert!((back[(1, 0)].z - 1.0).abs() < 1e-4);
    }
}
