/* Copyright 2020 @TwoCookingMice */

use crate::integrators::composite::OUTPUT_ALPHA;
use crate::io::ImageIoError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector3f;

use exr::prelude::*;
use std::path::Path;

struct Pixels {
    width: usize,
    height: usize,
    data: Vec<Vector3f>,
}

// Read EXR Image from file
pub fn read_exr_from_file(file_path: &Path) -> std::result::Result<Bitmap, ImageIoError> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path.display());

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution: Vec2<usize>, _: &RgbaChannels| Pixels {
                width: resolution.width(),
                height: resolution.height(),
                data: vec![Vector3f::zeros(); resolution.width() * resolution.height()],
            },
            |pixels: &mut Pixels, position: Vec2<usize>, (r, g, b, _a): (f32, f32, f32, f32)| {
                let idx = position.y() * pixels.width + position.x();
                pixels.data[idx] = Vector3f::new(r, g, b);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)
        .map_err(|e| ImageIoError::Exr(e.to_string()))?;

    let pixels = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded, width = {}, height = {}.", pixels.width, pixels.height);
    Bitmap::from_pixels(pixels.width, pixels.height, pixels.data)
        .ok_or_else(|| ImageIoError::Exr("pixel count mismatch".to_string()))
}

// Write EXR Image to file, alpha is always opaque
pub fn write_exr_to_file(bitmap: &Bitmap, file_path: &Path) -> std::result::Result<(), ImageIoError> {
    log::info!("Starting writing openexr images: {}.", file_path.display());

    let width = bitmap.width();
    let image = bitmap.raw_copy();
    write_rgba_file(file_path, width, bitmap.height(), |x, y| {
        (
            image[y*width+x].0,
            image[y*width+x].1,
            image[y*width+x].2,
            OUTPUT_ALPHA,
        )
    })
    .map_err(|e| ImageIoError::Exr(e.to_string()))?;

    log::info!("EXR written to: {}.", file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exr_round_trip_keeps_float_values() {
        let mut path = std::env::temp_dir();
        path.push("nimbus_exr_round_trip.exr");

        let mut bitmap = Bitmap::new(3, 2);
        bitmap[(2, 1)] = Vector3f::new(4.5, 0.25, 0.125);
        write_exr_to_file(&bitmap, &path).unwrap();

        let back = read_exr_from_file(&path).unwrap();
        assert_eq!((back.width(), back.height()), (3, 2));
        assert!((back[(2, 1)] - Vector3f::new(4.5, 0.25, 0.125)).norm() < 1e-3);
        assert_eq!(back[(0, 0)], Vector3f::zeros());
    }
}
