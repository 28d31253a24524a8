// Copyright @yucwang 2026

use crate::core::volume::DensityField;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::volumes::{VolumeError, VolumeFilterMode};
use std::fs;
use std::path::Path;

/// Dense scalar voxel grid. Voxel centers sit on the unit cube's lattice, so
/// the corner voxels are reached exactly at coordinates 0 and 1.
pub struct GridVolume {
    data: Vec<Float>,
    xres: usize,
    yres: usize,
    zres: usize,
    file_bounds: Option<AABB>,
    filter_mode: VolumeFilterMode,
}

impl GridVolume {
    pub fn from_data(xres: usize, yres: usize, zres: usize, data: Vec<Float>) -> Result<Self, VolumeError> {
        if xres == 0 || yres == 0 || zres == 0 {
            return Err(VolumeError::Format("grid dimensions must be positive".to_string()));
        }
        let expected = xres
            .checked_mul(yres)
            .and_then(|v| v.checked_mul(zres))
            .ok_or_else(|| VolumeError::Format("grid dimensions overflow".to_string()))?;
        if data.len() != expected {
            return Err(VolumeError::Format(format!(
                "expected {} voxels, got {}", expected, data.len()
            )));
        }

        Ok(Self {
            data,
            xres,
            yres,
            zres,
            file_bounds: None,
            filter_mode: VolumeFilterMode::Trilinear,
        })
    }

    /// Reads a binary `VOL` (version 3, float32) grid. Multi-channel grids
    /// are reduced to the mean of their first three channels.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VolumeError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut cursor = 4usize;

        if bytes.len() < 4 {
            return Err(VolumeError::Format("vol file too small".to_string()));
        }
        if &bytes[0..3] != b"VOL" {
            return Err(VolumeError::Format("invalid vol header".to_string()));
        }
        let version = bytes[3];
        if version != 3 {
            return Err(VolumeError::Format(format!("unsupported vol version: {}", version)));
        }

        let encoding = read_i32(&bytes, &mut cursor)?;
        let xres = read_i32(&bytes, &mut cursor)?;
        let yres = read_i32(&bytes, &mut cursor)?;
        let zres = read_i32(&bytes, &mut cursor)?;
        let channels = read_i32(&bytes, &mut cursor)?;

        if encoding != 1 {
            return Err(VolumeError::Format(format!("unsupported vol encoding: {}", encoding)));
        }
        if xres <= 0 || yres <= 0 || zres <= 0 {
            return Err(VolumeError::Format("vol dimensions must be positive".to_string()));
        }
        let channels = match channels {
            1 | 3 | 6 => channels as usize,
            other => return Err(VolumeError::Format(format!("unsupported vol channels: {}", other))),
        };

        let mut corners = [0.0 as Float; 6];
        for c in corners.iter_mut() {
            *c = read_f32(&bytes, &mut cursor)?;
        }
        let file_bounds = AABB::new(
            Vector3f::new(corners[0], corners[1], corners[2]),
            Vector3f::new(corners[3], corners[4], corners[5]),
        );

        let (xres, yres, zres) = (xres as usize, yres as usize, zres as usize);
        let voxels = xres
            .checked_mul(yres)
            .and_then(|v| v.checked_mul(zres))
            .ok_or_else(|| VolumeError::Format("vol dimensions overflow".to_string()))?;
        let payload = voxels
            .checked_mul(channels)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| VolumeError::Format("vol dimensions overflow".to_string()))?;
        if payload > bytes.len().saturating_sub(cursor) {
            return Err(VolumeError::Format(format!(
                "vol header declares {} bytes of voxels, file holds {}",
                payload, bytes.len().saturating_sub(cursor)
            )));
        }
        let mut data = Vec::with_capacity(voxels);
        for _ in 0..voxels {
            let mut acc = 0.0;
            for c in 0..channels {
                let v = read_f32(&bytes, &mut cursor)?;
                if c < 3 {
                    acc += v;
                }
            }
            data.push(acc / channels.min(3) as Float);
        }

        log::info!("Loaded {}x{}x{} density grid from {}.", xres, yres, zres, path.display());
        let mut grid = Self::from_data(xres, yres, zres, data)?;
        grid.file_bounds = Some(file_bounds);
        Ok(grid)
    }

    /// World-space box recorded in the source file, if any.
    pub fn file_bounds(&self) -> Option<AABB> {
        self.file_bounds
    }

    pub fn set_filter_mode(&mut self, filter_mode: VolumeFilterMode) {
        self.filter_mode = filter_mode;
    }

    pub fn max_value(&self) -> Float {
        self.data.iter().cloned().fold(0.0, Float::max)
    }

    fn fetch(&self, x: usize, y: usize, z: usize) -> Float {
        self.data[(z * self.yres + y) * self.xres + x]
    }

    fn lattice(&self, p: Vector3f) -> Vector3f {
        Vector3f::new(
            p.x.clamp(0.0, 1.0) * (self.xres as Float - 1.0),
            p.y.clamp(0.0, 1.0) * (self.yres as Float - 1.0),
            p.z.clamp(0.0, 1.0) * (self.zres as Float - 1.0),
        )
    }

    fn sample_nearest(&self, p: Vector3f) -> Float {
        let l = self.lattice(p);
        let x = ((l.x + 0.5).floor() as usize).min(self.xres - 1);
        let y = ((l.y + 0.5).floor() as usize).min(self.yres - 1);
        let z = ((l.z + 0.5).floor() as usize).min(self.zres - 1);
        self.fetch(x, y, z)
    }

    fn sample_trilinear(&self, p: Vector3f) -> Float {
        let l = self.lattice(p);

        let x0 = (l.x.floor() as usize).min(self.xres - 1);
        let y0 = (l.y.floor() as usize).min(self.yres - 1);
        let z0 = (l.z.floor() as usize).min(self.zres - 1);
        let x1 = (x0 + 1).min(self.xres - 1);
        let y1 = (y0 + 1).min(self.yres - 1);
        let z1 = (z0 + 1).min(self.zres - 1);

        let tx = l.x - x0 as Float;
        let ty = l.y - y0 as Float;
        let tz = l.z - z0 as Float;

        let c00 = lerp(self.fetch(x0, y0, z0), self.fetch(x1, y0, z0), tx);
        let c10 = lerp(self.fetch(x0, y1, z0), self.fetch(x1, y1, z0), tx);
        let c01 = lerp(self.fetch(x0, y0, z1), self.fetch(x1, y0, z1), tx);
        let c11 = lerp(self.fetch(x0, y1, z1), self.fetch(x1, y1, z1), tx);

        lerp(lerp(c00, c10, ty), lerp(c01, c11, ty), tz)
    }
}

impl DensityField for GridVolume {
    fn sample(&self, uvw: Vector3f) -> Float {
        match self.filter_mode {
            VolumeFilterMode::Nearest => self.sample_nearest(uvw),
            VolumeFilterMode::Trilinear => self.sample_trilinear(uvw),
        }
    }

    fn resolution(&self) -> (usize, usize, usize) {
        (self.xres, self.yres, self.zres)
    }
}

fn lerp(a: Float, b: Float, t: Float) -> Float {
    a * (1.0 - t) + b * t
}

fn read_i32(bytes: &[u8], cursor: &mut usize) -> Result<i32, VolumeError> {
    if *cursor + 4 > bytes.len() {
        return Err(VolumeError::Format("unexpected eof while reading i32".to_string()));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[*cursor..*cursor + 4]);
    *cursor += 4;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32(bytes: &[u8], cursor: &mut usize) -> Result<Float, VolumeError> {
    if *cursor + 4 > bytes.len() {
        return Err(VolumeError::Format("unexpected eof while reading f32".to_string()));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[*cursor..*cursor + 4]);
    *cursor += 4;
    Ok(Float::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_test_vol(path: &PathBuf, data: &[f32], res: (i32, i32, i32), channels: i32) {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"VOL");
        bytes.push(3u8);
        bytes.extend_from_slice(&1i32.to_le_bytes()); // encoding
        bytes.extend_from_slice(&res.0.to_le_bytes());
        bytes.extend_from_slice(&res.1.to_le_bytes());
        bytes.extend_from_slice(&res.2.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        for v in [-2.0f32, -1.0, -1.0, 2.0, 1.0, 1.0].iter() {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for v in data {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        std::fs::write(path, bytes).expect("write vol");
    }

    #[test]
    fn grid_volume_trilinear_center() {
        let mut path = std::env::temp_dir();
        path.push("nimbus_grid_volume_trilinear_center.vol");
        let data: Vec<f32> = (0..8).map(|v| v as f32).collect();
        write_test_vol(&path, &data, (2, 2, 2), 1);

        let vol = GridVolume::from_file(&path).expect("load vol");
        assert_eq!(vol.resolution(), (2, 2, 2));
        let v = vol.sample(Vector3f::new(0.5, 0.5, 0.5));
        assert!((v - 3.5).abs() < 1e-4);

        let bounds = vol.file_bounds().unwrap();
        assert_eq!(bounds.p_min, Vector3f::new(-2.0, -1.0, -1.0));
        assert_eq!(bounds.p_max, Vector3f::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn grid_volume_rgb_channels_are_averaged() {
        let mut path = std::env::temp_dir();
        path.push("nimbus_grid_volume_rgb.vol");
        write_test_vol(&path, &[0.0, 3.0, 6.0], (1, 1, 1), 3);

        let vol = GridVolume::from_file(&path).expect("load vol");
        assert!((vol.sample(Vector3f::new(0.2, 0.2, 0.2)) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn grid_volume_nearest_corner() {
        let data: Vec<f32> = (0..8).map(|v| v as f32).collect();
        let mut vol = GridVolume::from_data(2, 2, 2, data).unwrap();
        vol.set_filter_mode(VolumeFilterMode::Nearest);
        assert_eq!(vol.sample(Vector3f::new(0.1, 0.1, 0.1)), 0.0);
        assert_eq!(vol.sample(Vector3f::new(0.9, 0.9, 0.9)), 7.0);
        assert_eq!(vol.max_value(), 7.0);
    }

    #[test]
    fn truncated_file_is_rejected() {
        let mut path = std::env::temp_dir();
        path.push("nimbus_grid_volume_truncated.vol");
        write_test_vol(&path, &[1.0, 2.0], (2, 2, 2), 1);
        assert!(matches!(GridVolume::from_file(&path), Err(VolumeError::Format(_))));
    }

    #[test]
    fn oversized_header_is_rejected_before_allocating() {
        let mut path = std::env::temp_dir();
        path.push("nimbus_grid_volume_oversized.vol");
        write_test_vol(&path, &[1.0], (200000, 200000, 4000), 1);
        match GridVolume::from_file(&path) {
            Err(VolumeError::Format(msg)) => assert!(msg.contains("bytes")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("oversized grid was accepted"),
        }
    }

    #[test]
    fn from_data_checks_length() {
        assert!(GridVolume::from_data(2, 2, 2, vec![0.0; 7]).is_err());
        assert!(GridVolume::from_data(0, 2, 2, vec![]).is_err());
    }
}
