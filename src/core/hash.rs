// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Stateless per-pixel value in `[0, 1)`. Only used to decorrelate the
/// march start between neighbouring pixels.
pub fn pixel_hash(x: u32, y: u32) -> Float {
    let mut state = ((y as u64) << 32) | x as u64;
    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    state ^= state >> 33;
    state = state.wrapping_mul(0xff51afd7ed558ccd);
    state ^= state >> 33;
    // Top 24 bits keep the result strictly below one in f32.
    ((state >> 40) as u32) as Float / (1u32 << 24) as Float
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_in_range() {
        for y in 0..32 {
            for x in 0..32 {
                let h = pixel_hash(x, y);
                assert!(h >= 0.0 && h < 1.0);
                assert_eq!(h, pixel_hash(x, y));
            }
        }
    }

    #[test]
    fn neighbours_differ() {
        assert_ne!(pixel_hash(10, 10), pixel_hash(11, 10));
        assert_ne!(pixel_hash(10, 10), pixel_hash(10, 11));
    }

    #[test]
    fn hash_is_spread_over_unit_interval() {
        let n = 64 * 64;
        let mean: Float = (0..n).map(|i| pixel_hash(i % 64, i / 64)).sum::<Float>() / n as Float;
        assert!((mean - 0.5).abs() < 0.05);
    }
}
