#![allow(dead_code)]

use ndarray::{Array2, Array3};

/// Deterministic pseudo-random 8-bit image (64-bit LCG, high byte).
pub fn noise_image(h: usize, w: usize, seed: u64) -> Array2<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    Array2::from_shape_fn((h, w), |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 56) as u8
    })
}

/// Deterministic pseudo-random (time, height, width) volume.
pub fn noise_volume(t: usize, h: usize, w: usize, seed: u64) -> Array3<u8> {
    let flat = noise_image(t, h * w, seed);
    Array3::from_shape_fn((t, h, w), |(i, j, k)| flat[[i, j * w + k]])
}

/// Horizontal-plus-vertical ramp, `value = row * w + col`.
pub fn ramp_image(h: usize, w: usize) -> Array2<u16> {
    Array2::from_shape_fn((h, w), |(r, c)| (r * w + c) as u16)
}

/// The image repeated 3x3 times, so the middle copy sees wrapped neighbors.
pub fn tile_3x3<T: Copy>(image: &Array2<T>) -> Array2<T> {
    let (h, w) = image.dim();
    Array2::from_shape_fn((3 * h, 3 * w), |(r, c)| image[[r % h, c % w]])
}

/// The 3x3 patch used throughout the tests.
///
/// ```text
///  6 11 14
///  9 10 10
/// 19  0 22
/// ```
pub fn patch_3x3() -> Array2<u8> {
    Array2::from_shape_vec((3, 3), vec![6, 11, 14, 9, 10, 10, 19, 0, 22])
        .expect("3x3 patch")
}
