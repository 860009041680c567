//! Separable Gaussian blur.

use crate::{GrayImage, GrayImageView};

/// 1-D Gaussian taps, normalized to sum 1.
///
/// `sigma <= 0` derives sigma from the kernel size with the usual
/// `0.3·((ksize−1)/2 − 1) + 0.8` rule (≈1.7 for a 9-tap kernel).
fn gaussian_taps(ksize: usize, sigma: f32) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (ksize / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (0..ksize as i32)
        .map(|i| {
            let d = (i - half) as f32;
            (-d * d / denom).exp()
        })
        .collect();
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Gaussian blur with a `ksize × ksize` kernel; borders replicate the
/// edge pixel. `sigma <= 0` derives sigma from the kernel size.
pub fn gaussian_blur(src: &GrayImageView<'_>, ksize: usize, sigma: f32) -> GrayImage {
    if src.is_empty() || ksize < 2 {
        return src.to_owned();
    }

    let w = src.width;
    let h = src.height;
    let taps = gaussian_taps(ksize, sigma);
    let half = (ksize / 2) as i32;

    let mut horizontal = vec![0f32; w * h];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let mut acc = 0f32;
            for (k, &t) in taps.iter().enumerate() {
                let sx = (x as i32 + k as i32 - half).clamp(0, w as i32 - 1) as usize;
                acc += t * src.data[row + sx] as f32;
            }
            horizontal[row + x] = acc;
        }
    }

    let mut out = GrayImage::zeros(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0f32;
            for (k, &t) in taps.iter().enumerate() {
                let sy = (y as i32 + k as i32 - half).clamp(0, h as i32 - 1) as usize;
                acc += t * horizontal[sy * w + x];
            }
            out.data[y * w + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
