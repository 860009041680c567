//! Image rotation about the center.

use crate::{sample_bilinear_u8, GrayImage, GrayImageView};
use nalgebra::{Matrix3, Vector3};

/// Rotate by `angle_deg` about the image center, keeping the original
/// dimensions. Bilinear sampling; regions with no source pixel are black.
pub fn rotate_about_center(src: &GrayImageView<'_>, angle_deg: f32) -> GrayImage {
    if angle_deg == 0.0 {
        return src.to_owned();
    }

    let w = src.width;
    let h = src.height;
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;

    // Inverse mapping: for each destination pixel, sample the source at
    // the back-rotated position.
    let theta = (-angle_deg).to_radians();
    let (s, c) = theta.sin_cos();
    let back = Matrix3::new(
        c,
        -s,
        cx - c * cx + s * cy,
        s,
        c,
        cy - s * cx - c * cy,
        0.0,
        0.0,
        1.0,
    );

    let mut out = GrayImage::zeros(w, h);
    for y in 0..h {
        for x in 0..w {
            let p = back * Vector3::new(x as f32, y as f32, 1.0);
            out.data[y * w + x] = sample_bilinear_u8(src, p.x, p.y);
        }
    }
    out
}
