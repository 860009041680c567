//! Histograms and global binarization.

use crate::{GrayImage, GrayImageView};

/// 256-bin intensity histogram.
pub fn histogram(src: &GrayImageView<'_>) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for &v in src.data {
        hist[v as usize] += 1;
    }
    hist
}

/// Otsu threshold level from the between-class variance walk.
///
/// Callers binarize with `v > level`, so a flat image (level = its only
/// value) comes out all black.
pub fn otsu_level(src: &GrayImageView<'_>) -> u8 {
    if src.data.is_empty() {
        return 127;
    }

    let mut min_v = 255u8;
    let mut max_v = 0u8;
    for &v in src.data {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v == max_v {
        return min_v;
    }

    let hist = histogram(src);
    let total = src.data.len() as f64;
    let mut sum_total = 0f64;
    for (i, &h) in hist.iter().enumerate() {
        sum_total += (i as f64) * (h as f64);
    }

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 127u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += (t as f64) * (h as f64);
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Binary image: 255 where `v > level`, else 0.
pub fn binarize(src: &GrayImageView<'_>, level: u8) -> GrayImage {
    let data = src
        .data
        .iter()
        .map(|&v| if v > level { 255 } else { 0 })
        .collect();
    GrayImage {
        width: src.width,
        height: src.height,
        data,
    }
}

/// In-place inversion (0 ↔ 255 on binary input).
pub fn invert(img: &mut GrayImage) {
    for v in &mut img.data {
        *v = 255 - *v;
    }
}
