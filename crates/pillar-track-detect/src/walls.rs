use log::warn;
use pillar_track_core::{
    binarize, invert, keep_largest_components, morphology, otsu_level, rotate_about_center,
    ChannelSides, GrayImage, GrayImageView,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters of the channel wall search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WallDetectParams {
    /// Side of the square structuring element used for speckle cleanup.
    pub cleanup_kernel: usize,
    /// The vertical opening kernel height is `image height / line_height_divisor`,
    /// floored at `min_line_height`.
    pub line_height_divisor: usize,
    pub min_line_height: usize,
    /// Iterations of the vertical opening that isolates wall segments.
    pub open_iterations: usize,
    /// Walls tilted up to this many degrees off vertical still survive the
    /// opening, which runs on the raw mask and on two counter-rotated copies.
    pub tilt_degrees: f32,
    /// Fraction of the image width blanked at the left and right borders.
    pub edge_exclusion: f32,
    /// Iteration cap for the 1-D 2-means split of wall column coordinates.
    pub split_max_iters: usize,
    /// Convergence tolerance on the 2-means center shift, in pixels.
    pub split_tol: f64,
}

impl Default for WallDetectParams {
    fn default() -> Self {
        Self {
            cleanup_kernel: 5,
            line_height_divisor: 20,
            min_line_height: 16,
            open_iterations: 3,
            tilt_degrees: 2.0,
            edge_exclusion: 0.15,
            split_max_iters: 20,
            split_tol: 0.5,
        }
    }
}

/// Locate the two channel walls as x coordinates.
///
/// The wall mask is an Otsu binarization cleaned by a close/open pair and
/// inverted if the bright side dominates, so that walls are foreground. A
/// tall vertical opening (applied to the mask and to two slightly rotated
/// copies, then merged) keeps only wall-like columns; the border bands are
/// blanked and the two largest components kept. The returned coordinates are
/// the centers of a 1-D 2-means split of the surviving pixel columns, or the
/// 10% / 90% width marks when nothing survives.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn detect_channel_sides(img: &GrayImageView<'_>, params: &WallDetectParams) -> ChannelSides {
    let level = otsu_level(img);
    let binary = binarize(img, level);
    let k = params.cleanup_kernel;
    let closed = morphology::close(&binary.view(), k, k, 1);
    let mut mask = morphology::open(&closed.view(), k, k, 1);

    let white = mask.view().count_nonzero();
    if white * 2 > mask.data.len() {
        invert(&mut mask);
    }

    let line_height = (img.height / params.line_height_divisor).max(params.min_line_height);
    let n = params.open_iterations;

    let straight = morphology::open(&mask.view(), 1, line_height, n);
    let tilted_neg = vertical_open_rotated(&mask, -params.tilt_degrees, line_height, n);
    let tilted_pos = vertical_open_rotated(&mask, params.tilt_degrees, line_height, n);

    let mut combined = GrayImage::from_fn(mask.width, mask.height, |x, y| {
        let (xi, yi) = (x as i32, y as i32);
        if straight.view().get(xi, yi) > 0
            || tilted_neg.view().get(xi, yi) > 0
            || tilted_pos.view().get(xi, yi) > 0
        {
            255
        } else {
            0
        }
    });

    let band = (params.edge_exclusion * img.width as f32) as usize;
    blank_column_bands(&mut combined, band);

    let walls = keep_largest_components(&combined.view(), 2);

    let mut columns = Vec::new();
    for y in 0..walls.height {
        for x in 0..walls.width {
            if walls.data[y * walls.width + x] > 0 {
                columns.push(x as f64);
            }
        }
    }

    let fallback = ChannelSides {
        left_x: (img.width as f64 * 0.1) as i32,
        right_x: (img.width as f64 * 0.9) as i32,
    };
    if columns.len() < 2 {
        warn!("no channel wall pixels survived filtering, using default side positions");
        return fallback;
    }
    match two_means_1d(&columns, params.split_max_iters, params.split_tol) {
        Some((left_x, right_x)) => ChannelSides { left_x, right_x },
        None => {
            warn!("wall columns collapsed into one cluster, using default side positions");
            fallback
        }
    }
}

/// Vertical opening on a copy rotated by `angle_deg`, rotated back afterwards.
fn vertical_open_rotated(
    mask: &GrayImage,
    angle_deg: f32,
    line_height: usize,
    iterations: usize,
) -> GrayImage {
    let rotated = rotate_about_center(&mask.view(), angle_deg);
    let opened = morphology::open(&rotated.view(), 1, line_height, iterations);
    rotate_about_center(&opened.view(), -angle_deg)
}

fn blank_column_bands(img: &mut GrayImage, band: usize) {
    let band = band.min(img.width);
    for y in 0..img.height {
        let row = y * img.width;
        for x in 0..band {
            img.data[row + x] = 0;
        }
        for x in img.width - band..img.width {
            img.data[row + x] = 0;
        }
    }
}

/// Lloyd iterations on 1-D samples with two centers seeded at the extremes.
/// Returns the centers sorted ascending, or `None` when the samples do not
/// separate into two distinct clusters.
fn two_means_1d(samples: &[f64], max_iters: usize, tol: f64) -> Option<(i32, i32)> {
    let mut lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(hi > lo) {
        return None;
    }
    for _ in 0..max_iters {
        let (mut sum_lo, mut n_lo) = (0.0, 0usize);
        let (mut sum_hi, mut n_hi) = (0.0, 0usize);
        for &x in samples {
            if (x - lo).abs() <= (x - hi).abs() {
                sum_lo += x;
                n_lo += 1;
            } else {
                sum_hi += x;
                n_hi += 1;
            }
        }
        // An emptied cluster keeps its previous center.
        let next_lo = if n_lo > 0 { sum_lo / n_lo as f64 } else { lo };
        let next_hi = if n_hi > 0 { sum_hi / n_hi as f64 } else { hi };
        let shift = (next_lo - lo).abs().max((next_hi - hi).abs());
        lo = next_lo;
        hi = next_hi;
        if shift < tol {
            break;
        }
    }
    let (a, b) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let (a, b) = (a as i32, b as i32);
    if a == b {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_with_bars(width: usize, height: usize, bars: &[(usize, usize)]) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if bars.iter().any(|&(lo, hi)| x >= lo && x <= hi) {
                30
            } else {
                220
            }
        })
    }

    #[test]
    fn finds_two_dark_bars() {
        let img = image_with_bars(100, 100, &[(20, 24), (80, 84)]);
        let sides = detect_channel_sides(&img.view(), &WallDetectParams::default());
        assert!((sides.left_x - 22).abs() <= 2, "left_x = {}", sides.left_x);
        assert!((sides.right_x - 82).abs() <= 2, "right_x = {}", sides.right_x);
        assert!(sides.left_x < sides.right_x);
    }

    #[test]
    fn finds_bright_bars_on_dark_background() {
        // Already white-on-black, so the majority check must not invert.
        let img = GrayImage::from_fn(100, 100, |x, _| {
            if (20..=24).contains(&x) || (80..=84).contains(&x) {
                255
            } else {
                0
            }
        });
        let sides = detect_channel_sides(&img.view(), &WallDetectParams::default());
        assert!((sides.left_x - 22).abs() <= 2, "left_x = {}", sides.left_x);
        assert!((sides.right_x - 82).abs() <= 2, "right_x = {}", sides.right_x);
    }

    #[test]
    fn flat_image_falls_back_to_width_fractions() {
        let img = GrayImage::from_fn(200, 100, |_, _| 0);
        let sides = detect_channel_sides(&img.view(), &WallDetectParams::default());
        assert_eq!(sides.left_x, 20);
        assert_eq!(sides.right_x, 180);
    }

    #[test]
    fn zero_width_band_blanks_nothing() {
        let mut img = GrayImage::from_fn(6, 4, |_, _| 255);
        blank_column_bands(&mut img, 0);
        assert_eq!(img.view().count_nonzero(), 24);
    }

    #[test]
    fn narrow_frame_survives_a_floored_exclusion_band() {
        // 0.15 * 6 floors to a zero-column band.
        let img = GrayImage::from_fn(6, 40, |_, _| 128);
        let sides = detect_channel_sides(&img.view(), &WallDetectParams::default());
        assert_eq!(sides.left_x, 0);
        assert_eq!(sides.right_x, 5);
        assert!(sides.left_x < sides.right_x);
    }

    #[test]
    fn bars_in_border_bands_are_ignored() {
        // One bar inside the 15% exclusion band, one real wall pair further in.
        let img = image_with_bars(200, 200, &[(5, 9), (60, 64), (140, 144)]);
        let sides = detect_channel_sides(&img.view(), &WallDetectParams::default());
        assert!((sides.left_x - 62).abs() <= 2, "left_x = {}", sides.left_x);
        assert!((sides.right_x - 142).abs() <= 2, "right_x = {}", sides.right_x);
    }

    #[test]
    fn two_means_separates_extremes() {
        let samples = [1.0, 2.0, 3.0, 100.0, 101.0];
        let (lo, hi) = two_means_1d(&samples, 20, 0.5).unwrap();
        assert_eq!(lo, 2);
        assert_eq!(hi, 100);
    }

    #[test]
    fn two_means_rejects_coincident_samples() {
        let samples = [5.0; 8];
        assert!(two_means_1d(&samples, 20, 0.5).is_none());
    }
}
