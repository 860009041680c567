use nalgebra::Vector2;
use pillar_track_core::{Circle, GrayImageView, PixelPoint};
use serde::{Deserialize, Serialize};

/// Parameters of the gradient circle search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleSearchParams {
    /// Gaussian kernel size applied once before gradient extraction.
    pub blur_kernel: usize,
    /// Gaussian sigma. Non-positive derives sigma from the kernel size.
    pub blur_sigma: f32,
    /// Initial gradient magnitude threshold for edge pixels.
    pub edge_threshold: f32,
    /// Initial vote threshold for candidate centers.
    pub accumulator_threshold: f32,
    /// Both thresholds shrink by this factor (with truncation) after each
    /// attempt that yields no admissible circle.
    pub threshold_decay: f32,
    /// Attempt cap before the expected circle is synthesized.
    pub max_attempts: u32,
    /// Minimum distance between accepted centers, in pixels.
    pub min_center_separation: f64,
    /// Accumulator cells cover `accumulator_scale` pixels per axis.
    pub accumulator_scale: usize,
}

impl Default for CircleSearchParams {
    fn default() -> Self {
        Self {
            blur_kernel: 9,
            blur_sigma: 0.0,
            edge_threshold: 150.0,
            accumulator_threshold: 120.0,
            threshold_decay: 0.9,
            max_attempts: 28,
            min_center_separation: 1.0,
            accumulator_scale: 2,
        }
    }
}

/// One pass of the gradient-voting circle transform.
///
/// Edge pixels (Sobel magnitude at or above `edge_threshold`) vote along
/// their gradient line in both directions for every radius in range, into an
/// accumulator downscaled by `accumulator_scale`. Cells that are local
/// maxima at or above `accumulator_threshold` become centers, strongest
/// first, subject to the minimum separation; each center's radius is the
/// most frequent integer distance to the edge pixels within range. Centers
/// with no in-range edge support are dropped.
pub fn hough_circles(
    img: &GrayImageView<'_>,
    params: &CircleSearchParams,
    min_radius: i32,
    max_radius: i32,
    edge_threshold: f32,
    accumulator_threshold: f32,
) -> Vec<Circle> {
    let (w, h) = (img.width, img.height);
    if w < 3 || h < 3 || min_radius < 1 || max_radius < min_radius {
        return Vec::new();
    }
    let scale = params.accumulator_scale.max(1);
    let aw = w.div_ceil(scale);
    let ah = h.div_ceil(scale);
    let mut accumulator = vec![0u32; aw * ah];

    let mut edges: Vec<(i32, i32)> = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gradient = sobel_at(img, x as i32, y as i32);
            let magnitude = gradient.norm();
            // Flat pixels have no vote direction even when the threshold
            // has decayed to zero.
            if magnitude == 0.0 || magnitude < edge_threshold {
                continue;
            }
            edges.push((x as i32, y as i32));
            let direction = gradient / magnitude;
            let pixel = Vector2::new(x as f32, y as f32);
            for sign in [1.0f32, -1.0] {
                for r in min_radius..=max_radius {
                    let center = pixel + direction * (sign * r as f32);
                    let cx = center.x.round() as i32;
                    let cy = center.y.round() as i32;
                    if cx < 0 || cy < 0 || cx >= w as i32 || cy >= h as i32 {
                        continue;
                    }
                    accumulator[(cy as usize / scale) * aw + cx as usize / scale] += 1;
                }
            }
        }
    }

    // Local maxima above threshold, visited strongest first. The asymmetric
    // neighbor comparison picks one cell out of a flat plateau.
    let mut candidates: Vec<(u32, usize, usize)> = Vec::new();
    for ay in 0..ah {
        for ax in 0..aw {
            let v = accumulator[ay * aw + ax];
            if (v as f32) < accumulator_threshold {
                continue;
            }
            let left = if ax > 0 { accumulator[ay * aw + ax - 1] } else { 0 };
            let right = if ax + 1 < aw { accumulator[ay * aw + ax + 1] } else { 0 };
            let up = if ay > 0 { accumulator[(ay - 1) * aw + ax] } else { 0 };
            let down = if ay + 1 < ah { accumulator[(ay + 1) * aw + ax] } else { 0 };
            if v > left && v >= right && v > up && v >= down {
                candidates.push((v, ax, ay));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.2.cmp(&b.2)).then(a.1.cmp(&b.1)));

    let min_sep_sq = params.min_center_separation * params.min_center_separation;
    let mut circles: Vec<Circle> = Vec::new();
    for &(_, ax, ay) in &candidates {
        let cx = (ax * scale + scale / 2) as i32;
        let cy = (ay * scale + scale / 2) as i32;
        let too_close = circles.iter().any(|c| {
            let dx = (c.center.x - cx) as f64;
            let dy = (c.center.y - cy) as f64;
            dx * dx + dy * dy < min_sep_sq
        });
        if too_close {
            continue;
        }
        if let Some(radius) = estimate_radius(&edges, cx, cy, min_radius, max_radius) {
            circles.push(Circle {
                center: PixelPoint { x: cx, y: cy },
                radius,
            });
        }
    }
    circles
}

fn sobel_at(img: &GrayImageView<'_>, x: i32, y: i32) -> Vector2<f32> {
    let p = |dx: i32, dy: i32| img.get(x + dx, y + dy) as f32;
    let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
    let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
    Vector2::new(gx, gy)
}

/// Most frequent integer distance from the center to the edge pixels, within
/// the radius range. Ties resolve to the smaller radius.
fn estimate_radius(
    edges: &[(i32, i32)],
    cx: i32,
    cy: i32,
    min_radius: i32,
    max_radius: i32,
) -> Option<i32> {
    let span = (max_radius - min_radius + 1) as usize;
    let mut histogram = vec![0u32; span];
    for &(x, y) in edges {
        let dx = (x - cx) as f64;
        let dy = (y - cy) as f64;
        let d = (dx * dx + dy * dy).sqrt().round() as i64;
        if d < min_radius as i64 || d > max_radius as i64 {
            continue;
        }
        histogram[(d - min_radius as i64) as usize] += 1;
    }
    let mut best: Option<(usize, u32)> = None;
    for (i, &count) in histogram.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((i, count));
        }
    }
    best.map(|(i, _)| min_radius + i as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillar_track_core::{gaussian_blur, GrayImage};

    fn dark_disk(width: usize, height: usize, cx: i32, cy: i32, r: i32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let dx = x as i32 - cx;
            let dy = y as i32 - cy;
            if dx * dx + dy * dy <= r * r {
                25
            } else {
                230
            }
        })
    }

    #[test]
    fn finds_centered_disk() {
        let img = dark_disk(100, 100, 50, 50, 10);
        let blurred = gaussian_blur(&img.view(), 9, 0.0);
        let params = CircleSearchParams::default();
        let circles = hough_circles(&blurred.view(), &params, 5, 15, 150.0, 60.0);
        assert!(!circles.is_empty());
        let top = circles[0];
        assert!((top.center.x - 50).abs() <= 3, "center.x = {}", top.center.x);
        assert!((top.center.y - 50).abs() <= 3, "center.y = {}", top.center.y);
        assert!((top.radius - 10).abs() <= 3, "radius = {}", top.radius);
    }

    #[test]
    fn flat_image_yields_nothing() {
        let img = GrayImage::from_fn(64, 64, |_, _| 128);
        let params = CircleSearchParams::default();
        let circles = hough_circles(&img.view(), &params, 5, 15, 10.0, 1.0);
        assert!(circles.is_empty());
    }

    #[test]
    fn zero_edge_threshold_gives_flat_pixels_no_votes() {
        let img = GrayImage::from_fn(64, 64, |_, _| 128);
        let params = CircleSearchParams::default();
        let circles = hough_circles(&img.view(), &params, 5, 15, 0.0, 1.0);
        assert!(circles.is_empty(), "got {circles:?}");
    }

    #[test]
    fn radius_is_mode_of_edge_distances() {
        let mut edges = Vec::new();
        for i in 0..64 {
            let angle = i as f64 * std::f64::consts::TAU / 64.0;
            let x = (30.0 + 7.0 * angle.cos()).round() as i32;
            let y = (30.0 + 7.0 * angle.sin()).round() as i32;
            edges.push((x, y));
        }
        assert_eq!(estimate_radius(&edges, 30, 30, 3, 12), Some(7));
    }
}
