use nalgebra::Point2;
use pillar_track_core::{GrayImage, GrayImageView, PixelPoint};

/// Per-pixel saturating difference `current - first`. Pixels darker than the
/// first frame clamp to zero, so the map only shows where brightness rose.
pub(crate) fn subtract_saturating(
    current: &GrayImageView<'_>,
    first: &GrayImageView<'_>,
) -> GrayImage {
    debug_assert_eq!(current.width, first.width);
    debug_assert_eq!(current.height, first.height);
    let data = current
        .data
        .iter()
        .zip(first.data.iter())
        .map(|(&c, &f)| c.saturating_sub(f))
        .collect();
    GrayImage {
        width: current.width,
        height: current.height,
        data,
    }
}

/// Brightness-weighted centroid of the donut around `donut_center`, blended
/// toward `anchor` by the square of the mean masked brightness.
///
/// Pixels below the noise floor or outside the ring
/// `inner_radius < distance <= outer_radius` contribute nothing. The mean
/// brightness is taken over the whole change map, not just the ring, so a
/// small bright patch in a large window still counts as a weak signal. With
/// no signal at all the result collapses to the anchor.
pub(crate) fn donut_centroid_blend(
    change_map: &GrayImageView<'_>,
    donut_center: PixelPoint,
    inner_radius: i32,
    outer_radius: i32,
    noise_floor: u8,
    anchor: PixelPoint,
) -> PixelPoint {
    let inner_sq = i64::from(inner_radius) * i64::from(inner_radius);
    let outer_sq = i64::from(outer_radius) * i64::from(outer_radius);

    let mut sum: u64 = 0;
    let mut sum_x: u64 = 0;
    let mut sum_y: u64 = 0;
    for y in 0..change_map.height {
        for x in 0..change_map.width {
            let dx = i64::from(x as i32 - donut_center.x);
            let dy = i64::from(y as i32 - donut_center.y);
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= inner_sq || dist_sq > outer_sq {
                continue;
            }
            let v = change_map.data[y * change_map.width + x];
            if v < noise_floor {
                continue;
            }
            let w = u64::from(v);
            sum += w;
            sum_x += w * x as u64;
            sum_y += w * y as u64;
        }
    }

    let total = if sum > 1 { sum as f64 } else { 1.0 };
    let centroid_x = sum_x as f64 / total;
    let centroid_y = sum_y as f64 / total;

    let num_pixels = (change_map.width * change_map.height) as f64;
    let brightness_sq = (sum as f64 / num_pixels).powi(2);

    let blended_x = (centroid_x * brightness_sq + f64::from(anchor.x)) / (1.0 + brightness_sq);
    let blended_y = (centroid_y * brightness_sq + f64::from(anchor.y)) / (1.0 + brightness_sq);
    PixelPoint::from_point2(Point2::new(blended_x, blended_y))
}

/// Cap the displacement from `prev` at `max_step` pixels, preserving the
/// direction.
pub(crate) fn clamp_step(pos: PixelPoint, prev: PixelPoint, max_step: f64) -> PixelPoint {
    let delta = pos.to_point2() - prev.to_point2();
    let distance = delta.norm();
    if distance <= max_step {
        return pos;
    }
    PixelPoint::from_point2(prev.to_point2() + delta * (max_step / distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillar_track_core::GrayImage;

    #[test]
    fn subtraction_saturates_at_zero() {
        let first = GrayImage::from_raw(2, 2, vec![100, 50, 0, 255]).unwrap();
        let current = GrayImage::from_raw(2, 2, vec![150, 20, 40, 255]).unwrap();
        let diff = subtract_saturating(&current.view(), &first.view());
        assert_eq!(diff.data, vec![50, 0, 40, 0]);
    }

    #[test]
    fn empty_donut_collapses_to_anchor() {
        let change = GrayImage::zeros(40, 40);
        let pos = donut_centroid_blend(
            &change.view(),
            PixelPoint::new(20, 20),
            4,
            12,
            60,
            PixelPoint::new(17, 21),
        );
        assert_eq!(pos, PixelPoint::new(17, 21));
    }

    #[test]
    fn noise_floor_drops_dim_pixels() {
        // A dim pixel on the right side of the ring, bright pixels on the
        // left. Only the bright side may pull the blend off center.
        let mut change = GrayImage::zeros(40, 40);
        change.data[20 * 40 + 28] = 59;
        for &(x, y) in &[(12, 19), (12, 20), (12, 21), (11, 20)] {
            change.data[y * 40 + x] = 255;
        }
        let pos = donut_centroid_blend(
            &change.view(),
            PixelPoint::new(20, 20),
            4,
            12,
            60,
            PixelPoint::new(20, 20),
        );
        assert!(pos.x < 20, "pos.x = {}", pos.x);
        assert_eq!(pos.y, 20);
    }

    #[test]
    fn strong_signal_follows_the_centroid() {
        // Saturate a block of the ring so the brightness weight dominates.
        let mut change = GrayImage::zeros(20, 20);
        for y in 5..15 {
            for x in 16..20 {
                change.data[y * 20 + x] = 255;
            }
        }
        let pos = donut_centroid_blend(
            &change.view(),
            PixelPoint::new(10, 10),
            2,
            9,
            60,
            PixelPoint::new(10, 10),
        );
        assert!(pos.x > 12, "pos.x = {}", pos.x);
    }

    #[test]
    fn step_clamp_preserves_direction() {
        let clamped = clamp_step(PixelPoint::new(10, 0), PixelPoint::new(0, 0), 2.0);
        assert_eq!(clamped, PixelPoint::new(2, 0));
        let diagonal = clamp_step(PixelPoint::new(8, 8), PixelPoint::new(0, 0), 2.0);
        assert_eq!(diagonal, PixelPoint::new(1, 1));
    }

    #[test]
    fn short_steps_pass_through() {
        let pos = PixelPoint::new(3, 4);
        assert_eq!(clamp_step(pos, PixelPoint::new(2, 4), 2.0), pos);
    }
}
