use log::warn;
use pillar_track_core::{
    gaussian_blur, BoundingBox, ChannelSides, Circle, GrayImageView, PixelPoint,
};
use serde::{Deserialize, Serialize};

use crate::hough::{hough_circles, CircleSearchParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Where to look for the pillar and how large its radius may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRegion {
    pub bbox: BoundingBox,
    pub min_radius: i32,
    pub max_radius: i32,
}

/// How the search region follows from the channel sides.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionParams {
    /// Height fraction excluded at the top and at the bottom.
    pub vertical_margin: f64,
    /// Smallest admissible pillar diameter as a fraction of channel width.
    pub min_diameter_fraction: f64,
    /// Largest admissible pillar diameter as a fraction of channel width.
    pub max_diameter_fraction: f64,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            vertical_margin: 0.1,
            min_diameter_fraction: 0.15,
            max_diameter_fraction: 1.15,
        }
    }
}

/// Build the search region from the channel sides: the channel width
/// horizontally, the middle band of the image vertically, and a radius range
/// proportional to the channel width.
pub fn derive_search_region(
    sides: &ChannelSides,
    height: usize,
    params: &RegionParams,
) -> SearchRegion {
    let h = height as f64;
    let y1 = (h * params.vertical_margin) as i32;
    let y2 = (h * (1.0 - params.vertical_margin)) as i32;
    let channel_width = sides.width() as f64;
    let min_radius = ((channel_width * params.min_diameter_fraction / 2.0) as i32).max(1);
    let max_radius =
        ((channel_width * params.max_diameter_fraction / 2.0) as i32).max(min_radius + 1);
    SearchRegion {
        bbox: BoundingBox::new(sides.left_x, y1, sides.right_x, y2),
        min_radius,
        max_radius,
    }
}

/// Run the circle search with progressively relaxed thresholds.
///
/// Each attempt keeps only circles whose whole disk lies strictly inside the
/// region bbox; on failure both thresholds decay and the pass repeats, up to
/// the attempt cap. When every attempt fails, the expected circle (region
/// center, mean admissible radius) is synthesized so the search never comes
/// back empty.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn search_bounded(
    img: &GrayImageView<'_>,
    region: &SearchRegion,
    params: &CircleSearchParams,
) -> Circle {
    let blurred = gaussian_blur(img, params.blur_kernel, params.blur_sigma);
    let expected_radius = (region.min_radius + region.max_radius) / 2;
    let expected_x = (region.bbox.x1 + region.bbox.x2) / 2;

    let mut edge_threshold = params.edge_threshold;
    let mut accumulator_threshold = params.accumulator_threshold;
    for _ in 0..params.max_attempts {
        let circles = hough_circles(
            &blurred.view(),
            params,
            region.min_radius,
            region.max_radius,
            edge_threshold,
            accumulator_threshold,
        );
        let inside: Vec<Circle> = circles
            .into_iter()
            .filter(|c| region.bbox.contains_disk(c))
            .collect();
        if let Some(best) = best_circle(&inside, expected_radius, expected_x) {
            return best;
        }
        edge_threshold = (edge_threshold * params.threshold_decay).floor();
        accumulator_threshold = (accumulator_threshold * params.threshold_decay).floor();
    }
    warn!("no circle found inside the search region, synthesizing the expected circle");
    Circle {
        center: PixelPoint {
            x: expected_x,
            y: region.bbox.center_y(),
        },
        radius: expected_radius,
    }
}

/// Circle minimizing `|radius - expected_radius| + |center_x - expected_x|`,
/// with ties broken on center x, then center y, then radius.
fn best_circle(circles: &[Circle], expected_radius: i32, expected_x: i32) -> Option<Circle> {
    circles
        .iter()
        .map(|c| {
            let size_difference = (c.radius - expected_radius).abs();
            let pos_difference = (c.center.x - expected_x).abs();
            (
                size_difference + pos_difference,
                c.center.x,
                c.center.y,
                c.radius,
            )
        })
        .min()
        .map(|(_, x, y, r)| Circle {
            center: PixelPoint { x, y },
            radius: r,
        })
}
