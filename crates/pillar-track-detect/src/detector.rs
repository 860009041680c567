use pillar_track_core::{ChannelSides, Circle, ContrastParams, GrayImageView};
use serde::{Deserialize, Serialize};

use crate::hough::CircleSearchParams;
use crate::search::{derive_search_region, search_bounded, RegionParams, SearchRegion};
use crate::walls::{detect_channel_sides, WallDetectParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by start point detection.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("image too small for start point detection (width={width}, height={height})")]
    ImageTooSmall { width: usize, height: usize },
    #[error("invalid search region: {reason}")]
    InvalidSearchRegion { reason: &'static str },
}

/// Parameters of the full start point detection pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StartPointParams {
    /// Histogram mass clipped during contrast normalization.
    pub clip_fraction: f32,
    pub walls: WallDetectParams,
    pub region: RegionParams,
    pub search: CircleSearchParams,
}

impl Default for StartPointParams {
    fn default() -> Self {
        Self {
            clip_fraction: 0.01,
            walls: WallDetectParams::default(),
            region: RegionParams::default(),
            search: CircleSearchParams::default(),
        }
    }
}

/// Everything the detector learned about the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartDetection {
    /// The pillar tip circle.
    pub circle: Circle,
    /// Channel wall x coordinates the search region was derived from.
    pub channel: ChannelSides,
    /// Region the circle search ran in.
    pub region: SearchRegion,
}

/// Finds the pillar tip circle in a single frame.
///
/// Stateless apart from its parameters; calling it on different images
/// shares nothing between calls.
#[derive(Debug, Clone, Default)]
pub struct StartPointDetector {
    params: StartPointParams,
}

impl StartPointDetector {
    pub fn new(params: StartPointParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StartPointParams {
        &self.params
    }

    /// Full pipeline: normalize contrast, locate the channel walls, derive
    /// the search region and run the bounded circle search in it.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img), fields(width = img.width, height = img.height))
    )]
    pub fn detect(&self, img: &GrayImageView<'_>) -> Result<StartDetection, DetectError> {
        self.check_size(img)?;
        let contrast = ContrastParams::from_image(img, self.params.clip_fraction);
        let normalized = contrast.apply(img);
        let view = normalized.view();
        let channel = detect_channel_sides(&view, &self.params.walls);
        let region = derive_search_region(&channel, img.height, &self.params.region);
        let circle = search_bounded(&view, &region, &self.params.search);
        Ok(StartDetection {
            circle,
            channel,
            region,
        })
    }

    /// Bounded circle search in a caller-supplied region, skipping wall
    /// detection entirely.
    pub fn detect_in_region(
        &self,
        img: &GrayImageView<'_>,
        region: &SearchRegion,
    ) -> Result<Circle, DetectError> {
        self.check_size(img)?;
        validate_region(region, img.width, img.height)?;
        let contrast = ContrastParams::from_image(img, self.params.clip_fraction);
        let normalized = contrast.apply(img);
        Ok(search_bounded(&normalized.view(), region, &self.params.search))
    }

    fn check_size(&self, img: &GrayImageView<'_>) -> Result<(), DetectError> {
        if img.width < 2 || img.height < 2 {
            return Err(DetectError::ImageTooSmall {
                width: img.width,
                height: img.height,
            });
        }
        Ok(())
    }
}

fn validate_region(region: &SearchRegion, width: usize, height: usize) -> Result<(), DetectError> {
    let b = &region.bbox;
    if b.x1 >= b.x2 || b.y1 >= b.y2 {
        return Err(DetectError::InvalidSearchRegion {
            reason: "bounding box is empty",
        });
    }
    if b.x1 < 0 || b.y1 < 0 || b.x2 > width as i32 || b.y2 > height as i32 {
        return Err(DetectError::InvalidSearchRegion {
            reason: "bounding box exceeds the image bounds",
        });
    }
    if region.min_radius < 1 || region.max_radius < region.min_radius {
        return Err(DetectError::InvalidSearchRegion {
            reason: "radius range is empty",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillar_track_core::{BoundingBox, GrayImage};

    #[test]
    fn rejects_tiny_images() {
        let img = GrayImage::from_fn(1, 5, |_, _| 0);
        let detector = StartPointDetector::default();
        let err = detector.detect(&img.view()).unwrap_err();
        assert!(matches!(err, DetectError::ImageTooSmall { width: 1, height: 5 }));
    }

    #[test]
    fn rejects_out_of_bounds_region() {
        let img = GrayImage::from_fn(50, 50, |_, _| 128);
        let detector = StartPointDetector::default();
        let region = SearchRegion {
            bbox: BoundingBox::new(10, 10, 60, 40),
            min_radius: 3,
            max_radius: 8,
        };
        let err = detector.detect_in_region(&img.view(), &region).unwrap_err();
        assert!(matches!(err, DetectError::InvalidSearchRegion { .. }));
    }

    #[test]
    fn partial_params_json_fills_missing_fields() {
        let params: StartPointParams =
            serde_json::from_str(r#"{"clip_fraction":0.02,"walls":{"tilt_degrees":1.0}}"#)
                .expect("parse");
        assert_eq!(params.clip_fraction, 0.02);
        assert_eq!(params.walls.tilt_degrees, 1.0);
        assert_eq!(params.walls.open_iterations, 3);
        assert_eq!(params.region.vertical_margin, 0.1);
    }

    #[test]
    fn rejects_empty_radius_range() {
        let img = GrayImage::from_fn(50, 50, |_, _| 128);
        let detector = StartPointDetector::default();
        let region = SearchRegion {
            bbox: BoundingBox::new(5, 5, 45, 45),
            min_radius: 9,
            max_radius: 4,
        };
        let err = detector.detect_in_region(&img.view(), &region).unwrap_err();
        assert!(matches!(err, DetectError::InvalidSearchRegion { .. }));
    }
}
