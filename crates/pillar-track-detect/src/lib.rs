//! Start point detection for pillar centroid tracking.
//!
//! The detector answers one question about the first frame of a sequence:
//! where is the pillar tip and how large is it? It normalizes contrast,
//! finds the two channel walls, derives a search region between them and
//! runs a threshold-relaxing circle search inside that region. The search
//! never fails outright: when nothing is found the expected circle for the
//! region is returned instead.

mod detector;
mod hough;
mod search;
mod walls;

pub use detector::{DetectError, StartDetection, StartPointDetector, StartPointParams};
pub use hough::{hough_circles, CircleSearchParams};
pub use search::{derive_search_region, search_bounded, RegionParams, SearchRegion};
pub use walls::{detect_channel_sides, WallDetectParams};
