//! Core image containers and raster utilities for pillar centroid
//! tracking.
//!
//! Everything here is plain buffer math: no file I/O, no decoding, no
//! detection logic. The detection and tracking crates build on these
//! primitives.

mod blur;
mod components;
mod contrast;
mod geometry;
mod image;
mod logger;
pub mod morphology;
mod rotate;
mod threshold;

pub use blur::gaussian_blur;
pub use components::{keep_largest_components, label_components};
pub use contrast::ContrastParams;
pub use geometry::{BoundingBox, ChannelSides, Circle, PixelPoint};
pub use image::{sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView};
pub use rotate::rotate_about_center;
pub use threshold::{binarize, histogram, invert, otsu_level};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;
pub use logger::init_with_level;
