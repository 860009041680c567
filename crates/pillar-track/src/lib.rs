//! High-level facade crate for the `pillar-track-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - (feature-gated) end-to-end helpers that load image files, detect the
//!   pillar tip in the first frame and track its centroid across the rest.
//!
//! ## Quickstart
//!
//! ```no_run
//! use pillar_track::pipeline;
//! use pillar_track::{StartPointParams, TrackParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frames = vec!["frames/0001.png", "frames/0002.png", "frames/0003.png"];
//! let report = pipeline::run_files(&frames, &StartPointParams::default(), &TrackParams::default())?;
//! println!(
//!     "start ({}, {}) r={}",
//!     report.start.circle.center.x, report.start.circle.center.y, report.start.circle.radius
//! );
//! for ((frame, x), y) in report.table.frames.iter().zip(&report.table.xs).zip(&report.table.ys) {
//!     println!("{frame},{x},{y}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `pillar_track::core`: image containers and raster utilities.
//! - `pillar_track::detect`: channel walls, bounded circle search, start point.
//! - `pillar_track::trace`: the sequential centroid tracker.
//! - `pillar_track::pipeline` (feature `image`): file-based end-to-end helpers.

pub use pillar_track_core as core;
pub use pillar_track_detect as detect;
pub use pillar_track_trace as trace;

pub use pillar_track_core::{Circle, GrayImage, GrayImageView, PixelPoint};
pub use pillar_track_detect::{
    SearchRegion, StartDetection, StartPointDetector, StartPointParams,
};
pub use pillar_track_trace::{PositionTable, SequenceTracker, TrackParams, Trajectory};

#[cfg(feature = "image")]
pub mod pipeline;
