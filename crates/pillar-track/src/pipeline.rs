//! End-to-end helpers from image files to a position table.
//!
//! Frames are decoded with the `image` crate, converted to 8-bit grayscale
//! and handed to the detection and tracking crates. Tracking streams one
//! frame at a time, so a long sequence never sits in memory at once.

use std::path::Path;

use pillar_track_core::{Circle, GrayImage, GrayImageView};
use pillar_track_detect::{DetectError, StartDetection, StartPointDetector, StartPointParams};
use pillar_track_trace::{PositionTable, SequenceTracker, TrackError, TrackParams, Trajectory};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the file-based pipeline helpers.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("no input frames given")]
    NoFrames,
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("decoded buffer length mismatch (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Track(#[from] TrackError),
}

/// Borrow an `image::GrayImage` as the lightweight core view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Load one frame from disk as 8-bit grayscale.
pub fn load_frame(path: impl AsRef<Path>) -> Result<GrayImage, PipelineError> {
    let img = image::open(path.as_ref())?.to_luma8();
    let (width, height) = (img.width() as usize, img.height() as usize);
    let data = img.into_raw();
    let got = data.len();
    GrayImage::from_raw(width, height, data).ok_or(PipelineError::InvalidGrayBuffer {
        expected: width * height,
        got,
    })
}

/// Detect the pillar start circle in the given frame file.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))
)]
pub fn detect_start_in_file(
    path: impl AsRef<Path>,
    params: &StartPointParams,
) -> Result<StartDetection, PipelineError> {
    let frame = load_frame(path)?;
    let detector = StartPointDetector::new(*params);
    Ok(detector.detect(&frame.view())?)
}

/// Track the pillar across a sequence of frame files, starting from a known
/// circle. Frames are loaded one at a time, in order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(frames = paths.len()))
)]
pub fn track_files<P: AsRef<Path>>(
    paths: &[P],
    start: Circle,
    params: &TrackParams,
) -> Result<Trajectory, PipelineError> {
    let (first, rest) = paths.split_first().ok_or(PipelineError::NoFrames)?;
    let tracker = SequenceTracker::new(*params);
    let first_frame = load_frame(first)?;
    let mut run = tracker.begin(&first_frame.view(), start)?;
    for path in rest {
        let frame = load_frame(path)?;
        run.advance(&frame.view())?;
    }
    Ok(run.finish())
}

/// Start detection plus the tracked position table for one sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackReport {
    pub start: StartDetection,
    pub table: PositionTable,
}

/// Full pipeline: detect the start point in the first frame, then track the
/// whole sequence from it.
pub fn run_files<P: AsRef<Path>>(
    paths: &[P],
    detect_params: &StartPointParams,
    track_params: &TrackParams,
) -> Result<TrackReport, PipelineError> {
    let first = paths.first().ok_or(PipelineError::NoFrames)?;
    let detection = detect_start_in_file(first, detect_params)?;
    let trajectory = track_files(paths, detection.circle, track_params)?;
    Ok(TrackReport {
        start: detection,
        table: trajectory.to_table(),
    })
}
