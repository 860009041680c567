use log::debug;
use pillar_track_core::{Circle, ContrastParams, GrayImage, GrayImageView, PixelPoint};

use crate::centroid::{clamp_step, donut_centroid_blend, subtract_saturating};
use crate::types::{TrackError, TrackParams, Trajectory};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tracks the pillar centroid across an ordered frame sequence.
///
/// The tracker only holds parameters. Each run works on state local to that
/// run, so one tracker can serve any number of sequences, in turn or from
/// separate threads.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    params: TrackParams,
}

impl SequenceTracker {
    pub fn new(params: TrackParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrackParams {
        &self.params
    }

    /// Track across a fully loaded sequence. The first frame anchors the
    /// run; every following frame appends one point.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frames), fields(frames = frames.len()))
    )]
    pub fn track(&self, frames: &[GrayImage], start: Circle) -> Result<Trajectory, TrackError> {
        let first = frames.first().ok_or(TrackError::EmptySequence)?;
        let mut run = self.begin(&first.view(), start)?;
        for frame in &frames[1..] {
            run.advance(&frame.view())?;
        }
        Ok(run.finish())
    }

    /// Start an incremental run from the first frame.
    ///
    /// The crop window, contrast parameters and donut geometry are fixed
    /// here and reused for every later frame. The first trajectory point is
    /// the start point itself.
    pub fn begin(
        &self,
        first_frame: &GrayImageView<'_>,
        start: Circle,
    ) -> Result<TrackRun, TrackError> {
        if start.radius < 1 {
            return Err(TrackError::InvalidRadius {
                radius: start.radius,
            });
        }
        let (width, height) = (first_frame.width, first_frame.height);
        let on_frame = start.center.x >= 0
            && start.center.y >= 0
            && (start.center.x as usize) < width
            && (start.center.y as usize) < height;
        if !on_frame {
            return Err(TrackError::StartOutOfBounds {
                x: start.center.x,
                y: start.center.y,
                width,
                height,
            });
        }

        // Fixed window of 4 radii of padding around the start point, clamped
        // to the frame.
        let pad = (f64::from(start.radius) * self.params.crop_pad_radii) as i32;
        let x1 = (start.center.x - pad).max(0);
        let y1 = (start.center.y - pad).max(0);
        let x2 = (start.center.x + pad).min(width as i32);
        let y2 = (start.center.y + pad).min(height as i32);
        let window_w = (x2 - x1) as usize;
        let window_h = (y2 - y1) as usize;

        let cropped = first_frame.crop(x1 as usize, y1 as usize, window_w, window_h);
        debug!("tracking window {window_w}x{window_h} at ({x1}, {y1})");
        let contrast = ContrastParams::from_image(&cropped.view(), self.params.clip_fraction);
        let first = contrast.apply(&cropped.view());

        let local_start = PixelPoint::new(start.center.x - x1, start.center.y - y1);
        Ok(TrackRun {
            params: self.params,
            frame_width: width,
            frame_height: height,
            origin: PixelPoint::new(x1, y1),
            contrast,
            first,
            local_start,
            radius: start.radius,
            inner_radius: (f64::from(start.radius) * self.params.donut_inner) as i32,
            outer_radius: (f64::from(start.radius) * self.params.donut_outer) as i32,
            prev: local_start,
            points: vec![start.center],
        })
    }
}

/// State of one in-progress tracking run.
///
/// Created by [`SequenceTracker::begin`]; feed the remaining frames through
/// [`advance`](TrackRun::advance) in order and take the result with
/// [`finish`](TrackRun::finish).
#[derive(Debug, Clone)]
pub struct TrackRun {
    params: TrackParams,
    frame_width: usize,
    frame_height: usize,
    origin: PixelPoint,
    contrast: ContrastParams,
    first: GrayImage,
    local_start: PixelPoint,
    radius: i32,
    inner_radius: i32,
    outer_radius: i32,
    prev: PixelPoint,
    points: Vec<PixelPoint>,
}

impl TrackRun {
    /// Consume the next frame and return the estimated position, in full
    /// frame coordinates.
    pub fn advance(&mut self, frame: &GrayImageView<'_>) -> Result<PixelPoint, TrackError> {
        if frame.width != self.frame_width || frame.height != self.frame_height {
            return Err(TrackError::FrameSizeMismatch {
                frame_index: self.points.len(),
                expected_width: self.frame_width,
                expected_height: self.frame_height,
                width: frame.width,
                height: frame.height,
            });
        }

        let cropped = frame.crop(
            self.origin.x as usize,
            self.origin.y as usize,
            self.first.width,
            self.first.height,
        );
        let normalized = self.contrast.apply(&cropped.view());
        let change_map = subtract_saturating(&normalized.view(), &self.first.view());

        let blended = donut_centroid_blend(
            &change_map.view(),
            self.local_start,
            self.inner_radius,
            self.outer_radius,
            self.params.noise_floor,
            self.prev,
        );
        let max_step = f64::from(self.radius) * self.params.max_step_radii;
        let position = clamp_step(blended, self.prev, max_step);

        self.prev = position;
        let global = PixelPoint::new(position.x + self.origin.x, position.y + self.origin.y);
        self.points.push(global);
        Ok(global)
    }

    /// Number of frames consumed so far, the first frame included.
    pub fn frames_seen(&self) -> usize {
        self.points.len()
    }

    pub fn finish(self) -> Trajectory {
        Trajectory {
            points: self.points,
            radius: self.radius,
        }
    }
}
