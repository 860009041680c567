use pillar_track_core::PixelPoint;
use serde::{Deserialize, Serialize};

/// Parameters of the sequential tracker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Histogram mass clipped during contrast normalization of the first
    /// cropped frame.
    pub clip_fraction: f32,
    /// Half-width of the fixed crop window, in pillar radii.
    pub crop_pad_radii: f64,
    /// Inner donut radius as a multiple of the pillar radius.
    pub donut_inner: f64,
    /// Outer donut radius as a multiple of the pillar radius.
    pub donut_outer: f64,
    /// Change-map intensities below this value count as noise and are
    /// dropped before the centroid is taken.
    pub noise_floor: u8,
    /// Per-frame displacement cap, in pillar radii.
    pub max_step_radii: f64,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            clip_fraction: 0.01,
            crop_pad_radii: 4.0,
            donut_inner: 0.5,
            donut_outer: 1.5,
            noise_floor: 60,
            max_step_radii: 0.25,
        }
    }
}

/// Pillar positions across a frame sequence, one point per frame.
///
/// The first point is always the start point the run began with. The radius
/// is constant across the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<PixelPoint>,
    pub radius: i32,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Parallel columns of a position table, frame numbers starting at 1.
    pub fn to_table(&self) -> PositionTable {
        PositionTable {
            frames: (1..=self.points.len() as u32).collect(),
            xs: self.points.iter().map(|p| p.x).collect(),
            ys: self.points.iter().map(|p| p.y).collect(),
        }
    }
}

/// Index-aligned columns ready for an external table writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTable {
    pub frames: Vec<u32>,
    pub xs: Vec<i32>,
    pub ys: Vec<i32>,
}

/// Errors produced when a tracking run is set up or fed frames.
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error("frame sequence is empty")]
    EmptySequence,
    #[error("pillar radius must be positive (got {radius})")]
    InvalidRadius { radius: i32 },
    #[error("start point ({x}, {y}) lies outside the {width}x{height} first frame")]
    StartOutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
    #[error(
        "frame {frame_index} is {width}x{height} but the sequence started at {expected_width}x{expected_height}"
    )]
    FrameSizeMismatch {
        frame_index: usize,
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_columns_are_aligned() {
        let trajectory = Trajectory {
            points: vec![
                PixelPoint::new(10, 20),
                PixelPoint::new(11, 20),
                PixelPoint::new(12, 21),
            ],
            radius: 8,
        };
        let table = trajectory.to_table();
        assert_eq!(table.frames, vec![1, 2, 3]);
        assert_eq!(table.xs, vec![10, 11, 12]);
        assert_eq!(table.ys, vec![20, 20, 21]);
    }

    #[test]
    fn trajectory_serializes_with_named_fields() {
        let trajectory = Trajectory {
            points: vec![PixelPoint::new(3, 4)],
            radius: 5,
        };
        let json = serde_json::to_string(&trajectory).unwrap();
        assert_eq!(json, r#"{"points":[{"x":3,"y":4}],"radius":5}"#);
    }
}
