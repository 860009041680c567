//! Sequential pillar centroid tracking.
//!
//! Given a start circle and an ordered sequence of equally sized frames,
//! the tracker estimates the pillar position in every frame. Each frame is
//! cropped to a fixed window around the start point, normalized with the
//! contrast of the first frame, and differenced against it; the position
//! estimate is a brightness-weighted centroid of a donut around the start
//! point, blended toward the previous position when the change signal is
//! weak and clamped to a quarter radius of travel per frame.
//!
//! The per-sequence loop is inherently ordered (every estimate depends on
//! the previous one), so there is no parallelism inside a run. Independent
//! sequences can run on separate threads, one tracker each or a shared one.

mod centroid;
mod tracker;
mod types;

pub use tracker::{SequenceTracker, TrackRun};
pub use types::{PositionTable, TrackError, TrackParams, Trajectory};
