/// Toe trajectory models
///
/// One `ToeTrajectoryPoint` per eligible input frame: the smoothed,
/// gap-filled vertical foot-tip position (larger = lower on screen = nearer
/// ground), its forward-difference velocity, and the per-frame motion
/// classification the gait detector consumes.

use serde::{Deserialize, Serialize};

/// A single sample of the analyzed foot-height signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToeTrajectoryPoint {
    /// Source frame number.
    pub frame: usize,
    /// Smoothed, gap-filled vertical position.
    pub height: f64,
    /// Forward difference to the next sample (0.0 on the last sample).
    pub velocity: f64,
    /// Foot moving toward the ground faster than the adaptive threshold.
    pub is_descending: bool,
    /// Local minimum of foot height: velocity near zero with an imminent
    /// rise at the next sample.
    pub is_lowest: bool,
    /// Foot moving away from the ground faster than the adaptive threshold.
    pub is_rising: bool,
}

/// Summary statistics of the smoothed valid signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrajectoryStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Adaptive velocity threshold derived from `range`.
    pub velocity_threshold: f64,
}

/// Result of toe-trajectory analysis over a frame sequence.
///
/// Degenerate input (fewer than two valid height samples) produces the
/// empty result: no points, no stats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToeTrajectory {
    pub points: Vec<ToeTrajectoryPoint>,
    pub stats: Option<TrajectoryStats>,
}

impl ToeTrajectory {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Height at a given frame number, if the frame was eligible.
    pub fn height_at(&self, frame: usize) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.frame == frame)
            .map(|p| p.height)
    }
}
