/// Toe Trajectory Analyzer
///
/// Turns a frame sequence into a smoothed, gap-filled foot-height signal
/// with per-sample velocity and motion classification:
/// - Height per frame is the lower value of the two foot-tip y coordinates
///   when both clear the visibility gate; otherwise the frame is unknown.
/// - Unknowns are filled by forward-then-backward nearest-valid hold
///   (propagation, not interpolation).
/// - A small symmetric moving average smooths the signal over valid
///   neighbors only.
/// - The descent/rise velocity threshold adapts to the observed height
///   range, never a fixed pixel constant.

use tracing::debug;

use crate::config::TrajectoryTuning;
use crate::models::landmark::{BodyLandmark, Frame};
use crate::models::trajectory::{ToeTrajectory, ToeTrajectoryPoint, TrajectoryStats};

pub struct ToeTrajectoryAnalyzer {
    tuning: TrajectoryTuning,
}

impl ToeTrajectoryAnalyzer {
    pub fn new() -> Self {
        Self::with_tuning(TrajectoryTuning::default())
    }

    pub fn with_tuning(tuning: TrajectoryTuning) -> Self {
        Self { tuning }
    }

    /// Analyze a frame sequence into a toe trajectory.
    ///
    /// Degenerate input (fewer than two frames with a usable foot-tip
    /// height) yields the empty trajectory rather than an error; no output
    /// value is ever NaN or infinite.
    pub fn analyze(&self, frames: &[Frame]) -> ToeTrajectory {
        let raw = self.raw_heights(frames);

        let valid_count = raw.iter().filter(|h| h.is_finite()).count();
        if valid_count < 2 {
            debug!(
                frames = frames.len(),
                valid = valid_count,
                "toe trajectory degenerate, returning empty result"
            );
            return ToeTrajectory::default();
        }

        let filled = fill_gaps(&raw);
        let smoothed = moving_average(&filled, self.tuning.smoothing_window.max(1));

        let mean = smoothed.iter().sum::<f64>() / smoothed.len() as f64;
        let min = smoothed.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = smoothed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        let velocity_threshold = range * self.tuning.velocity_threshold_ratio;

        let n = smoothed.len();
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            // Forward difference; the final sample has no successor.
            let velocity = if i + 1 < n {
                smoothed[i + 1] - smoothed[i]
            } else {
                0.0
            };
            let next_velocity = if i + 2 < n {
                smoothed[i + 2] - smoothed[i + 1]
            } else {
                0.0
            };

            let is_descending = velocity > velocity_threshold;
            let is_rising = velocity < -velocity_threshold;
            // Local minimum of foot height: the signal has settled and the
            // next sample already pulls away from the ground.
            let is_lowest = velocity.abs() < velocity_threshold && next_velocity < -velocity_threshold;

            points.push(ToeTrajectoryPoint {
                frame: frames[i].frame_number,
                height: smoothed[i],
                velocity,
                is_descending,
                is_lowest,
                is_rising,
            });
        }

        debug!(
            points = points.len(),
            range, velocity_threshold, "toe trajectory analyzed"
        );

        ToeTrajectory {
            points,
            stats: Some(TrajectoryStats {
                mean,
                min,
                max,
                range,
                velocity_threshold,
            }),
        }
    }

    /// Per-frame raw height, NaN where the foot tips are unusable.
    fn raw_heights(&self, frames: &[Frame]) -> Vec<f64> {
        frames
            .iter()
            .map(|frame| {
                let left = frame.get(BodyLandmark::LeftFootIndex);
                let right = frame.get(BodyLandmark::RightFootIndex);
                match (left, right) {
                    (Some(l), Some(r))
                        if l.visibility > self.tuning.min_foot_visibility
                            && r.visibility > self.tuning.min_foot_visibility =>
                    {
                        l.y.min(r.y)
                    }
                    _ => f64::NAN,
                }
            })
            .collect()
    }
}

impl Default for ToeTrajectoryAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward-then-backward nearest-valid hold over NaN gaps.
fn fill_gaps(raw: &[f64]) -> Vec<f64> {
    let mut filled = raw.to_vec();

    let mut last_valid: Option<f64> = None;
    for value in filled.iter_mut() {
        if value.is_finite() {
            last_valid = Some(*value);
        } else if let Some(held) = last_valid {
            *value = held;
        }
    }

    // Leading gap: hold the first valid value backward.
    let mut next_valid: Option<f64> = None;
    for value in filled.iter_mut().rev() {
        if value.is_finite() {
            next_valid = Some(*value);
        } else if let Some(held) = next_valid {
            *value = held;
        }
    }

    filled
}

/// Symmetric moving average over whichever window neighbors exist.
fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    let n = signal.len();
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            let slice = &signal[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
