/// Analysis configuration
///
/// Everything the host supplies before the core runs: capture frame rate,
/// the known reference distance the analyzed interval covers, optional
/// athlete data, and the analysis mode. Tuning structs expose the
/// empirically tuned algorithm constants as configurable defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::models::evaluation::{AnalysisMode, Gender};

/// Host-supplied analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Capture frame rate, frames per second.
    pub fps: f64,
    /// Physical distance covered by the analyzed interval, meters.
    pub reference_distance_m: f64,
    /// Athlete height in centimeters, when known.
    pub athlete_height_cm: Option<f64>,
    /// Athlete gender, when known.
    pub gender: Option<Gender>,
    pub mode: AnalysisMode,
}

impl AnalysisConfig {
    pub fn new(fps: f64, reference_distance_m: f64, mode: AnalysisMode) -> Result<Self> {
        let config = Self {
            fps,
            reference_distance_m,
            athlete_height_cm: None,
            gender: None,
            mode,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_athlete(mut self, height_cm: Option<f64>, gender: Option<Gender>) -> Result<Self> {
        self.athlete_height_cm = height_cm;
        self.gender = gender;
        self.validate()?;
        Ok(self)
    }

    /// Validate ranges with descriptive messages.
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(anyhow!("Frame rate must be a positive number of frames per second"));
        }

        if !self.reference_distance_m.is_finite() || self.reference_distance_m <= 0.0 {
            return Err(anyhow!("Reference distance must be a positive number of meters"));
        }

        if let Some(height) = self.athlete_height_cm {
            if !height.is_finite() || !(100.0..=250.0).contains(&height) {
                return Err(anyhow!("Athlete height must be between 100 and 250 cm"));
            }
        }

        Ok(())
    }
}

/// Tuning for the toe-trajectory analyzer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrajectoryTuning {
    /// Minimum foot-tip visibility for a frame to contribute a height.
    pub min_foot_visibility: f64,
    /// Symmetric moving-average window, in frames.
    pub smoothing_window: usize,
    /// Velocity threshold as a fraction of the observed height range.
    pub velocity_threshold_ratio: f64,
}

impl Default for TrajectoryTuning {
    fn default() -> Self {
        Self {
            min_foot_visibility: 0.3,
            smoothing_window: 3,
            velocity_threshold_ratio: 0.15,
        }
    }
}

/// Tuning for the two-strategy gait event detector.
///
/// The defaults are empirically tuned against real capture footage; they
/// are exposed as configuration rather than re-derived.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorTuning {
    /// Candidates from the auxiliary method within this many frames of a
    /// trajectory-based candidate are dropped in the merge.
    pub merge_tolerance_frames: usize,
    /// Inter-frame knee-flexion change flagging a contact candidate, deg.
    pub knee_delta_deg: f64,
    /// Inter-frame ankle-angle increase flagging a toe-off candidate, deg.
    pub ankle_delta_deg: f64,
    /// Minimum visibility on every landmark an angle delta reads.
    pub min_joint_visibility: f64,
}

impl Default for DetectorTuning {
    fn default() -> Self {
        Self {
            merge_tolerance_frames: 5,
            knee_delta_deg: 15.0,
            ankle_delta_deg: 5.0,
            min_joint_visibility: 0.5,
        }
    }
}

/// Tuning for the calibrated full-interval scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScanTuning {
    /// Frames averaged when testing for a stable (grounded) region.
    pub stable_window_frames: usize,
    /// Stability gate as a fraction of the base threshold.
    pub stable_ratio: f64,
    /// How far past a contact the toe-off search may look.
    pub toe_off_lookahead_frames: usize,
    /// Displacement gate for a toe-off candidate, fraction of threshold.
    pub toe_off_ratio: f64,
    /// Displacement confirming a toe-off early, fraction of threshold.
    pub early_confirm_ratio: f64,
    /// Frames skipped past a found toe-off before the next contact search.
    pub resume_after_toe_off: usize,
    /// Frames skipped past a contact when no toe-off was found.
    pub resume_after_contact: usize,
}

impl Default for ScanTuning {
    fn default() -> Self {
        Self {
            stable_window_frames: 5,
            stable_ratio: 0.3,
            toe_off_lookahead_frames: 60,
            toe_off_ratio: 0.8,
            early_confirm_ratio: 1.5,
            resume_after_toe_off: 5,
            resume_after_contact: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluation::AnalysisMode;

    #[test]
    fn test_valid_config() {
        let config = AnalysisConfig::new(30.0, 10.0, AnalysisMode::TopSpeed).unwrap();
        assert_eq!(config.fps, 30.0);
        assert!(config.athlete_height_cm.is_none());
    }

    #[test]
    fn test_rejects_bad_fps() {
        assert!(AnalysisConfig::new(0.0, 10.0, AnalysisMode::TopSpeed).is_err());
        assert!(AnalysisConfig::new(f64::NAN, 10.0, AnalysisMode::TopSpeed).is_err());
    }

    #[test]
    fn test_rejects_bad_distance() {
        assert!(AnalysisConfig::new(30.0, -1.0, AnalysisMode::TopSpeed).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_height() {
        let result = AnalysisConfig::new(30.0, 10.0, AnalysisMode::TopSpeed)
            .unwrap()
            .with_athlete(Some(40.0), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_tuning_defaults() {
        let scan = ScanTuning::default();
        assert_eq!(scan.stable_window_frames, 5);
        assert_eq!(scan.toe_off_lookahead_frames, 60);
        assert!((scan.stable_ratio - 0.3).abs() < 1e-12);
        assert!((scan.early_confirm_ratio - 1.5).abs() < 1e-12);

        let detector = DetectorTuning::default();
        assert_eq!(detector.merge_tolerance_frames, 5);
    }
}
