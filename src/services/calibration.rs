/// Calibration workflow and calibrated event scan
///
/// The operator marks one contact and one later toe-off on the toe
/// trajectory; the height difference between the two becomes the detection
/// threshold. The workflow is a single explicit state machine mutated only
/// by discrete operator actions; illegal transitions are rejected with a
/// typed error and leave the state untouched.
///
/// Once calibrated, `scan_interval` walks the whole interval: it looks for
/// a stable (grounded) region as the next contact, then searches forward
/// for the upward displacement that marks the matching toe-off.

use thiserror::Error;
use tracing::debug;

use crate::config::ScanTuning;
use crate::models::gait::GaitEvents;
use crate::models::landmark::{BodyLandmark, Frame};
use crate::models::trajectory::{ToeTrajectory, ToeTrajectoryPoint};

/// Minimum visibility for an ankle landmark to corroborate a toe-off.
const MIN_ANKLE_VISIBILITY: f64 = 0.5;

#[derive(Error, Debug, PartialEq)]
pub enum CalibrationError {
    #[error("A contact frame is already marked; mark the toe-off or reset")]
    ContactAlreadyMarked,
    #[error("Mark a contact frame before marking a toe-off")]
    ContactNotMarked,
    #[error("Toe-off frame {toe_off} must be after contact frame {contact}")]
    ToeOffNotAfterContact { contact: usize, toe_off: usize },
    #[error("Frame {0} has no trajectory height")]
    UnknownFrame(usize),
    #[error("Rescale ratio {0} is outside the allowed range 0.5-2.0")]
    RatioOutOfRange(f64),
    #[error("Calibration is not complete")]
    NotCalibrated,
}

/// A completed calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub contact_frame: usize,
    pub toe_off_frame: usize,
    /// Frozen at calibration time; rescaling never touches it.
    pub base_threshold: f64,
    /// Active detection threshold, `base_threshold` × the rescale ratio.
    pub threshold: f64,
}

/// Operator-driven calibration state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationState {
    AwaitingContact,
    AwaitingToeOff {
        contact_frame: usize,
        contact_height: f64,
    },
    Calibrated(Calibration),
}

impl CalibrationState {
    /// Pure transition: accept the operator's contact mark.
    fn mark_contact(self, frame: usize, height: f64) -> Result<Self, CalibrationError> {
        match self {
            CalibrationState::AwaitingContact => Ok(CalibrationState::AwaitingToeOff {
                contact_frame: frame,
                contact_height: height,
            }),
            _ => Err(CalibrationError::ContactAlreadyMarked),
        }
    }

    /// Pure transition: accept the operator's toe-off mark.
    fn mark_toe_off(self, frame: usize, height: f64) -> Result<Self, CalibrationError> {
        match self {
            CalibrationState::AwaitingToeOff {
                contact_frame,
                contact_height,
            } => {
                if frame <= contact_frame {
                    return Err(CalibrationError::ToeOffNotAfterContact {
                        contact: contact_frame,
                        toe_off: frame,
                    });
                }
                let threshold = (contact_height - height).abs();
                Ok(CalibrationState::Calibrated(Calibration {
                    contact_frame,
                    toe_off_frame: frame,
                    base_threshold: threshold,
                    threshold,
                }))
            }
            _ => Err(CalibrationError::ContactNotMarked),
        }
    }

    /// Pure transition: rescale the active threshold without recalibrating.
    fn rescale(self, ratio: f64) -> Result<Self, CalibrationError> {
        if !ratio.is_finite() || !(0.5..=2.0).contains(&ratio) {
            return Err(CalibrationError::RatioOutOfRange(ratio));
        }
        match self {
            CalibrationState::Calibrated(calibration) => {
                Ok(CalibrationState::Calibrated(Calibration {
                    threshold: calibration.base_threshold * ratio,
                    ..calibration
                }))
            }
            _ => Err(CalibrationError::NotCalibrated),
        }
    }
}

/// The calibration workflow plus the calibrated full-interval scan.
pub struct CalibrationSession {
    state: CalibrationState,
    tuning: ScanTuning,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self::with_tuning(ScanTuning::default())
    }

    pub fn with_tuning(tuning: ScanTuning) -> Self {
        Self {
            state: CalibrationState::AwaitingContact,
            tuning,
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        match &self.state {
            CalibrationState::Calibrated(calibration) => Some(calibration),
            _ => None,
        }
    }

    /// Operator action: mark the grounded frame of a reference stride.
    pub fn mark_contact(
        &mut self,
        trajectory: &ToeTrajectory,
        frame: usize,
    ) -> Result<(), CalibrationError> {
        let height = trajectory
            .height_at(frame)
            .ok_or(CalibrationError::UnknownFrame(frame))?;
        self.state = self.state.mark_contact(frame, height)?;
        Ok(())
    }

    /// Operator action: mark the airborne frame completing the reference
    /// stride. Completes calibration.
    pub fn mark_toe_off(
        &mut self,
        trajectory: &ToeTrajectory,
        frame: usize,
    ) -> Result<(), CalibrationError> {
        let height = trajectory
            .height_at(frame)
            .ok_or(CalibrationError::UnknownFrame(frame))?;
        self.state = self.state.mark_toe_off(frame, height)?;

        if let CalibrationState::Calibrated(calibration) = &self.state {
            debug!(
                threshold = calibration.threshold,
                contact = calibration.contact_frame,
                toe_off = calibration.toe_off_frame,
                "calibration complete"
            );
        }
        Ok(())
    }

    /// Operator action: rescale the active threshold to ratio × base.
    pub fn rescale_threshold(&mut self, ratio: f64) -> Result<(), CalibrationError> {
        self.state = self.state.rescale(ratio)?;
        Ok(())
    }

    /// Operator action: discard the calibration and start over.
    pub fn reset(&mut self) {
        self.state = CalibrationState::AwaitingContact;
    }

    /// Calibrated automatic scan over `[start_frame, end_frame]`.
    ///
    /// Missing trajectory data inside the interval is simply skipped; zero
    /// detected strides is a normal empty result.
    pub fn scan_interval(
        &self,
        trajectory: &ToeTrajectory,
        frames: &[Frame],
        start_frame: usize,
        end_frame: usize,
    ) -> Result<GaitEvents, CalibrationError> {
        let calibration = self.calibration().ok_or(CalibrationError::NotCalibrated)?;

        let points = &trajectory.points;
        let Some(start_idx) = points.iter().position(|p| p.frame >= start_frame) else {
            return Ok(GaitEvents::default());
        };
        let end_idx = match points.iter().rposition(|p| p.frame <= end_frame) {
            Some(idx) if idx >= start_idx => idx,
            _ => return Ok(GaitEvents::default()),
        };

        let mut contacts = Vec::new();
        let mut toe_offs = Vec::new();
        let mut cursor = start_idx;

        while cursor <= end_idx {
            let Some(contact_idx) = self.find_stable_region(points, cursor, end_idx, calibration)
            else {
                break;
            };
            contacts.push(points[contact_idx].frame);

            match self.find_toe_off(points, frames, contact_idx, end_idx, calibration) {
                Some(toe_off_idx) => {
                    toe_offs.push(points[toe_off_idx].frame);
                    cursor = toe_off_idx + self.tuning.resume_after_toe_off;
                }
                None => {
                    cursor = contact_idx + self.tuning.resume_after_contact;
                }
            }
        }

        debug!(
            contacts = contacts.len(),
            toe_offs = toe_offs.len(),
            start_frame,
            end_frame,
            "calibrated scan finished"
        );

        Ok(GaitEvents::new(contacts, toe_offs))
    }

    /// First index in `[from, end]` whose foot-tip height stays within the
    /// stability gate averaged over the lookahead window.
    fn find_stable_region(
        &self,
        points: &[ToeTrajectoryPoint],
        from: usize,
        end: usize,
        calibration: &Calibration,
    ) -> Option<usize> {
        let gate = self.tuning.stable_ratio * calibration.base_threshold;

        for idx in from..=end {
            let window_end = (idx + self.tuning.stable_window_frames).min(end);
            if window_end == idx {
                break;
            }
            let mean_change = (idx + 1..=window_end)
                .map(|k| (points[k].height - points[idx].height).abs())
                .sum::<f64>()
                / (window_end - idx) as f64;
            if mean_change < gate {
                return Some(idx);
            }
        }
        None
    }

    /// Frame of maximal upward displacement after a contact, within the
    /// lookahead window. Displacement must clear the detection gate while
    /// the ankle rises; reaching the early-confirm level stops the search
    /// immediately.
    fn find_toe_off(
        &self,
        points: &[ToeTrajectoryPoint],
        frames: &[Frame],
        contact_idx: usize,
        end: usize,
        calibration: &Calibration,
    ) -> Option<usize> {
        let gate = self.tuning.toe_off_ratio * calibration.threshold;
        let early = self.tuning.early_confirm_ratio * calibration.threshold;
        let contact_height = points[contact_idx].height;
        let window_end = (contact_idx + self.tuning.toe_off_lookahead_frames).min(end);

        let mut best: Option<(usize, f64)> = None;
        for idx in contact_idx + 1..=window_end {
            let displacement = contact_height - points[idx].height;
            if displacement < gate {
                continue;
            }
            if !ankle_rising(frames, points[idx].frame) {
                continue;
            }
            if best.map_or(true, |(_, d)| displacement > d) {
                best = Some((idx, displacement));
            }
            if displacement >= early {
                break;
            }
        }

        best.map(|(idx, _)| idx)
    }
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Ankle corroboration for a toe-off candidate: the ankle must be moving
/// up (image y shrinking) into this frame. Frames without confident ankle
/// landmarks cannot veto a candidate.
fn ankle_rising(frames: &[Frame], frame_number: usize) -> bool {
    let Some(curr_pos) = frames.iter().position(|f| f.frame_number == frame_number) else {
        return true;
    };
    if curr_pos == 0 {
        return true;
    }

    let (prev, curr) = (&frames[curr_pos - 1], &frames[curr_pos]);
    match (ankle_height(prev), ankle_height(curr)) {
        (Some(before), Some(after)) => after < before,
        _ => true,
    }
}

/// Lower value of the two confident ankle ys, mirroring the foot-tip rule.
fn ankle_height(frame: &Frame) -> Option<f64> {
    let left = frame.get(BodyLandmark::LeftAnkle)?;
    let right = frame.get(BodyLandmark::RightAnkle)?;
    if left.visibility < MIN_ANKLE_VISIBILITY || right.visibility < MIN_ANKLE_VISIBILITY {
        return None;
    }
    Some(left.y.min(right.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn trajectory_from_heights(heights: &[f64]) -> ToeTrajectory {
        ToeTrajectory {
            points: heights
                .iter()
                .enumerate()
                .map(|(frame, &height)| ToeTrajectoryPoint {
                    frame,
                    height,
                    velocity: 0.0,
                    is_descending: false,
                    is_lowest: false,
                    is_rising: false,
                })
                .collect(),
            stats: None,
        }
    }

    /// Heights repeating every 13 frames: grounded at 0.50 on phases 9-12,
    /// a sharp airborne minimum of 0.32 at phase 5.
    fn periodic_trajectory(len: usize) -> ToeTrajectory {
        let pattern = [
            0.49, 0.46, 0.43, 0.40, 0.34, 0.32, 0.35, 0.40, 0.45, 0.50, 0.50, 0.50, 0.50,
        ];
        let heights: Vec<f64> = (0..len).map(|i| pattern[i % pattern.len()]).collect();
        trajectory_from_heights(&heights)
    }

    fn calibrated_session(trajectory: &ToeTrajectory) -> CalibrationSession {
        let mut session = CalibrationSession::new();
        session.mark_contact(trajectory, 10).unwrap();
        session.mark_toe_off(trajectory, 16).unwrap();
        session
    }

    #[test]
    fn test_round_trip_threshold() {
        let mut heights = vec![0.50; 20];
        heights[16] = 0.40;
        let trajectory = trajectory_from_heights(&heights);

        let session = calibrated_session(&trajectory);
        let calibration = session.calibration().unwrap();
        assert!((calibration.threshold - 0.10).abs() < 1e-9);
        assert!((calibration.base_threshold - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_rescale_scales_active_threshold_only() {
        let mut heights = vec![0.50; 20];
        heights[16] = 0.40;
        let trajectory = trajectory_from_heights(&heights);

        let mut session = calibrated_session(&trajectory);
        session.rescale_threshold(1.5).unwrap();

        let calibration = session.calibration().unwrap();
        assert!((calibration.threshold - 0.15).abs() < 1e-9);
        assert!((calibration.base_threshold - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_rescale_out_of_range_rejected() {
        let mut heights = vec![0.50; 20];
        heights[16] = 0.40;
        let trajectory = trajectory_from_heights(&heights);

        let mut session = calibrated_session(&trajectory);
        assert_matches!(
            session.rescale_threshold(2.5),
            Err(CalibrationError::RatioOutOfRange(_))
        );
        // State untouched.
        assert!((session.calibration().unwrap().threshold - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_toe_off_before_contact_rejected() {
        let trajectory = trajectory_from_heights(&[0.5; 20]);
        let mut session = CalibrationSession::new();
        session.mark_contact(&trajectory, 10).unwrap();

        assert_matches!(
            session.mark_toe_off(&trajectory, 10),
            Err(CalibrationError::ToeOffNotAfterContact { .. })
        );
        assert_matches!(session.state(), CalibrationState::AwaitingToeOff { .. });
    }

    #[test]
    fn test_out_of_order_actions_rejected() {
        let trajectory = trajectory_from_heights(&[0.5; 20]);
        let mut session = CalibrationSession::new();

        assert_matches!(
            session.mark_toe_off(&trajectory, 5),
            Err(CalibrationError::ContactNotMarked)
        );
        assert_matches!(
            session.rescale_threshold(1.0),
            Err(CalibrationError::NotCalibrated)
        );

        session.mark_contact(&trajectory, 3).unwrap();
        assert_matches!(
            session.mark_contact(&trajectory, 4),
            Err(CalibrationError::ContactAlreadyMarked)
        );
    }

    #[test]
    fn test_reset_returns_to_awaiting_contact() {
        let trajectory = trajectory_from_heights(&[0.5; 20]);
        let mut session = CalibrationSession::new();
        session.mark_contact(&trajectory, 3).unwrap();
        session.reset();
        assert_matches!(session.state(), CalibrationState::AwaitingContact);
    }

    #[test]
    fn test_scan_requires_calibration() {
        let trajectory = periodic_trajectory(61);
        let session = CalibrationSession::new();
        assert_matches!(
            session.scan_interval(&trajectory, &[], 0, 60),
            Err(CalibrationError::NotCalibrated)
        );
    }

    #[test]
    fn test_scan_finds_periodic_contacts() {
        let trajectory = periodic_trajectory(61);
        let mut session = CalibrationSession::new();
        // Calibrate on the first stride: grounded 0.50 at frame 10,
        // already airborne at 0.40 by frame 16.
        session.mark_contact(&trajectory, 10).unwrap();
        session.mark_toe_off(&trajectory, 16).unwrap();
        assert!((session.calibration().unwrap().threshold - 0.10).abs() < 1e-9);

        let events = session.scan_interval(&trajectory, &[], 0, 60).unwrap();

        let expected = [10_usize, 23, 36, 49];
        assert_eq!(events.contact_frames.len(), expected.len());
        for (found, wanted) in events.contact_frames.iter().zip(expected) {
            assert!(
                found.abs_diff(wanted) <= 1,
                "contact {} not within 1 frame of {}",
                found,
                wanted
            );
        }
        assert!(events.is_well_ordered());
        assert_eq!(events.toe_off_frames.len(), expected.len());
    }

    #[test]
    fn test_scan_on_flat_signal_is_empty_or_unpaired() {
        let mut heights = vec![0.50; 40];
        heights[16] = 0.40;
        let trajectory = trajectory_from_heights(&heights);
        let session = calibrated_session(&trajectory);

        // A signal that never leaves the ground produces contacts without
        // toe-offs at worst; it must never produce a crash or a disordered
        // event set.
        let events = session.scan_interval(&trajectory, &[], 0, 39).unwrap();
        assert!(events.is_well_ordered());
        assert!(events.toe_off_frames.len() <= events.contact_frames.len());
    }
}
