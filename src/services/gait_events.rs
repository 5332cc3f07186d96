/// Gait Event Detector
///
/// Emits candidate contact and toe-off frames from two independent
/// strategies and reconciles them:
/// - (a) trajectory-based: rising edges of the toe trajectory's
///   `is_lowest` (contact) and `is_rising` (toe-off) flags;
/// - (b) joint-angle-based auxiliary: large inter-frame knee-flexion
///   change flags a contact, an opening ankle angle flags a toe-off.
///
/// The merge keeps every trajectory-based candidate and admits an
/// auxiliary candidate only when no trajectory-based candidate lies within
/// the tolerance window. Output sequences are sorted, duplicate-free and
/// strictly increasing.

use tracing::debug;

use crate::config::DetectorTuning;
use crate::models::gait::GaitEvents;
use crate::models::landmark::{BodyLandmark, Frame};
use crate::models::trajectory::ToeTrajectory;
use crate::services::joint_angles::interior_angle_deg;

pub struct GaitEventDetector {
    tuning: DetectorTuning,
}

impl GaitEventDetector {
    pub fn new() -> Self {
        Self::with_tuning(DetectorTuning::default())
    }

    pub fn with_tuning(tuning: DetectorTuning) -> Self {
        Self { tuning }
    }

    /// Detect gait events from a toe trajectory and its source frames.
    ///
    /// Either input may be degenerate; the result is then simply empty.
    pub fn detect(&self, trajectory: &ToeTrajectory, frames: &[Frame]) -> GaitEvents {
        let (contacts, toe_offs) = trajectory_candidates(trajectory);
        let (aux_contacts, aux_toe_offs) = self.joint_angle_candidates(frames);

        let merged_contacts = merge_candidates(contacts, &aux_contacts, self.tuning.merge_tolerance_frames);
        let merged_toe_offs = merge_candidates(toe_offs, &aux_toe_offs, self.tuning.merge_tolerance_frames);

        debug!(
            contacts = merged_contacts.len(),
            toe_offs = merged_toe_offs.len(),
            aux_contacts = aux_contacts.len(),
            aux_toe_offs = aux_toe_offs.len(),
            "gait events detected"
        );

        GaitEvents::new(merged_contacts, merged_toe_offs)
    }

    /// Auxiliary candidates from per-frame joint-angle deltas.
    ///
    /// Frames with missing or low-confidence landmarks contribute nothing;
    /// they never abort the pass.
    fn joint_angle_candidates(&self, frames: &[Frame]) -> (Vec<usize>, Vec<usize>) {
        let mut contacts = Vec::new();
        let mut toe_offs = Vec::new();

        for pair in frames.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);

            if let Some(delta) = self.largest_knee_delta(prev, curr) {
                if delta > self.tuning.knee_delta_deg {
                    contacts.push(curr.frame_number);
                }
            }

            if self.ankle_opened(prev, curr) {
                toe_offs.push(curr.frame_number);
            }
        }

        (contacts, toe_offs)
    }

    /// Larger of the two legs' inter-frame knee-flexion change, degrees.
    fn largest_knee_delta(&self, prev: &Frame, curr: &Frame) -> Option<f64> {
        let legs = [
            (BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle),
            (BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle),
        ];

        legs.iter()
            .filter_map(|&(hip, knee, ankle)| {
                let before = self.gated_interior(prev, hip, knee, ankle)?;
                let after = self.gated_interior(curr, hip, knee, ankle)?;
                Some((after - before).abs())
            })
            .fold(None, |best, delta| Some(best.map_or(delta, |b: f64| b.max(delta))))
    }

    /// True when either ankle's knee–ankle–toe included angle opened by
    /// more than the tuned delta between the two frames.
    fn ankle_opened(&self, prev: &Frame, curr: &Frame) -> bool {
        let legs = [
            (BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle, BodyLandmark::LeftFootIndex),
            (BodyLandmark::RightKnee, BodyLandmark::RightAnkle, BodyLandmark::RightFootIndex),
        ];

        legs.iter().any(|&(knee, ankle, toe)| {
            match (
                self.gated_interior(prev, knee, ankle, toe),
                self.gated_interior(curr, knee, ankle, toe),
            ) {
                (Some(before), Some(after)) => after - before > self.tuning.ankle_delta_deg,
                _ => false,
            }
        })
    }

    /// Interior angle at `joint`, present only when all three landmarks
    /// clear the visibility gate.
    fn gated_interior(
        &self,
        frame: &Frame,
        a: BodyLandmark,
        joint: BodyLandmark,
        c: BodyLandmark,
    ) -> Option<f64> {
        if !frame.all_visible(&[a, joint, c], self.tuning.min_joint_visibility) {
            return None;
        }
        interior_angle_deg(frame.get(a)?, frame.get(joint)?, frame.get(c)?)
    }
}

impl Default for GaitEventDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Rising edges of the trajectory classification flags.
fn trajectory_candidates(trajectory: &ToeTrajectory) -> (Vec<usize>, Vec<usize>) {
    let points = &trajectory.points;
    let mut contacts = Vec::new();
    let mut toe_offs = Vec::new();

    for i in 0..points.len() {
        let prev_lowest = i > 0 && points[i - 1].is_lowest;
        if points[i].is_lowest && !prev_lowest {
            contacts.push(points[i].frame);
        }

        let prev_rising = i > 0 && points[i - 1].is_rising;
        if points[i].is_rising && !prev_rising {
            toe_offs.push(points[i].frame);
        }
    }

    (contacts, toe_offs)
}

/// Keep every primary candidate; admit an auxiliary candidate only when no
/// primary candidate lies within `tolerance` frames of it.
fn merge_candidates(primary: Vec<usize>, auxiliary: &[usize], tolerance: usize) -> Vec<usize> {
    let mut merged = primary;

    for &candidate in auxiliary {
        let shadowed = merged
            .iter()
            .any(|&existing| existing.abs_diff(candidate) <= tolerance);
        if !shadowed {
            merged.push(candidate);
        }
    }

    merged.sort_unstable();
    merged.dedup();
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trajectory::ToeTrajectoryPoint;

    fn point(frame: usize, is_lowest: bool, is_rising: bool) -> ToeTrajectoryPoint {
        ToeTrajectoryPoint {
            frame,
            height: 0.5,
            velocity: 0.0,
            is_descending: false,
            is_lowest,
            is_rising,
        }
    }

    fn trajectory_from_flags(flags: &[(bool, bool)]) -> ToeTrajectory {
        ToeTrajectory {
            points: flags
                .iter()
                .enumerate()
                .map(|(i, &(lowest, rising))| point(i, lowest, rising))
                .collect(),
            stats: None,
        }
    }

    #[test]
    fn test_rising_edges_only() {
        // Two-frame plateaus must yield a single event each.
        let trajectory = trajectory_from_flags(&[
            (true, false),
            (true, false),
            (false, true),
            (false, true),
            (false, false),
            (true, false),
        ]);
        let events = GaitEventDetector::new().detect(&trajectory, &[]);
        assert_eq!(events.contact_frames, vec![0, 5]);
        assert_eq!(events.toe_off_frames, vec![2]);
    }

    #[test]
    fn test_merge_drops_nearby_auxiliary() {
        let merged = merge_candidates(vec![10, 30], &[13, 25, 37], 5);
        // 13 is within 5 of 10 and 25/37 within 5 of 30: primary survives.
        assert_eq!(merged, vec![10, 30]);
    }

    #[test]
    fn test_merge_admits_distant_auxiliary() {
        let merged = merge_candidates(vec![10], &[20, 3], 5);
        assert_eq!(merged, vec![3, 10, 20]);
    }

    #[test]
    fn test_merge_result_strictly_increasing() {
        let merged = merge_candidates(vec![10, 10, 4], &[4, 22, 22], 5);
        assert!(merged.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_inputs_yield_empty_events() {
        let events = GaitEventDetector::new().detect(&ToeTrajectory::default(), &[]);
        assert!(events.is_empty());
        assert!(events.is_well_ordered());
    }

    #[test]
    fn test_missing_landmarks_never_crash_auxiliary_pass() {
        let frames = vec![Frame::empty(0, 0.0), Frame::empty(1, 0.03)];
        let events = GaitEventDetector::new().detect(&ToeTrajectory::default(), &frames);
        assert!(events.is_empty());
    }
}
