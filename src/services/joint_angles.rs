/// Joint Angle Engine
///
/// Pure per-frame mapping from the landmark skeleton to trunk, thigh,
/// shank, knee, ankle and elbow angles plus the horizontal hip→toe offset.
///
/// Confidence gating:
/// - Hip or shoulder below 0.5 visibility on either side invalidates the
///   whole sample (all fields `None` together).
/// - Elbow angles are additionally gated per side on shoulder/elbow/wrist
///   visibility, so one arm can be `None` inside an otherwise valid sample.
///
/// Every cosine argument is clamped to [-1, 1] before `acos`; zero-length
/// vectors and near-zero scale denominators degrade to `None`, never to
/// NaN or infinity.

use crate::models::angles::{AngleSample, SideAngles};
use crate::models::landmark::{BodyLandmark, Frame, Landmark};

/// Assumed physical thigh length used as the implicit ruler when
/// converting normalized offsets to centimeters.
const REFERENCE_THIGH_CM: f64 = 50.0;

/// Below this image-plane distance a segment is too degenerate to scale by.
const MIN_SEGMENT_LENGTH: f64 = 1e-6;

pub struct JointAngleEngine {
    min_visibility: f64,
}

impl JointAngleEngine {
    pub fn new() -> Self {
        Self { min_visibility: 0.5 }
    }

    pub fn with_min_visibility(mut self, min_visibility: f64) -> Self {
        self.min_visibility = min_visibility.clamp(0.0, 1.0);
        self
    }

    /// Compute all joint angles for one frame.
    pub fn compute(&self, frame: &Frame) -> AngleSample {
        let gate = [
            BodyLandmark::LeftHip,
            BodyLandmark::RightHip,
            BodyLandmark::LeftShoulder,
            BodyLandmark::RightShoulder,
        ];
        if !frame.all_visible(&gate, self.min_visibility) {
            return AngleSample::invalid(frame.frame_number);
        }

        let trunk_deg = self.trunk_angle(frame);

        let thigh_deg = SideAngles::new(
            self.segment_angle(frame, BodyLandmark::LeftHip, BodyLandmark::LeftKnee),
            self.segment_angle(frame, BodyLandmark::RightHip, BodyLandmark::RightKnee),
        );
        let shank_deg = SideAngles::new(
            self.segment_angle(frame, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle),
            self.segment_angle(frame, BodyLandmark::RightKnee, BodyLandmark::RightAnkle),
        );
        let knee_flex_deg = SideAngles::new(
            self.flexion(
                frame,
                BodyLandmark::LeftHip,
                BodyLandmark::LeftKnee,
                BodyLandmark::LeftAnkle,
            ),
            self.flexion(
                frame,
                BodyLandmark::RightHip,
                BodyLandmark::RightKnee,
                BodyLandmark::RightAnkle,
            ),
        );
        let ankle_flex_deg = SideAngles::new(
            self.flexion(
                frame,
                BodyLandmark::LeftKnee,
                BodyLandmark::LeftAnkle,
                BodyLandmark::LeftFootIndex,
            ),
            self.flexion(
                frame,
                BodyLandmark::RightKnee,
                BodyLandmark::RightAnkle,
                BodyLandmark::RightFootIndex,
            ),
        );

        let elbow_deg = SideAngles::new(
            self.elbow_angle(
                frame,
                BodyLandmark::LeftShoulder,
                BodyLandmark::LeftElbow,
                BodyLandmark::LeftWrist,
            ),
            self.elbow_angle(
                frame,
                BodyLandmark::RightShoulder,
                BodyLandmark::RightElbow,
                BodyLandmark::RightWrist,
            ),
        );

        let toe_horizontal_cm = SideAngles::new(
            self.toe_horizontal_cm(
                frame,
                BodyLandmark::LeftHip,
                BodyLandmark::LeftKnee,
                BodyLandmark::LeftFootIndex,
            ),
            self.toe_horizontal_cm(
                frame,
                BodyLandmark::RightHip,
                BodyLandmark::RightKnee,
                BodyLandmark::RightFootIndex,
            ),
        );

        AngleSample {
            frame: frame.frame_number,
            trunk_deg,
            thigh_deg,
            shank_deg,
            knee_flex_deg,
            ankle_flex_deg,
            elbow_deg,
            toe_horizontal_cm,
        }
    }

    /// Compute angles for every frame of a sequence.
    pub fn compute_all(&self, frames: &[Frame]) -> Vec<AngleSample> {
        frames.iter().map(|frame| self.compute(frame)).collect()
    }

    /// Trunk inclination: 90° = upright, < 90° = leaning toward horizontal,
    /// normalized to [0, 180). Mirror-symmetric by construction.
    fn trunk_angle(&self, frame: &Frame) -> Option<f64> {
        let left_hip = frame.get(BodyLandmark::LeftHip)?;
        let right_hip = frame.get(BodyLandmark::RightHip)?;
        let left_shoulder = frame.get(BodyLandmark::LeftShoulder)?;
        let right_shoulder = frame.get(BodyLandmark::RightShoulder)?;

        let hip_mid_x = (left_hip.x + right_hip.x) / 2.0;
        let hip_mid_y = (left_hip.y + right_hip.y) / 2.0;
        let shoulder_mid_x = (left_shoulder.x + right_shoulder.x) / 2.0;
        let shoulder_mid_y = (left_shoulder.y + right_shoulder.y) / 2.0;

        let dx = shoulder_mid_x - hip_mid_x;
        let dy = shoulder_mid_y - hip_mid_y;
        let magnitude = (dx * dx + dy * dy).sqrt();
        if magnitude < MIN_SEGMENT_LENGTH {
            return None;
        }

        // Deviation from vertical-up; image y grows downward, so -dy points
        // toward the top of the frame.
        let lean = (-dy / magnitude).clamp(-1.0, 1.0).acos().to_degrees();
        Some(normalize_half_turn(90.0 - lean))
    }

    /// Signed angle of a body segment from vertical-down; forward (+x)
    /// deflection reads negative, rearward positive.
    fn segment_angle(&self, frame: &Frame, from: BodyLandmark, to: BodyLandmark) -> Option<f64> {
        let a = frame.get(from)?;
        let b = frame.get(to)?;
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        if (dx * dx + dy * dy).sqrt() < MIN_SEGMENT_LENGTH {
            return None;
        }
        Some(-dx.atan2(dy).to_degrees())
    }

    /// Flexion as 180° minus the interior angle at the middle landmark.
    fn flexion(
        &self,
        frame: &Frame,
        a: BodyLandmark,
        joint: BodyLandmark,
        c: BodyLandmark,
    ) -> Option<f64> {
        let interior = interior_angle_deg(frame.get(a)?, frame.get(joint)?, frame.get(c)?)?;
        Some(180.0 - interior)
    }

    /// Elbow flexion with the per-side visibility gate.
    fn elbow_angle(
        &self,
        frame: &Frame,
        shoulder: BodyLandmark,
        elbow: BodyLandmark,
        wrist: BodyLandmark,
    ) -> Option<f64> {
        if !frame.all_visible(&[shoulder, elbow, wrist], self.min_visibility) {
            return None;
        }
        self.flexion(frame, shoulder, elbow, wrist)
    }

    /// Horizontal hip→toe offset in centimeters, forward negative. Uses the
    /// subject's own hip→knee distance as an implicit ruler against the
    /// reference thigh length, so the value survives changes in camera
    /// distance.
    fn toe_horizontal_cm(
        &self,
        frame: &Frame,
        hip: BodyLandmark,
        knee: BodyLandmark,
        toe: BodyLandmark,
    ) -> Option<f64> {
        let hip_lm = frame.get(hip)?;
        let knee_lm = frame.get(knee)?;
        let toe_lm = frame.get(toe)?;

        let thigh_len = hip_lm.distance_to(knee_lm);
        if thigh_len < MIN_SEGMENT_LENGTH {
            return None;
        }

        let cm_per_unit = REFERENCE_THIGH_CM / thigh_len;
        Some(-(toe_lm.x - hip_lm.x) * cm_per_unit)
    }
}

impl Default for JointAngleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Interior angle at `joint` between `a` and `c`, degrees in [0, 180].
///
/// Returns `None` when either adjacent segment collapses to a point.
pub(crate) fn interior_angle_deg(a: &Landmark, joint: &Landmark, c: &Landmark) -> Option<f64> {
    let ja_x = a.x - joint.x;
    let ja_y = a.y - joint.y;
    let jc_x = c.x - joint.x;
    let jc_y = c.y - joint.y;

    let mag_ja = (ja_x * ja_x + ja_y * ja_y).sqrt();
    let mag_jc = (jc_x * jc_x + jc_y * jc_y).sqrt();
    if mag_ja < MIN_SEGMENT_LENGTH || mag_jc < MIN_SEGMENT_LENGTH {
        return None;
    }

    let cos_angle = (ja_x * jc_x + ja_y * jc_y) / (mag_ja * mag_jc);
    Some(cos_angle.clamp(-1.0, 1.0).acos().to_degrees())
}

/// Map an angle into [0, 180).
fn normalize_half_turn(angle: f64) -> f64 {
    let wrapped = angle % 180.0;
    if wrapped < 0.0 {
        wrapped + 180.0
    } else {
        wrapped
    }
}
