/// Skeletal landmark models
///
/// Canonical per-frame skeleton representation produced by the upstream
/// pose-estimation provider: 33 named body landmarks with image-normalized
/// coordinates and a per-landmark detection confidence.

use serde::{Deserialize, Serialize};

/// Number of landmarks the upstream provider emits per detected frame.
pub const LANDMARK_COUNT: usize = 33;

/// A single estimated body landmark.
///
/// Coordinates are image-normalized (x and y in [0, 1] for points inside
/// the frame, y growing downward). `z` is the provider's relative depth
/// estimate and is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Detection confidence in [0, 1].
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Check whether this landmark clears a confidence threshold.
    pub fn is_visible(&self, min_visibility: f64) -> bool {
        self.visibility >= min_visibility
    }

    /// Euclidean distance to another landmark in the image plane.
    pub fn distance_to(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Fixed anatomical landmark indices (33-point BlazePose layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Get landmark name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

/// A single frame of the input sequence.
///
/// `landmarks` is `None` when the upstream detection failed for this frame.
/// A failed detection is the expected common case under partial tracking
/// loss and must propagate as "unknown", never default to zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Position in the sequence. Strictly increasing, no index gaps.
    pub frame_number: usize,
    /// Capture time in seconds from sequence start.
    pub timestamp_s: f64,
    /// All 33 landmarks, or `None` for a failed detection.
    pub landmarks: Option<Vec<Landmark>>,
}

impl Frame {
    pub fn new(frame_number: usize, timestamp_s: f64, landmarks: Option<Vec<Landmark>>) -> Self {
        Self {
            frame_number,
            timestamp_s,
            landmarks,
        }
    }

    /// Frame with no detection.
    pub fn empty(frame_number: usize, timestamp_s: f64) -> Self {
        Self::new(frame_number, timestamp_s, None)
    }

    /// Get a landmark by anatomical index.
    ///
    /// Returns `None` for failed detections or short landmark vectors.
    pub fn get(&self, landmark: BodyLandmark) -> Option<&Landmark> {
        self.landmarks.as_ref()?.get(landmark as usize)
    }

    /// Check that every listed landmark is present and clears the
    /// confidence threshold.
    pub fn all_visible(&self, landmarks: &[BodyLandmark], min_visibility: f64) -> bool {
        landmarks
            .iter()
            .all(|&lm| self.get(lm).map_or(false, |l| l.is_visible(min_visibility)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_landmarks(visibility: f64) -> Vec<Landmark> {
        (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(0.5, i as f64 / LANDMARK_COUNT as f64, 0.0, visibility))
            .collect()
    }

    #[test]
    fn test_landmark_visibility() {
        let lm = Landmark::new(0.5, 0.5, 0.0, 0.6);
        assert!(lm.is_visible(0.5));
        assert!(!lm.is_visible(0.7));
    }

    #[test]
    fn test_landmark_distance() {
        let a = Landmark::new(0.0, 0.0, 0.0, 1.0);
        let b = Landmark::new(0.3, 0.4, 0.0, 1.0);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_body_landmark_indices() {
        assert_eq!(BodyLandmark::LeftHip as usize, 23);
        assert_eq!(BodyLandmark::RightKnee as usize, 26);
        assert_eq!(BodyLandmark::LeftFootIndex as usize, 31);
        assert_eq!(BodyLandmark::RightFootIndex.name(), "right_foot_index");
    }

    #[test]
    fn test_frame_get_on_failed_detection() {
        let frame = Frame::empty(3, 0.1);
        assert!(frame.get(BodyLandmark::LeftAnkle).is_none());
        assert!(!frame.all_visible(&[BodyLandmark::LeftAnkle], 0.1));
    }

    #[test]
    fn test_frame_all_visible() {
        let frame = Frame::new(0, 0.0, Some(uniform_landmarks(0.8)));
        assert!(frame.all_visible(
            &[BodyLandmark::LeftHip, BodyLandmark::RightShoulder],
            0.5
        ));
        assert!(!frame.all_visible(&[BodyLandmark::LeftHip], 0.9));
    }
}
