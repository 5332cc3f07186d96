use pretty_assertions::assert_eq;

use stride_coach::models::{AnalysisMode, BodyLandmark, Frame, Gender, Landmark, StridePhase};
use stride_coach::services::{CalibrationSession, JointAngleEngine, RunAnalysisService};
use stride_coach::{AnalysisConfig, AnalysisSnapshot};

const LANDMARK_COUNT: usize = 33;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Foot-tip height pattern repeating every 13 frames: grounded at 0.95,
/// sharp airborne minimum at 0.77.
const FOOT_PATTERN: [f64; 13] = [
    0.94, 0.91, 0.88, 0.85, 0.79, 0.77, 0.80, 0.85, 0.90, 0.95, 0.95, 0.95, 0.95,
];

/// A synthetic runner moving through the frame: upright trunk, legs
/// swinging with the stride cycle, steady forward drift.
///
/// Knee and foot-tip visibility sit just under the joint gate so the
/// auxiliary angle-based detector stays quiet and the trajectory method
/// is exercised alone; ankles stay confident for stride-length data.
fn running_frames(count: usize) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let phase = i % FOOT_PATTERN.len();
            let foot_y = FOOT_PATTERN[phase];
            let swing = (2.0 * std::f64::consts::PI * i as f64 / 13.0).sin();
            let drift = 0.004 * i as f64;

            let mut landmarks = vec![Landmark::new(0.0, 0.0, 0.0, 0.0); LANDMARK_COUNT];
            let mut set = |lm: BodyLandmark, x: f64, y: f64, visibility: f64| {
                landmarks[lm as usize] = Landmark::new(x + drift, y, 0.0, visibility);
            };

            set(BodyLandmark::LeftShoulder, 0.48, 0.28, 0.9);
            set(BodyLandmark::RightShoulder, 0.52, 0.28, 0.9);
            set(BodyLandmark::LeftElbow, 0.54, 0.38, 0.9);
            set(BodyLandmark::RightElbow, 0.46, 0.38, 0.9);
            set(BodyLandmark::LeftWrist, 0.57, 0.30, 0.9);
            set(BodyLandmark::RightWrist, 0.43, 0.30, 0.9);
            set(BodyLandmark::LeftHip, 0.48, 0.50, 0.9);
            set(BodyLandmark::RightHip, 0.52, 0.50, 0.9);
            set(BodyLandmark::LeftKnee, 0.50 + 0.08 * swing, 0.64, 0.45);
            set(BodyLandmark::RightKnee, 0.50 - 0.08 * swing, 0.64, 0.45);
            set(BodyLandmark::LeftAnkle, 0.50 + 0.10 * swing, foot_y - 0.04, 0.9);
            set(BodyLandmark::RightAnkle, 0.50 - 0.10 * swing, foot_y - 0.02, 0.9);
            set(BodyLandmark::LeftFootIndex, 0.51 + 0.10 * swing, foot_y, 0.45);
            set(BodyLandmark::RightFootIndex, 0.49 - 0.10 * swing, foot_y + 0.02, 0.45);

            Frame::new(i, i as f64 / 30.0, Some(landmarks))
        })
        .collect()
}

fn config() -> AnalysisConfig {
    AnalysisConfig::new(30.0, 10.0, AnalysisMode::TopSpeed)
        .unwrap()
        .with_athlete(Some(180.0), Some(Gender::Male))
        .unwrap()
}

fn assert_snapshot_sane(snapshot: &AnalysisSnapshot) {
    assert!(snapshot.events.is_well_ordered());

    for stride in &snapshot.strides {
        for duration in [
            stride.contact_time_s,
            stride.flight_time_s,
            stride.step_time_s,
        ] {
            if let Some(value) = duration {
                assert!(value > 0.0 && value.is_finite());
            }
        }
        if let Some(length) = stride.stride_length_m {
            assert!(length > 0.0 && length.is_finite());
        }
        if let Some(speed) = stride.speed_mps {
            assert!(speed > 0.0 && speed.is_finite());
        }
    }

    if let Some(stats) = &snapshot.trajectory_stats {
        assert!(stats.mean.is_finite());
        assert!(stats.range.is_finite());
        assert!(stats.velocity_threshold.is_finite());
    }
    assert!(snapshot.evaluation.avg_score.is_finite());
}

#[test]
fn automatic_analysis_produces_full_snapshot() {
    init_tracing();
    let service = RunAnalysisService::new(running_frames(61), config());
    let snapshot = service.analyze();

    assert_eq!(snapshot.frame_count, 61);
    assert_snapshot_sane(&snapshot);

    // One contact per 13-frame stride cycle.
    assert_eq!(snapshot.events.contact_frames.len(), 5);
    assert_eq!(snapshot.strides.len(), 5);

    // Steady drift splits the reference distance evenly over the strides
    // that close with a next contact.
    let measured: Vec<f64> = snapshot
        .strides
        .iter()
        .filter_map(|s| s.stride_length_m)
        .collect();
    assert_eq!(measured.len(), 4);
    for length in measured {
        assert!((length - 2.5).abs() < 1e-6);
    }

    // Every closed stride steps one full cycle.
    for stride in snapshot.strides.iter().take(4) {
        assert!((stride.step_time_s.unwrap() - 13.0 / 30.0).abs() < 1e-9);
    }

    // All three phases are sampled for every stride.
    let initial_count = snapshot
        .phase_samples
        .iter()
        .filter(|s| s.phase == StridePhase::Initial)
        .count();
    assert_eq!(initial_count, 5);
    assert_eq!(snapshot.phase_samples.len(), 15);

    // The runner is upright, so posture scores at the top of the band.
    let posture = snapshot
        .evaluation
        .findings
        .iter()
        .find(|f| format!("{}", f.category) == "posture")
        .expect("posture should be evaluable");
    assert!(posture.message.contains("90.0"));

    // Findings are ranked worst first.
    let ordinals: Vec<f64> = snapshot
        .evaluation
        .findings
        .iter()
        .map(|f| f.score.ordinal())
        .collect();
    assert!(ordinals.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn calibrated_analysis_matches_expected_period() {
    init_tracing();
    let service = RunAnalysisService::new(running_frames(61), config());
    let trajectory = service.trajectory();

    let mut session = CalibrationSession::new();
    session.mark_contact(&trajectory, 10).unwrap();
    session.mark_toe_off(&trajectory, 16).unwrap();

    let snapshot = service.analyze_calibrated(&session, 0, 60).unwrap();
    assert_snapshot_sane(&snapshot);

    assert_eq!(snapshot.events.contact_frames.len(), 4);
    for (found, wanted) in snapshot
        .events
        .contact_frames
        .iter()
        .zip([10_usize, 23, 36, 49])
    {
        assert!(
            found.abs_diff(wanted) <= 1,
            "contact {} too far from {}",
            found,
            wanted
        );
    }
    assert!(!snapshot.strides.is_empty());
}

#[test]
fn snapshot_serializes_and_round_trips() {
    let service = RunAnalysisService::new(running_frames(61), config());
    let snapshot = service.analyze();

    let json = serde_json::to_string(&snapshot).expect("snapshot must serialize");
    let back: AnalysisSnapshot = serde_json::from_str(&json).expect("snapshot must deserialize");

    assert_eq!(back.frame_count, snapshot.frame_count);
    assert_eq!(back.strides.len(), snapshot.strides.len());
    assert_eq!(back.events, snapshot.events);
}

#[test]
fn reanalysis_recomputes_from_scratch() {
    let service = RunAnalysisService::new(running_frames(61), config());
    let first = service.analyze();
    let second = service.analyze();

    // Fresh snapshot identity, identical derived content.
    assert_ne!(first.id, second.id);
    assert_eq!(first.events, second.events);
    assert_eq!(first.strides.len(), second.strides.len());
}

#[test]
fn low_confidence_hips_invalidate_every_angle() {
    let mut frames = running_frames(20);
    for frame in frames.iter_mut() {
        if let Some(landmarks) = frame.landmarks.as_mut() {
            landmarks[BodyLandmark::LeftHip as usize].visibility = 0.2;
        }
    }

    let engine = JointAngleEngine::new();
    for frame in &frames {
        let sample = engine.compute(frame);
        assert!(sample.is_invalid());
    }
}

#[test]
fn all_zero_input_degrades_to_empty_snapshot() {
    let frames: Vec<Frame> = (0..30)
        .map(|i| {
            Frame::new(
                i,
                i as f64 / 30.0,
                Some(vec![Landmark::new(0.0, 0.0, 0.0, 0.0); LANDMARK_COUNT]),
            )
        })
        .collect();

    let service = RunAnalysisService::new(frames, config());
    let snapshot = service.analyze();

    assert!(snapshot.is_empty());
    assert!(snapshot.trajectory_stats.is_none());
    assert!(snapshot.evaluation.findings.is_empty());
    serde_json::to_string(&snapshot).expect("empty snapshot must serialize");
}

#[test]
fn short_sequence_is_normal_empty_result() {
    let service = RunAnalysisService::new(running_frames(10), config());
    let snapshot = service.analyze();

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.frame_count, 10);
}
