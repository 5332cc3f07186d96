/// Run analysis pipeline
///
/// Composes the engines into the session-grain flow: landmark source →
/// toe trajectory → gait events (automatic, or a calibrated scan) → joint
/// angles → stride metrics → phase samples → evaluation, bundled into one
/// immutable `AnalysisSnapshot`.
///
/// The pose provider is an explicit capability injected at construction.
/// The core never resolves it through any ambient or global lookup, which
/// keeps the whole pipeline testable with a stub source.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{AnalysisConfig, DetectorTuning, TrajectoryTuning};
use crate::models::gait::GaitEvents;
use crate::models::landmark::{Frame, Landmark};
use crate::models::snapshot::AnalysisSnapshot;
use crate::models::trajectory::ToeTrajectory;
use crate::services::calibration::{CalibrationError, CalibrationSession};
use crate::services::evaluation::EvaluationEngine;
use crate::services::gait_events::GaitEventDetector;
use crate::services::joint_angles::JointAngleEngine;
use crate::services::phase_angles::PhaseAngleSampler;
use crate::services::stride_metrics::StrideMetricBuilder;
use crate::services::toe_trajectory::ToeTrajectoryAnalyzer;

/// Sequences shorter than this cannot carry a full stride.
const MIN_SEQUENCE_FRAMES: usize = 15;

/// The injected pose capability: landmarks for one frame at a time.
///
/// The upstream provider may be asynchronous internally, but it must be
/// fully resolved before the core runs; this interface is batch-in.
pub trait LandmarkSource {
    /// Number of frames in the sequence.
    fn frame_count(&self) -> usize;
    /// Landmarks for a frame, `None` when detection failed there.
    fn landmarks_for_frame(&self, frame_number: usize) -> Option<&[Landmark]>;
    /// Capture timestamp of a frame, seconds from sequence start.
    fn timestamp_s(&self, frame_number: usize) -> f64;
}

impl LandmarkSource for [Frame] {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn landmarks_for_frame(&self, frame_number: usize) -> Option<&[Landmark]> {
        self.iter()
            .find(|f| f.frame_number == frame_number)?
            .landmarks
            .as_deref()
    }

    fn timestamp_s(&self, frame_number: usize) -> f64 {
        self.iter()
            .find(|f| f.frame_number == frame_number)
            .map(|f| f.timestamp_s)
            .unwrap_or(0.0)
    }
}

impl LandmarkSource for Vec<Frame> {
    fn frame_count(&self) -> usize {
        self.as_slice().frame_count()
    }

    fn landmarks_for_frame(&self, frame_number: usize) -> Option<&[Landmark]> {
        self.as_slice().landmarks_for_frame(frame_number)
    }

    fn timestamp_s(&self, frame_number: usize) -> f64 {
        self.as_slice().timestamp_s(frame_number)
    }
}

pub struct RunAnalysisService<S: LandmarkSource> {
    source: S,
    config: AnalysisConfig,
    trajectory_analyzer: ToeTrajectoryAnalyzer,
    detector: GaitEventDetector,
    angle_engine: JointAngleEngine,
}

impl<S: LandmarkSource> RunAnalysisService<S> {
    pub fn new(source: S, config: AnalysisConfig) -> Self {
        Self {
            source,
            config,
            trajectory_analyzer: ToeTrajectoryAnalyzer::new(),
            detector: GaitEventDetector::new(),
            angle_engine: JointAngleEngine::new(),
        }
    }

    pub fn with_tuning(
        source: S,
        config: AnalysisConfig,
        trajectory: TrajectoryTuning,
        detector: DetectorTuning,
    ) -> Self {
        Self {
            source,
            config,
            trajectory_analyzer: ToeTrajectoryAnalyzer::with_tuning(trajectory),
            detector: GaitEventDetector::with_tuning(detector),
            angle_engine: JointAngleEngine::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Toe trajectory over the whole source, for calibration UIs.
    pub fn trajectory(&self) -> ToeTrajectory {
        self.trajectory_analyzer.analyze(&self.materialize_frames())
    }

    /// Full analysis with automatic two-strategy event detection.
    pub fn analyze(&self) -> AnalysisSnapshot {
        let frames = self.materialize_frames();
        info!(frames = frames.len(), mode = %self.config.mode, "running form analysis");

        if frames.len() < MIN_SEQUENCE_FRAMES {
            warn!(
                frames = frames.len(),
                minimum = MIN_SEQUENCE_FRAMES,
                "sequence too short to analyze"
            );
            return self.empty_snapshot(frames.len());
        }

        let trajectory = self.trajectory_analyzer.analyze(&frames);
        let events = self.detector.detect(&trajectory, &frames);
        self.snapshot_from_events(&frames, &trajectory, events)
    }

    /// Full analysis using a calibrated scan over `[start_frame, end_frame]`
    /// instead of automatic detection.
    pub fn analyze_calibrated(
        &self,
        session: &CalibrationSession,
        start_frame: usize,
        end_frame: usize,
    ) -> Result<AnalysisSnapshot, CalibrationError> {
        let frames = self.materialize_frames();
        info!(
            frames = frames.len(),
            start_frame, end_frame, "running calibrated form analysis"
        );

        if frames.len() < MIN_SEQUENCE_FRAMES {
            return Ok(self.empty_snapshot(frames.len()));
        }

        let trajectory = self.trajectory_analyzer.analyze(&frames);
        let events = session.scan_interval(&trajectory, &frames, start_frame, end_frame)?;
        Ok(self.snapshot_from_events(&frames, &trajectory, events))
    }

    /// Resolve the source into the in-memory frame sequence.
    fn materialize_frames(&self) -> Vec<Frame> {
        (0..self.source.frame_count())
            .map(|frame_number| {
                Frame::new(
                    frame_number,
                    self.source.timestamp_s(frame_number),
                    self.source
                        .landmarks_for_frame(frame_number)
                        .map(|landmarks| landmarks.to_vec()),
                )
            })
            .collect()
    }

    fn snapshot_from_events(
        &self,
        frames: &[Frame],
        trajectory: &ToeTrajectory,
        events: GaitEvents,
    ) -> AnalysisSnapshot {
        let angles = self.angle_engine.compute_all(frames);

        let builder = StrideMetricBuilder::new(self.config.fps, self.config.reference_distance_m);
        let strides = builder.build(&events, frames);
        let stride_summary = builder.summarize(&strides);

        let phase_samples = PhaseAngleSampler::new().sample(&strides, &angles);

        let evaluation = EvaluationEngine::new(self.config.mode).evaluate(
            &strides,
            &stride_summary,
            &phase_samples,
            &angles,
            self.config.athlete_height_cm,
            self.config.gender,
        );

        info!(
            strides = strides.len(),
            findings = evaluation.findings.len(),
            rating = %evaluation.overall_rating,
            "analysis snapshot ready"
        );

        AnalysisSnapshot {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            frame_count: frames.len(),
            trajectory_stats: trajectory.stats,
            events,
            strides,
            stride_summary,
            phase_samples,
            evaluation,
        }
    }

    fn empty_snapshot(&self, frame_count: usize) -> AnalysisSnapshot {
        AnalysisSnapshot {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            frame_count,
            trajectory_stats: None,
            events: GaitEvents::default(),
            strides: Vec::new(),
            stride_summary: Default::default(),
            phase_samples: Vec::new(),
            evaluation: crate::models::evaluation::EvaluationSummary::empty(),
        }
    }
}
