//! stride-coach: the algorithmic core of a running-form analysis tool.
//!
//! The crate ingests a per-frame skeletal pose sequence produced by an
//! external pose-estimation provider and derives gait events, per-stride
//! kinematic metrics, joint angles at key stride phases, and a rule-based
//! performance evaluation with prioritized coaching advice.
//!
//! Everything around the core is an external collaborator: frame
//! acquisition, the pose estimator itself, rendering, navigation and
//! remote persistence live with the host. The host hands the core an
//! already-materialized frame sequence through the [`LandmarkSource`]
//! capability and receives plain serializable snapshots back.
//!
//! Partial tracking failure is the expected common case: missing or
//! low-confidence landmarks degrade individual metrics to `None`, and
//! degenerate sequences produce empty results. Nothing inside the core
//! aborts an analysis.

pub mod config;
pub mod models;
pub mod services;

pub use config::{AnalysisConfig, DetectorTuning, ScanTuning, TrajectoryTuning};
pub use models::{
    AnalysisMode, AnalysisSnapshot, AngleSample, BodyLandmark, EvaluationFinding,
    EvaluationSummary, FormScore, Frame, GaitEvents, Gender, Landmark, PhaseAngleSample,
    StartType, StrideMetric, StridePhase, StrideSummary, ToeTrajectory, ToeTrajectoryPoint,
};
pub use services::{
    CalibrationError, CalibrationSession, CalibrationState, EvaluationEngine, GaitEventDetector,
    JointAngleEngine, LandmarkSource, PhaseAngleSampler, RunAnalysisService, StrideMetricBuilder,
    ToeTrajectoryAnalyzer,
};
