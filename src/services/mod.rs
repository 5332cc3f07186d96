// Analysis engines

pub mod analysis;
pub mod calibration;
pub mod evaluation;
pub mod gait_events;
pub mod joint_angles;
pub mod phase_angles;
pub mod stride_metrics;
pub mod toe_trajectory;

pub use analysis::{LandmarkSource, RunAnalysisService};
pub use calibration::{Calibration, CalibrationError, CalibrationSession, CalibrationState};
pub use evaluation::EvaluationEngine;
pub use gait_events::GaitEventDetector;
pub use joint_angles::JointAngleEngine;
pub use phase_angles::PhaseAngleSampler;
pub use stride_metrics::StrideMetricBuilder;
pub use toe_trajectory::ToeTrajectoryAnalyzer;
