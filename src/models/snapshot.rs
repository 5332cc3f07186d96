/// Analysis snapshot
///
/// The complete output bundle handed to the UI/export layer: plain,
/// serializable, immutable, and recomputed from scratch on every input
/// change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::evaluation::EvaluationSummary;
use crate::models::gait::GaitEvents;
use crate::models::phase::PhaseAngleSample;
use crate::models::stride::{StrideMetric, StrideSummary};
use crate::models::trajectory::TrajectoryStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Number of input frames the analysis consumed.
    pub frame_count: usize,
    pub trajectory_stats: Option<TrajectoryStats>,
    pub events: GaitEvents,
    pub strides: Vec<StrideMetric>,
    pub stride_summary: StrideSummary,
    pub phase_samples: Vec<PhaseAngleSample>,
    pub evaluation: EvaluationSummary,
}

impl AnalysisSnapshot {
    /// True when the input was too degenerate to produce any stride.
    pub fn is_empty(&self) -> bool {
        self.strides.is_empty()
    }

    /// Serialize for the UI/export layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
