/// Stride phase models

use serde::{Deserialize, Serialize};

use crate::models::angles::AngleSample;

/// Key phases within a single stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StridePhase {
    /// Ground contact instant.
    Initial,
    /// Mid-stance: thighs closest to vertical.
    Mid,
    /// Toe-off instant.
    Late,
}

impl std::fmt::Display for StridePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StridePhase::Initial => write!(f, "initial"),
            StridePhase::Mid => write!(f, "mid"),
            StridePhase::Late => write!(f, "late"),
        }
    }
}

/// Joint angles sampled at one phase of one stride.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseAngleSample {
    /// Stride the sample belongs to.
    pub stride_index: usize,
    pub phase: StridePhase,
    pub frame: usize,
    pub angles: AngleSample,
}
