/// Gait event models

use serde::{Deserialize, Serialize};

/// Detected gait events over an analyzed interval.
///
/// Both sequences are ordered, duplicate-free and strictly increasing.
/// Empty sequences are the normal result for degenerate input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaitEvents {
    /// Frames at which the tracked foot first touches the ground.
    pub contact_frames: Vec<usize>,
    /// Frames at which the tracked foot leaves the ground.
    pub toe_off_frames: Vec<usize>,
}

impl GaitEvents {
    pub fn new(contact_frames: Vec<usize>, toe_off_frames: Vec<usize>) -> Self {
        Self {
            contact_frames,
            toe_off_frames,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contact_frames.is_empty() && self.toe_off_frames.is_empty()
    }

    /// Check the strictly-increasing, duplicate-free sequence invariant.
    pub fn is_well_ordered(&self) -> bool {
        strictly_increasing(&self.contact_frames) && strictly_increasing(&self.toe_off_frames)
    }
}

fn strictly_increasing(frames: &[usize]) -> bool {
    frames.windows(2).all(|w| w[0] < w[1])
}
