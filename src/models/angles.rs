/// Joint angle models
///
/// Per-frame angles derived from the landmark skeleton. Sign conventions:
/// trunk 90° = upright with smaller values leaning forward; thigh/shank
/// measured from vertical-down with forward = negative, rearward =
/// positive; flexion angles are 180° minus the joint's interior angle.

use serde::{Deserialize, Serialize};

/// A left/right pair of optional angle values, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideAngles {
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl SideAngles {
    pub fn new(left: Option<f64>, right: Option<f64>) -> Self {
        Self { left, right }
    }

    /// Mean of whichever sides are present.
    pub fn mean(&self) -> Option<f64> {
        match (self.left, self.right) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }
}

/// All joint angles for a single frame.
///
/// When the hip/shoulder confidence gate fails, every field is `None`
/// together; a sample is never partially invalidated by that gate. Elbow
/// angles are additionally gated per side, so a valid sample may still
/// carry `None` for one arm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AngleSample {
    pub frame: usize,
    /// Trunk inclination from horizontal, [0, 180). 90° = upright.
    pub trunk_deg: Option<f64>,
    /// Hip→knee angle from vertical-down, forward negative.
    pub thigh_deg: SideAngles,
    /// Knee→ankle angle from vertical-down, forward negative.
    pub shank_deg: SideAngles,
    /// 180° minus the hip–knee–ankle interior angle.
    pub knee_flex_deg: SideAngles,
    /// 180° minus the knee–ankle–toe interior angle.
    pub ankle_flex_deg: SideAngles,
    /// 180° minus the shoulder–elbow–wrist interior angle.
    pub elbow_deg: SideAngles,
    /// Horizontal hip→toe offset in centimeters, forward negative.
    pub toe_horizontal_cm: SideAngles,
}

impl AngleSample {
    /// The all-`None` sample emitted when the confidence gate fails.
    pub fn invalid(frame: usize) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    /// True when the global gate failed and no field carries a value.
    pub fn is_invalid(&self) -> bool {
        self.trunk_deg.is_none()
            && self.thigh_deg == SideAngles::default()
            && self.shank_deg == SideAngles::default()
            && self.knee_flex_deg == SideAngles::default()
            && self.ankle_flex_deg == SideAngles::default()
            && self.elbow_deg == SideAngles::default()
            && self.toe_horizontal_cm == SideAngles::default()
    }
}
