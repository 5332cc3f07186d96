/// Evaluation models and reference bands
///
/// The evaluation engine compares aggregated stride metrics and phase
/// angles against literature-derived numeric bands. Acceleration-phase and
/// top-speed-phase sprinting are biomechanically different, so every band
/// lives here as named configuration data selected by analysis mode, never
/// as an inline literal in the rule code.

use serde::{Deserialize, Serialize};

/// Sub-case of acceleration-phase analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartType {
    /// Block or crouched standing start: strides begin from zero velocity.
    Standing,
    /// Flying start: the athlete enters the interval already moving.
    Flying,
}

/// Coarse classification selecting which reference bands apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Acceleration { start: StartType },
    TopSpeed,
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMode::Acceleration {
                start: StartType::Standing,
            } => write!(f, "acceleration (standing start)"),
            AnalysisMode::Acceleration {
                start: StartType::Flying,
            } => write!(f, "acceleration (flying start)"),
            AnalysisMode::TopSpeed => write!(f, "top speed"),
        }
    }
}

/// Athlete gender, used only to select stride-length-to-height bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Four-tier quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormScore {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl FormScore {
    /// Ordinal value: excellent = 4 down to poor = 1.
    pub fn ordinal(&self) -> f64 {
        match self {
            FormScore::Excellent => 4.0,
            FormScore::Good => 3.0,
            FormScore::Fair => 2.0,
            FormScore::Poor => 1.0,
        }
    }

    /// Bucket a mean ordinal back into a tier.
    pub fn from_avg(avg: f64) -> Self {
        if avg >= 3.5 {
            FormScore::Excellent
        } else if avg >= 2.8 {
            FormScore::Good
        } else if avg >= 2.0 {
            FormScore::Fair
        } else {
            FormScore::Poor
        }
    }
}

impl std::fmt::Display for FormScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormScore::Excellent => write!(f, "excellent"),
            FormScore::Good => write!(f, "good"),
            FormScore::Fair => write!(f, "fair"),
            FormScore::Poor => write!(f, "poor"),
        }
    }
}

/// Evaluation dimension identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    Posture,
    KneeExtension,
    CadenceBalance,
    StrideLength,
    ContactTime,
    ContactFlightRatio,
    ThighRange,
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FindingCategory::Posture => "posture",
            FindingCategory::KneeExtension => "knee_extension",
            FindingCategory::CadenceBalance => "cadence_balance",
            FindingCategory::StrideLength => "stride_length",
            FindingCategory::ContactTime => "contact_time",
            FindingCategory::ContactFlightRatio => "contact_flight_ratio",
            FindingCategory::ThighRange => "thigh_range",
        };
        write!(f, "{}", name)
    }
}

/// One scored dimension with its coaching advice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationFinding {
    pub category: FindingCategory,
    pub score: FormScore,
    /// Observation with the measured value interpolated.
    pub message: String,
    /// Mode-specific coaching cue.
    pub advice: String,
}

/// Complete evaluation result, ranked worst finding first.
///
/// Always recomputed fully from current inputs, never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub findings: Vec<EvaluationFinding>,
    pub overall_rating: FormScore,
    pub overall_message: String,
    /// Mean ordinal score over the produced findings (4 = excellent).
    pub avg_score: f64,
}

impl EvaluationSummary {
    /// The neutral summary when no dimension had usable inputs.
    pub fn empty() -> Self {
        Self {
            findings: Vec::new(),
            overall_rating: FormScore::Fair,
            overall_message: "Not enough data to evaluate this run.".to_string(),
            avg_score: 0.0,
        }
    }
}

/// "Lower is better" thresholds: value ≤ excellent ⇒ excellent, and so on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpperBand {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
}

impl UpperBand {
    pub fn score(&self, value: f64) -> FormScore {
        if value <= self.excellent {
            FormScore::Excellent
        } else if value <= self.good {
            FormScore::Good
        } else if value <= self.fair {
            FormScore::Fair
        } else {
            FormScore::Poor
        }
    }
}

/// "Higher is better" thresholds: value ≥ excellent ⇒ excellent, and so on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LowerBand {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
}

impl LowerBand {
    pub fn score(&self, value: f64) -> FormScore {
        if value >= self.excellent {
            FormScore::Excellent
        } else if value >= self.good {
            FormScore::Good
        } else if value >= self.fair {
            FormScore::Fair
        } else {
            FormScore::Poor
        }
    }
}

/// Target-centered thresholds bucketing by distance from `target`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetBand {
    pub target: f64,
    pub excellent_tol: f64,
    pub good_tol: f64,
    pub fair_tol: f64,
}

impl TargetBand {
    pub fn score(&self, value: f64) -> FormScore {
        let dev = (value - self.target).abs();
        if dev <= self.excellent_tol {
            FormScore::Excellent
        } else if dev <= self.good_tol {
            FormScore::Good
        } else if dev <= self.fair_tol {
            FormScore::Fair
        } else {
            FormScore::Poor
        }
    }
}

/// The full reference-band set for one analysis mode.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceBands {
    /// Ground contact time, seconds.
    pub contact_time_s: UpperBand,
    /// Contact time divided by flight time.
    pub contact_flight_ratio: UpperBand,
    /// Strides per second.
    pub cadence_hz: LowerBand,
    /// Stride length divided by athlete height, by gender.
    pub stride_height_ratio_male: LowerBand,
    pub stride_height_ratio_female: LowerBand,
    /// Forward-to-rearward thigh excursion, degrees.
    pub thigh_rom_deg: LowerBand,
    /// Trunk angle at initial contact, degrees from horizontal.
    pub trunk_deg: TargetBand,
    /// First-stride trunk target; acceleration modes only.
    pub first_stride_trunk_deg: Option<TargetBand>,
    /// Minimum mean trunk rise per stride, degrees; acceleration only.
    pub trunk_progression_min_deg: Option<f64>,
    /// Trailing-knee flexion at toe-off on early strides; acceleration only.
    pub knee_lock_flex_deg: Option<UpperBand>,
    /// How many leading strides the knee-lock rule inspects.
    pub early_stride_count: usize,
}

/// Top-speed sprinting: brief contacts, upright trunk, full flight phase.
///
/// Contact-time cutoffs here are much stricter than the acceleration
/// bands below; elite flat-out contacts sit near 0.10 s while drive-phase
/// contacts run almost twice as long. The two families stay separate.
pub const TOP_SPEED_BANDS: ReferenceBands = ReferenceBands {
    contact_time_s: UpperBand {
        excellent: 0.10,
        good: 0.13,
        fair: 0.16,
    },
    contact_flight_ratio: UpperBand {
        excellent: 1.0,
        good: 1.4,
        fair: 1.8,
    },
    cadence_hz: LowerBand {
        excellent: 4.5,
        good: 4.0,
        fair: 3.5,
    },
    stride_height_ratio_male: LowerBand {
        excellent: 1.15,
        good: 1.05,
        fair: 0.95,
    },
    stride_height_ratio_female: LowerBand {
        excellent: 1.10,
        good: 1.00,
        fair: 0.90,
    },
    thigh_rom_deg: LowerBand {
        excellent: 80.0,
        good: 65.0,
        fair: 50.0,
    },
    trunk_deg: TargetBand {
        target: 90.0,
        excellent_tol: 5.0,
        good_tol: 10.0,
        fair_tol: 15.0,
    },
    first_stride_trunk_deg: None,
    trunk_progression_min_deg: None,
    knee_lock_flex_deg: None,
    early_stride_count: 0,
};

/// Acceleration phase from a standing start: long powerful contacts,
/// aggressive forward lean that rises stride over stride, full rear-leg
/// extension at toe-off.
pub const ACCELERATION_STANDING_BANDS: ReferenceBands = ReferenceBands {
    contact_time_s: UpperBand {
        excellent: 0.18,
        good: 0.20,
        fair: 0.24,
    },
    contact_flight_ratio: UpperBand {
        excellent: 1.8,
        good: 2.4,
        fair: 3.0,
    },
    cadence_hz: LowerBand {
        excellent: 4.3,
        good: 3.8,
        fair: 3.3,
    },
    stride_height_ratio_male: LowerBand {
        excellent: 1.00,
        good: 0.90,
        fair: 0.80,
    },
    stride_height_ratio_female: LowerBand {
        excellent: 0.95,
        good: 0.85,
        fair: 0.75,
    },
    thigh_rom_deg: LowerBand {
        excellent: 70.0,
        good: 55.0,
        fair: 40.0,
    },
    trunk_deg: TargetBand {
        target: 68.0,
        excellent_tol: 6.0,
        good_tol: 12.0,
        fair_tol: 18.0,
    },
    first_stride_trunk_deg: Some(TargetBand {
        target: 45.0,
        excellent_tol: 8.0,
        good_tol: 14.0,
        fair_tol: 20.0,
    }),
    trunk_progression_min_deg: Some(2.0),
    knee_lock_flex_deg: Some(UpperBand {
        excellent: 15.0,
        good: 25.0,
        fair: 35.0,
    }),
    early_stride_count: 3,
};

/// Acceleration phase from a flying start: same family as the standing
/// bands but with a milder first-stride lean requirement.
pub const ACCELERATION_FLYING_BANDS: ReferenceBands = ReferenceBands {
    contact_time_s: UpperBand {
        excellent: 0.18,
        good: 0.20,
        fair: 0.24,
    },
    contact_flight_ratio: UpperBand {
        excellent: 1.8,
        good: 2.4,
        fair: 3.0,
    },
    cadence_hz: LowerBand {
        excellent: 4.3,
        good: 3.8,
        fair: 3.3,
    },
    stride_height_ratio_male: LowerBand {
        excellent: 1.00,
        good: 0.90,
        fair: 0.80,
    },
    stride_height_ratio_female: LowerBand {
        excellent: 0.95,
        good: 0.85,
        fair: 0.75,
    },
    thigh_rom_deg: LowerBand {
        excellent: 70.0,
        good: 55.0,
        fair: 40.0,
    },
    trunk_deg: TargetBand {
        target: 68.0,
        excellent_tol: 6.0,
        good_tol: 12.0,
        fair_tol: 18.0,
    },
    first_stride_trunk_deg: Some(TargetBand {
        target: 60.0,
        excellent_tol: 8.0,
        good_tol: 14.0,
        fair_tol: 20.0,
    }),
    trunk_progression_min_deg: Some(2.0),
    knee_lock_flex_deg: Some(UpperBand {
        excellent: 15.0,
        good: 25.0,
        fair: 35.0,
    }),
    early_stride_count: 3,
};

impl ReferenceBands {
    pub fn for_mode(mode: AnalysisMode) -> &'static ReferenceBands {
        match mode {
            AnalysisMode::TopSpeed => &TOP_SPEED_BANDS,
            AnalysisMode::Acceleration {
                start: StartType::Standing,
            } => &ACCELERATION_STANDING_BANDS,
            AnalysisMode::Acceleration {
                start: StartType::Flying,
            } => &ACCELERATION_FLYING_BANDS,
        }
    }

    /// Stride-length-to-height band for the given gender.
    pub fn stride_height_ratio(&self, gender: Gender) -> &LowerBand {
        match gender {
            Gender::Male => &self.stride_height_ratio_male,
            Gender::Female => &self.stride_height_ratio_female,
        }
    }
}
