/// Evaluation Engine
///
/// Stateless rule-based scorer. Each dimension buckets an observed value
/// into excellent/good/fair/poor against the reference bands of the active
/// analysis mode, attaches a message with the value interpolated, and a
/// mode-specific coaching cue. Dimensions whose inputs are unavailable are
/// skipped entirely, never scored as poor.
///
/// The summary ranks findings worst first and carries the overall rating
/// as the mean ordinal score bucketed into four tiers.

use tracing::debug;

use crate::models::angles::AngleSample;
use crate::models::evaluation::{
    AnalysisMode, EvaluationFinding, EvaluationSummary, FindingCategory, FormScore, Gender,
    ReferenceBands,
};
use crate::models::phase::{PhaseAngleSample, StridePhase};
use crate::models::stride::{StrideMetric, StrideSummary};

pub struct EvaluationEngine {
    mode: AnalysisMode,
    bands: &'static ReferenceBands,
}

impl EvaluationEngine {
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            mode,
            bands: ReferenceBands::for_mode(mode),
        }
    }

    /// Evaluate a completed analysis.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate(
        &self,
        strides: &[StrideMetric],
        summary: &StrideSummary,
        phase_samples: &[PhaseAngleSample],
        angles: &[AngleSample],
        athlete_height_cm: Option<f64>,
        gender: Option<Gender>,
    ) -> EvaluationSummary {
        let mut findings = Vec::new();

        if let Some(finding) = self.evaluate_posture(phase_samples) {
            findings.push(finding);
        }
        if let Some(finding) = self.evaluate_knee_extension(strides, phase_samples) {
            findings.push(finding);
        }
        if let Some(finding) = self.evaluate_cadence_balance(summary) {
            findings.push(finding);
        }
        if let Some(finding) = self.evaluate_stride_length_ratio(summary, athlete_height_cm, gender)
        {
            findings.push(finding);
        }
        if let Some(finding) = self.evaluate_contact_time(summary) {
            findings.push(finding);
        }
        if let Some(finding) = self.evaluate_contact_flight_ratio(summary) {
            findings.push(finding);
        }
        if let Some(finding) = self.evaluate_thigh_range(angles) {
            findings.push(finding);
        }

        if findings.is_empty() {
            debug!("no evaluable dimensions, returning neutral summary");
            return EvaluationSummary::empty();
        }

        // Worst findings first; the sort is stable so equal scores keep
        // their dimension order.
        findings.sort_by(|a, b| {
            a.score
                .ordinal()
                .partial_cmp(&b.score.ordinal())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let avg_score =
            findings.iter().map(|f| f.score.ordinal()).sum::<f64>() / findings.len() as f64;
        let overall_rating = FormScore::from_avg(avg_score);
        let overall_message = self.overall_message(overall_rating);

        debug!(
            findings = findings.len(),
            avg_score,
            rating = %overall_rating,
            "evaluation complete"
        );

        EvaluationSummary {
            findings,
            overall_rating,
            overall_message,
            avg_score,
        }
    }

    /// Trunk posture at initial contact, with the first-stride and
    /// stride-over-stride progression checks in acceleration mode.
    fn evaluate_posture(&self, phase_samples: &[PhaseAngleSample]) -> Option<EvaluationFinding> {
        let trunk_at_contact: Vec<f64> = phase_samples
            .iter()
            .filter(|s| s.phase == StridePhase::Initial)
            .filter_map(|s| s.angles.trunk_deg)
            .collect();
        if trunk_at_contact.is_empty() {
            return None;
        }

        let mean_trunk = trunk_at_contact.iter().sum::<f64>() / trunk_at_contact.len() as f64;
        let mut score = self.bands.trunk_deg.score(mean_trunk);
        let mut notes = Vec::new();

        if let Some(first_band) = self.bands.first_stride_trunk_deg {
            let first = trunk_at_contact[0];
            let first_score = first_band.score(first);
            if first_score.ordinal() < score.ordinal() {
                score = first_score;
            }
            notes.push(format!(
                "first stride {:.1}° against a {:.0}° drive target",
                first, first_band.target
            ));
        }

        if let Some(min_rise) = self.bands.trunk_progression_min_deg {
            if trunk_at_contact.len() >= 2 {
                let rises: Vec<f64> = trunk_at_contact.windows(2).map(|w| w[1] - w[0]).collect();
                let mean_rise = rises.iter().sum::<f64>() / rises.len() as f64;
                if mean_rise < min_rise && score == FormScore::Excellent {
                    score = FormScore::Good;
                }
                if mean_rise < 0.0 {
                    notes.push("the trunk is not rising stride over stride".to_string());
                }
            }
        }

        let mut message = format!("Average trunk angle at contact is {:.1}°", mean_trunk);
        if !notes.is_empty() {
            message.push_str(&format!(" ({})", notes.join("; ")));
        }
        message.push('.');

        let advice = match self.mode {
            AnalysisMode::TopSpeed => {
                "Run tall at top speed: keep the trunk upright with the hips under the shoulders."
            }
            AnalysisMode::Acceleration { .. } => {
                "Hold the forward body lean out of the start and let the trunk rise gradually with each stride."
            }
        };

        Some(EvaluationFinding {
            category: FindingCategory::Posture,
            score,
            message,
            advice: advice.to_string(),
        })
    }

    /// Rear-leg extension at toe-off over the early strides; acceleration
    /// modes only.
    fn evaluate_knee_extension(
        &self,
        strides: &[StrideMetric],
        phase_samples: &[PhaseAngleSample],
    ) -> Option<EvaluationFinding> {
        let band = self.bands.knee_lock_flex_deg?;
        let early_limit = self.bands.early_stride_count.min(strides.len());
        if early_limit == 0 {
            return None;
        }

        let flexions: Vec<f64> = phase_samples
            .iter()
            .filter(|s| s.phase == StridePhase::Late && s.stride_index < early_limit)
            .filter_map(|s| {
                // The push-off leg is the straighter of the two at toe-off.
                match (s.angles.knee_flex_deg.left, s.angles.knee_flex_deg.right) {
                    (Some(l), Some(r)) => Some(l.min(r)),
                    (Some(l), None) => Some(l),
                    (None, Some(r)) => Some(r),
                    (None, None) => None,
                }
            })
            .collect();
        if flexions.is_empty() {
            return None;
        }

        let mean_flex = flexions.iter().sum::<f64>() / flexions.len() as f64;
        let score = band.score(mean_flex);

        Some(EvaluationFinding {
            category: FindingCategory::KneeExtension,
            score,
            message: format!(
                "Push-off knee keeps {:.1}° of flexion at toe-off over the first {} strides.",
                mean_flex, early_limit
            ),
            advice: "Drive to full rear-leg extension on the early strides; finish each push before cycling the leg through.".to_string(),
        })
    }

    /// Cadence against the mode band, with the stride-length context in
    /// the message.
    fn evaluate_cadence_balance(&self, summary: &StrideSummary) -> Option<EvaluationFinding> {
        let cadence = summary.avg_cadence_hz?;
        let score = self.bands.cadence_hz.score(cadence);

        let message = match summary.avg_stride_length_m {
            Some(length) => format!(
                "Average cadence is {:.2} strides/s at {:.2} m per stride.",
                cadence, length
            ),
            None => format!("Average cadence is {:.2} strides/s.", cadence),
        };

        let advice = match self.mode {
            AnalysisMode::TopSpeed => {
                "Keep turnover high without reaching; the foot should land under a tall body."
            }
            AnalysisMode::Acceleration { .. } => {
                "Build step frequency with each push instead of overstriding early."
            }
        };

        Some(EvaluationFinding {
            category: FindingCategory::CadenceBalance,
            score,
            message,
            advice: advice.to_string(),
        })
    }

    /// Stride length relative to athlete height; only when height is known.
    fn evaluate_stride_length_ratio(
        &self,
        summary: &StrideSummary,
        athlete_height_cm: Option<f64>,
        gender: Option<Gender>,
    ) -> Option<EvaluationFinding> {
        let height_cm = athlete_height_cm?;
        let length = summary.avg_stride_length_m?;
        if height_cm <= 0.0 {
            return None;
        }

        let ratio = length / (height_cm / 100.0);
        let band = self
            .bands
            .stride_height_ratio(gender.unwrap_or(Gender::Male));
        let score = band.score(ratio);

        Some(EvaluationFinding {
            category: FindingCategory::StrideLength,
            score,
            message: format!(
                "Stride length is {:.2}× body height ({:.2} m per stride).",
                ratio, length
            ),
            advice: match self.mode {
                AnalysisMode::TopSpeed => {
                    "Lengthen the stride behind the body with a stronger push, not by reaching out in front."
                }
                AnalysisMode::Acceleration { .. } => {
                    "Let stride length grow naturally with speed; short powerful steps beat long passive ones."
                }
            }
            .to_string(),
        })
    }

    fn evaluate_contact_time(&self, summary: &StrideSummary) -> Option<EvaluationFinding> {
        let contact = summary.avg_contact_time_s?;
        let score = self.bands.contact_time_s.score(contact);

        Some(EvaluationFinding {
            category: FindingCategory::ContactTime,
            score,
            message: format!("Average ground contact time is {:.0} ms.", contact * 1000.0),
            advice: match self.mode {
                AnalysisMode::TopSpeed => {
                    "Strike the ground under the hips and spring off; think hot ground."
                }
                AnalysisMode::Acceleration { .. } => {
                    "Longer contacts are expected while accelerating; keep each one a full push, not a wait."
                }
            }
            .to_string(),
        })
    }

    fn evaluate_contact_flight_ratio(&self, summary: &StrideSummary) -> Option<EvaluationFinding> {
        let contact = summary.avg_contact_time_s?;
        let flight = summary.avg_flight_time_s?;
        if flight <= 0.0 {
            return None;
        }

        let ratio = contact / flight;
        let score = self.bands.contact_flight_ratio.score(ratio);

        Some(EvaluationFinding {
            category: FindingCategory::ContactFlightRatio,
            score,
            message: format!(
                "Contact-to-flight ratio is {:.2} ({:.0} ms on the ground, {:.0} ms airborne).",
                ratio,
                contact * 1000.0,
                flight * 1000.0
            ),
            advice: match self.mode {
                AnalysisMode::TopSpeed => {
                    "More air, less floor: stiffer ankles at touchdown shift time from contact to flight."
                }
                AnalysisMode::Acceleration { .. } => {
                    "Ground dominance is correct here; make sure the flight phase still grows as you come up."
                }
            }
            .to_string(),
        })
    }

    /// Total forward-to-rearward thigh excursion over the whole interval.
    fn evaluate_thigh_range(&self, angles: &[AngleSample]) -> Option<EvaluationFinding> {
        let thigh_values: Vec<f64> = angles
            .iter()
            .flat_map(|a| [a.thigh_deg.left, a.thigh_deg.right])
            .flatten()
            .collect();
        if thigh_values.len() < 2 {
            return None;
        }

        let max = thigh_values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = thigh_values.iter().cloned().fold(f64::INFINITY, f64::min);
        let rom = max - min;
        let score = self.bands.thigh_rom_deg.score(rom);

        Some(EvaluationFinding {
            category: FindingCategory::ThighRange,
            score,
            message: format!("Hip range of motion spans {:.0}° of thigh swing.", rom),
            advice: match self.mode {
                AnalysisMode::TopSpeed => {
                    "Drive the knees through a full cycle: high in front, open behind."
                }
                AnalysisMode::Acceleration { .. } => {
                    "Punch the lead knee forward on every step; the range grows as the trunk rises."
                }
            }
            .to_string(),
        })
    }

    fn overall_message(&self, rating: FormScore) -> String {
        match (self.mode, rating) {
            (AnalysisMode::TopSpeed, FormScore::Excellent) => {
                "Top-speed mechanics look excellent; keep reinforcing this pattern.".to_string()
            }
            (AnalysisMode::TopSpeed, FormScore::Good) => {
                "Solid top-speed form with a few dimensions worth polishing.".to_string()
            }
            (AnalysisMode::TopSpeed, FormScore::Fair) => {
                "Top-speed form is workable but leaks speed; start with the worst findings."
                    .to_string()
            }
            (AnalysisMode::TopSpeed, FormScore::Poor) => {
                "Top-speed mechanics need fundamental work; address posture and contacts first."
                    .to_string()
            }
            (AnalysisMode::Acceleration { .. }, FormScore::Excellent) => {
                "The acceleration pattern is excellent; the drive phase is doing its job."
                    .to_string()
            }
            (AnalysisMode::Acceleration { .. }, FormScore::Good) => {
                "Good acceleration shape; tighten the flagged dimensions to sharpen the drive."
                    .to_string()
            }
            (AnalysisMode::Acceleration { .. }, FormScore::Fair) => {
                "The drive phase gives away position; work the prioritized advice in order."
                    .to_string()
            }
            (AnalysisMode::Acceleration { .. }, FormScore::Poor) => {
                "Acceleration mechanics need rebuilding from the start position outward."
                    .to_string()
            }
        }
    }
}
