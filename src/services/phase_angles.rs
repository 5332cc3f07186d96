/// Phase-Angle Sampler
///
/// For each stride, records the joint angles at three key instants:
/// initial contact, mid-stance (the frame whose mean thigh angle is
/// closest to vertical) and toe-off. Strides whose toe-off does not follow
/// their contact are skipped.

use crate::models::angles::AngleSample;
use crate::models::phase::{PhaseAngleSample, StridePhase};
use crate::models::stride::StrideMetric;

pub struct PhaseAngleSampler;

impl PhaseAngleSampler {
    pub fn new() -> Self {
        Self
    }

    /// Sample angles at the key phases of every stride.
    pub fn sample(
        &self,
        strides: &[StrideMetric],
        angles: &[AngleSample],
    ) -> Vec<PhaseAngleSample> {
        let mut samples = Vec::new();

        for stride in strides {
            if stride.toe_off_frame <= stride.contact_frame {
                continue;
            }

            if let Some(sample) = angles_at(angles, stride.contact_frame) {
                samples.push(PhaseAngleSample {
                    stride_index: stride.index,
                    phase: StridePhase::Initial,
                    frame: stride.contact_frame,
                    angles: sample.clone(),
                });
            }

            if let Some(sample) = mid_stance(angles, stride.contact_frame, stride.toe_off_frame) {
                samples.push(PhaseAngleSample {
                    stride_index: stride.index,
                    phase: StridePhase::Mid,
                    frame: sample.frame,
                    angles: sample.clone(),
                });
            }

            if let Some(sample) = angles_at(angles, stride.toe_off_frame) {
                samples.push(PhaseAngleSample {
                    stride_index: stride.index,
                    phase: StridePhase::Late,
                    frame: stride.toe_off_frame,
                    angles: sample.clone(),
                });
            }
        }

        samples
    }
}

impl Default for PhaseAngleSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn angles_at(angles: &[AngleSample], frame: usize) -> Option<&AngleSample> {
    angles.iter().find(|a| a.frame == frame)
}

/// The stance frame whose mean left/right thigh angle sits nearest 0°
/// (thighs vertical under the hips).
fn mid_stance(angles: &[AngleSample], contact: usize, toe_off: usize) -> Option<&AngleSample> {
    angles
        .iter()
        .filter(|a| a.frame >= contact && a.frame <= toe_off)
        .filter_map(|a| a.thigh_deg.mean().map(|mean| (a, mean.abs())))
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(sample, _)| sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::angles::SideAngles;

    fn angle_sample(frame: usize, thigh_left: f64, thigh_right: f64) -> AngleSample {
        AngleSample {
            frame,
            trunk_deg: Some(90.0),
            thigh_deg: SideAngles::new(Some(thigh_left), Some(thigh_right)),
            ..AngleSample::default()
        }
    }

    fn stride(index: usize, contact: usize, toe_off: usize) -> StrideMetric {
        StrideMetric {
            index,
            contact_frame: contact,
            toe_off_frame: toe_off,
            next_contact_frame: None,
            contact_time_s: None,
            flight_time_s: None,
            step_time_s: None,
            cadence_hz: None,
            stride_length_m: None,
            speed_mps: None,
        }
    }

    #[test]
    fn test_three_phases_per_stride() {
        let angles: Vec<AngleSample> = (0..8)
            .map(|f| {
                // Legs scissor through the stride; the left/right mean
                // stays constant.
                let spread = (f as f64 - 3.0) * 10.0;
                angle_sample(f, -spread, spread - 4.0)
            })
            .collect();
        let strides = vec![stride(0, 0, 6)];

        let samples = PhaseAngleSampler::new().sample(&strides, &angles);
        assert_eq!(samples.len(), 3);

        assert_eq!(samples[0].phase, StridePhase::Initial);
        assert_eq!(samples[0].frame, 0);
        assert_eq!(samples[1].phase, StridePhase::Mid);
        // Mean thigh angle is -2.0 at every frame; the first minimum wins.
        assert_eq!(samples[1].frame, 0);
        assert_eq!(samples[2].phase, StridePhase::Late);
        assert_eq!(samples[2].frame, 6);
    }

    #[test]
    fn test_mid_stance_picks_most_vertical_thighs() {
        let angles = vec![
            angle_sample(0, -40.0, 20.0),
            angle_sample(1, -20.0, 10.0),
            angle_sample(2, -4.0, 2.0),
            angle_sample(3, 18.0, -30.0),
        ];
        let strides = vec![stride(0, 0, 3)];

        let samples = PhaseAngleSampler::new().sample(&strides, &angles);
        let mid = samples.iter().find(|s| s.phase == StridePhase::Mid).unwrap();
        assert_eq!(mid.frame, 2);
    }

    #[test]
    fn test_degenerate_stride_skipped() {
        let angles = vec![angle_sample(5, 0.0, 0.0)];
        let strides = vec![stride(0, 5, 5)];
        assert!(PhaseAngleSampler::new().sample(&strides, &angles).is_empty());
    }

    #[test]
    fn test_invalid_angles_do_not_provide_mid_stance() {
        // All-None samples carry no thigh angles, so no mid-stance frame
        // exists; initial and late samples are still emitted.
        let angles: Vec<AngleSample> = (0..6).map(AngleSample::invalid).collect();
        let strides = vec![stride(0, 1, 4)];

        let samples = PhaseAngleSampler::new().sample(&strides, &angles);
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.phase != StridePhase::Mid));
    }
}
