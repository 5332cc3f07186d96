/// Stride Metric Builder
///
/// Pairs detected gait events into per-stride records and derives the
/// kinematic metrics: contact/flight/step time, cadence, stride length and
/// speed. Every metric degrades to `None` when an input event is missing
/// or a duration would be non-positive.
///
/// Stride length prefers distributing the known reference distance across
/// strides in proportion to their normalized horizontal ankle-midpoint
/// displacement, which compensates perspective distortion; without usable
/// landmark data the distance is divided uniformly.

use tracing::debug;

use crate::models::gait::GaitEvents;
use crate::models::landmark::{BodyLandmark, Frame};
use crate::models::stride::{StrideMetric, StrideSummary};

/// Minimum ankle visibility for a frame to contribute a displacement.
const MIN_ANKLE_VISIBILITY: f64 = 0.5;

/// Below this total displacement the proportional split is meaningless.
const MIN_TOTAL_DISPLACEMENT: f64 = 1e-6;

pub struct StrideMetricBuilder {
    fps: f64,
    reference_distance_m: f64,
}

impl StrideMetricBuilder {
    pub fn new(fps: f64, reference_distance_m: f64) -> Self {
        Self {
            fps,
            reference_distance_m,
        }
    }

    /// Build per-stride metrics from detected events.
    ///
    /// `frames` supplies optional ankle positions for the proportional
    /// stride-length split; an empty slice selects the uniform fallback.
    pub fn build(&self, events: &GaitEvents, frames: &[Frame]) -> Vec<StrideMetric> {
        let pairs = pair_events(&events.contact_frames, &events.toe_off_frames);
        if pairs.is_empty() {
            debug!("no pairable gait events, zero strides");
            return Vec::new();
        }

        let mut strides: Vec<StrideMetric> = pairs
            .iter()
            .enumerate()
            .map(|(index, &(contact, toe_off))| {
                let next_contact = pairs.get(index + 1).map(|&(c, _)| c);

                let contact_time_s = positive_duration(contact, toe_off, self.fps);
                let flight_time_s =
                    next_contact.and_then(|nc| positive_duration(toe_off, nc, self.fps));
                let step_time_s =
                    next_contact.and_then(|nc| positive_duration(contact, nc, self.fps));
                let cadence_hz = step_time_s.map(|t| 1.0 / t);

                StrideMetric {
                    index,
                    contact_frame: contact,
                    toe_off_frame: toe_off,
                    next_contact_frame: next_contact,
                    contact_time_s,
                    flight_time_s,
                    step_time_s,
                    cadence_hz,
                    stride_length_m: None,
                    speed_mps: None,
                }
            })
            .collect();

        self.assign_stride_lengths(&mut strides, frames);

        for stride in strides.iter_mut() {
            stride.speed_mps = match (stride.stride_length_m, stride.step_time_s) {
                (Some(length), Some(step)) if step > 0.0 => Some(length / step),
                _ => None,
            };
        }

        debug!(strides = strides.len(), "stride metrics built");
        strides
    }

    /// Aggregate summary over the built strides.
    pub fn summarize(&self, strides: &[StrideMetric]) -> StrideSummary {
        StrideSummary::from_strides(strides)
    }

    /// Distribute the reference distance over the strides.
    fn assign_stride_lengths(&self, strides: &mut [StrideMetric], frames: &[Frame]) {
        let displacements: Vec<Option<f64>> = strides
            .iter()
            .map(|stride| {
                let next_contact = stride.next_contact_frame?;
                let start = ankle_mid_x(frames, stride.contact_frame)?;
                let end = ankle_mid_x(frames, next_contact)?;
                Some((end - start).abs())
            })
            .collect();

        let total: f64 = displacements.iter().flatten().sum();

        if total > MIN_TOTAL_DISPLACEMENT {
            // Proportional split over the strides that measured one.
            for (stride, displacement) in strides.iter_mut().zip(displacements.iter().copied()) {
                stride.stride_length_m =
                    displacement.map(|d| d / total * self.reference_distance_m);
            }
        } else {
            // Uniform fallback: no usable landmark data anywhere.
            let uniform = self.reference_distance_m / strides.len() as f64;
            for stride in strides.iter_mut() {
                stride.stride_length_m = Some(uniform);
            }
        }
    }
}

/// Two-pointer pairing: each contact takes the first unconsumed toe-off
/// strictly after it. A contact with no remaining toe-off gets a synthetic
/// `contact + 1` only when a later contact proves the stride happened; a
/// trailing contact with neither forms no stride.
fn pair_events(contacts: &[usize], toe_offs: &[usize]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(contacts.len());
    let mut t = 0;

    for (i, &contact) in contacts.iter().enumerate() {
        while t < toe_offs.len() && toe_offs[t] <= contact {
            t += 1;
        }

        if t < toe_offs.len() {
            pairs.push((contact, toe_offs[t]));
            t += 1;
        } else if i + 1 < contacts.len() {
            pairs.push((contact, contact + 1));
        }
    }

    pairs
}

/// Duration between two frames in seconds, `None` unless strictly positive.
fn positive_duration(from: usize, to: usize, fps: f64) -> Option<f64> {
    if to > from {
        Some((to - from) as f64 / fps)
    } else {
        None
    }
}

/// Horizontal ankle midpoint at a frame, gated on both ankles' visibility.
fn ankle_mid_x(frames: &[Frame], frame_number: usize) -> Option<f64> {
    let frame = frames.iter().find(|f| f.frame_number == frame_number)?;
    let left = frame.get(BodyLandmark::LeftAnkle)?;
    let right = frame.get(BodyLandmark::RightAnkle)?;
    if left.visibility < MIN_ANKLE_VISIBILITY || right.visibility < MIN_ANKLE_VISIBILITY {
        return None;
    }
    Some((left.x + right.x) / 2.0)
}
