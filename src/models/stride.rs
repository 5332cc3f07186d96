/// Stride metric models

use serde::{Deserialize, Serialize};

/// Kinematic metrics for one detected stride.
///
/// Every derived field is `None` whenever an input event is missing or the
/// corresponding duration would be non-positive; downstream consumers treat
/// `None` as "metric unavailable", never as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrideMetric {
    /// Stride position within the analyzed interval, from 0.
    pub index: usize,
    pub contact_frame: usize,
    pub toe_off_frame: usize,
    /// The next stride's contact frame; `None` on the last stride.
    pub next_contact_frame: Option<usize>,
    /// Ground contact duration in seconds.
    pub contact_time_s: Option<f64>,
    /// Airborne duration between toe-off and the next contact, seconds.
    pub flight_time_s: Option<f64>,
    /// Contact-to-contact duration in seconds.
    pub step_time_s: Option<f64>,
    /// Strides per second, reciprocal of step time.
    pub cadence_hz: Option<f64>,
    /// Ground distance covered by this stride, meters.
    pub stride_length_m: Option<f64>,
    /// Stride length over step time, meters per second.
    pub speed_mps: Option<f64>,
}

/// Aggregate means over all strides.
///
/// Each mean is taken over the strides where that metric is present, so
/// the denominators are independent per metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrideSummary {
    pub stride_count: usize,
    pub avg_contact_time_s: Option<f64>,
    pub avg_flight_time_s: Option<f64>,
    pub avg_step_time_s: Option<f64>,
    pub avg_cadence_hz: Option<f64>,
    pub avg_stride_length_m: Option<f64>,
    pub avg_speed_mps: Option<f64>,
}

impl StrideSummary {
    /// Mean over the strides where `pick` yields a value.
    fn mean_of(strides: &[StrideMetric], pick: impl Fn(&StrideMetric) -> Option<f64>) -> Option<f64> {
        let values: Vec<f64> = strides.iter().filter_map(&pick).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    pub fn from_strides(strides: &[StrideMetric]) -> Self {
        Self {
            stride_count: strides.len(),
            avg_contact_time_s: Self::mean_of(strides, |s| s.contact_time_s),
            avg_flight_time_s: Self::mean_of(strides, |s| s.flight_time_s),
            avg_step_time_s: Self::mean_of(strides, |s| s.step_time_s),
            avg_cadence_hz: Self::mean_of(strides, |s| s.cadence_hz),
            avg_stride_length_m: Self::mean_of(strides, |s| s.stride_length_m),
            avg_speed_mps: Self::mean_of(strides, |s| s.speed_mps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stride(index: usize, contact_time_s: Option<f64>, cadence_hz: Option<f64>) -> StrideMetric {
        StrideMetric {
            index,
            contact_frame: index * 10,
            toe_off_frame: index * 10 + 5,
            next_contact_frame: None,
            contact_time_s,
            flight_time_s: None,
            step_time_s: None,
            cadence_hz,
            stride_length_m: None,
            speed_mps: None,
        }
    }

    #[test]
    fn test_summary_independent_denominators() {
        let strides = vec![
            stride(0, Some(0.2), Some(4.0)),
            stride(1, None, Some(4.4)),
            stride(2, Some(0.3), None),
        ];
        let summary = StrideSummary::from_strides(&strides);
        assert_eq!(summary.stride_count, 3);
        assert!((summary.avg_contact_time_s.unwrap() - 0.25).abs() < 1e-9);
        assert!((summary.avg_cadence_hz.unwrap() - 4.2).abs() < 1e-9);
        assert!(summary.avg_flight_time_s.is_none());
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = StrideSummary::from_strides(&[]);
        assert_eq!(summary.stride_count, 0);
        assert!(summary.avg_contact_time_s.is_none());
    }
}
