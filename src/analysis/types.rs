// Types module - Data structures for the analysis pipeline
//
// Samples flow in as a `SampleSeries`, are re-based to t = 0 as a
// `NormalizedSeries`, and leave as one `MetricRecord` per window wrapped in an
// `AnalysisReport`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::metrics::{FrequencyBand, MetricKind};

/// One 3-axis accelerometer reading (m/s²) at `time` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
}

impl Sample {
    pub fn new(time: f64, ax: f64, ay: f64, az: f64) -> Self {
        Self { time, ax, ay, az }
    }

    /// Magnitude of the acceleration vector.
    pub fn total(&self) -> f64 {
        (self.ax * self.ax + self.ay * self.ay + self.az * self.az).sqrt()
    }
}

/// Decoded recording as handed over by an ingestion adapter.
///
/// Declared rates are informational; the engine always infers the actual
/// rate from timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    pub samples: Vec<Sample>,
    /// Wall-clock origin of the recording
    #[serde(default)]
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sample_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_device_sample_rate: Option<f64>,
}

impl SampleSeries {
    pub fn new(samples: Vec<Sample>, start_time: DateTime<Utc>) -> Self {
        Self {
            samples,
            start_time,
            target_sample_rate: None,
            max_device_sample_rate: None,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Sample series whose first timestamp has been shifted to exactly 0.
///
/// Only produced by the sample-rate estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    samples: Vec<Sample>,
    start_time: DateTime<Utc>,
}

impl NormalizedSeries {
    pub(crate) fn new(samples: Vec<Sample>, start_time: DateTime<Utc>) -> Self {
        Self {
            samples,
            start_time,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Metrics computed for a single window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Seconds since the first sample (x-axis coordinate)
    pub time: f64,
    pub absolute_time: DateTime<Utc>,
    pub values: BTreeMap<MetricKind, f64>,
}

impl MetricRecord {
    pub fn get(&self, kind: MetricKind) -> Option<f64> {
        self.values.get(&kind).copied()
    }
}

/// Full output of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Inferred sample rate in Hz
    pub rate: f64,
    /// Number of samples in the normalized series
    pub sample_count: usize,
    pub window_size_samples: usize,
    pub step_samples: usize,
    /// Requested bands with no FFT bin below Nyquist at the full window
    /// length (above Nyquist, or narrower than the bin spacing); their values are 0
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmeasurable_bands: Vec<FrequencyBand>,
    pub records: Vec<MetricRecord>,
}

/// Offset a wall-clock origin by fractional seconds.
///
/// Saturates at the representable `DateTime<Utc>` range.
pub fn offset_time(start: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    let offset = Duration::nanoseconds((seconds * 1e9).round() as i64);
    start.checked_add_signed(offset).unwrap_or(if seconds < 0.0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
