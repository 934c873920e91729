//! Deterministic synthetic accelerometer recordings.
//!
//! Each axis is a sinusoid on top of a constant offset (gravity on z by
//! default), optionally with uniform noise and timestamp jitter. A fixed seed
//! always yields the same series, so generated recordings can back fixtures
//! and property-style tests without touching real sensor logs.

use std::f64::consts::PI;
use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::analysis::{Sample, SampleSeries};

/// Standard gravity, used as the default z-axis offset.
pub const GRAVITY: f64 = 9.81;

/// Jitter beyond this fraction of a sample period could reorder timestamps.
const MAX_JITTER_FRACTION: f64 = 0.45;

/// One axis: `offset + amplitude * sin(2π f t)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTone {
    pub frequency_hz: f64,
    pub amplitude: f64,
    #[serde(default)]
    pub offset: f64,
}

impl AxisTone {
    pub const fn new(frequency_hz: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            frequency_hz,
            amplitude,
            offset,
        }
    }

    /// Constant signal with no oscillation.
    pub const fn constant(offset: f64) -> Self {
        Self::new(0.0, 0.0, offset)
    }

    fn value_at(&self, t: f64) -> f64 {
        self.offset + self.amplitude * (2.0 * PI * self.frequency_hz * t).sin()
    }
}

/// Declarative description of a synthetic recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub sample_rate: f64,
    pub duration_seconds: f64,
    /// Timestamp of the first sample; recordings rarely start at 0
    #[serde(default)]
    pub first_timestamp: f64,
    pub x: AxisTone,
    pub y: AxisTone,
    pub z: AxisTone,
    /// Peak amplitude of uniform noise added to every axis
    #[serde(default)]
    pub noise_amplitude: f64,
    /// Timestamp jitter as a fraction of the sample period
    #[serde(default)]
    pub jitter_fraction: f64,
    #[serde(default)]
    pub start_time: DateTime<Utc>,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    0x1A7A_5EED
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            sample_rate: 100.0,
            duration_seconds: 10.0,
            first_timestamp: 0.0,
            x: AxisTone::constant(0.0),
            y: AxisTone::constant(0.0),
            z: AxisTone::constant(GRAVITY),
            noise_amplitude: 0.0,
            jitter_fraction: 0.0,
            start_time: DateTime::<Utc>::default(),
            seed: default_seed(),
        }
    }
}

impl SyntheticSpec {
    /// Number of samples `generate` produces.
    pub fn sample_count(&self) -> usize {
        if !(self.sample_rate > 0.0 && self.duration_seconds > 0.0) {
            return 0;
        }
        (self.sample_rate * self.duration_seconds).round() as usize
    }

    /// Render the recording.
    pub fn generate(&self) -> SampleSeries {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let period = 1.0 / self.sample_rate;
        let jitter = self.jitter_fraction.clamp(0.0, MAX_JITTER_FRACTION) * period;
        let noise = self.noise_amplitude.abs();

        let samples = (0..self.sample_count())
            .map(|i| {
                let nominal = self.first_timestamp + i as f64 * period;
                let t = if jitter > 0.0 {
                    nominal + rng.gen_range(-jitter..jitter)
                } else {
                    nominal
                };
                let mut axis = |tone: &AxisTone| {
                    let value = tone.value_at(t);
                    if noise > 0.0 {
                        value + rng.gen_range(-noise..noise)
                    } else {
                        value
                    }
                };
                Sample::new(t, axis(&self.x), axis(&self.y), axis(&self.z))
            })
            .collect();

        let mut series = SampleSeries::new(samples, self.start_time);
        series.target_sample_rate = Some(self.sample_rate);
        series
    }
}

/// Write a series as CSV with `# key: value` metadata lines.
///
/// The output decodes back through the delimited ingest adapter.
pub fn write_csv<W: Write>(series: &SampleSeries, mut writer: W) -> io::Result<()> {
    writeln!(
        writer,
        "# start_time: {}",
        series
            .start_time
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
    )?;
    if let Some(rate) = series.target_sample_rate {
        writeln!(writer, "# sample_rate: {}", rate)?;
    }
    if let Some(rate) = series.max_device_sample_rate {
        writeln!(writer, "# max_sample_rate: {}", rate)?;
    }
    writeln!(writer, "time,x,y,z")?;
    for sample in &series.samples {
        writeln!(
            writer,
            "{},{},{},{}",
            sample.time, sample.ax, sample.ay, sample.az
        )?;
    }
    writer.flush()
}
