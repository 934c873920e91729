// Rate module - Effective sample rate inference from timestamps
//
// Consumer sensor apps log irregular, sometimes coarse timestamps and their
// declared rates are unreliable, so the rate is always derived from the data:
// n samples define n - 1 intervals over the span tN - t0.

use super::types::{NormalizedSeries, Sample, SampleSeries};

/// Inferred sample rate plus the series re-based to t = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct RateEstimate {
    /// Samples per second; 0 marks an unusable series
    pub rate: f64,
    /// Time covered by the series in seconds (tN - t0, may be non-finite)
    pub span_seconds: f64,
    pub normalized: NormalizedSeries,
}

impl RateEstimate {
    pub fn is_usable(&self) -> bool {
        self.rate > 0.0
    }
}

/// Estimate the effective sample rate of `series`.
///
/// Returns `rate = 0` with the samples passed through untouched when there
/// are fewer than 2 samples, either boundary timestamp is non-finite, or the
/// span is not positive. Otherwise every timestamp is shifted by `-t0`.
pub fn estimate_sample_rate(series: &SampleSeries) -> RateEstimate {
    let samples = &series.samples;
    let n = samples.len();

    let (t0, t_n) = match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (first.time, last.time),
        _ => (f64::NAN, f64::NAN),
    };
    let span_seconds = t_n - t0;

    if n < 2 || !t0.is_finite() || !t_n.is_finite() || span_seconds <= 0.0 {
        return RateEstimate {
            rate: 0.0,
            span_seconds,
            normalized: NormalizedSeries::new(samples.clone(), series.start_time),
        };
    }

    let rate = (n - 1) as f64 / span_seconds;
    let normalized = samples
        .iter()
        .map(|s| Sample {
            time: s.time - t0,
            ..*s
        })
        .collect();

    RateEstimate {
        rate,
        span_seconds,
        normalized: NormalizedSeries::new(normalized, series.start_time),
    }
}
