// VibrationAnalyzer - Windowed multi-metric analysis of accelerometer bursts
//
// This module turns a decoded 3-axis accelerometer series into one metric
// record per (possibly overlapping) window: per-axis and total RMS, a
// 90th-percentile peak estimate, and RMS energy in twelve fixed 0-100 Hz bands.
//
// Module organization:
// - types: Data structures (Sample, SampleSeries, MetricRecord, AnalysisReport)
// - metrics: Metric kinds, frequency bands, requested-metric sets
// - rate: Effective sample rate inference and time normalization
// - window: Window segmentation and the x-axis time anchor policy
// - spectral: Band-limited RMS energy via zero-padded FFT
// - compute: Per-window metric evaluation
// - mod.rs: Coordinator (VibrationAnalyzer)
//
// Pipeline:
// 1. Infer the sample rate and re-base timestamps to 0
// 2. Convert window duration / overlap into sample boundaries
// 3. Evaluate the requested metrics for every window
//
// Each pass is a pure function of its inputs. Changing the window
// configuration or the metric selection means re-running from step 2 with the
// same normalized series.

pub mod compute;
pub mod metrics;
pub mod rate;
pub mod spectral;
pub mod types;
pub mod window;

#[cfg(test)]
mod tests;

pub use compute::MetricComputer;
pub use metrics::{FrequencyBand, MetricKind, MetricSet, STANDARD_BANDS};
pub use rate::{estimate_sample_rate, RateEstimate};
pub use types::{AnalysisReport, MetricRecord, NormalizedSeries, Sample, SampleSeries};
pub use window::{TimeAnchor, Window, WindowSegmenter};

use crate::config::AnalysisConfig;
use crate::error::{log_analysis_error, AnalysisError};

/// Relative difference above which a declared rate is reported as off.
const DECLARED_RATE_TOLERANCE: f64 = 0.1;

/// VibrationAnalyzer coordinates the windowed analysis pipeline
///
/// Holds no per-series state; the same analyzer can be reused across
/// series and configurations.
#[derive(Clone, Default)]
pub struct VibrationAnalyzer {
    computer: MetricComputer,
}

impl VibrationAnalyzer {
    pub fn new() -> Self {
        Self {
            computer: MetricComputer::new(),
        }
    }

    /// Run the full pipeline on a decoded series.
    ///
    /// # Errors
    /// * `InvalidWindow` / `InvalidOverlap` / `EmptyMetricSet` - bad config
    /// * `UnusableSeries` - the inferred rate is 0
    pub fn analyze(
        &self,
        series: &SampleSeries,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, AnalysisError> {
        config.validate()?;

        let estimate = estimate_sample_rate(series);
        tracing::info!(
            "[VibrationAnalyzer] {} samples over {:.6} s -> rate {:.4} Hz",
            series.len(),
            estimate.span_seconds,
            estimate.rate
        );

        if estimate.is_usable() {
            report_declared_rate(series, estimate.rate);
        }

        self.analyze_estimate(&estimate, config)
    }

    /// Re-run windowing and metric computation on an existing estimate.
    ///
    /// Used when only the window configuration or metric selection changes.
    pub fn analyze_estimate(
        &self,
        estimate: &RateEstimate,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, AnalysisError> {
        config.validate()?;

        if !estimate.is_usable() {
            let err = AnalysisError::UnusableSeries {
                sample_count: estimate.normalized.len(),
                span_seconds: estimate.span_seconds,
            };
            log_analysis_error(&err, "analyze_estimate");
            return Err(err);
        }

        let rate = estimate.rate;
        let segmenter = WindowSegmenter::new(
            config.window_seconds,
            config.overlap_fraction,
            rate,
            config.time_anchor,
        )?;
        let windows = segmenter.segment(&estimate.normalized);

        // Judged at the full window length; the window size can exceed n
        let window_len = segmenter.window_size().min(estimate.normalized.len());
        let unmeasurable_bands: Vec<FrequencyBand> = config
            .requested_metrics
            .bands()
            .filter(|&band| {
                !band.is_measurable(rate) || spectral::band_bin_count(window_len, rate, band) == 0
            })
            .collect();
        if !unmeasurable_bands.is_empty() {
            tracing::warn!(
                "[VibrationAnalyzer] {} requested band(s) have no FFT bin below Nyquist ({:.2} Hz, {:.2} Hz bins) and will read 0",
                unmeasurable_bands.len(),
                rate / 2.0,
                rate / spectral::padded_fft_size(window_len) as f64
            );
        }

        let records = self.computer.compute(
            &estimate.normalized,
            &windows,
            rate,
            &config.requested_metrics,
        );

        tracing::debug!(
            "[VibrationAnalyzer] computed {} records x {} metrics",
            records.len(),
            config.requested_metrics.len()
        );

        Ok(AnalysisReport {
            rate,
            sample_count: estimate.normalized.len(),
            window_size_samples: segmenter.window_size(),
            step_samples: segmenter.step(),
            unmeasurable_bands,
            records,
        })
    }
}

/// Log declared device rates that disagree with the inferred rate.
///
/// Informational only; declared rates never feed the computation.
fn report_declared_rate(series: &SampleSeries, rate: f64) {
    let declared = [
        ("target", series.target_sample_rate),
        ("max device", series.max_device_sample_rate),
    ];
    for (label, value) in declared {
        if let Some(declared_rate) = value.filter(|r| *r > 0.0) {
            let deviation = (declared_rate - rate).abs() / declared_rate;
            if deviation > DECLARED_RATE_TOLERANCE {
                tracing::info!(
                    "[VibrationAnalyzer] {} rate {:.2} Hz differs from inferred {:.2} Hz",
                    label,
                    declared_rate,
                    rate
                );
            }
        }
    }
}
