// Compute module - Per-window metric evaluation
//
// Each window is evaluated independently from the normalized series: the
// per-sample total acceleration is computed once per window (when any
// requested metric needs it) and shared by rms_total, percentile_90 and every
// band metric.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::metrics::{MetricKind, MetricSet};
use super::spectral::SpectralBandAnalyzer;
use super::types::{offset_time, MetricRecord, NormalizedSeries, Sample};
use super::window::Window;

/// Nearest-rank position of the 90th percentile.
const PERCENTILE_90: f64 = 0.9;

/// Root mean square of `values`; 0 for an empty slice.
pub fn rms<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v * v, count + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}

/// Nearest-rank percentile without interpolation: element at
/// `floor(fraction × len)` of the ascending sort.
pub fn nearest_rank_percentile(values: &[f64], fraction: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let index = ((fraction * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

/// Samples of one window plus lazily shared intermediates.
struct WindowContext<'a> {
    samples: &'a [Sample],
    totals: Vec<f64>,
    rate: f64,
}

impl<'a> WindowContext<'a> {
    fn new(samples: &'a [Sample], rate: f64, with_totals: bool) -> Self {
        let totals = if with_totals {
            samples.iter().map(Sample::total).collect()
        } else {
            Vec::new()
        };
        Self {
            samples,
            totals,
            rate,
        }
    }
}

/// Produces one `MetricRecord` per window for the requested metric set.
#[derive(Clone, Default)]
pub struct MetricComputer {
    spectral: SpectralBandAnalyzer,
}

impl MetricComputer {
    pub fn new() -> Self {
        Self {
            spectral: SpectralBandAnalyzer::new(),
        }
    }

    /// Compute every requested metric for one window.
    pub fn compute_window(
        &self,
        series: &NormalizedSeries,
        window: &Window,
        rate: f64,
        metrics: &MetricSet,
    ) -> MetricRecord {
        window_record(&self.spectral, series, window, rate, metrics)
    }

    /// Compute records for all windows, in window order.
    ///
    /// With the `parallel` feature windows are spread over the rayon pool.
    /// Each worker owns a fresh `SpectralBandAnalyzer`, so FFT planning never
    /// contends on a shared lock. Results are identical to the sequential path.
    pub fn compute(
        &self,
        series: &NormalizedSeries,
        windows: &[Window],
        rate: f64,
        metrics: &MetricSet,
    ) -> Vec<MetricRecord> {
        #[cfg(feature = "parallel")]
        {
            windows
                .par_iter()
                .map_init(SpectralBandAnalyzer::new, |spectral, window| {
                    window_record(spectral, series, window, rate, metrics)
                })
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            windows
                .iter()
                .map(|window| self.compute_window(series, window, rate, metrics))
                .collect()
        }
    }
}

/// Evaluate a single metric kind on a prepared window.
fn evaluate(spectral: &SpectralBandAnalyzer, kind: MetricKind, ctx: &WindowContext<'_>) -> f64 {
    match kind {
        MetricKind::RmsX => rms(ctx.samples.iter().map(|s| s.ax)),
        MetricKind::RmsY => rms(ctx.samples.iter().map(|s| s.ay)),
        MetricKind::RmsZ => rms(ctx.samples.iter().map(|s| s.az)),
        MetricKind::RmsTotal => rms(ctx.totals.iter().copied()),
        MetricKind::Percentile90 => nearest_rank_percentile(&ctx.totals, PERCENTILE_90),
        MetricKind::Band(band) => spectral.band(&ctx.totals, ctx.rate, band),
    }
}

fn window_record(
    spectral: &SpectralBandAnalyzer,
    series: &NormalizedSeries,
    window: &Window,
    rate: f64,
    metrics: &MetricSet,
) -> MetricRecord {
    let samples = &series.samples()[window.start..window.end];
    let ctx = WindowContext::new(samples, rate, metrics.needs_totals());

    let values: BTreeMap<MetricKind, f64> = metrics
        .iter()
        .map(|kind| (kind, evaluate(spectral, kind, &ctx)))
        .collect();

    MetricRecord {
        time: window.time,
        absolute_time: offset_time(series.start_time(), window.time),
        values,
    }
}
