// LAVA Core - Windowed vibration analysis of accelerometer recordings
// Sample-rate inference, window segmentation and per-window RMS / band metrics

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod ingest;
pub mod testing;

// Re-exports for convenience
pub use analysis::{
    AnalysisReport, FrequencyBand, MetricKind, MetricRecord, MetricSet, Sample, SampleSeries,
    TimeAnchor, VibrationAnalyzer,
};
pub use config::{AnalysisConfig, AppConfig, IngestConfig};
pub use error::{AnalysisError, ErrorCode, IngestError};

use tracing::Level;

/// Initialize stderr logging for command-line use.
///
/// `log` records from dependencies are forwarded into the same subscriber.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let result = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();

    if result.is_ok() {
        tracing::debug!("Logging initialized at {}", level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false);
        init_logging(true);
    }

    #[test]
    fn test_reexported_pipeline() {
        let samples = (0..100)
            .map(|i| Sample::new(i as f64 * 0.01, 0.0, 0.0, 1.0))
            .collect();
        let series = SampleSeries::new(samples, Default::default());
        let report = VibrationAnalyzer::new()
            .analyze(&series, &AnalysisConfig::default())
            .unwrap();
        assert!(!report.records.is_empty());
        assert_eq!(report.records[0].get(MetricKind::RmsZ), Some(1.0));
    }
}
