// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Single source of truth for the numeric codes carried by [`AnalysisError`].
///
/// Error code range: 3001-3005
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Series has too few samples or an unusable time range
    pub const UNUSABLE_SERIES: i32 = 3001;

    /// Window duration is not a positive finite number
    pub const INVALID_WINDOW: i32 = 3002;

    /// Overlap fraction lies outside [0, 1)
    pub const INVALID_OVERLAP: i32 = 3003;

    /// No metrics were requested
    pub const EMPTY_METRIC_SET: i32 = 3004;

    /// Metric name does not match any known metric
    pub const UNKNOWN_METRIC: i32 = 3005;
}

/// Log an analysis error with structured context
///
/// Emits a single line with the numeric code, the component and the message
/// so failures can be grepped out of CLI logs.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=VibrationAnalyzer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Analysis-related errors
///
/// `UnusableSeries` is the hard failure signalled by a zero inferred sample
/// rate; the remaining variants reject invalid caller configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Fewer than 2 samples, non-finite timestamps, or non-positive time span
    UnusableSeries { sample_count: usize, span_seconds: f64 },

    /// Window duration must be > 0
    InvalidWindow { window_seconds: f64 },

    /// Overlap fraction must be in [0, 1)
    InvalidOverlap { overlap_fraction: f64 },

    /// Requested metric set is empty
    EmptyMetricSet,

    /// Metric name could not be parsed
    UnknownMetric { name: String },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::UnusableSeries { .. } => AnalysisErrorCodes::UNUSABLE_SERIES,
            AnalysisError::InvalidWindow { .. } => AnalysisErrorCodes::INVALID_WINDOW,
            AnalysisError::InvalidOverlap { .. } => AnalysisErrorCodes::INVALID_OVERLAP,
            AnalysisError::EmptyMetricSet => AnalysisErrorCodes::EMPTY_METRIC_SET,
            AnalysisError::UnknownMetric { .. } => AnalysisErrorCodes::UNKNOWN_METRIC,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::UnusableSeries {
                sample_count,
                span_seconds,
            } => {
                format!(
                    "Series is unusable: {} samples spanning {} s (need >= 2 samples over a positive finite span)",
                    sample_count, span_seconds
                )
            }
            AnalysisError::InvalidWindow { window_seconds } => {
                format!("Window duration must be greater than 0 (got {})", window_seconds)
            }
            AnalysisError::InvalidOverlap { overlap_fraction } => {
                format!(
                    "Overlap fraction must be in [0, 1) (got {})",
                    overlap_fraction
                )
            }
            AnalysisError::EmptyMetricSet => "At least one metric must be requested".to_string(),
            AnalysisError::UnknownMetric { name } => format!("Unknown metric: {}", name),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}
