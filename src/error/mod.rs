// Error types for the vibration analysis engine
//
// This module defines custom error types for analysis and ingestion,
// providing structured error handling with stable numeric codes suitable for
// reports and CLI exit diagnostics.

mod analysis;
mod ingest;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use ingest::{log_ingest_error, IngestError, IngestErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent handling in the CLI and
/// fixture harness.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_trait() {
        let analysis_err: &dyn ErrorCode = &AnalysisError::EmptyMetricSet;
        assert_eq!(analysis_err.code(), 3004);

        let ingest_err: &dyn ErrorCode = &IngestError::Empty;
        assert_eq!(ingest_err.code(), 4001);
    }

    #[test]
    fn test_error_propagation() {
        fn may_fail() -> Result<(), AnalysisError> {
            Err(AnalysisError::InvalidWindow {
                window_seconds: 0.0,
            })
        }

        fn caller() -> Result<(), AnalysisError> {
            may_fail()?;
            Ok(())
        }

        assert!(caller().is_err());
    }
}
