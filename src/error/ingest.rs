// Ingestion error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Ingestion error code constants
///
/// Error code range: 4001-4006
pub struct IngestErrorCodes {}

impl IngestErrorCodes {
    /// Input contained no samples
    pub const EMPTY: i32 = 4001;

    /// A required column (time, x, y, z) could not be located
    pub const MISSING_COLUMN: i32 = 4002;

    /// A cell could not be parsed as a number
    pub const INVALID_VALUE: i32 = 4003;

    /// A metadata comment carried an unparseable value
    pub const INVALID_METADATA: i32 = 4004;

    /// Underlying I/O failure
    pub const IO: i32 = 4005;

    /// JSON document could not be decoded
    pub const JSON: i32 = 4006;
}

/// Log an ingestion error with structured context
pub fn log_ingest_error(err: &IngestError, context: &str) {
    error!(
        "Ingest error in {}: code={}, component=SampleDecoder, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while decoding recordings into a sample series
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// No samples found in the input
    Empty,

    /// Header did not contain the named column
    MissingColumn { column: String },

    /// Cell at `line`/`column` is not a number
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    /// Metadata comment could not be parsed
    InvalidMetadata { key: String, value: String },

    /// I/O failure reading the source
    Io { details: String },

    /// JSON decoding failure
    Json { details: String },
}

impl ErrorCode for IngestError {
    fn code(&self) -> i32 {
        match self {
            IngestError::Empty => IngestErrorCodes::EMPTY,
            IngestError::MissingColumn { .. } => IngestErrorCodes::MISSING_COLUMN,
            IngestError::InvalidValue { .. } => IngestErrorCodes::INVALID_VALUE,
            IngestError::InvalidMetadata { .. } => IngestErrorCodes::INVALID_METADATA,
            IngestError::Io { .. } => IngestErrorCodes::IO,
            IngestError::Json { .. } => IngestErrorCodes::JSON,
        }
    }

    fn message(&self) -> String {
        match self {
            IngestError::Empty => "Input contains no samples".to_string(),
            IngestError::MissingColumn { column } => {
                format!("Missing required column: {}", column)
            }
            IngestError::InvalidValue {
                line,
                column,
                value,
            } => {
                format!(
                    "Invalid number '{}' in column {} at line {}",
                    value, column, line
                )
            }
            IngestError::InvalidMetadata { key, value } => {
                format!("Invalid metadata value for {}: '{}'", key, value)
            }
            IngestError::Io { details } => format!("I/O error: {}", details),
            IngestError::Json { details } => format!("JSON error: {}", details),
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IngestError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for IngestError {}

/// Convert from std::io::Error to IngestError
impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Json {
            details: err.to_string(),
        }
    }
}
