// JSON decoder - serde form of SampleSeries

use super::{truncate_samples, SampleDecoder};
use crate::analysis::SampleSeries;
use crate::error::IngestError;

/// Decodes `{"samples": [{"time", "ax", "ay", "az"}, ...], "start_time": ...}`.
pub struct JsonDecoder {
    max_samples: usize,
}

impl JsonDecoder {
    pub fn new(max_samples: usize) -> Self {
        Self { max_samples }
    }
}

impl SampleDecoder for JsonDecoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decode(&self, input: &str) -> Result<SampleSeries, IngestError> {
        let mut series: SampleSeries = serde_json::from_str(input)?;
        if series.is_empty() {
            return Err(IngestError::Empty);
        }
        truncate_samples(&mut series, self.max_samples);
        Ok(series)
    }
}
