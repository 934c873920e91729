//! Ingestion adapters decoding sensor-log exports into a [`SampleSeries`].
//!
//! Every source format implements [`SampleDecoder`]; the analysis engine only
//! ever sees the decoded series and never branches on format.

use std::fs;
use std::path::Path;

use crate::analysis::SampleSeries;
use crate::config::IngestConfig;
use crate::error::{log_ingest_error, IngestError};

mod delimited;
mod json;

pub use delimited::DelimitedDecoder;
pub use json::JsonDecoder;

/// Capability shared by all source formats: decode text into a sample series.
pub trait SampleDecoder: Send + Sync {
    /// Short format name used in logs
    fn name(&self) -> &'static str;

    fn decode(&self, input: &str) -> Result<SampleSeries, IngestError>;
}

/// Pick a decoder from the file extension (`.json` or delimited text).
pub fn decoder_for_path(path: &Path, config: &IngestConfig) -> Box<dyn SampleDecoder> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => Box::new(JsonDecoder::new(config.max_samples)),
        Some("tsv") => Box::new(DelimitedDecoder::new(
            Some(config.delimiter.unwrap_or('\t')),
            config.max_samples,
        )),
        _ => Box::new(DelimitedDecoder::new(config.delimiter, config.max_samples)),
    }
}

/// Read and decode a recording from disk.
pub fn read_series(path: &Path, config: &IngestConfig) -> Result<SampleSeries, IngestError> {
    let decoder = decoder_for_path(path, config);
    let series = fs::read_to_string(path)
        .map_err(IngestError::from)
        .and_then(|contents| decoder.decode(&contents))
        .map_err(|err| {
            log_ingest_error(&err, decoder.name());
            err
        })?;
    tracing::info!(
        "[Ingest] Decoded {} samples from {} ({})",
        series.len(),
        path.display(),
        decoder.name()
    );
    Ok(series)
}

/// Keep at most `max_samples` samples, logging what was dropped.
pub(crate) fn truncate_samples(series: &mut SampleSeries, max_samples: usize) {
    if series.samples.len() > max_samples {
        tracing::warn!(
            "[Ingest] Dropping {} samples beyond the {} sample limit",
            series.samples.len() - max_samples,
            max_samples
        );
        series.samples.truncate(max_samples);
    }
}
