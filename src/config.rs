//! Configuration management for analysis and ingestion parameters
//!
//! This module provides runtime configuration loading from JSON files so
//! window length, overlap, the metric selection and decoder options can be
//! tuned without recompilation. CLI flags override whatever the file sets.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::metrics::MetricSet;
use crate::analysis::window::TimeAnchor;
use crate::error::AnalysisError;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Windowing and metric selection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Window duration in seconds before conversion to samples
    pub window_seconds: f64,
    /// Fraction of a window shared with the preceding window, in [0, 1)
    pub overlap_fraction: f64,
    /// Metrics computed per window; unrequested metrics are skipped
    pub requested_metrics: MetricSet,
    /// Sample providing each window's x-axis time
    pub time_anchor: TimeAnchor,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_seconds: 1.0,
            overlap_fraction: 0.5,
            requested_metrics: MetricSet::all(),
            time_anchor: TimeAnchor::Last,
        }
    }
}

impl AnalysisConfig {
    /// Reject degenerate configurations before any computation starts.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.window_seconds.is_finite() && self.window_seconds > 0.0) {
            return Err(AnalysisError::InvalidWindow {
                window_seconds: self.window_seconds,
            });
        }
        if !(0.0..1.0).contains(&self.overlap_fraction) {
            return Err(AnalysisError::InvalidOverlap {
                overlap_fraction: self.overlap_fraction,
            });
        }
        if self.requested_metrics.is_empty() {
            return Err(AnalysisError::EmptyMetricSet);
        }
        Ok(())
    }
}

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Field delimiter for delimited text; auto-detected when unset
    pub delimiter: Option<char>,
    /// Samples beyond this count are dropped
    pub max_samples: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_samples: 20_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration, or the defaults if the file is missing or its
    /// JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::MetricKind;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.window_seconds, 1.0);
        assert_eq!(config.analysis.overlap_fraction, 0.5);
        assert_eq!(config.analysis.requested_metrics.len(), 17);
        assert_eq!(config.analysis.time_anchor, TimeAnchor::Last);
        assert_eq!(config.ingest.max_samples, 20_000);
        assert!(config.analysis.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"analysis": {"window_seconds": 2.5, "requested_metrics": ["rms_total", "freq_band_1_5"]}}"#;
        let parsed: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.analysis.window_seconds, 2.5);
        assert_eq!(parsed.analysis.overlap_fraction, 0.5);
        assert_eq!(parsed.analysis.requested_metrics.len(), 2);
        assert!(parsed
            .analysis
            .requested_metrics
            .contains(MetricKind::RmsTotal));
        assert_eq!(parsed.ingest, IngestConfig::default());
    }

    #[test]
    fn test_validate_rejects_invalid_values() {
        let config = AnalysisConfig {
            window_seconds: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(AnalysisError::InvalidWindow {
                window_seconds: 0.0
            })
        );

        let config = AnalysisConfig {
            overlap_fraction: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidOverlap { .. })
        ));

        let config = AnalysisConfig {
            requested_metrics: MetricSet::new(Vec::new()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(AnalysisError::EmptyMetricSet));
    }

    #[test]
    fn test_load_from_file_falls_back_to_defaults() {
        let missing = AppConfig::load_from_file("/nonexistent/lava-config.json");
        assert_eq!(missing, AppConfig::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert_eq!(AppConfig::load_from_file(file.path()), AppConfig::default());
    }

    #[test]
    fn test_load_from_file_reads_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"analysis": {{"overlap_fraction": 0.25, "time_anchor": "center"}}, "ingest": {{"delimiter": ";"}}}}"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path());
        assert_eq!(config.analysis.overlap_fraction, 0.25);
        assert_eq!(config.analysis.time_anchor, TimeAnchor::Center);
        assert_eq!(config.ingest.delimiter, Some(';'));
    }
}
